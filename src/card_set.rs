use std::convert::TryFrom;
use std::fmt;
use std::iter::FromIterator;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::card::{Card, CardOrder};
use crate::constants::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseCardSetError {
    #[error("{0:?} has an odd number of characters")]
    OddLength(String),
    #[error("{card:?} at offset {offset} of {input:?} is not a valid card")]
    InvalidCard {
        input: String,
        offset: usize,
        card: String,
    },
}

/// 64 bit set of cards
///
/// Bit `i` is set when the card with index `i` is a member.
/// Bits 52-63 are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CardSet(u64);

impl CardSet {
    pub const EMPTY: CardSet = CardSet(0);
    pub const FULL: CardSet = CardSet(FULL_MASK);

    pub const fn empty() -> CardSet {
        CardSet::EMPTY
    }

    pub const fn full() -> CardSet {
        CardSet::FULL
    }

    /// Set from a raw mask, `None` if bits above 51 are set
    pub fn from_bits(bits: u64) -> Option<CardSet> {
        if bits & !FULL_MASK == 0 {
            Some(CardSet(bits))
        } else {
            None
        }
    }

    pub fn from_cards<I: IntoIterator<Item = Card>>(cards: I) -> CardSet {
        cards
            .into_iter()
            .fold(CardSet::empty(), |set, card| set.added(card))
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns true when every card of `other` is in this set
    ///
    /// # Example
    ///
    /// ```
    /// use poker_equity::card_set::CardSet;
    /// let board: CardSet = "AsKcQhJd".parse().unwrap();
    /// assert!(board.has("AsQh".parse::<CardSet>().unwrap()));
    /// assert!(!board.has("AsAh".parse::<CardSet>().unwrap()));
    /// assert!(board.has(CardSet::empty()));
    /// ```
    pub fn has<T: Into<CardSet>>(self, other: T) -> bool {
        let other = other.into().0;
        (self.0 & other) == other
    }

    /// Returns true when the sets share at least one card
    pub fn intersects<T: Into<CardSet>>(self, other: T) -> bool {
        (self.0 & other.into().0) != 0
    }

    pub fn added<T: Into<CardSet>>(self, other: T) -> CardSet {
        CardSet(self.0 | other.into().0)
    }

    pub fn removed<T: Into<CardSet>>(self, other: T) -> CardSet {
        CardSet(self.0 & !other.into().0)
    }

    pub const fn size(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Card at position `index` in iteration order
    pub fn at(self, index: usize) -> Option<Card> {
        self.iter().nth(index)
    }

    /// Iterates cards in ascending index order
    pub fn iter(self) -> CardSetIter {
        CardSetIter(self.0)
    }

    /// 13 bit mask of the ranks present in `suit`, bit `i` being rank index `i`
    pub(crate) const fn suit_mask(self, suit: u8) -> u16 {
        ((self.0 >> (suit as u32 * RANK_COUNT as u32)) & 0x1fff) as u16
    }

    /// Writes the cards sorted by `order`
    ///
    /// # Example
    ///
    /// ```
    /// use poker_equity::card::CardOrder;
    /// use poker_equity::card_set::CardSet;
    /// let cards: CardSet = "QhAsJdKc".parse().unwrap();
    /// assert_eq!(cards.format(CardOrder::Power), "AsKcQhJd");
    /// assert_eq!(cards.format(CardOrder::Index), "AsQhJdKc");
    /// ```
    pub fn format(self, order: CardOrder) -> String {
        let mut cards: Vec<Card> = self.iter().collect();
        cards.sort_by(|&a, &b| order.compare(a, b));
        cards.iter().map(|c| c.to_string()).collect()
    }
}

impl FromStr for CardSet {
    type Err = ParseCardSetError;

    /// Parses concatenated two char cards, in any order
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() % 2 != 0 {
            return Err(ParseCardSetError::OddLength(s.to_string()));
        }
        let mut cards = CardSet::empty();
        for (i, pair) in chars.chunks(2).enumerate() {
            let text: String = pair.iter().collect();
            match text.parse::<Card>() {
                Ok(card) => cards += card,
                Err(_) => {
                    return Err(ParseCardSetError::InvalidCard {
                        input: s.to_string(),
                        offset: 2 * i,
                        card: text,
                    })
                }
            }
        }
        Ok(cards)
    }
}

impl fmt::Display for CardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for card in self.iter() {
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for CardSet {
    type Error = ParseCardSetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CardSet> for String {
    fn from(cards: CardSet) -> String {
        cards.to_string()
    }
}

impl From<Card> for CardSet {
    fn from(card: Card) -> CardSet {
        CardSet(1u64 << card.index())
    }
}

impl FromIterator<Card> for CardSet {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        CardSet::from_cards(iter)
    }
}

impl<T: Into<CardSet>> Add<T> for CardSet {
    type Output = Self;

    fn add(self, other: T) -> Self::Output {
        self.added(other)
    }
}

impl<T: Into<CardSet>> AddAssign<T> for CardSet {
    fn add_assign(&mut self, rhs: T) {
        self.0 |= rhs.into().0;
    }
}

impl<T: Into<CardSet>> Sub<T> for CardSet {
    type Output = Self;

    fn sub(self, other: T) -> Self::Output {
        self.removed(other)
    }
}

impl<T: Into<CardSet>> SubAssign<T> for CardSet {
    fn sub_assign(&mut self, rhs: T) {
        self.0 &= !rhs.into().0;
    }
}

impl IntoIterator for CardSet {
    type Item = Card;
    type IntoIter = CardSetIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pops the lowest set bit each step
#[derive(Debug, Clone)]
pub struct CardSetIter(u64);

impl Iterator for CardSetIter {
    type Item = Card;

    fn next(&mut self) -> Option<Card> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as u8;
        self.0 &= self.0 - 1;
        Card::from_index(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for CardSetIter {}
