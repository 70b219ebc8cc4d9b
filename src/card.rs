/*
 * Playing card primitives
 *
 * A card is stored as its index `rank + 13 * suit`
 * where rank is 0 (ace) -> 12 (king) and suit is 0 (spade) -> 3 (club)
 */

use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseCardError {
    #[error("{0:?} is not a valid rank")]
    InvalidRank(char),
    #[error("{0:?} is not a valid suit")]
    InvalidSuit(char),
    #[error("{0:?} is not a valid card")]
    InvalidCard(String),
}

/// Card rank, declared in index order
///
/// The derived `Ord` is the index order. Use `Rank::compare` for strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Ace,
    Deuce,
    Trey,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    /// All ranks in index order
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Deuce,
        Rank::Trey,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// All ranks from strongest to weakest
    pub const POWER_ORDER: [Rank; 13] = [
        Rank::Ace,
        Rank::King,
        Rank::Queen,
        Rank::Jack,
        Rank::Ten,
        Rank::Nine,
        Rank::Eight,
        Rank::Seven,
        Rank::Six,
        Rank::Five,
        Rank::Four,
        Rank::Trey,
        Rank::Deuce,
    ];

    /// Parse rank char
    ///
    /// # Example
    ///
    /// ```
    /// use poker_equity::card::Rank;
    /// assert_eq!(Rank::parse('T').unwrap(), Rank::Ten);
    /// assert!(Rank::parse('t').is_err());
    /// ```
    pub fn parse(c: char) -> Result<Rank, ParseCardError> {
        RANK_TO_CHAR
            .iter()
            .position(|&r| r == c)
            .map(|i| Rank::ALL[i])
            .ok_or(ParseCardError::InvalidRank(c))
    }

    pub fn from_index(index: u8) -> Option<Rank> {
        Rank::ALL.get(usize::from(index)).copied()
    }

    /// 0 (ace) -> 12 (king)
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// 0 (ace) -> 12 (deuce)
    pub fn power_index(self) -> u8 {
        match self {
            Rank::Ace => 0,
            r => RANK_COUNT - r.index(),
        }
    }

    /// 0 (deuce) -> 12 (ace), used by the hand evaluator
    pub fn strength(self) -> u8 {
        RANK_COUNT - 1 - self.power_index()
    }

    /// Compares ranks in power order, stronger rank first
    pub fn compare(self, other: Rank) -> Ordering {
        self.power_index().cmp(&other.power_index())
    }

    pub fn to_char(self) -> char {
        RANK_TO_CHAR[usize::from(self.index())]
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Card suit, declared in index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spade,
    Heart,
    Diamond,
    Club,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spade, Suit::Heart, Suit::Diamond, Suit::Club];

    /// Parse lowercase suit char
    pub fn parse(c: char) -> Result<Suit, ParseCardError> {
        SUIT_TO_CHAR
            .iter()
            .position(|&s| s == c)
            .map(|i| Suit::ALL[i])
            .ok_or(ParseCardError::InvalidSuit(c))
    }

    pub fn from_index(index: u8) -> Option<Suit> {
        Suit::ALL.get(usize::from(index)).copied()
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub fn compare(self, other: Suit) -> Ordering {
        self.index().cmp(&other.index())
    }

    pub fn to_char(self) -> char {
        SUIT_TO_CHAR[usize::from(self.index())]
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Orderings used when cards need to be sorted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardOrder {
    /// suit major, rank index minor (As, 2s, ... Ks, Ah, ...)
    Index,
    /// rank strength major, suit minor (As, Ah, Ad, Ac, Ks, ...)
    Power,
}

impl CardOrder {
    pub fn compare(self, a: Card, b: Card) -> Ordering {
        match self {
            CardOrder::Index => a.index().cmp(&b.index()),
            CardOrder::Power => a.compare(b),
        }
    }
}

/// A single playing card
///
/// The derived `Ord` is the index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card(u8);

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Card {
        Card(rank.index() + suit.index() * RANK_COUNT)
    }

    /// Card from index, `None` if out of range
    pub fn from_index(index: u8) -> Option<Card> {
        if index < CARD_COUNT {
            Some(Card(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    pub fn rank(self) -> Rank {
        Rank::ALL[usize::from(self.0 % RANK_COUNT)]
    }

    pub fn suit(self) -> Suit {
        Suit::ALL[usize::from(self.0 / RANK_COUNT)]
    }

    /// Compares cards in power order, suit breaks ties
    ///
    /// # Example
    ///
    /// ```
    /// use std::cmp::Ordering;
    /// use poker_equity::card::Card;
    /// let ace: Card = "Ad".parse().unwrap();
    /// let six: Card = "6h".parse().unwrap();
    /// assert_eq!(ace.compare(six), Ordering::Less);
    /// ```
    pub fn compare(self, other: Card) -> Ordering {
        self.rank()
            .compare(other.rank())
            .then_with(|| self.suit().compare(other.suit()))
    }
}

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parses exactly two chars, rank then suit
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(r), Some(su), None) => match (Rank::parse(r), Suit::parse(su)) {
                (Ok(rank), Ok(suit)) => Ok(Card::new(rank, suit)),
                _ => Err(ParseCardError::InvalidCard(s.to_string())),
            },
            _ => Err(ParseCardError::InvalidCard(s.to_string())),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank(), self.suit())
    }
}

impl TryFrom<String> for Card {
    type Error = ParseCardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> String {
        card.to_string()
    }
}
