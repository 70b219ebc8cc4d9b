use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::evaluator;
use crate::card_set::CardSet;
use crate::constants::*;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MadeHandError {
    #[error("a made hand needs exactly 7 cards, got {0}")]
    InvalidCardCount(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandCategory {
    StraightFlush,
    FourOfAKind,
    FullHouse,
    Flush,
    Straight,
    ThreeOfAKind,
    TwoPair,
    Pair,
    HighCard,
}

impl HandCategory {
    pub fn from_power_index(power_index: u16) -> HandCategory {
        match power_index {
            0..=STRAIGHT_FLUSH_MAX => HandCategory::StraightFlush,
            0..=FOUR_OF_A_KIND_MAX => HandCategory::FourOfAKind,
            0..=FULL_HOUSE_MAX => HandCategory::FullHouse,
            0..=FLUSH_MAX => HandCategory::Flush,
            0..=STRAIGHT_MAX => HandCategory::Straight,
            0..=THREE_OF_A_KIND_MAX => HandCategory::ThreeOfAKind,
            0..=TWO_PAIR_MAX => HandCategory::TwoPair,
            0..=PAIR_MAX => HandCategory::Pair,
            _ => HandCategory::HighCard,
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandCategory::StraightFlush => "straight-flush",
            HandCategory::FourOfAKind => "quads",
            HandCategory::FullHouse => "full-house",
            HandCategory::Flush => "flush",
            HandCategory::Straight => "straight",
            HandCategory::ThreeOfAKind => "trips",
            HandCategory::TwoPair => "two-pairs",
            HandCategory::Pair => "pair",
            HandCategory::HighCard => "highcard",
        };
        write!(f, "{}", name)
    }
}

/// The best 5 card hand a player makes at showdown
///
/// Lower power index is stronger: 1 is a royal flush, 7462 is 7-5-4-3-2 high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MadeHand {
    power_index: u16,
}

impl MadeHand {
    /// Evaluates the best hand in a 7 card set
    ///
    /// # Example
    ///
    /// ```
    /// use poker_equity::card_set::CardSet;
    /// use poker_equity::hand_evaluator::{HandCategory, MadeHand};
    /// let cards: CardSet = "AsKsQsJsTs2h3d".parse().unwrap();
    /// let hand = MadeHand::find_best_from(cards).unwrap();
    /// assert_eq!(hand.category(), HandCategory::StraightFlush);
    /// ```
    pub fn find_best_from(cards: CardSet) -> Result<MadeHand, MadeHandError> {
        if cards.size() != HAND_CARDS {
            return Err(MadeHandError::InvalidCardCount(cards.size()));
        }
        Ok(MadeHand::from_seven_cards(cards))
    }

    /// Skips the card count check, `cards` must hold 7 cards
    pub(crate) fn from_seven_cards(cards: CardSet) -> MadeHand {
        debug_assert_eq!(cards.size(), HAND_CARDS);
        MadeHand {
            power_index: evaluator::evaluate(cards),
        }
    }

    pub const fn power_index(self) -> u16 {
        self.power_index
    }

    pub fn category(self) -> HandCategory {
        HandCategory::from_power_index(self.power_index)
    }

    /// True when this hand beats `other`
    pub fn beats(self, other: MadeHand) -> bool {
        self.power_index < other.power_index
    }
}

impl fmt::Display for MadeHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.category(), self.power_index)
    }
}
