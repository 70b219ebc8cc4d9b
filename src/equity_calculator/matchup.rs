use serde::{Deserialize, Serialize};

use crate::card_set::CardSet;
use crate::hand_evaluator::MadeHand;

/// One player's outcome in a matchup
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerResult {
    /// hole cards
    pub cards: CardSet,
    pub hand: MadeHand,
    /// true for every player sharing the best hand
    pub win: bool,
}

/// A single evaluated outcome: full board, hole cards and winners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    /// always 5 cards
    pub board: CardSet,
    /// in the order the ranges were given
    pub players: Vec<PlayerResult>,
    /// more than one on ties
    pub won_player_count: usize,
    /// relative likelihood of this outcome
    pub weight: f64,
}

impl Matchup {
    /// Evaluates every player's hand against `board` and marks the best ones
    ///
    /// `board` must hold 5 cards, each hole 2 cards, and no card may repeat.
    pub(crate) fn showdown(board: CardSet, holes: &[CardSet], weight: f64) -> Matchup {
        let mut players: Vec<PlayerResult> = holes
            .iter()
            .map(|&cards| PlayerResult {
                cards,
                hand: MadeHand::from_seven_cards(board + cards),
                win: false,
            })
            .collect();
        let best = players.iter().map(|p| p.hand.power_index()).min();
        let mut won_player_count = 0;
        for player in players.iter_mut() {
            if Some(player.hand.power_index()) == best {
                player.win = true;
                won_player_count += 1;
            }
        }
        Matchup {
            board,
            players,
            won_player_count,
            weight,
        }
    }

    /// Indexes of the winning players
    pub fn winners(&self) -> impl Iterator<Item = usize> + '_ {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.win)
            .map(|(i, _)| i)
    }

    pub fn is_tie(&self) -> bool {
        self.won_player_count > 1
    }
}
