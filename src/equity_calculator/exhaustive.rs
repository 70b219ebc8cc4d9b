use crate::card::Card;
use crate::card_set::CardSet;
use crate::constants::*;
use crate::hand_range::HandRange;

use super::matchup::Matchup;
use super::{check_board, Evaluator, SimulatorError};

/// Partial deal waiting on the work stack
#[derive(Debug, Clone)]
struct Frame {
    holes: Vec<CardSet>,
    board: CardSet,
    /// board and hole cards dealt so far
    used: CardSet,
    weight: f64,
    /// lowest card index that may still be added to the board
    next_card: u8,
}

/// Enumerates every legal hole card assignment and board completion
///
/// Each outcome is yielded once, weighted by the product of the players'
/// range probabilities. Runs depth first on an explicit stack, so it can be
/// paused between matchups and dropped at any time.
///
/// # Example
///
/// ```
/// use poker_equity::card_set::CardSet;
/// use poker_equity::equity_calculator::ExhaustiveEvaluator;
/// use poker_equity::hand_range::HandRange;
/// let board: CardSet = "AsKcQh2d".parse().unwrap();
/// let ranges = vec![HandRange::parse("KdJd").unwrap(), HandRange::parse("Ah3h").unwrap()];
/// let evaluator = ExhaustiveEvaluator::new(board, &ranges).unwrap();
/// let wins = evaluator.filter(|m| m.players[0].win).count();
/// assert_eq!(wins, 9);
/// ```
#[derive(Debug, Clone)]
pub struct ExhaustiveEvaluator {
    board: CardSet,
    /// per player (card pair, probability), board conflicts removed
    ranges: Vec<Vec<(CardSet, f64)>>,
    stack: Vec<Frame>,
}

impl ExhaustiveEvaluator {
    pub fn new(board: CardSet, ranges: &[HandRange]) -> Result<Self, SimulatorError> {
        let ranges = ranges
            .iter()
            .map(|range| range.without_conflicts(board).iter().collect())
            .collect();
        ExhaustiveEvaluator::from_pairs(board, ranges)
    }

    fn from_pairs(
        board: CardSet,
        ranges: Vec<Vec<(CardSet, f64)>>,
    ) -> Result<Self, SimulatorError> {
        check_board(board, ranges.len())?;
        if let Some(player) = ranges.iter().position(|pairs| pairs.is_empty()) {
            log::warn!("player {} has no card pair left, no matchup will be yielded", player);
        }
        log::debug!(
            "exhaustive evaluator: {} players on [{}], range sizes {:?}",
            ranges.len(),
            board,
            ranges.iter().map(Vec::len).collect::<Vec<usize>>()
        );
        let root = Frame {
            holes: Vec::with_capacity(ranges.len()),
            board,
            used: board,
            weight: 1.0,
            next_card: 0,
        };
        Ok(ExhaustiveEvaluator {
            board,
            ranges,
            stack: vec![root],
        })
    }

    /// Pushes the children of `frame`, in reverse so they pop in order
    fn expand(&mut self, frame: Frame) {
        let player = frame.holes.len();
        if player < self.ranges.len() {
            for &(pair, probability) in self.ranges[player].iter().rev() {
                if frame.used.intersects(pair) {
                    continue;
                }
                let mut holes = frame.holes.clone();
                holes.push(pair);
                self.stack.push(Frame {
                    holes,
                    board: frame.board,
                    used: frame.used + pair,
                    weight: frame.weight * probability,
                    next_card: frame.next_card,
                });
            }
            return;
        }
        for index in (frame.next_card..CARD_COUNT).rev() {
            let card = match Card::from_index(index) {
                Some(card) => card,
                None => continue,
            };
            if frame.used.has(card) {
                continue;
            }
            self.stack.push(Frame {
                holes: frame.holes.clone(),
                board: frame.board + card,
                used: frame.used + card,
                weight: frame.weight,
                next_card: index + 1,
            });
        }
    }
}

impl Iterator for ExhaustiveEvaluator {
    type Item = Matchup;

    fn next(&mut self) -> Option<Matchup> {
        while let Some(frame) = self.stack.pop() {
            if frame.holes.len() == self.ranges.len() && frame.board.size() == BOARD_CARDS {
                return Some(Matchup::showdown(frame.board, &frame.holes, frame.weight));
            }
            self.expand(frame);
        }
        None
    }
}

impl Evaluator for ExhaustiveEvaluator {
    fn board(&self) -> CardSet {
        self.board
    }

    fn player_count(&self) -> usize {
        self.ranges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn cs(s: &str) -> CardSet {
        s.parse().unwrap()
    }

    fn ranges(specs: &[&str]) -> Vec<HandRange> {
        specs.iter().map(|s| HandRange::parse(s).unwrap()).collect()
    }

    fn win_counts(board: &str, specs: &[&str]) -> (Vec<usize>, usize) {
        let evaluator = ExhaustiveEvaluator::new(cs(board), &ranges(specs)).unwrap();
        let mut wins = vec![0; specs.len()];
        let mut total = 0;
        for matchup in evaluator {
            for i in matchup.winners() {
                wins[i] += 1;
            }
            total += 1;
        }
        (wins, total)
    }

    #[test]
    fn test_turn_heads_up() {
        assert_eq!(win_counts("AsKcQh2d", &["KdJd", "Ah3h"]), (vec![9, 35], 44));
    }

    #[test]
    fn test_turn_three_way() {
        assert_eq!(
            win_counts("4s5hQhTd", &["AKs", "Th9h", "6s6h"]),
            (vec![36, 124, 8], 168)
        );
    }

    #[test]
    fn test_matchup_invariants() {
        let board = cs("4s5hQhTd");
        let evaluator = ExhaustiveEvaluator::new(board, &ranges(&["AKs", "Th9h", "6s6h"])).unwrap();
        let mut seen = HashSet::new();
        for matchup in evaluator {
            assert_eq!(matchup.board.size(), 5);
            assert!(matchup.board.has(board));
            assert!(matchup.won_player_count >= 1);
            assert_eq!(
                matchup.won_player_count,
                matchup.players.iter().filter(|p| p.win).count()
            );
            let mut dealt = matchup.board;
            for player in &matchup.players {
                assert!(!dealt.intersects(player.cards));
                dealt += player.cards;
            }
            let holes: Vec<CardSet> = matchup.players.iter().map(|p| p.cards).collect();
            assert!(seen.insert((matchup.board, holes)), "duplicate matchup");
        }
        assert_eq!(seen.len(), 168);
    }

    #[test]
    fn test_flop_board_completions() {
        // 45 cards left, C(45, 2) run outs
        let (_, total) = win_counts("AsKcQh", &["KdJd", "Ah3h"]);
        assert_eq!(total, 990);
    }

    #[test]
    fn test_overlapping_ranges_are_pruned() {
        // AsKs collides with every AK suited pair sharing a spade
        let (wins, total) = win_counts("2c3d4h8sJc", &["AsKs", "AKs"]);
        assert_eq!(total, 3);
        assert_eq!(wins, vec![3, 3]);
    }

    #[test]
    fn test_weights() {
        let evaluator =
            ExhaustiveEvaluator::new(cs("2c3d4h8sJc"), &ranges(&["AA:0.5,KK", "QQ"])).unwrap();
        let matchups: Vec<Matchup> = evaluator.collect();
        assert_eq!(matchups.len(), 72);
        let total: f64 = matchups.iter().map(|m| m.weight).sum();
        assert!((total - 54.0).abs() < 1e-9);
        assert!(matchups.iter().all(|m| m.players[0].win));
    }

    #[test]
    fn test_empty_range_yields_nothing() {
        let mut evaluator =
            ExhaustiveEvaluator::new(cs("AsAhAd"), &ranges(&["AA", "KK"])).unwrap();
        assert!(evaluator.next().is_none());
        let mut evaluator = ExhaustiveEvaluator::new(cs(""), &ranges(&["", "KK"])).unwrap();
        assert!(evaluator.next().is_none());
    }

    #[test]
    fn test_invalid_configurations() {
        assert!(matches!(
            ExhaustiveEvaluator::new(cs("AsKsQsJsTs9s"), &ranges(&["22", "33"])),
            Err(SimulatorError::TooManyBoardCards(6))
        ));
        assert!(matches!(
            ExhaustiveEvaluator::new(cs(""), &[]),
            Err(SimulatorError::NoPlayers)
        ));
    }

    #[test]
    fn test_accessors() {
        let evaluator = ExhaustiveEvaluator::new(cs("AsKcQh2d"), &ranges(&["KdJd", "Ah3h"])).unwrap();
        assert_eq!(evaluator.board(), cs("AsKcQh2d"));
        assert_eq!(evaluator.player_count(), 2);
    }
}
