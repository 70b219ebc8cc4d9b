use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::card_set::CardSet;
use crate::constants::DEFAULT_PROBABILITY_RESOLUTION;
use crate::hand_range::HandRange;

use super::{Evaluator, ExhaustiveEvaluator, Matchup, MontecarloEvaluator, SimulatorError};

/// Accumulated outcomes of many matchups
///
/// A win counts the matchup weight, a tie splits it between the winners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityResults {
    wins: Vec<f64>,
    ties: Vec<f64>,
    total_weight: f64,
    matchup_count: u64,
}

impl EquityResults {
    pub fn new(player_count: usize) -> EquityResults {
        EquityResults {
            wins: vec![0f64; player_count],
            ties: vec![0f64; player_count],
            total_weight: 0.0,
            matchup_count: 0,
        }
    }

    /// Drains an evaluator, stopping after `limit` matchups if given
    pub fn from_evaluator<E: Evaluator>(evaluator: E, limit: Option<usize>) -> EquityResults {
        let mut results = EquityResults::new(evaluator.player_count());
        let limit = limit.unwrap_or(usize::MAX);
        for matchup in evaluator.take(limit) {
            results.record(&matchup);
        }
        results
    }

    pub fn record(&mut self, matchup: &Matchup) {
        let share = matchup.weight / matchup.won_player_count as f64;
        for i in matchup.winners() {
            if matchup.is_tie() {
                self.ties[i] += share;
            } else {
                self.wins[i] += matchup.weight;
            }
        }
        self.total_weight += matchup.weight;
        self.matchup_count += 1;
    }

    /// Adds another batch of the same players
    pub fn merge(&mut self, other: &EquityResults) {
        debug_assert_eq!(
            self.player_count(),
            other.player_count(),
            "merging results of different player counts"
        );
        for (win, other_win) in self.wins.iter_mut().zip(&other.wins) {
            *win += other_win;
        }
        for (tie, other_tie) in self.ties.iter_mut().zip(&other.ties) {
            *tie += other_tie;
        }
        self.total_weight += other.total_weight;
        self.matchup_count += other.matchup_count;
    }

    pub fn player_count(&self) -> usize {
        self.wins.len()
    }

    pub fn matchup_count(&self) -> u64 {
        self.matchup_count
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    fn normalized(&self, f: impl Fn(usize) -> f64) -> Vec<f64> {
        if self.total_weight == 0.0 {
            return vec![0.0; self.player_count()];
        }
        (0..self.player_count())
            .map(|i| f(i) / self.total_weight)
            .collect()
    }

    /// Expected pot share of each player, summing to 1
    pub fn equities(&self) -> Vec<f64> {
        self.normalized(|i| self.wins[i] + self.ties[i])
    }

    /// Share of outright wins
    pub fn win_rates(&self) -> Vec<f64> {
        self.normalized(|i| self.wins[i])
    }

    /// Share of tie pot fractions
    pub fn tie_rates(&self) -> Vec<f64> {
        self.normalized(|i| self.ties[i])
    }
}

/// Calculates exact range vs range equities
///
/// Enumerates every hole card assignment and board completion.
/// Only tractable for small ranges or boards with few missing cards.
///
/// # Arguments
///
/// * `board` cards already dealt, at most 5
/// * `ranges` one range per player
///
/// # Example
/// ```
/// use poker_equity::card_set::CardSet;
/// use poker_equity::equity_calculator::exact_equity;
/// use poker_equity::hand_range::HandRange;
/// let board: CardSet = "AsKcQh2d".parse().unwrap();
/// let ranges = vec![HandRange::parse("KdJd").unwrap(), HandRange::parse("Ah3h").unwrap()];
/// let results = exact_equity(board, &ranges).unwrap();
/// assert_eq!(results.matchup_count(), 44);
/// ```
pub fn exact_equity(board: CardSet, ranges: &[HandRange]) -> Result<EquityResults, SimulatorError> {
    let evaluator = ExhaustiveEvaluator::new(board, ranges)?;
    Ok(EquityResults::from_evaluator(evaluator, None))
}

/// Runs a monte carlo simulation to approximate range vs range equity
///
/// Trials are split between `threads` scoped threads, each sampling with its
/// own generator seeded from system entropy.
///
/// # Arguments
///
/// * `board` cards already dealt, at most 5
/// * `ranges` one range per player
/// * `threads` number of threads to use in simulation
/// * `trials` total number of matchups to sample
///
/// # Example
/// ```
/// use poker_equity::card_set::CardSet;
/// use poker_equity::equity_calculator::approx_equity;
/// use poker_equity::hand_range::HandRange;
/// let ranges = vec![HandRange::parse("QQ+").unwrap(), HandRange::parse("AKs").unwrap()];
/// let results = approx_equity(CardSet::empty(), &ranges, 2, 1000).unwrap();
/// assert_eq!(results.matchup_count(), 1000);
/// ```
pub fn approx_equity(
    board: CardSet,
    ranges: &[HandRange],
    threads: usize,
    trials: usize,
) -> Result<EquityResults, SimulatorError> {
    let mut rng = SmallRng::from_entropy();
    let template = MontecarloEvaluator::from_rng(
        board,
        ranges,
        DEFAULT_PROBABILITY_RESOLUTION,
        SmallRng::seed_from_u64(rng.gen()),
    )?;
    let threads = threads.max(1);
    let player_count = ranges.len();

    crossbeam::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let shard = trials / threads + if i < trials % threads { 1 } else { 0 };
                let evaluator = template.reseeded(SmallRng::seed_from_u64(rng.gen()));
                scope.spawn(move |_| {
                    let results = EquityResults::from_evaluator(evaluator, Some(shard));
                    log::trace!("thread {} sampled {} matchups", i, results.matchup_count());
                    results
                })
            })
            .collect();
        handles
            .into_iter()
            .try_fold(EquityResults::new(player_count), |mut total, handle| {
                let results = handle.join().map_err(|_| SimulatorError::WorkerPanicked)?;
                total.merge(&results);
                Ok(total)
            })
    })
    .map_err(|_| SimulatorError::WorkerPanicked)?
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERROR: f64 = 0.02;

    fn cs(s: &str) -> CardSet {
        s.parse().unwrap()
    }

    fn ranges(specs: &[&str]) -> Vec<HandRange> {
        specs.iter().map(|s| HandRange::parse(s).unwrap()).collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64], error: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < error, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_exact_heads_up() {
        let results = exact_equity(cs("AsKcQh2d"), &ranges(&["KdJd", "Ah3h"])).unwrap();
        assert_eq!(results.matchup_count(), 44);
        assert_close(&results.equities(), &[9.0 / 44.0, 35.0 / 44.0], 1e-9);
        assert_close(&results.win_rates(), &[9.0 / 44.0, 35.0 / 44.0], 1e-9);
    }

    #[test]
    fn test_exact_three_way() {
        let results = exact_equity(cs("4s5hQhTd"), &ranges(&["AKs", "Th9h", "6s6h"])).unwrap();
        assert_eq!(results.matchup_count(), 168);
        assert_close(
            &results.equities(),
            &[36.0 / 168.0, 124.0 / 168.0, 8.0 / 168.0],
            1e-9,
        );
    }

    #[test]
    fn test_exact_ties() {
        let results = exact_equity(cs("AsKsQsJsTs"), &ranges(&["2c2d", "3c3d"])).unwrap();
        assert_eq!(results.matchup_count(), 1);
        assert_close(&results.equities(), &[0.5, 0.5], 1e-9);
        assert_close(&results.win_rates(), &[0.0, 0.0], 1e-9);
        assert_close(&results.tie_rates(), &[0.5, 0.5], 1e-9);
    }

    #[test]
    fn test_exact_weighted() {
        // AA beats QQ, QQ beats 88 at half weight
        let results = exact_equity(cs("2c3d4h9sJc"), &ranges(&["AA,88:0.5", "QQ"])).unwrap();
        assert_eq!(results.matchup_count(), 72);
        assert!((results.total_weight() - 54.0).abs() < 1e-9);
        assert_close(&results.equities(), &[36.0 / 54.0, 18.0 / 54.0], 1e-9);
    }

    #[test]
    fn test_exact_empty_range() {
        let results = exact_equity(cs("AsAhAd"), &ranges(&["AA", "KK"])).unwrap();
        assert_eq!(results.matchup_count(), 0);
        assert_eq!(results.equities(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_approx_heads_up() {
        let results = approx_equity(cs("AsKcQh2d"), &ranges(&["KdJd", "Ah3h"]), 4, 100_000).unwrap();
        assert_eq!(results.matchup_count(), 100_000);
        assert_close(&results.equities(), &[9.0 / 44.0, 35.0 / 44.0], ERROR);
    }

    #[test]
    fn test_approx_three_way() {
        let results =
            approx_equity(cs("4s5hQhTd"), &ranges(&["AKs", "Th9h", "6s6h"]), 3, 100_000).unwrap();
        assert_close(
            &results.equities(),
            &[36.0 / 168.0, 124.0 / 168.0, 8.0 / 168.0],
            ERROR,
        );
    }

    #[test]
    fn test_approx_uneven_shards() {
        let results = approx_equity(cs(""), &ranges(&["AA", "KK"]), 7, 1_000).unwrap();
        assert_eq!(results.matchup_count(), 1_000);
        let results = approx_equity(cs(""), &ranges(&["AA", "KK"]), 0, 10).unwrap();
        assert_eq!(results.matchup_count(), 10);
    }

    #[test]
    fn test_approx_errors() {
        assert!(matches!(
            approx_equity(cs(""), &ranges(&["AsAh", "AsKd"]), 2, 100),
            Err(SimulatorError::NoSatisfiableMatchup)
        ));
        assert!(matches!(
            approx_equity(cs("AsAhAd"), &ranges(&["AA", "KK"]), 2, 100),
            Err(SimulatorError::EmptyRange(0))
        ));
    }

    #[test]
    fn test_merge() {
        let board = cs("AsKcQh2d");
        let specs = ranges(&["KdJd", "Ah3h"]);
        let mut total = exact_equity(board, &specs).unwrap();
        total.merge(&exact_equity(board, &specs).unwrap());
        assert_eq!(total.matchup_count(), 88);
        assert_close(&total.equities(), &[9.0 / 44.0, 35.0 / 44.0], 1e-9);
    }

    #[test]
    #[should_panic(expected = "different player counts")]
    fn test_merge_player_count_mismatch() {
        let mut total = EquityResults::new(2);
        total.merge(&EquityResults::new(3));
    }

    #[test]
    fn test_serde() {
        let results = exact_equity(cs("AsKsQsJsTs"), &ranges(&["2c2d", "3c3d"])).unwrap();
        let json = serde_json::to_string(&results).unwrap();
        assert_eq!(serde_json::from_str::<EquityResults>(&json).unwrap(), results);
    }
}
