use std::collections::BTreeMap;

use rand::distributions::Uniform;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::card::Card;
use crate::card_set::CardSet;
use crate::constants::*;
use crate::hand_range::HandRange;

use super::matchup::Matchup;
use super::{check_board, Evaluator, SimulatorError};

/// Endless stream of randomly dealt matchups
///
/// Each range is flattened into a sampling pool where a pair of probability
/// `p` appears `round(p * resolution)` times. Hole cards are drawn from each
/// pool independently and the draw is retried whenever two players collide,
/// then the board is completed with uniformly random undealt cards.
///
/// Construction fails when no legal deal exists, so every pull terminates.
/// Deciding that is a bounded search: configurations it cannot settle within
/// `SATISFIABILITY_SEARCH_BUDGET` tried pairs are rejected with
/// `SearchBudgetExceeded`. Bound consumption with `Iterator::take`.
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use poker_equity::card_set::CardSet;
/// use poker_equity::equity_calculator::MontecarloEvaluator;
/// use poker_equity::hand_range::HandRange;
/// let board: CardSet = "AsKcQh2d".parse().unwrap();
/// let ranges = vec![HandRange::parse("KdJd").unwrap(), HandRange::parse("Ah3h").unwrap()];
/// let rng = SmallRng::seed_from_u64(7);
/// let evaluator = MontecarloEvaluator::from_rng(board, &ranges, 12, rng).unwrap();
/// assert_eq!(evaluator.take(100).count(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct MontecarloEvaluator<R: Rng = SmallRng> {
    board: CardSet,
    pools: Vec<Vec<CardSet>>,
    card_dist: Uniform<u8>,
    rng: R,
}

impl MontecarloEvaluator<SmallRng> {
    /// Evaluator seeded from system entropy
    pub fn new(
        board: CardSet,
        ranges: &[HandRange],
        resolution: u32,
    ) -> Result<Self, SimulatorError> {
        MontecarloEvaluator::from_rng(board, ranges, resolution, SmallRng::from_entropy())
    }
}

impl<R: Rng> MontecarloEvaluator<R> {
    pub fn from_rng(
        board: CardSet,
        ranges: &[HandRange],
        resolution: u32,
        rng: R,
    ) -> Result<Self, SimulatorError> {
        check_board(board, ranges.len())?;
        let pools: Vec<Vec<CardSet>> = ranges
            .iter()
            .map(|range| resolve(&range.without_conflicts(board), resolution))
            .collect();
        if let Some(player) = pools.iter().position(Vec::is_empty) {
            log::warn!("player {} has nothing to sample at resolution {}", player, resolution);
            return Err(SimulatorError::EmptyRange(player));
        }
        if !is_satisfiable(board, &pools, SATISFIABILITY_SEARCH_BUDGET)? {
            log::warn!("no legal deal for {} players on [{}]", pools.len(), board);
            return Err(SimulatorError::NoSatisfiableMatchup);
        }
        log::debug!(
            "montecarlo evaluator: {} players on [{}], pool sizes {:?}",
            pools.len(),
            board,
            pools.iter().map(Vec::len).collect::<Vec<usize>>()
        );
        Ok(MontecarloEvaluator {
            board,
            pools,
            card_dist: Uniform::from(0..CARD_COUNT),
            rng,
        })
    }

    /// Same pools driven by another generator
    pub fn reseeded<S: Rng>(&self, rng: S) -> MontecarloEvaluator<S> {
        MontecarloEvaluator {
            board: self.board,
            pools: self.pools.clone(),
            card_dist: self.card_dist.clone(),
            rng,
        }
    }

    /// Draws one hole pair per player, `None` on a collision
    fn deal_holes(&mut self) -> Option<(Vec<CardSet>, CardSet)> {
        let mut used = self.board;
        let mut holes = Vec::with_capacity(self.pools.len());
        for pool in &self.pools {
            let pair = pool[self.rng.gen_range(0, pool.len())];
            if used.intersects(pair) {
                return None;
            }
            used += pair;
            holes.push(pair);
        }
        Some((holes, used))
    }
}

impl<R: Rng> Iterator for MontecarloEvaluator<R> {
    type Item = Matchup;

    fn next(&mut self) -> Option<Matchup> {
        loop {
            if let Some((holes, used)) = self.deal_holes() {
                let board = randomize_board(&mut self.rng, self.board, used, &self.card_dist);
                return Some(Matchup::showdown(board, &holes, 1.0));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<R: Rng> Evaluator for MontecarloEvaluator<R> {
    fn board(&self) -> CardSet {
        self.board
    }

    fn player_count(&self) -> usize {
        self.pools.len()
    }
}

/// Sampling pool of a range, in card set order
fn resolve(range: &HandRange, resolution: u32) -> Vec<CardSet> {
    let mut pool = Vec::new();
    for (pair, probability) in range.iter() {
        let copies = (probability * f64::from(resolution)).round() as usize;
        pool.extend(std::iter::repeat(pair).take(copies));
    }
    pool
}

/// True when some collision free deal of the pools and board completion exists
///
/// Card counting rules out most impossible tables. The backtracking search
/// after it fails with `SearchBudgetExceeded` once `budget` pairs were tried.
fn is_satisfiable(
    board: CardSet,
    pools: &[Vec<CardSet>],
    budget: u64,
) -> Result<bool, SimulatorError> {
    let mut pairs: Vec<Vec<CardSet>> = pools
        .iter()
        .map(|pool| {
            let mut pairs = pool.clone();
            pairs.dedup();
            pairs
        })
        .collect();
    if !has_room(board, &pairs) {
        return Ok(false);
    }
    // smallest pools first prunes earliest
    pairs.sort_by_key(Vec::len);
    let mut remaining = budget;
    find_deal(board, &pairs, &mut remaining).ok_or(SimulatorError::SearchBudgetExceeded(budget))
}

/// Checks the deck and each group of identical pools hold enough cards
fn has_room(board: CardSet, pools: &[Vec<CardSet>]) -> bool {
    let players = pools.len() as u32;
    if 2 * players + BOARD_CARDS > u32::from(CARD_COUNT) {
        return false;
    }
    let mut groups: BTreeMap<&[CardSet], u32> = BTreeMap::new();
    for pool in pools {
        *groups.entry(pool.as_slice()).or_insert(0) += 1;
    }
    let everything = cards_of(pools.iter().flatten()).removed(board);
    everything.size() >= 2 * players
        && groups
            .iter()
            .all(|(pool, &count)| cards_of(pool.iter()).size() >= 2 * count)
}

fn cards_of<'a, I: Iterator<Item = &'a CardSet>>(pairs: I) -> CardSet {
    pairs.fold(CardSet::empty(), |cards, &pair| cards + pair)
}

/// Picks one disjoint pair per pool, `None` once the budget runs out
fn find_deal(used: CardSet, pools: &[Vec<CardSet>], budget: &mut u64) -> Option<bool> {
    let (pool, rest) = match pools.split_first() {
        Some(split) => split,
        None => return Some(true),
    };
    for &pair in pool {
        if *budget == 0 {
            return None;
        }
        *budget -= 1;
        if !used.intersects(pair) && find_deal(used + pair, rest, budget)? {
            return Some(true);
        }
    }
    Some(false)
}

/// Completes `board` to 5 cards, skipping anything in `used`
fn randomize_board<R: Rng>(
    rng: &mut R,
    mut board: CardSet,
    mut used: CardSet,
    card_dist: &Uniform<u8>,
) -> CardSet {
    while board.size() < BOARD_CARDS {
        if let Some(card) = Card::from_index(rng.sample(card_dist)) {
            if !used.has(card) {
                used += card;
                board += card;
            }
        }
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Rank;

    const TRIALS: usize = 100_000;
    const TOLERANCE: f64 = 0.02;

    fn cs(s: &str) -> CardSet {
        s.parse().unwrap()
    }

    fn ranges(specs: &[&str]) -> Vec<HandRange> {
        specs.iter().map(|s| HandRange::parse(s).unwrap()).collect()
    }

    fn seeded(board: &str, specs: &[&str], seed: u64) -> MontecarloEvaluator {
        MontecarloEvaluator::from_rng(
            cs(board),
            &ranges(specs),
            DEFAULT_PROBABILITY_RESOLUTION,
            SmallRng::seed_from_u64(seed),
        )
        .unwrap()
    }

    fn win_rates(evaluator: MontecarloEvaluator, players: usize) -> Vec<f64> {
        let mut wins = vec![0usize; players];
        for matchup in evaluator.take(TRIALS) {
            for i in matchup.winners() {
                wins[i] += 1;
            }
        }
        wins.iter().map(|&w| w as f64 / TRIALS as f64).collect()
    }

    #[test]
    fn test_turn_heads_up() {
        let rates = win_rates(seeded("AsKcQh2d", &["KdJd", "Ah3h"], 1), 2);
        assert!((rates[0] - 9.0 / 44.0).abs() < TOLERANCE, "{:?}", rates);
        assert!((rates[1] - 35.0 / 44.0).abs() < TOLERANCE, "{:?}", rates);
    }

    #[test]
    fn test_turn_three_way() {
        let rates = win_rates(seeded("4s5hQhTd", &["AKs", "Th9h", "6s6h"], 2), 3);
        let expected = [36.0 / 168.0, 124.0 / 168.0, 8.0 / 168.0];
        for (rate, expected) in rates.iter().zip(expected.iter()) {
            assert!((rate - expected).abs() < TOLERANCE, "{:?}", rates);
        }
    }

    #[test]
    fn test_matchups_are_legal() {
        let board = cs("4s5hQh");
        for matchup in seeded("4s5hQh", &["AKs,QQ", "Th9h", "66+"], 3).take(2_000) {
            assert_eq!(matchup.board.size(), 5);
            assert!(matchup.board.has(board));
            assert_eq!(matchup.weight, 1.0);
            assert!(matchup.won_player_count >= 1);
            assert_eq!(
                matchup.won_player_count,
                matchup.players.iter().filter(|p| p.win).count()
            );
            let mut dealt = matchup.board;
            for player in &matchup.players {
                assert_eq!(player.cards.size(), 2);
                assert!(!dealt.intersects(player.cards));
                dealt += player.cards;
            }
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a: Vec<Matchup> = seeded("", &["AKs", "QQ"], 42).take(50).collect();
        let b: Vec<Matchup> = seeded("", &["AKs", "QQ"], 42).take(50).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolution_weights() {
        let pool = resolve(&HandRange::parse("AsKs:0.5,QsQh,2c2d:0.01").unwrap(), 12);
        assert_eq!(pool.len(), 18);
        assert_eq!(pool.iter().filter(|&&p| p == cs("AsKs")).count(), 6);
        assert_eq!(pool.iter().filter(|&&p| p == cs("QsQh")).count(), 12);
        assert!(!pool.contains(&cs("2c2d")));
    }

    #[test]
    fn test_weighted_sampling() {
        // AA drawn a third of the time, KK two thirds, QQ loses both
        let evaluator = seeded("2c3d4h8sJc", &["AA:0.5,KK", "QQ"], 5);
        let evaluator = evaluator.reseeded(SmallRng::seed_from_u64(6));
        let aces = evaluator
            .take(30_000)
            .filter(|m| m.players[0].cards.iter().any(|c| c.rank() == Rank::Ace))
            .count();
        assert!((aces as f64 / 30_000.0 - 1.0 / 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_unsatisfiable_configurations() {
        let build = |board: &str, specs: &[&str], resolution| {
            MontecarloEvaluator::from_rng(
                cs(board),
                &ranges(specs),
                resolution,
                SmallRng::seed_from_u64(0),
            )
        };
        assert!(matches!(
            build("", &["AsAh", "AsKd"], 12),
            Err(SimulatorError::NoSatisfiableMatchup)
        ));
        assert!(matches!(
            build("AsAhAd", &["AA", "KK"], 12),
            Err(SimulatorError::EmptyRange(0))
        ));
        assert!(matches!(
            build("", &["KK", "AA:0.01"], 12),
            Err(SimulatorError::EmptyRange(1))
        ));
        assert!(matches!(
            build("AsKsQsJsTs9s", &["22", "33"], 12),
            Err(SimulatorError::TooManyBoardCards(6))
        ));
        assert!(matches!(build("", &[], 12), Err(SimulatorError::NoPlayers)));
    }

    #[test]
    fn test_too_many_players_for_range() {
        // ten disjoint TT+ pairs exist, an eleventh player has no cards left
        let tens = vec![HandRange::parse("TT+").unwrap(); 11];
        let result =
            MontecarloEvaluator::from_rng(CardSet::empty(), &tens, 12, SmallRng::seed_from_u64(0));
        assert!(matches!(result, Err(SimulatorError::NoSatisfiableMatchup)));

        let tens = vec![HandRange::parse("TT+").unwrap(); 10];
        let result =
            MontecarloEvaluator::from_rng(CardSet::empty(), &tens, 12, SmallRng::seed_from_u64(0));
        assert!(result.is_ok());

        let everyone = vec![HandRange::parse("22+").unwrap(); 24];
        let result =
            MontecarloEvaluator::from_rng(CardSet::empty(), &everyone, 12, SmallRng::seed_from_u64(0));
        assert!(matches!(result, Err(SimulatorError::NoSatisfiableMatchup)));
    }

    #[test]
    fn test_hard_configuration_terminates() {
        // T9s takes a ten, leaving 19 cards for ten TT+ players
        let mut specs = vec!["T9s"];
        specs.extend(std::iter::repeat("TT+").take(10));
        let result = MontecarloEvaluator::from_rng(
            CardSet::empty(),
            &ranges(&specs),
            12,
            SmallRng::seed_from_u64(0),
        );
        assert!(matches!(
            result,
            Err(SimulatorError::SearchBudgetExceeded(_)) | Err(SimulatorError::NoSatisfiableMatchup)
        ));
    }

    #[test]
    fn test_search_budget() {
        // enough cards overall, but every pair of the second pool needs an ace
        let pools = vec![vec![cs("AsAh")], vec![cs("AsKd"), cs("AhQc")]];
        assert!(matches!(
            is_satisfiable(CardSet::empty(), &pools, 1),
            Err(SimulatorError::SearchBudgetExceeded(1))
        ));
        assert!(matches!(is_satisfiable(CardSet::empty(), &pools, 10), Ok(false)));

        let pools = vec![vec![cs("AsAh"), cs("KsKh")], vec![cs("AsKd")]];
        assert!(matches!(is_satisfiable(CardSet::empty(), &pools, 10), Ok(true)));
    }
}
