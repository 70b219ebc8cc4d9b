mod exhaustive;
mod matchup;
mod montecarlo;
mod simulator;

use thiserror::Error;

use crate::card_set::CardSet;
use crate::constants::BOARD_CARDS;

pub use exhaustive::ExhaustiveEvaluator;
pub use matchup::{Matchup, PlayerResult};
pub use montecarlo::MontecarloEvaluator;
pub use simulator::{approx_equity, exact_equity, EquityResults};

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("no players")]
    NoPlayers,
    #[error("board has {0} cards, at most 5 allowed")]
    TooManyBoardCards(u32),
    #[error("range of player {0} is empty")]
    EmptyRange(usize),
    #[error("no legal deal exists for these ranges and board")]
    NoSatisfiableMatchup,
    #[error("no legal deal found within {0} tried card pairs")]
    SearchBudgetExceeded(u64),
    #[error("simulation thread panicked")]
    WorkerPanicked,
}

/// A source of matchups for a fixed board and list of ranges
pub trait Evaluator: Iterator<Item = Matchup> {
    /// cards dealt before evaluation
    fn board(&self) -> CardSet;
    fn player_count(&self) -> usize;
}

fn check_board(board: CardSet, player_count: usize) -> Result<(), SimulatorError> {
    if player_count == 0 {
        return Err(SimulatorError::NoPlayers);
    }
    if board.size() > BOARD_CARDS {
        return Err(SimulatorError::TooManyBoardCards(board.size()));
    }
    Ok(())
}
