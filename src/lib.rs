//! # Poker Equity
//! Range vs range equity calculations for texas holdem
//!
//! Currently supports
//!  - card and card set notation
//!  - weighted hand range shorthand, parsed and formatted
//!  - fast 7 card hand evaluation
//!  - exact and monte carlo equity calculations
//!
//! ## Equity Calculator
//!
//! ```
//! use poker_equity::card_set::CardSet;
//! use poker_equity::hand_range::HandRange;
//! use poker_equity::equity_calculator::{approx_equity, exact_equity};
//! let ranges = vec![
//!     HandRange::parse("JJ+,AKs").unwrap(),
//!     HandRange::parse("QQ:0.5,AQo+").unwrap(),
//! ];
//! let board: CardSet = "2h3d4cKs".parse().unwrap();
//! let exact = exact_equity(board, &ranges).unwrap();
//! let approx = approx_equity(board, &ranges, 4, 10000).unwrap();
//! assert!((exact.equities()[0] - approx.equities()[0]).abs() < 0.05);
//! ```
//!
//! ## Hand Evaluator
//!
//! ```
//! use poker_equity::card_set::CardSet;
//! use poker_equity::hand_evaluator::MadeHand;
//! // cards are indexed 0->51 where index is rank + 13 * suit
//! let cards: CardSet = "AsAhKdKc2s7h9d".parse().unwrap();
//! let hand = MadeHand::find_best_from(cards).unwrap();
//! println!("{}", hand);
//! ```

#[macro_use]
extern crate lazy_static;

pub mod card;
pub mod card_set;
pub mod constants;
pub mod hand_evaluator;
pub mod hand_range;

pub mod equity_calculator;
