mod evaluator;
mod made_hand;

pub use made_hand::{HandCategory, MadeHand, MadeHandError};
