//! Move evaluation.
//!
//! Scores moves by immediate material change and folds per-team deltas
//! into a single number from one team's side.

pub mod material;

pub use material::{accumulate, aggregate, get_move_score, ScoreDelta};
