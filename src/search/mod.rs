//! AI players.
//!
//! Strategies are parsed from short names and pick one move per call for
//! whichever team is to move.

pub mod lookahead;
pub mod strategy;

pub use lookahead::{ai_play, ai_select};
pub use strategy::{Strategy, StrategyError, Weighting};
