//! Optional self-check filtering.
//!
//! Engines have no check rule by default: losing a royal piece is handled by
//! team elimination, not by forbidding moves. Installing a rule makes
//! `RuleEngine::get_legal_moves` drop destinations that leave any of the
//! mover's teams in check.

use std::fmt;

use crate::board::GraphBoard;
use crate::engine::RuleEngine;

/// Decides whether a team is in check on a board.
pub trait CheckRule: Send + Sync + fmt::Debug {
    fn in_check(&self, engine: &RuleEngine, board: &GraphBoard, team: &str) -> bool;
}

/// Never in check.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheck;

impl CheckRule for NoCheck {
    fn in_check(&self, _engine: &RuleEngine, _board: &GraphBoard, _team: &str) -> bool {
        false
    }
}

/// In check when a piece outside the team could capture one of its royals.
///
/// Attacks are generated without check filtering.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoyalCaptureCheck;

impl CheckRule for RoyalCaptureCheck {
    fn in_check(&self, engine: &RuleEngine, board: &GraphBoard, team: &str) -> bool {
        let royals = board.royal_tiles(team);
        if royals.is_empty() {
            return false;
        }
        board.nodes().any(|node| {
            let Some(piece) = node.tile().piece.as_ref() else {
                return false;
            };
            !piece.belongs_to(team)
                && engine
                    .pseudo_legal_destinations(node.position(), board)
                    .iter()
                    .any(|d| royals.contains(&d.position))
        })
    }
}
