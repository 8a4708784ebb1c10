//! Movesets: move templates sharing range and capture rules.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::condition::{Condition, EvalContext};
use super::moves::Move;
use super::mutator::Mutator;

/// A bundle of alternative moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moveset {
    pub moves: Vec<Move>,
    /// Repetitions below this are not destinations but still block.
    pub min_distance: u32,
    /// `None` slides until blocked.
    pub max_distance: Option<u32>,
    pub can_move_empty: bool,
    pub can_capture: bool,
    /// The moveset is only used while this holds.
    pub requirement: Condition,
    /// First matching condition replaces the whole moveset.
    pub overrides: Vec<(Condition, Arc<Moveset>)>,
    /// Applied after a move generated by this moveset is played.
    pub mutators: Vec<Mutator>,
}

/// The effective fields of a moveset after overrides.
#[derive(Debug, Clone, Copy)]
pub struct MovesetView<'a> {
    pub moves: &'a [Move],
    pub min_distance: u32,
    pub max_distance: Option<u32>,
    pub can_move_empty: bool,
    pub can_capture: bool,
    pub mutators: &'a [Mutator],
}

impl Moveset {
    /// Unbounded, moves and captures.
    pub fn new(moves: Vec<Move>) -> Self {
        Moveset {
            moves,
            min_distance: 1,
            max_distance: None,
            can_move_empty: true,
            can_capture: true,
            requirement: Condition::True,
            overrides: Vec::new(),
            mutators: Vec::new(),
        }
    }

    pub fn with_max_distance(mut self, max: u32) -> Self {
        self.max_distance = Some(max);
        self
    }

    pub fn with_min_distance(mut self, min: u32) -> Self {
        self.min_distance = min;
        self
    }

    /// Moves to empty tiles only.
    pub fn move_only(mut self) -> Self {
        self.can_capture = false;
        self
    }

    /// Captures only.
    pub fn capture_only(mut self) -> Self {
        self.can_move_empty = false;
        self
    }

    pub fn with_requirement(mut self, requirement: Condition) -> Self {
        self.requirement = requirement;
        self
    }

    pub fn with_override(mut self, condition: Condition, moveset: Moveset) -> Self {
        self.overrides.push((condition, Arc::new(moveset)));
        self
    }

    pub fn with_mutator(mut self, mutator: Mutator) -> Self {
        self.mutators.push(mutator);
        self
    }

    pub fn meets_requirement(&self, ctx: &EvalContext<'_>) -> bool {
        self.requirement.evaluate(ctx)
    }

    /// Picks the first override whose condition holds, else the base fields.
    pub fn resolve(&self, ctx: &EvalContext<'_>) -> MovesetView<'_> {
        let chosen = self
            .overrides
            .iter()
            .find(|(condition, _)| condition.evaluate(ctx))
            .map(|(_, m)| m.as_ref())
            .unwrap_or(self);
        chosen.view()
    }

    fn view(&self) -> MovesetView<'_> {
        MovesetView {
            moves: &self.moves,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            can_move_empty: self.can_move_empty,
            can_capture: self.can_capture,
            mutators: &self.mutators,
        }
    }

    /// Whether this moveset and all overrides have `min <= max`.
    pub fn has_valid_range(&self) -> bool {
        self.max_distance.map_or(true, |max| self.min_distance <= max)
            && self.overrides.iter().all(|(_, m)| m.has_valid_range())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::presets::rectangular_grid;
    use crate::board::{Piece, Position};
    use std::collections::BTreeMap;

    #[test]
    fn first_matching_override_wins() {
        let pawn = Moveset::new(vec![Move::new(&[("f", "edge")])])
            .with_max_distance(1)
            .move_only()
            .with_override(Condition::unmoved(), Moveset::new(vec![Move::new(&[("f", "edge")])]).with_max_distance(2))
            .with_override(Condition::True, Moveset::new(vec![]).with_max_distance(5));

        let mut board = rectangular_grid(8, 8);
        let at = Position::grid(1, 0);
        board.set_piece(at, Some(Piece::new("pawn", "white", "n"))).unwrap();
        let teams = BTreeMap::new();
        let order = Vec::new();
        let ctx = EvalContext {
            board: &board,
            source: at,
            target: None,
            team: "white",
            teams: &teams,
            turn_order: &order,
        };
        let view = pawn.resolve(&ctx);
        assert_eq!(view.max_distance, Some(2));
        assert!(view.can_capture);

        board.update_piece(at, |p| p.has_moved = true).unwrap();
        let ctx = EvalContext {
            board: &board,
            source: at,
            target: None,
            team: "white",
            teams: &teams,
            turn_order: &order,
        };
        assert_eq!(pawn.resolve(&ctx).max_distance, Some(5));
    }

    #[test]
    fn range_validation_reaches_overrides() {
        let ok = Moveset::new(vec![]).with_min_distance(2).with_max_distance(3);
        assert!(ok.has_valid_range());
        let bad = Moveset::new(vec![]).with_override(Condition::True, Moveset::new(vec![]).with_min_distance(3).with_max_distance(2));
        assert!(!bad.has_valid_range());
        assert!(Moveset::new(vec![]).with_min_distance(9).has_valid_range());
    }
}
