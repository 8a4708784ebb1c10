//! Legal destination generation.
//!
//! Expands a piece's movesets into destination tiles by repeatedly
//! resolving each move template from the piece's tile.

pub mod alliance;
pub mod check;

use std::collections::{BTreeSet, HashSet};

use crate::board::{GraphBoard, Piece, Position};
use crate::movement::{MovesetView, Mutator};

pub use alliance::{ally_set, is_capturable};
pub use check::{CheckRule, NoCheck, RoyalCaptureCheck};

/// A reachable destination and the facing the piece arrives with.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination<'a> {
    pub position: Position,
    pub facing: String,
    /// Mutators of the moveset that produced this destination.
    pub mutators: &'a [Mutator],
}

/// Appends the destinations of one moveset view to `out`.
///
/// Each move is repeated from the piece's tile, carrying the facing from
/// one repetition to the next. A walk stops when resolution fails, the
/// maximum distance is reached, a tile refuses the piece type, a tile is
/// occupied, or the walk revisits a `(position, facing)` pair. An occupied
/// tile is a destination only if the occupant is capturable and the view
/// allows captures. Repetitions short of `min_distance` are never recorded
/// but still block. `(position, facing)` pairs already in `out` are skipped.
pub fn moveset_destinations<'a>(
    board: &GraphBoard,
    start: Position,
    piece: &Piece,
    view: &MovesetView<'a>,
    allies: &BTreeSet<String>,
    out: &mut Vec<Destination<'a>>,
) {
    let record = |position: Position, facing: &str, out: &mut Vec<Destination<'a>>| {
        if !out.iter().any(|d| d.position == position && d.facing == facing) {
            out.push(Destination {
                position,
                facing: facing.to_string(),
                mutators: view.mutators,
            });
        }
    };

    for mv in view.moves {
        let mut position = start;
        let mut facing = piece.facing.clone();
        let mut distance = 0u32;
        let mut seen = HashSet::new();

        loop {
            if view.max_distance.is_some_and(|max| distance >= max) {
                break;
            }
            let Some(resolved) = mv.resolve(board, position, &facing) else {
                break;
            };
            distance += 1;
            if !seen.insert((resolved.position, resolved.facing.clone())) {
                break;
            }
            let Some(tile) = board.tile(&resolved.position) else {
                break;
            };
            if !tile.allows(&piece.name) {
                break;
            }
            let reached = distance >= view.min_distance;
            if let Some(occupant) = &tile.piece {
                if reached && view.can_capture && is_capturable(allies, occupant) {
                    record(resolved.position, &resolved.facing, out);
                }
                break;
            }
            if reached && view.can_move_empty {
                record(resolved.position, &resolved.facing, out);
            }
            position = resolved.position;
            facing = resolved.facing;
        }
    }
}
