//! A single move template: a chain of direction steps.

use serde::{Deserialize, Serialize};

use crate::board::{GraphBoard, Position};

/// One step of a move: a direction token and the adjacency kind to follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub direction: String,
    pub kind: String,
}

/// Ordered steps plus a final relative reorientation of the mover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub steps: Vec<Step>,
    /// Relative turn applied to the mover's facing at the end (`"f"`: none).
    pub end_direction: String,
}

/// Result of resolving a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub position: Position,
    /// Facing of the mover on arrival.
    pub facing: String,
    /// Absolute heading of the last step.
    pub last_direction: String,
}

impl Move {
    /// Builds a move from `(direction, kind)` pairs.
    pub fn new(steps: &[(&str, &str)]) -> Self {
        Move {
            steps: steps
                .iter()
                .map(|(direction, kind)| Step {
                    direction: direction.to_string(),
                    kind: kind.to_string(),
                })
                .collect(),
            end_direction: "f".to_string(),
        }
    }

    pub fn with_end_direction(mut self, end_direction: impl Into<String>) -> Self {
        self.end_direction = end_direction.into();
        self
    }

    /// Resolves the move from `start` for a mover facing `facing`.
    ///
    /// Each step token is turned against the current heading when its kind
    /// uses relative directions, and taken literally otherwise. The first
    /// registered neighbour is followed. A neighbour's reorientation turns
    /// both the heading and the mover's facing. Returns `None` as soon as a
    /// step has no neighbour or names a direction foreign to the topology.
    pub fn resolve(&self, board: &GraphBoard, start: Position, facing: &str) -> Option<Resolved> {
        let graph = board.directions();
        let mut position = start;
        let mut heading = facing.to_string();
        let mut facing = facing.to_string();

        for step in &self.steps {
            let direction = if graph.is_relative_kind(&step.kind) {
                graph.resolve(&heading, &step.direction)?.to_string()
            } else {
                step.direction.clone()
            };
            let neighbor = board.neighbors(&position, &step.kind, &direction).first()?;

            // Literal steps (portals, layer changes) keep the heading.
            if graph.contains(&direction) {
                heading = direction;
            }
            if neighbor.reorientation != "f" {
                heading = graph.resolve(&heading, &neighbor.reorientation)?.to_string();
                facing = graph.resolve(&facing, &neighbor.reorientation)?.to_string();
            }
            position = neighbor.position;
        }

        let facing = graph.resolve(&facing, &self.end_direction)?.to_string();
        Some(Resolved {
            position,
            facing,
            last_direction: heading,
        })
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{} ({})", step.direction, step.kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::presets::{cylinder, rectangular_grid};
    use crate::board::Tile;

    #[test]
    fn steps_turn_against_the_heading() {
        let board = rectangular_grid(8, 8);
        let knight = Move::new(&[("b", "edge"), ("f", "edge"), ("l", "edge")]);
        let r = knight.resolve(&board, Position::grid(3, 3), "n").unwrap();
        // s, s, then left of south is east.
        assert_eq!(r.position, Position::grid(1, 4));
        assert_eq!(r.facing, "n");
        assert_eq!(r.last_direction, "e");
    }

    #[test]
    fn resolution_is_pure() {
        let board = rectangular_grid(8, 8);
        let m = Move::new(&[("fr", "vertex")]);
        let a = m.resolve(&board, Position::grid(0, 0), "n");
        let b = m.resolve(&board, Position::grid(0, 0), "n");
        assert_eq!(a, b);
        assert_eq!(a.unwrap().position, Position::grid(1, 1));
    }

    #[test]
    fn missing_neighbour_fails() {
        let board = rectangular_grid(8, 8);
        assert!(Move::new(&[("b", "edge")]).resolve(&board, Position::grid(0, 0), "n").is_none());
        // Hex tokens are foreign to a square topology.
        assert!(Move::new(&[("ffr", "vertex")]).resolve(&board, Position::grid(3, 3), "n").is_none());
    }

    #[test]
    fn end_direction_turns_the_mover() {
        let board = rectangular_grid(8, 8);
        let m = Move::new(&[("f", "edge")]).with_end_direction("b");
        let r = m.resolve(&board, Position::grid(3, 3), "n").unwrap();
        assert_eq!(r.facing, "s");
    }

    #[test]
    fn reorientation_on_arrival() {
        // A cylinder edge that flips the mover as it wraps.
        let mut board = cylinder(4, 4);
        board.remove_adjacency(Position::grid(0, 3), Position::grid(0, 0), "edge", "e").unwrap();
        board.add_adjacency(Position::grid(0, 3), Position::grid(0, 0), "edge", "e", "b").unwrap();
        let m = Move::new(&[("r", "edge")]);
        let r = m.resolve(&board, Position::grid(0, 3), "n").unwrap();
        assert_eq!(r.position, Position::grid(0, 0));
        assert_eq!(r.facing, "s");
        assert_eq!(r.last_direction, "w");
    }

    #[test]
    fn literal_kinds_bypass_the_direction_graph() {
        let mut board = rectangular_grid(4, 4);
        board.add_node(Position::grid(9, 9), Tile::empty());
        board.add_adjacency(Position::grid(0, 0), Position::grid(9, 9), "warp", "warp", "f").unwrap();
        let m = Move::new(&[("warp", "warp")]);
        let r = m.resolve(&board, Position::grid(0, 0), "n").unwrap();
        assert_eq!(r.position, Position::grid(9, 9));
        assert_eq!(r.last_direction, "n");
        assert_eq!(m.to_string(), "warp (warp)");
    }
}
