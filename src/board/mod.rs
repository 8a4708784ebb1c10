//! Board representation.
//!
//! Contains positions, the direction algebra, tiles, pieces and teams, the
//! graph board arena, and preset board builders.

pub mod direction;
pub mod graph;
pub mod piece;
pub mod position;
pub mod presets;
pub mod tile;
pub mod value;

pub use direction::DirectionGraph;
pub use graph::{AdjacencyTable, BoardError, GraphBoard, Neighbor, TileNode};
pub use piece::{LoseCondition, Piece, Team, MAX_TEAM_SLOTS};
pub use position::Position;
pub use tile::Tile;
pub use value::Value;
