//! Tiles: the content of a board node.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::value::Value;

/// A square (or hex, or cell) of the board.
///
/// Texture and tint are carried for renderers and never read by the rules.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tile {
    pub piece: Option<Piece>,
    pub tile_type: Option<String>,
    pub texture: Option<String>,
    pub tint: Option<[f32; 3]>,
    /// Piece types that may not enter this tile.
    #[serde(default)]
    pub disallowed_pieces: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl Tile {
    /// An empty, untyped tile.
    pub fn empty() -> Self {
        Tile::default()
    }

    /// A typed tile. The texture defaults to the type name.
    pub fn typed(tile_type: impl Into<String>) -> Self {
        let tile_type = tile_type.into();
        Tile {
            texture: Some(tile_type.clone()),
            tile_type: Some(tile_type),
            ..Tile::default()
        }
    }

    pub fn with_piece(mut self, piece: Piece) -> Self {
        self.piece = Some(piece);
        self
    }

    pub fn with_disallowed(mut self, piece_type: impl Into<String>) -> Self {
        self.disallowed_pieces.push(piece_type.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.piece.is_none()
    }

    /// Whether a piece of the given type may enter.
    pub fn allows(&self, piece_type: &str) -> bool {
        !self.disallowed_pieces.iter().any(|p| p == piece_type)
    }
}
