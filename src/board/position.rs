//! Position keys for board nodes.
//!
//! A position is an opaque, ordered key of one to four integer coordinates.
//! Square boards use `(row, col)`, hexagonal boards cube coordinates
//! `(q, r, s)`, layered boards `(layer, row, col)`. Movement never performs
//! arithmetic on positions; only the board builders do.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of coordinates a position can carry.
pub const MAX_DIMS: usize = 4;

/// A board node key.
///
/// Unused trailing coordinates are always zero so that derived equality,
/// hashing, and ordering only depend on the meaningful prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "Vec<i32>", try_from = "Vec<i32>")]
pub struct Position {
    dims: u8,
    coords: [i32; MAX_DIMS],
}

impl Position {
    /// Builds a position from a coordinate slice.
    ///
    /// Returns `None` for an empty slice or more than [`MAX_DIMS`] coordinates.
    pub fn from_slice(coords: &[i32]) -> Option<Self> {
        if coords.is_empty() || coords.len() > MAX_DIMS {
            return None;
        }
        let mut buf = [0; MAX_DIMS];
        buf[..coords.len()].copy_from_slice(coords);
        Some(Position {
            dims: coords.len() as u8,
            coords: buf,
        })
    }

    /// A two-coordinate `(row, col)` position.
    pub const fn grid(row: i32, col: i32) -> Self {
        Position {
            dims: 2,
            coords: [row, col, 0, 0],
        }
    }

    /// A cube-coordinate hex position. Callers keep `q + r + s == 0`.
    pub const fn cube(q: i32, r: i32, s: i32) -> Self {
        Position {
            dims: 3,
            coords: [q, r, s, 0],
        }
    }

    /// A `(layer, row, col)` position for stacked boards.
    pub const fn layered(layer: i32, row: i32, col: i32) -> Self {
        Position {
            dims: 3,
            coords: [layer, row, col, 0],
        }
    }

    /// Returns the meaningful coordinates.
    pub fn coords(&self) -> &[i32] {
        &self.coords[..self.dims as usize]
    }

    /// Number of coordinates.
    pub fn dims(&self) -> usize {
        self.dims as usize
    }

    /// Returns coordinate `i`, if present.
    pub fn get(&self, i: usize) -> Option<i32> {
        self.coords().get(i).copied()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<Position> for Vec<i32> {
    fn from(p: Position) -> Self {
        p.coords().to_vec()
    }
}

impl TryFrom<Vec<i32>> for Position {
    type Error = String;

    fn try_from(v: Vec<i32>) -> Result<Self, Self::Error> {
        Position::from_slice(&v)
            .ok_or_else(|| format!("a position needs 1 to {} coordinates, got {}", MAX_DIMS, v.len()))
    }
}
