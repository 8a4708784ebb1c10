//! Board builders.
//!
//! Coordinate arithmetic happens only here, once, to wire adjacency. After
//! construction all movement goes through the graph.
//!
//! Conventions:
//! - Rectangular boards use `(row, col)`; `n` is `row + 1`, `e` is `col + 1`.
//!   Orthogonal steps are kind `edge`, diagonal steps kind `vertex`.
//! - Hexagonal boards use cube coordinates `(q, r, s)` with `q + r + s = 0`.
//!   The six side-sharing neighbours are `edge`, the six corner-sharing
//!   cells two steps away are `vertex`.
//! - Layered boards use `(layer, row, col)` and add kind `layer` with the
//!   literal directions `up` and `down`.
//!
//! Kings placed by the chess presets are royal.

use super::direction::DirectionGraph;
use super::graph::GraphBoard;
use super::piece::Piece;
use super::position::Position;
use super::tile::Tile;

const SQUARE_EDGE: [(&str, i32, i32); 4] = [("n", 1, 0), ("e", 0, 1), ("s", -1, 0), ("w", 0, -1)];
const SQUARE_VERTEX: [(&str, i32, i32); 4] = [("ne", 1, 1), ("se", -1, 1), ("sw", -1, -1), ("nw", 1, -1)];

const HEX_EDGE: [(&str, [i32; 3]); 6] = [
    ("n", [0, 1, -1]),
    ("ne", [1, 0, -1]),
    ("se", [1, -1, 0]),
    ("s", [0, -1, 1]),
    ("sw", [-1, 0, 1]),
    ("nw", [-1, 1, 0]),
];
const HEX_VERTEX: [(&str, [i32; 3]); 6] = [
    ("nne", [1, 1, -2]),
    ("e", [2, -1, -1]),
    ("sse", [1, -2, 1]),
    ("ssw", [-1, -1, 2]),
    ("w", [-2, 1, 1]),
    ("nnw", [-1, 2, -1]),
];

/// Kind of the inter-layer adjacency on layered boards.
pub const LAYER_KIND: &str = "layer";

const BACK_RANK: [&str; 8] = ["rook", "knight", "bishop", "queen", "king", "bishop", "knight", "rook"];

fn link(board: &mut GraphBoard, from: Position, to: Position, kind: &str, direction: &str) {
    board.link(from, to, kind, direction);
}

fn chess_piece(name: &str, team: &str, facing: &str) -> Piece {
    Piece::new(name, team, facing).with_royal(name == "king")
}

/// An empty `rows x cols` grid with 8-neighbour adjacency.
pub fn rectangular_grid(rows: i32, cols: i32) -> GraphBoard {
    let mut board = GraphBoard::new(DirectionGraph::cartesian_2d());
    for row in 0..rows {
        for col in 0..cols {
            board.add_node(Position::grid(row, col), Tile::empty());
        }
    }
    for row in 0..rows {
        for col in 0..cols {
            let here = Position::grid(row, col);
            for (dir, dr, dc) in SQUARE_EDGE {
                link(&mut board, here, Position::grid(row + dr, col + dc), "edge", dir);
            }
            for (dir, dr, dc) in SQUARE_VERTEX {
                link(&mut board, here, Position::grid(row + dr, col + dc), "vertex", dir);
            }
        }
    }
    board
}

/// A grid whose east and west edges wrap around.
///
/// Wrapped steps keep the mover's facing, so a rook sliding east returns
/// to its own file.
pub fn cylinder(rows: i32, cols: i32) -> GraphBoard {
    let mut board = rectangular_grid(rows, cols);
    let wrap = |c: i32| c.rem_euclid(cols);
    for row in 0..rows {
        for col in [0, cols - 1] {
            let here = Position::grid(row, col);
            for (dir, dr, dc) in SQUARE_EDGE {
                if dc != 0 && !(0..cols).contains(&(col + dc)) {
                    link(&mut board, here, Position::grid(row + dr, wrap(col + dc)), "edge", dir);
                }
            }
            for (dir, dr, dc) in SQUARE_VERTEX {
                if !(0..cols).contains(&(col + dc)) {
                    link(&mut board, here, Position::grid(row + dr, wrap(col + dc)), "vertex", dir);
                }
            }
        }
    }
    board
}

/// The standard chess setup on an 8x8 board.
pub fn standard_board(white: &str, black: &str) -> GraphBoard {
    standard_board_spaced(white, black, 4)
}

/// A chess setup with `distance` empty ranks between the two pawn rows.
pub fn standard_board_spaced(white: &str, black: &str, distance: i32) -> GraphBoard {
    let mut board = rectangular_grid(4 + distance, 8);
    let last = 3 + distance;
    for (col, name) in (0..).zip(BACK_RANK) {
        place(&mut board, Position::grid(0, col), chess_piece(name, white, "n"));
        place(&mut board, Position::grid(1, col), chess_piece("pawn", white, "n"));
        place(&mut board, Position::grid(last - 1, col), chess_piece("pawn", black, "s"));
        place(&mut board, Position::grid(last, col), chess_piece(name, black, "s"));
    }
    board
}

fn place(board: &mut GraphBoard, position: Position, piece: Piece) {
    board.add_node(position, Tile::empty().with_piece(piece));
}

/// An empty hexagon of cells within `radius` of the centre.
pub fn hexagonal(radius: i32) -> GraphBoard {
    let mut board = GraphBoard::new(DirectionGraph::hexagonal_2d());
    let cells: Vec<Position> = hex_cells(radius).collect();
    for &cell in &cells {
        board.add_node(cell, Tile::empty());
    }
    for &cell in &cells {
        let c = cell.coords();
        let offset = |d: [i32; 3]| Position::cube(c[0] + d[0], c[1] + d[1], c[2] + d[2]);
        for (dir, d) in HEX_EDGE {
            link(&mut board, cell, offset(d), "edge", dir);
        }
        for (dir, d) in HEX_VERTEX {
            link(&mut board, cell, offset(d), "vertex", dir);
        }
    }
    board
}

fn hex_cells(radius: i32) -> impl Iterator<Item = Position> {
    (-radius..=radius).flat_map(move |q| {
        let lo = (-radius).max(-radius - q);
        let hi = radius.min(radius - q);
        (lo..=hi).map(move |r| Position::cube(q, r, -q - r))
    })
}

/// Cell of a hexagonal board by file index `q` and 1-based rank counted
/// from the bottom (`from_top == false`) or top of that file.
pub fn hex_cell(radius: i32, q: i32, rank: i32, from_top: bool) -> Position {
    let r = if from_top {
        radius.min(radius - q) - (rank - 1)
    } else {
        (-radius).max(-radius - q) + (rank - 1)
    };
    Position::cube(q, r, -q - r)
}

/// Glinski's hexagonal chess: 91 cells, files a–l (no j) mapped to `q = -5..=5`.
pub fn glinski_board(white: &str, black: &str) -> GraphBoard {
    const RADIUS: i32 = 5;
    // (piece, file q, rank)
    const SETUP: [(&str, i32, i32); 18] = [
        ("rook", -3, 1),
        ("knight", -2, 1),
        ("queen", -1, 1),
        ("bishop", 0, 1),
        ("bishop", 0, 2),
        ("bishop", 0, 3),
        ("king", 1, 1),
        ("knight", 2, 1),
        ("rook", 3, 1),
        ("pawn", -4, 1),
        ("pawn", -3, 2),
        ("pawn", -2, 3),
        ("pawn", -1, 4),
        ("pawn", 0, 5),
        ("pawn", 1, 4),
        ("pawn", 2, 3),
        ("pawn", 3, 2),
        ("pawn", 4, 1),
    ];
    let mut board = hexagonal(RADIUS);
    for (name, q, rank) in SETUP {
        place(&mut board, hex_cell(RADIUS, q, rank, false), chess_piece(name, white, "n"));
        place(&mut board, hex_cell(RADIUS, q, rank, true), chess_piece(name, black, "s"));
    }
    board
}

/// `layers` stacked `rows x cols` grids joined by `up`/`down` steps.
pub fn layered(layers: i32, rows: i32, cols: i32) -> GraphBoard {
    let mut board = GraphBoard::new(DirectionGraph::cartesian_2d());
    for layer in 0..layers {
        for row in 0..rows {
            for col in 0..cols {
                board.add_node(Position::layered(layer, row, col), Tile::empty());
            }
        }
    }
    for layer in 0..layers {
        for row in 0..rows {
            for col in 0..cols {
                let here = Position::layered(layer, row, col);
                for (dir, dr, dc) in SQUARE_EDGE {
                    link(&mut board, here, Position::layered(layer, row + dr, col + dc), "edge", dir);
                }
                for (dir, dr, dc) in SQUARE_VERTEX {
                    link(&mut board, here, Position::layered(layer, row + dr, col + dc), "vertex", dir);
                }
                link(&mut board, here, Position::layered(layer + 1, row, col), LAYER_KIND, "up");
                link(&mut board, here, Position::layered(layer - 1, row, col), LAYER_KIND, "down");
            }
        }
    }
    board
}
