//! Graphchess: a variant-chess rules engine on graph boards.
//!
//! Boards are directed graphs of tiles with named adjacency kinds, so
//! square, hexagonal, layered, wrap-around, and portal topologies share one
//! move generator. Piece movement is declarative and can be loaded from
//! JSON variant documents. The engine plays moves, tracks royal pieces,
//! eliminates teams, and drives simple AI opponents.

pub mod board;
pub mod engine;
pub mod eval;
pub mod game;
pub mod movegen;
pub mod movement;
pub mod protocol;
pub mod search;
pub mod selfplay;
