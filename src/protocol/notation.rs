//! Square notation for rectangular boards.
//!
//! A square is a file letter `a`..`z` followed by a 1-based rank, so `e4`
//! is `Position::grid(3, 4)`. Moves are two squares, optionally joined by
//! `-` or `x`: `e2e4`, `e2-e4`, `d1xh5`.

use crate::board::Position;

/// Errors from reading or writing square notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotationError {
    #[error("invalid square: '{0}'")]
    InvalidSquare(String),

    #[error("invalid move: '{0}'")]
    InvalidMove(String),

    #[error("{0} has no square name")]
    Unnamed(Position),
}

/// Parses a square like `e4`.
pub fn parse_square(s: &str) -> Result<Position, NotationError> {
    let invalid = || NotationError::InvalidSquare(s.to_string());
    let mut chars = s.chars();
    let file = chars.next().filter(char::is_ascii_lowercase).ok_or_else(invalid)?;
    let rank: i32 = chars.as_str().parse().map_err(|_| invalid())?;
    if rank < 1 || !chars.as_str().bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    Ok(Position::grid(rank - 1, i32::from(file as u8 - b'a')))
}

/// Names a two-coordinate position, or fails for anything else.
pub fn format_square(position: Position) -> Result<String, NotationError> {
    match *position.coords() {
        [row, col] if row >= 0 && (0..26).contains(&col) => {
            Ok(format!("{}{}", char::from(b'a' + col as u8), row + 1))
        }
        _ => Err(NotationError::Unnamed(position)),
    }
}

/// Parses a move like `e2e4`, `e2-e4`, or `d1xh5`.
pub fn parse_move(s: &str) -> Result<(Position, Position), NotationError> {
    let invalid = || NotationError::InvalidMove(s.to_string());
    let split = s
        .char_indices()
        .skip(1)
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .ok_or_else(invalid)?;
    let (from, rest) = s.split_at(split);
    let to = rest.strip_prefix(|c: char| c == '-' || c == 'x').unwrap_or(rest);
    let start = parse_square(from).map_err(|_| invalid())?;
    let end = parse_square(to).map_err(|_| invalid())?;
    Ok((start, end))
}
