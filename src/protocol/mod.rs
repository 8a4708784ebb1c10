//! Text formats: square notation and declarative variant documents.

pub mod notation;
pub mod variant;

pub use notation::{format_square, parse_move, parse_square, NotationError};
pub use variant::{load_variant, ConfigError, VariantSpec};
