//! Declarative piece movement.
//!
//! A `Move` is a chain of direction steps, a `Moveset` groups moves under
//! shared range and capture rules with conditional overrides, and a
//! `RuleSet` binds movesets, value, and promotion to a piece type.

pub mod condition;
pub mod moves;
pub mod moveset;
pub mod mutator;
pub mod presets;
pub mod ruleset;

pub use condition::{Accessor, Condition, EvalContext, Operand, OperandError, Subject};
pub use moves::{Move, Resolved, Step};
pub use moveset::{Moveset, MovesetView};
pub use mutator::{Assignment, Field, Mutator};
pub use ruleset::{rule_table, RuleSet, RuleTable};
