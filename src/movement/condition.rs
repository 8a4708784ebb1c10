//! Board predicates.
//!
//! Conditions are a small AST built once when a variant is loaded and
//! interpreted by a tree-walking evaluator. Operands address the source
//! tile (the moving piece), the target tile, or the mover's team through
//! dotted paths such as `source.piece.has_moved` or `target.tile.type`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::board::{GraphBoard, Position, Team, Value};

/// Errors from building conditions, operands, and mutator paths.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperandError {
    #[error("unknown operand path '{0}'")]
    UnknownPath(String),

    #[error("field '{0}' is read-only")]
    ReadOnly(String),

    #[error("unsupported value: {0}")]
    BadValue(String),

    #[error("unknown condition type '{0}'")]
    UnknownType(String),

    #[error("condition is missing field '{0}'")]
    MissingField(&'static str),
}

/// Which tile an operand looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Source,
    Target,
}

/// A field of a tile or of the piece on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessor {
    Position,
    TileType,
    TileProperty(String),
    /// The piece type, or `Null` on an empty tile.
    Piece,
    PieceTeams,
    PieceFacing,
    PieceHasMoved,
    PieceRoyal,
    PieceProperty(String),
    /// Union of the allies of the piece's teams.
    Allies,
}

/// A value-producing leaf of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Literal(Value),
    Field(Subject, Accessor),
    /// The team the condition is evaluated for.
    Team,
    TeamAllies,
    /// The team whose turn it is on the board.
    CurrentTeam,
}

/// Everything a condition may read.
pub struct EvalContext<'a> {
    pub board: &'a GraphBoard,
    pub source: Position,
    pub target: Option<Position>,
    pub team: &'a str,
    pub teams: &'a BTreeMap<String, Team>,
    pub turn_order: &'a [String],
}

impl<'a> EvalContext<'a> {
    fn position(&self, subject: Subject) -> Option<Position> {
        match subject {
            Subject::Source => Some(self.source),
            Subject::Target => self.target,
        }
    }

    fn allies_of<'t>(&self, names: impl IntoIterator<Item = &'t String>) -> Value {
        let mut allies = BTreeSet::new();
        for name in names {
            match self.teams.get(name) {
                Some(team) => allies.extend(team.allies().iter().cloned()),
                None => {
                    allies.insert(name.clone());
                }
            }
        }
        Value::List(allies.into_iter().map(Value::Str).collect())
    }
}

impl Operand {
    /// Parses a loosely typed operand.
    ///
    /// Strings beginning with `source.`, `target.`, `team.` or `board.`,
    /// and the bare string `team`, are paths; anything else is a literal.
    pub fn parse(v: &serde_json::Value) -> Result<Operand, OperandError> {
        match v {
            serde_json::Value::String(s) => Operand::parse_str(s),
            other => Value::from_json(other)
                .map(Operand::Literal)
                .ok_or_else(|| OperandError::BadValue(other.to_string())),
        }
    }

    pub fn parse_str(s: &str) -> Result<Operand, OperandError> {
        let parts: Vec<&str> = s.split('.').collect();
        let unknown = || OperandError::UnknownPath(s.to_string());
        match parts[0] {
            "team" => match parts.len() {
                1 => Ok(Operand::Team),
                2 if parts[1] == "allies" => Ok(Operand::TeamAllies),
                _ => Err(unknown()),
            },
            "board" => match &parts[1..] {
                ["current_team"] => Ok(Operand::CurrentTeam),
                _ => Err(unknown()),
            },
            "source" | "target" if parts.len() > 1 => {
                let subject = if parts[0] == "source" { Subject::Source } else { Subject::Target };
                let accessor = parse_accessor(&parts[1..]).ok_or_else(unknown)?;
                Ok(Operand::Field(subject, accessor))
            }
            "source" | "target" => Err(unknown()),
            _ => Ok(Operand::Literal(Value::Str(s.to_string()))),
        }
    }

    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> Value {
        match self {
            Operand::Literal(v) => v.clone(),
            Operand::Team => Value::from(ctx.team),
            Operand::TeamAllies => ctx.allies_of([&ctx.team.to_string()]),
            Operand::CurrentTeam => ctx
                .turn_order
                .get(ctx.board.current_team_index)
                .map(|t| Value::from(t.as_str()))
                .unwrap_or(Value::Null),
            Operand::Field(subject, accessor) => {
                let Some(position) = ctx.position(*subject) else {
                    return Value::Null;
                };
                let Some(tile) = ctx.board.tile(&position) else {
                    return Value::Null;
                };
                if let Accessor::Position = accessor {
                    return Value::Position(position);
                }
                match accessor {
                    Accessor::TileType => return tile.tile_type.clone().map(Value::Str).unwrap_or(Value::Null),
                    Accessor::TileProperty(key) => return tile.properties.get(key).cloned().unwrap_or(Value::Null),
                    _ => {}
                }
                let Some(piece) = tile.piece.as_ref() else {
                    return Value::Null;
                };
                match accessor {
                    Accessor::Piece => Value::from(piece.name.as_str()),
                    Accessor::PieceTeams => Value::from(piece.teams().to_vec()),
                    Accessor::PieceFacing => Value::from(piece.facing.as_str()),
                    Accessor::PieceHasMoved => Value::Bool(piece.has_moved),
                    Accessor::PieceRoyal => Value::Bool(piece.is_royal()),
                    Accessor::PieceProperty(key) => piece.properties.get(key).cloned().unwrap_or(Value::Null),
                    Accessor::Allies => ctx.allies_of(piece.teams()),
                    Accessor::Position | Accessor::TileType | Accessor::TileProperty(_) => Value::Null,
                }
            }
        }
    }
}

/// Parses the part of a path after `source.` / `target.`.
pub(crate) fn parse_accessor(parts: &[&str]) -> Option<Accessor> {
    Some(match parts {
        ["position"] => Accessor::Position,
        ["tile", "type"] => Accessor::TileType,
        ["tile", "properties", rest @ ..] if !rest.is_empty() => Accessor::TileProperty(rest.join(".")),
        ["piece"] | ["piece", "type"] => Accessor::Piece,
        ["piece", "teams"] => Accessor::PieceTeams,
        ["piece", "facing"] => Accessor::PieceFacing,
        ["piece", "has_moved"] => Accessor::PieceHasMoved,
        ["piece", "royal"] => Accessor::PieceRoyal,
        ["piece", "properties", rest @ ..] if !rest.is_empty() => Accessor::PieceProperty(rest.join(".")),
        ["allies"] => Accessor::Allies,
        _ => return None,
    })
}

/// A predicate over the board and a source/target pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    True,
    False,
    Not(Box<Condition>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    /// Equal values.
    Compare(Operand, Operand),
    /// The two values share an item.
    Intersect(Operand, Operand),
    /// The first value is an item of the second.
    Contains(Operand, Operand),
    /// Every item of the first value is in the second.
    Subset(Operand, Operand),
    /// The value is not null.
    Exists(Operand),
}

impl Condition {
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> bool {
        match self {
            Condition::True => true,
            Condition::False => false,
            Condition::Not(c) => !c.evaluate(ctx),
            Condition::And(cs) => cs.iter().all(|c| c.evaluate(ctx)),
            Condition::Or(cs) => cs.iter().any(|c| c.evaluate(ctx)),
            Condition::Compare(a, b) => a.evaluate(ctx) == b.evaluate(ctx),
            Condition::Intersect(a, b) => {
                let (a, b) = (a.evaluate(ctx), b.evaluate(ctx));
                a.as_items().iter().any(|x| b.as_items().contains(x))
            }
            Condition::Contains(a, b) => {
                let (a, b) = (a.evaluate(ctx), b.evaluate(ctx));
                b.as_items().contains(&a)
            }
            Condition::Subset(a, b) => {
                let (a, b) = (a.evaluate(ctx), b.evaluate(ctx));
                a.as_items().iter().all(|x| b.as_items().contains(x))
            }
            Condition::Exists(a) => !a.evaluate(ctx).is_null(),
        }
    }

    /// Builds a condition from its JSON form.
    ///
    /// `true`/`false`, or an object with a `type` of `not` (`condition`),
    /// `and`/`or` (`conditions`), `compare`/`intersect`/`contains`/`subset`
    /// (`value1`, `value2`), or `exists` (`value`).
    pub fn from_json(v: &serde_json::Value) -> Result<Condition, OperandError> {
        let obj = match v {
            serde_json::Value::Bool(true) => return Ok(Condition::True),
            serde_json::Value::Bool(false) => return Ok(Condition::False),
            serde_json::Value::Object(obj) => obj,
            other => return Err(OperandError::BadValue(other.to_string())),
        };
        let field = |name: &'static str| obj.get(name).ok_or(OperandError::MissingField(name));
        let pair = || -> Result<(Operand, Operand), OperandError> {
            Ok((Operand::parse(field("value1")?)?, Operand::parse(field("value2")?)?))
        };
        let list = || -> Result<Vec<Condition>, OperandError> {
            field("conditions")?
                .as_array()
                .ok_or(OperandError::MissingField("conditions"))?
                .iter()
                .map(Condition::from_json)
                .collect()
        };

        let kind = field("type")?.as_str().ok_or(OperandError::MissingField("type"))?;
        Ok(match kind {
            "not" => Condition::Not(Box::new(Condition::from_json(field("condition")?)?)),
            "and" => Condition::And(list()?),
            "or" => Condition::Or(list()?),
            "compare" => {
                let (a, b) = pair()?;
                Condition::Compare(a, b)
            }
            "intersect" => {
                let (a, b) = pair()?;
                Condition::Intersect(a, b)
            }
            "contains" => {
                let (a, b) = pair()?;
                Condition::Contains(a, b)
            }
            "subset" => {
                let (a, b) = pair()?;
                Condition::Subset(a, b)
            }
            "exists" => Condition::Exists(Operand::parse(field("value")?)?),
            other => return Err(OperandError::UnknownType(other.to_string())),
        })
    }

    /// `source.piece.has_moved == false`, the classic first-move test.
    pub fn unmoved() -> Condition {
        Condition::Compare(
            Operand::Field(Subject::Source, Accessor::PieceHasMoved),
            Operand::Literal(Value::Bool(false)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::presets::rectangular_grid;
    use crate::board::{Piece, Tile};
    use serde_json::json;

    fn ctx_fixture() -> (GraphBoard, BTreeMap<String, Team>, Vec<String>) {
        let mut board = rectangular_grid(4, 4);
        board.set_piece(Position::grid(0, 0), Some(Piece::new("pawn", "white", "n"))).unwrap();
        board
            .set_piece(Position::grid(1, 1), Some(Piece::new("rook", "black", "s").with_property("hp", 3i64)))
            .unwrap();
        board.set_tile(Position::grid(2, 2), Tile::typed("water")).unwrap();
        let mut teams = BTreeMap::new();
        teams.insert("white".to_string(), Team::new("white").with_ally("red"));
        teams.insert("black".to_string(), Team::new("black"));
        (board, teams, vec!["white".to_string(), "black".to_string()])
    }

    #[test]
    fn operand_paths() {
        assert_eq!(
            Operand::parse_str("source.piece.has_moved"),
            Ok(Operand::Field(Subject::Source, Accessor::PieceHasMoved))
        );
        assert_eq!(
            Operand::parse_str("target.piece.properties.a.b"),
            Ok(Operand::Field(Subject::Target, Accessor::PieceProperty("a.b".into())))
        );
        assert_eq!(Operand::parse_str("team"), Ok(Operand::Team));
        assert_eq!(Operand::parse_str("pawn"), Ok(Operand::Literal(Value::from("pawn"))));
        assert!(Operand::parse_str("source.piece.colour").is_err());
        assert!(Operand::parse_str("source").is_err());
        assert!(Operand::parse_str("board.size").is_err());
    }

    #[test]
    fn evaluates_against_the_board() {
        let (board, teams, order) = ctx_fixture();
        let ctx = EvalContext {
            board: &board,
            source: Position::grid(0, 0),
            target: Some(Position::grid(1, 1)),
            team: "white",
            teams: &teams,
            turn_order: &order,
        };
        assert!(Condition::unmoved().evaluate(&ctx));

        let c = Condition::from_json(&json!({
            "type": "and",
            "conditions": [
                {"type": "compare", "value1": "target.piece", "value2": "rook"},
                {"type": "compare", "value1": "target.piece.properties.hp", "value2": 3},
                {"type": "contains", "value1": "red", "value2": "source.allies"},
                {"type": "not", "condition": {"type": "intersect", "value1": "target.piece.teams", "value2": "team.allies"}},
                {"type": "compare", "value1": "board.current_team", "value2": "white"}
            ]
        }))
        .unwrap();
        assert!(c.evaluate(&ctx));

        let water = EvalContext { target: Some(Position::grid(2, 2)), ..ctx };
        let c = Condition::from_json(&json!({"type": "compare", "value1": "target.tile.type", "value2": "water"})).unwrap();
        assert!(c.evaluate(&water));
        let c = Condition::from_json(&json!({"type": "exists", "value": "target.piece"})).unwrap();
        assert!(!c.evaluate(&water));
    }

    #[test]
    fn subset_and_scalars() {
        let (board, teams, order) = ctx_fixture();
        let ctx = EvalContext {
            board: &board,
            source: Position::grid(0, 0),
            target: None,
            team: "white",
            teams: &teams,
            turn_order: &order,
        };
        let c = Condition::from_json(&json!({"type": "subset", "value1": "source.piece.teams", "value2": ["white", "red"]}))
            .unwrap();
        assert!(c.evaluate(&ctx));
        // Without a target every target field is null.
        let c = Condition::from_json(&json!({"type": "exists", "value": "target.position"})).unwrap();
        assert!(!c.evaluate(&ctx));
    }

    #[test]
    fn malformed_conditions_are_rejected() {
        assert_eq!(
            Condition::from_json(&json!({"type": "xor", "conditions": []})),
            Err(OperandError::UnknownType("xor".into()))
        );
        assert_eq!(
            Condition::from_json(&json!({"type": "compare", "value1": 1})),
            Err(OperandError::MissingField("value2"))
        );
        assert!(Condition::from_json(&json!("yes")).is_err());
        assert!(Condition::from_json(&json!({"type": "exists", "value": 1.5})).is_err());
    }
}
