//! Post-move edits.
//!
//! A mutator runs after the piece has been relocated. `source` is then the
//! vacated start tile and `target` the destination holding the moved piece.
//! Values are evaluated against the board before any edit of the same
//! mutator is applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::condition::{Condition, EvalContext, Operand, OperandError, Subject};
use crate::board::{BoardError, GraphBoard, Position, Team, Value};

/// A writable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    PieceType,
    PieceFacing,
    PieceHasMoved,
    PieceProperty(String),
    TileType,
    TileProperty(String),
}

impl Field {
    /// Parses `source.<field>` / `target.<field>` into a subject and field.
    pub fn parse(path: &str) -> Result<(Subject, Field), OperandError> {
        let parts: Vec<&str> = path.split('.').collect();
        let subject = match parts[0] {
            "source" => Subject::Source,
            "target" => Subject::Target,
            "board" | "team" => return Err(OperandError::ReadOnly(path.to_string())),
            _ => return Err(OperandError::UnknownPath(path.to_string())),
        };
        let field = match &parts[1..] {
            ["piece", "type"] => Field::PieceType,
            ["piece", "facing"] => Field::PieceFacing,
            ["piece", "has_moved"] => Field::PieceHasMoved,
            ["piece", "properties", rest @ ..] if !rest.is_empty() => Field::PieceProperty(rest.join(".")),
            ["tile", "type"] => Field::TileType,
            ["tile", "properties", rest @ ..] if !rest.is_empty() => Field::TileProperty(rest.join(".")),
            ["position"] | ["piece", "teams"] | ["piece", "royal"] => {
                return Err(OperandError::ReadOnly(path.to_string()))
            }
            _ => return Err(OperandError::UnknownPath(path.to_string())),
        };
        Ok((subject, field))
    }
}

/// One `field := value` assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub subject: Subject,
    pub field: Field,
    pub value: Operand,
}

/// A bundle of assignments and conditional piece removals.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Mutator {
    #[serde(default)]
    pub set: Vec<Assignment>,
    /// The piece on the subject's tile is removed when the condition holds.
    #[serde(default)]
    pub remove: Vec<(Subject, Condition)>,
}

impl Mutator {
    pub fn new() -> Self {
        Mutator::default()
    }

    /// Adds an assignment from a dotted path and a loosely typed value.
    pub fn with_set(mut self, path: &str, value: &serde_json::Value) -> Result<Self, OperandError> {
        let (subject, field) = Field::parse(path)?;
        self.set.push(Assignment {
            subject,
            field,
            value: Operand::parse(value)?,
        });
        Ok(self)
    }

    pub fn with_remove(mut self, subject: Subject, condition: Condition) -> Self {
        self.remove.push((subject, condition));
        self
    }

    /// Builds a mutator from `{"set": {path: value}, "remove": {"source"|"target": condition}}`.
    pub fn from_json(v: &serde_json::Value) -> Result<Mutator, OperandError> {
        let obj = v.as_object().ok_or_else(|| OperandError::BadValue(v.to_string()))?;
        let mut mutator = Mutator::new();
        if let Some(set) = obj.get("set") {
            let set = set.as_object().ok_or_else(|| OperandError::BadValue(set.to_string()))?;
            for (path, value) in set {
                mutator = mutator.with_set(path, value)?;
            }
        }
        if let Some(remove) = obj.get("remove") {
            let remove = remove.as_object().ok_or_else(|| OperandError::BadValue(remove.to_string()))?;
            for (who, condition) in remove {
                let subject = match who.as_str() {
                    "source" => Subject::Source,
                    "target" => Subject::Target,
                    other => return Err(OperandError::UnknownPath(other.to_string())),
                };
                mutator = mutator.with_remove(subject, Condition::from_json(condition)?);
            }
        }
        Ok(mutator)
    }

    /// Applies the mutator in place after a move from `source` to `target`.
    ///
    /// Assignments whose subject piece is absent are skipped.
    pub fn apply(
        &self,
        board: &mut GraphBoard,
        source: Position,
        target: Position,
        team: &str,
        teams: &BTreeMap<String, Team>,
        turn_order: &[String],
    ) -> Result<(), BoardError> {
        let (values, removals) = {
            let ctx = EvalContext {
                board: &*board,
                source,
                target: Some(target),
                team,
                teams,
                turn_order,
            };
            let values: Vec<Value> = self.set.iter().map(|a| a.value.evaluate(&ctx)).collect();
            let removals: Vec<Subject> = self
                .remove
                .iter()
                .filter(|(_, c)| c.evaluate(&ctx))
                .map(|(s, _)| *s)
                .collect();
            (values, removals)
        };
        let at = |subject: Subject| match subject {
            Subject::Source => source,
            Subject::Target => target,
        };

        for (assignment, value) in self.set.iter().zip(values) {
            board.update_tile(at(assignment.subject), |tile| match &assignment.field {
                Field::TileType => tile.tile_type = value.as_str().map(str::to_string),
                Field::TileProperty(key) => {
                    tile.properties.insert(key.clone(), value);
                }
                field => {
                    let Some(piece) = tile.piece.as_mut() else {
                        return;
                    };
                    match field {
                        Field::PieceType => {
                            if let Some(name) = value.as_str() {
                                piece.name = name.to_string();
                            }
                        }
                        Field::PieceFacing => {
                            if let Some(facing) = value.as_str() {
                                piece.facing = facing.to_string();
                            }
                        }
                        Field::PieceHasMoved => {
                            if let Some(moved) = value.as_bool() {
                                piece.has_moved = moved;
                            }
                        }
                        Field::PieceProperty(key) => {
                            piece.properties.insert(key.clone(), value);
                        }
                        Field::TileType | Field::TileProperty(_) => {}
                    }
                }
            })?;
        }

        for subject in removals {
            board.take_piece(at(subject))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::presets::rectangular_grid;
    use crate::board::Piece;
    use serde_json::json;

    #[test]
    fn paths_are_validated() {
        assert_eq!(Field::parse("target.piece.type"), Ok((Subject::Target, Field::PieceType)));
        assert_eq!(
            Field::parse("source.tile.properties.scorched"),
            Ok((Subject::Source, Field::TileProperty("scorched".into())))
        );
        assert!(matches!(Field::parse("source.position"), Err(OperandError::ReadOnly(_))));
        assert!(matches!(Field::parse("board.current_team"), Err(OperandError::ReadOnly(_))));
        assert!(matches!(Field::parse("target.piece.colour"), Err(OperandError::UnknownPath(_))));
        assert!(Mutator::from_json(&json!({"set": {"target.tile.properties": 1}})).is_err());
    }

    #[test]
    fn applies_assignments_and_removals() {
        let mut board = rectangular_grid(4, 4);
        let (from, to) = (Position::grid(0, 0), Position::grid(1, 0));
        board.set_piece(to, Some(Piece::new("pawn", "white", "n"))).unwrap();
        let teams: BTreeMap<String, Team> = BTreeMap::new();
        let order = vec!["white".to_string()];

        let m = Mutator::from_json(&json!({
            "set": {
                "source.tile.type": "scorched",
                "target.piece.properties.steps": 1,
                "target.piece.type": "source.tile.properties.spawn"
            },
            "remove": {"target": {"type": "compare", "value1": "target.tile.type", "value2": "lava"}}
        }))
        .unwrap();
        board.update_tile(from, |t| {
            t.properties.insert("spawn".into(), Value::from("knight"));
        })
        .unwrap();

        m.apply(&mut board, from, to, "white", &teams, &order).unwrap();
        assert_eq!(board.tile(&from).unwrap().tile_type.as_deref(), Some("scorched"));
        let piece = board.piece(&to).unwrap();
        assert_eq!(piece.name, "knight");
        assert_eq!(piece.properties.get("steps"), Some(&Value::Int(1)));
    }

    #[test]
    fn removal_keeps_royal_index() {
        let mut board = rectangular_grid(2, 2);
        let to = Position::grid(1, 1);
        board.set_piece(to, Some(Piece::new("king", "white", "n").with_royal(true))).unwrap();
        let teams = BTreeMap::new();
        let order: Vec<String> = Vec::new();
        Mutator::new()
            .with_remove(Subject::Target, Condition::True)
            .apply(&mut board, Position::grid(0, 0), to, "white", &teams, &order)
            .unwrap();
        assert!(board.piece(&to).is_none());
        assert!(board.royal_tiles("white").is_empty());
    }
}
