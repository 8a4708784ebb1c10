//! Dynamic property values.
//!
//! Tiles and pieces carry string-keyed properties, and condition operands
//! evaluate to these values.

use serde::{Deserialize, Serialize};

use super::position::Position;

/// A property or operand value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Position(Position),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Views the value as a list; scalars become a one-element slice and
    /// `Null` an empty one.
    pub fn as_items(&self) -> &[Value] {
        match self {
            Value::Null => &[],
            Value::List(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Builds a value from loosely typed JSON.
    ///
    /// Floats are rejected; property values are integral.
    pub fn from_json(v: &serde_json::Value) -> Option<Value> {
        Some(match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Int(n.as_i64()?),
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect::<Option<Vec<_>>>()?)
            }
            serde_json::Value::Object(_) => return None,
        })
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Position> for Value {
    fn from(p: Position) -> Self {
        Value::Position(p)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_view_as_singletons() {
        assert_eq!(Value::Int(3).as_items(), &[Value::Int(3)]);
        assert!(Value::Null.as_items().is_empty());
        let list = Value::from(vec!["a", "b"]);
        assert_eq!(list.as_items().len(), 2);
    }

    #[test]
    fn from_json_rejects_objects_and_floats() {
        assert_eq!(Value::from_json(&serde_json::json!([1, "x", true])),
            Some(Value::List(vec![Value::Int(1), Value::from("x"), Value::Bool(true)])));
        assert_eq!(Value::from_json(&serde_json::json!({"a": 1})), None);
        assert_eq!(Value::from_json(&serde_json::json!(1.5)), None);
    }
}
