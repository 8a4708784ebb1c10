//! Per-piece-type rules.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::moveset::Moveset;

/// Movement rules, value, and promotion of one piece type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub name: String,
    pub points: i32,
    pub movesets: Vec<Arc<Moveset>>,
    pub promotion: Option<String>,
    /// Whether pieces of this type are royal unless overridden.
    pub royal: bool,
}

impl RuleSet {
    pub fn new(name: impl Into<String>, points: i32) -> Self {
        RuleSet {
            name: name.into(),
            points,
            movesets: Vec::new(),
            promotion: None,
            royal: false,
        }
    }

    pub fn with_moveset(mut self, moveset: Moveset) -> Self {
        self.movesets.push(Arc::new(moveset));
        self
    }

    /// Adds an already shared moveset.
    pub fn with_shared(mut self, moveset: Arc<Moveset>) -> Self {
        self.movesets.push(moveset);
        self
    }

    pub fn with_promotion(mut self, target: impl Into<String>) -> Self {
        self.promotion = Some(target.into());
        self
    }

    pub fn royal(mut self) -> Self {
        self.royal = true;
        self
    }
}

/// Rule sets keyed by piece type name.
pub type RuleTable = BTreeMap<String, RuleSet>;

/// Collects rule sets into a table keyed by their names.
pub fn rule_table(rules: impl IntoIterator<Item = RuleSet>) -> RuleTable {
    rules.into_iter().map(|r| (r.name.clone(), r)).collect()
}
