//! Pieces and teams.
//!
//! A piece belongs to one to four teams at once (alliance puzzles), with
//! the first team being its primary owner. Royal status is fixed when the
//! piece is created and drives the board's royal index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::value::Value;

/// Maximum number of team slots on a piece.
pub const MAX_TEAM_SLOTS: usize = 4;

/// A piece standing on a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// Piece type name, the key into the engine's rule table.
    pub name: String,
    /// Team slots, primary first, no duplicates.
    teams: Vec<String>,
    /// Absolute direction the piece currently treats as forward.
    pub facing: String,
    pub has_moved: bool,
    royal: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl Piece {
    /// Creates a non-royal, unmoved piece owned by a single team.
    pub fn new(name: impl Into<String>, team: impl Into<String>, facing: impl Into<String>) -> Self {
        Piece {
            name: name.into(),
            teams: vec![team.into()],
            facing: facing.into(),
            has_moved: false,
            royal: false,
            properties: BTreeMap::new(),
        }
    }

    /// Sets the royal flag.
    pub fn with_royal(mut self, royal: bool) -> Self {
        self.royal = royal;
        self
    }

    /// Adds a further team slot. Duplicates and slots beyond
    /// [`MAX_TEAM_SLOTS`] are ignored.
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        let team = team.into();
        if self.teams.len() < MAX_TEAM_SLOTS && !self.teams.contains(&team) {
            self.teams.push(team);
        }
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn is_royal(&self) -> bool {
        self.royal
    }

    /// The primary owning team.
    pub fn team(&self) -> &str {
        &self.teams[0]
    }

    pub fn teams(&self) -> &[String] {
        &self.teams
    }

    pub fn belongs_to(&self, team: &str) -> bool {
        self.teams.iter().any(|t| t == team)
    }
}

/// How a team is knocked out of the turn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoseCondition {
    /// Loses once no royal piece of the team remains.
    #[default]
    EliminateRoyals,
    /// Loses as soon as any royal piece is lost.
    EliminateAnyRoyal,
    /// Loses only when no piece of the team remains.
    NoPieces,
}

impl LoseCondition {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "eliminate_royals" => Some(LoseCondition::EliminateRoyals),
            "eliminate_any_royal" => Some(LoseCondition::EliminateAnyRoyal),
            "no_pieces" => Some(LoseCondition::NoPieces),
            _ => None,
        }
    }
}

/// A side in the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    /// Allied team names, always including the team itself.
    allies: Vec<String>,
    pub color: [f32; 3],
    pub lose_condition: LoseCondition,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Team {
            allies: vec![name.clone()],
            name,
            color: [1.0, 1.0, 1.0],
            lose_condition: LoseCondition::default(),
        }
    }

    pub fn with_ally(mut self, ally: impl Into<String>) -> Self {
        self.add_ally(ally);
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn with_lose_condition(mut self, lose: LoseCondition) -> Self {
        self.lose_condition = lose;
        self
    }

    pub fn add_ally(&mut self, ally: impl Into<String>) {
        let ally = ally.into();
        if !self.allies.contains(&ally) {
            self.allies.push(ally);
        }
    }

    /// Removes an ally. A team cannot stop being its own ally.
    pub fn remove_ally(&mut self, ally: &str) {
        if ally != self.name {
            self.allies.retain(|a| a != ally);
        }
    }

    pub fn allies(&self) -> &[String] {
        &self.allies
    }

    pub fn is_ally(&self, team: &str) -> bool {
        self.allies.iter().any(|a| a == team)
    }
}
