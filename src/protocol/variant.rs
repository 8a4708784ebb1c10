//! Declarative variants.
//!
//! A variant is a JSON document describing teams, a board shape, piece
//! rules, and the starting position. Conditions and mutators are compiled
//! into their in-memory forms here, so a loaded variant never re-parses
//! rule text during play. Loading fails on the first problem found.
//!
//! ```json
//! {
//!   "name": "warp chess",
//!   "base_rules": "standard",
//!   "teams": [
//!     {"name": "white", "facing": "n", "promotion_tiles": ["a8", "h8"]},
//!     {"name": "black", "facing": "s"}
//!   ],
//!   "board": {"shape": "rectangular", "rows": 8, "cols": 8},
//!   "pieces": [{"name": "wazir", "points": 20, "movesets": [
//!     {"moves": [{"steps": [["f", "edge"]]}], "max_distance": 1}
//!   ]}],
//!   "placements": [{"at": "e1", "piece": "king", "team": "white"}],
//!   "adjacencies": [{"from": "a1", "to": "h8", "kind": "warp", "direction": "warp"}]
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::notation::{parse_square, NotationError};
use crate::board::presets::{cylinder, glinski_board, hexagonal, layered, rectangular_grid, standard_board_spaced};
use crate::board::{BoardError, GraphBoard, LoseCondition, Position, Team, Tile, Value};
use crate::engine::{EngineOptions, RuleEngine};
use crate::game::Game;
use crate::movegen::{NoCheck, RoyalCaptureCheck};
use crate::movement::presets::by_name;
use crate::movement::{Condition, Move, Moveset, Mutator, OperandError, RuleSet, RuleTable};

/// Why a variant could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid variant JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown rule table '{0}'")]
    UnknownRules(String),

    #[error("unknown piece type '{0}'")]
    UnknownPiece(String),

    #[error("unknown team '{0}'")]
    UnknownTeam(String),

    #[error("unknown tile type '{0}'")]
    UnknownTileType(String),

    #[error("adjacency kind '{kind}' used by '{piece}' does not exist on the board")]
    UnknownKind { piece: String, kind: String },

    #[error("'{0}' is not a direction of this board")]
    UnknownDirection(String),

    #[error("move of '{piece}' steps '{direction}' along '{kind}', which the board does not have")]
    UnknownStep {
        piece: String,
        direction: String,
        kind: String,
    },

    #[error("unknown check rule '{0}'")]
    UnknownCheckRule(String),

    #[error("moveset of '{piece}' has max_distance {max} below min_distance {min}")]
    DistanceRange { piece: String, min: u32, max: i64 },

    #[error("invalid coordinates {0:?}")]
    BadCoordinates(Vec<i32>),

    #[error("property '{key}' has unsupported value {value}")]
    BadProperty { key: String, value: String },

    #[error("duplicate team '{0}'")]
    DuplicateTeam(String),

    #[error("team '{0}' loses on royal capture but starts without a royal piece")]
    NoRoyals(String),

    #[error("rule in '{piece}': {source}")]
    Rule {
        piece: String,
        #[source]
        source: OperandError,
    },

    #[error(transparent)]
    Notation(#[from] NotationError),

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// A square given as a name (`"e4"`) or raw coordinates (`[0, 1, -1]`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SquareSpec {
    Name(String),
    Coords(Vec<i32>),
}

impl SquareSpec {
    pub fn position(&self) -> Result<Position, ConfigError> {
        match self {
            SquareSpec::Name(s) => Ok(parse_square(s)?),
            SquareSpec::Coords(c) => Position::from_slice(c).ok_or_else(|| ConfigError::BadCoordinates(c.clone())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamSpec {
    pub name: String,
    #[serde(default)]
    pub allies: Vec<String>,
    pub color: Option<[f32; 3]>,
    #[serde(default)]
    pub lose_condition: LoseCondition,
    /// Facing of this team's pieces unless a placement says otherwise.
    #[serde(default = "default_facing")]
    pub facing: String,
    #[serde(default)]
    pub promotion_tiles: Vec<SquareSpec>,
}

fn default_facing() -> String {
    "n".to_string()
}

fn white() -> String {
    "white".to_string()
}

fn black() -> String {
    "black".to_string()
}

fn standard_distance() -> i32 {
    4
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum BoardSpec {
    Rectangular {
        rows: i32,
        cols: i32,
    },
    Cylinder {
        rows: i32,
        cols: i32,
    },
    Hexagonal {
        radius: i32,
    },
    Layered {
        layers: i32,
        rows: i32,
        cols: i32,
    },
    /// Standard chess setup; `distance` empty ranks between the pawns.
    Standard {
        #[serde(default = "white")]
        white: String,
        #[serde(default = "black")]
        black: String,
        #[serde(default = "standard_distance")]
        distance: i32,
    },
    Glinski {
        #[serde(default = "white")]
        white: String,
        #[serde(default = "black")]
        black: String,
    },
}

impl BoardSpec {
    fn build(&self) -> GraphBoard {
        match self {
            BoardSpec::Rectangular { rows, cols } => rectangular_grid(*rows, *cols),
            BoardSpec::Cylinder { rows, cols } => cylinder(*rows, *cols),
            BoardSpec::Hexagonal { radius } => hexagonal(*radius),
            BoardSpec::Layered { layers, rows, cols } => layered(*layers, *rows, *cols),
            BoardSpec::Standard { white, black, distance } => standard_board_spaced(white, black, *distance),
            BoardSpec::Glinski { white, black } => glinski_board(white, black),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveSpec {
    /// `(direction, adjacency kind)` pairs.
    pub steps: Vec<(String, String)>,
    #[serde(default = "forward")]
    pub end_direction: String,
}

fn forward() -> String {
    "f".to_string()
}

fn one() -> u32 {
    1
}

fn yes() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovesetSpec {
    pub moves: Vec<MoveSpec>,
    #[serde(default = "one")]
    pub min_distance: u32,
    /// Missing, `null`, or `-1` slides until blocked.
    pub max_distance: Option<i64>,
    #[serde(default = "yes")]
    pub can_move_empty: bool,
    #[serde(default = "yes")]
    pub can_capture: bool,
    pub requirement: Option<serde_json::Value>,
    #[serde(default)]
    pub overrides: Vec<OverrideSpec>,
    #[serde(default)]
    pub mutators: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverrideSpec {
    pub condition: serde_json::Value,
    pub moveset: MovesetSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PieceSpec {
    pub name: String,
    #[serde(default)]
    pub points: i32,
    #[serde(default)]
    pub royal: bool,
    pub promotion: Option<String>,
    #[serde(default)]
    pub movesets: Vec<MovesetSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TileTypeSpec {
    pub texture: Option<String>,
    pub tint: Option<[f32; 3]>,
    #[serde(default)]
    pub disallowed_pieces: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileSpec {
    pub at: SquareSpec,
    #[serde(rename = "type")]
    pub tile_type: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacementSpec {
    pub at: SquareSpec,
    pub piece: String,
    pub team: String,
    /// Further team slots after the primary one.
    #[serde(default)]
    pub extra_teams: Vec<String>,
    pub facing: Option<String>,
    /// Overrides the piece type's royal default.
    pub royal: Option<bool>,
    #[serde(default)]
    pub has_moved: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdjacencySpec {
    pub from: SquareSpec,
    pub to: SquareSpec,
    pub kind: String,
    pub direction: String,
    #[serde(default = "forward")]
    pub reorientation: String,
    /// Also registers `to -> from` under the same kind.
    pub back_direction: Option<String>,
}

/// A whole variant document.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantSpec {
    #[serde(default)]
    pub name: String,
    /// Built-in rule table the pieces extend (`standard`, `glinski`, `warp`).
    pub base_rules: Option<String>,
    pub teams: Vec<TeamSpec>,
    /// Defaults to the order of `teams`.
    pub turn_order: Option<Vec<String>>,
    #[serde(default)]
    pub options: EngineOptions,
    /// `none` (default) or `royal_capture`.
    pub check_rule: Option<String>,
    pub board: BoardSpec,
    /// Squares cut out of the board shape.
    #[serde(default)]
    pub holes: Vec<SquareSpec>,
    #[serde(default)]
    pub tile_types: BTreeMap<String, TileTypeSpec>,
    #[serde(default)]
    pub tiles: Vec<TileSpec>,
    #[serde(default)]
    pub adjacencies: Vec<AdjacencySpec>,
    #[serde(default)]
    pub pieces: Vec<PieceSpec>,
    #[serde(default)]
    pub placements: Vec<PlacementSpec>,
}

impl VariantSpec {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Compiles the variant into a game ready for its first move.
    pub fn build(&self) -> Result<Game, ConfigError> {
        let teams = self.build_teams()?;
        let known: BTreeSet<&str> = teams.iter().map(|t| t.name.as_str()).collect();
        let turn_order = match &self.turn_order {
            Some(order) => {
                if let Some(t) = order.iter().find(|t| !known.contains(t.as_str())) {
                    return Err(ConfigError::UnknownTeam(t.clone()));
                }
                order.clone()
            }
            None => teams.iter().map(|t| t.name.clone()).collect(),
        };

        let mut board = self.board.build();
        for hole in &self.holes {
            board.remove_node(hole.position()?)?;
        }
        self.apply_tiles(&mut board)?;
        for adj in &self.adjacencies {
            let (from, to) = (adj.from.position()?, adj.to.position()?);
            let graph = board.directions();
            if graph.is_relative_kind(&adj.kind) {
                let bad = std::iter::once(&adj.direction)
                    .chain(&adj.back_direction)
                    .find(|d| !graph.contains(d));
                if let Some(d) = bad {
                    return Err(ConfigError::UnknownDirection(d.clone()));
                }
            }
            board.add_adjacency(from, to, &adj.kind, &adj.direction, &adj.reorientation)?;
            if let Some(back) = &adj.back_direction {
                board.add_adjacency(to, from, &adj.kind, back, &adj.reorientation)?;
            }
        }

        let rules = self.build_rules(&board)?;
        let mut engine = RuleEngine::new(rules, teams)
            .with_turn_order(turn_order)
            .with_options(self.options);
        for team in &self.teams {
            let tiles = team
                .promotion_tiles
                .iter()
                .map(|s| -> Result<Position, ConfigError> {
                    let p = s.position()?;
                    board.node(&p)?;
                    Ok(p)
                })
                .collect::<Result<Vec<_>, _>>()?;
            engine = engine.with_promotion_tiles(&team.name, tiles);
        }
        match self.check_rule.as_deref() {
            None | Some("none") => engine.set_check_rule(None),
            Some("royal_capture") => engine.set_check_rule(Some(Arc::new(RoyalCaptureCheck))),
            Some("never") => engine.set_check_rule(Some(Arc::new(NoCheck))),
            Some(other) => return Err(ConfigError::UnknownCheckRule(other.to_string())),
        }

        self.place_pieces(&engine, &mut board)?;
        if let Some(team) = self
            .teams
            .iter()
            .find(|t| t.lose_condition != LoseCondition::NoPieces && board.royal_tiles(&t.name).is_empty())
        {
            return Err(ConfigError::NoRoyals(team.name.clone()));
        }
        board.validate()?;
        debug!(variant = %self.name, tiles = board.len(), pieces = engine.rules().len(), "variant loaded");
        Ok(Game::new(engine, board))
    }

    fn build_teams(&self) -> Result<Vec<Team>, ConfigError> {
        let names: BTreeSet<&str> = self.teams.iter().map(|t| t.name.as_str()).collect();
        if names.len() != self.teams.len() {
            let mut seen = BTreeSet::new();
            let dup = self.teams.iter().find(|t| !seen.insert(t.name.as_str()));
            return Err(ConfigError::DuplicateTeam(dup.map(|t| t.name.clone()).unwrap_or_default()));
        }
        self.teams
            .iter()
            .map(|spec| {
                let mut team = Team::new(spec.name.clone()).with_lose_condition(spec.lose_condition);
                if let Some(color) = spec.color {
                    team = team.with_color(color);
                }
                for ally in &spec.allies {
                    if !names.contains(ally.as_str()) {
                        return Err(ConfigError::UnknownTeam(ally.clone()));
                    }
                    team = team.with_ally(ally.clone());
                }
                Ok(team)
            })
            .collect()
    }

    fn apply_tiles(&self, board: &mut GraphBoard) -> Result<(), ConfigError> {
        for spec in &self.tiles {
            let at = spec.at.position()?;
            board.node(&at)?;
            let mut tile = match &spec.tile_type {
                Some(name) => {
                    let ty = self
                        .tile_types
                        .get(name)
                        .ok_or_else(|| ConfigError::UnknownTileType(name.clone()))?;
                    let mut tile = Tile::typed(name.clone());
                    if ty.texture.is_some() {
                        tile.texture = ty.texture.clone();
                    }
                    tile.tint = ty.tint;
                    tile.disallowed_pieces = ty.disallowed_pieces.clone();
                    tile.properties = values(&ty.properties)?;
                    tile
                }
                None => Tile::empty(),
            };
            tile.properties.extend(values(&spec.properties)?);
            board.set_tile(at, tile)?;
        }
        Ok(())
    }

    fn build_rules(&self, board: &GraphBoard) -> Result<RuleTable, ConfigError> {
        let mut rules = match &self.base_rules {
            Some(name) => by_name(name)
                .ok_or_else(|| ConfigError::UnknownRules(name.clone()))?
                .clone(),
            None => RuleTable::new(),
        };

        let topology = Topology::of(board);
        for spec in &self.pieces {
            let mut rule = RuleSet::new(spec.name.clone(), spec.points);
            for moveset in &spec.movesets {
                rule = rule.with_moveset(compile_moveset(&spec.name, moveset, &topology)?);
            }
            if let Some(target) = &spec.promotion {
                rule = rule.with_promotion(target.clone());
            }
            if spec.royal {
                rule = rule.royal();
            }
            rules.insert(spec.name.clone(), rule);
        }

        for rule in rules.values() {
            if let Some(target) = &rule.promotion {
                if !rules.contains_key(target) {
                    return Err(ConfigError::UnknownPiece(target.clone()));
                }
            }
        }
        Ok(rules)
    }

    fn place_pieces(&self, engine: &RuleEngine, board: &mut GraphBoard) -> Result<(), ConfigError> {
        for spec in &self.placements {
            if engine.rule(&spec.piece).is_none() {
                return Err(ConfigError::UnknownPiece(spec.piece.clone()));
            }
            let team = self
                .teams
                .iter()
                .find(|t| t.name == spec.team)
                .ok_or_else(|| ConfigError::UnknownTeam(spec.team.clone()))?;
            let facing = spec.facing.as_deref().unwrap_or(&team.facing);
            if !board.directions().contains(facing) {
                return Err(ConfigError::UnknownDirection(facing.to_string()));
            }

            let mut piece = engine.new_piece(&spec.piece, &spec.team, facing);
            for extra in &spec.extra_teams {
                if engine.team(extra).is_none() {
                    return Err(ConfigError::UnknownTeam(extra.clone()));
                }
                piece = piece.with_team(extra.clone());
            }
            if let Some(royal) = spec.royal {
                piece = piece.with_royal(royal);
            }
            piece.has_moved = spec.has_moved;
            piece.properties = values(&spec.properties)?;
            board.set_piece(spec.at.position()?, Some(piece))?;
        }
        Ok(())
    }
}

fn values(props: &BTreeMap<String, serde_json::Value>) -> Result<BTreeMap<String, Value>, ConfigError> {
    props
        .iter()
        .map(|(k, v)| {
            Value::from_json(v)
                .map(|v| (k.clone(), v))
                .ok_or_else(|| ConfigError::BadProperty {
                    key: k.clone(),
                    value: v.to_string(),
                })
        })
        .collect()
}

/// Adjacency kinds and step directions present on a built board.
struct Topology<'a> {
    board: &'a GraphBoard,
    /// Kind to the directions registered under it on any node.
    kinds: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> Topology<'a> {
    fn of(board: &'a GraphBoard) -> Self {
        let mut kinds: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (kind, dirs) in board.nodes().flat_map(|n| n.adjacencies()) {
            kinds.entry(kind.as_str()).or_default().extend(dirs.keys().map(String::as_str));
        }
        Topology { board, kinds }
    }

    /// Relative kinds take relative tokens; other kinds take a literal
    /// direction registered somewhere under that kind.
    fn check_step(&self, piece: &str, direction: &str, kind: &str) -> Result<(), ConfigError> {
        let Some(dirs) = self.kinds.get(kind) else {
            return Err(ConfigError::UnknownKind {
                piece: piece.to_string(),
                kind: kind.to_string(),
            });
        };
        let graph = self.board.directions();
        let known = if graph.is_relative_kind(kind) {
            graph.is_relative(direction)
        } else {
            dirs.contains(direction)
        };
        if known {
            Ok(())
        } else {
            Err(ConfigError::UnknownStep {
                piece: piece.to_string(),
                direction: direction.to_string(),
                kind: kind.to_string(),
            })
        }
    }
}

fn compile_moveset(piece: &str, spec: &MovesetSpec, topology: &Topology<'_>) -> Result<Moveset, ConfigError> {
    let rule_err = |source| ConfigError::Rule {
        piece: piece.to_string(),
        source,
    };

    let mut moves = Vec::with_capacity(spec.moves.len());
    for m in &spec.moves {
        for (direction, kind) in &m.steps {
            topology.check_step(piece, direction, kind)?;
        }
        if !topology.board.directions().is_relative(&m.end_direction) {
            return Err(ConfigError::UnknownDirection(m.end_direction.clone()));
        }
        let steps: Vec<(&str, &str)> = m.steps.iter().map(|(d, k)| (d.as_str(), k.as_str())).collect();
        moves.push(Move::new(&steps).with_end_direction(m.end_direction.clone()));
    }

    let mut moveset = Moveset::new(moves).with_min_distance(spec.min_distance);
    match spec.max_distance {
        None | Some(-1) => {}
        Some(max) if max < i64::from(spec.min_distance) => {
            return Err(ConfigError::DistanceRange {
                piece: piece.to_string(),
                min: spec.min_distance,
                max,
            })
        }
        Some(max) => {
            let max = u32::try_from(max).map_err(|_| ConfigError::DistanceRange {
                piece: piece.to_string(),
                min: spec.min_distance,
                max,
            })?;
            moveset = moveset.with_max_distance(max);
        }
    }
    moveset.can_move_empty = spec.can_move_empty;
    moveset.can_capture = spec.can_capture;
    if let Some(req) = &spec.requirement {
        moveset = moveset.with_requirement(Condition::from_json(req).map_err(rule_err)?);
    }
    for o in &spec.overrides {
        let condition = Condition::from_json(&o.condition).map_err(rule_err)?;
        moveset = moveset.with_override(condition, compile_moveset(piece, &o.moveset, topology)?);
    }
    for m in &spec.mutators {
        moveset = moveset.with_mutator(Mutator::from_json(m).map_err(rule_err)?);
    }
    Ok(moveset)
}

/// Parses and compiles a variant document.
pub fn load_variant(json: &str) -> Result<Game, ConfigError> {
    VariantSpec::from_json(json)?.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINI: &str = r#"{
        "name": "mini",
        "teams": [
            {"name": "white", "facing": "n", "promotion_tiles": ["a4", "b4", "c4", "d4"]},
            {"name": "black", "facing": "s", "lose_condition": "no_pieces"}
        ],
        "board": {"shape": "rectangular", "rows": 4, "cols": 4},
        "tile_types": {"wall": {"disallowed_pieces": ["wazir"]}},
        "tiles": [{"at": "a2", "type": "wall"}],
        "pieces": [
            {"name": "wazir", "points": 20, "royal": true, "movesets": [
                {"moves": [{"steps": [["f", "edge"]]}, {"steps": [["r", "edge"]]},
                           {"steps": [["b", "edge"]]}, {"steps": [["l", "edge"]]}],
                 "max_distance": 1}
            ]},
            {"name": "runner", "points": 10, "promotion": "wazir", "movesets": [
                {"moves": [{"steps": [["f", "edge"]]}], "max_distance": -1, "can_capture": false}
            ]}
        ],
        "placements": [
            {"at": "a1", "piece": "wazir", "team": "white"},
            {"at": "c1", "piece": "runner", "team": "white"},
            {"at": "d4", "piece": "runner", "team": "black"}
        ]
    }"#;

    fn patched(f: impl FnOnce(&mut serde_json::Value)) -> Result<Game, ConfigError> {
        let mut v: serde_json::Value = serde_json::from_str(MINI).unwrap();
        f(&mut v);
        load_variant(&v.to_string())
    }

    #[test]
    fn loads_a_small_variant() {
        let game = load_variant(MINI).unwrap();
        let a1 = Position::grid(0, 0);
        assert!(game.board.piece(&a1).unwrap().is_royal());
        assert_eq!(game.board.royal_tiles("white"), &[a1]);
        assert_eq!(game.engine.initial_royals("white"), 1);
        // a2 is a wall for the wazir.
        let moves: Vec<Position> = game.legal_moves(a1).into_iter().map(|(p, _)| p).collect();
        assert_eq!(moves, vec![Position::grid(0, 1)]);
        assert_eq!(game.board.tile(&Position::grid(1, 0)).unwrap().tile_type.as_deref(), Some("wall"));
        assert_eq!(game.legal_moves(Position::grid(0, 2)).len(), 3);
        assert_eq!(game.board.piece(&Position::grid(3, 3)).unwrap().facing, "s");
    }

    #[test]
    fn runners_promote_on_the_far_rank() {
        let mut game = load_variant(MINI).unwrap();
        game.play(Position::grid(0, 2), Position::grid(3, 2)).unwrap();
        assert_eq!(game.board.piece(&Position::grid(3, 2)).unwrap().name, "wazir");
    }

    #[test]
    fn extends_base_rules() {
        let game = patched(|v| {
            v["base_rules"] = "standard".into();
            v["placements"][1]["piece"] = "rook".into();
        })
        .unwrap();
        assert!(game.engine.rule("queen").is_some());
        // Up the c-file, and one step each way along the first rank.
        assert_eq!(game.legal_moves(Position::grid(0, 2)).len(), 3 + 2);
    }

    #[test]
    fn holes_and_portals() {
        let game = patched(|v| {
            v["tiles"] = serde_json::json!([]);
            v["holes"] = serde_json::json!(["a2"]);
            v["adjacencies"] = serde_json::json!([
                {"from": "a1", "to": "d3", "kind": "edge", "direction": "n", "back_direction": "s"}
            ]);
        })
        .unwrap();
        assert!(!game.board.contains(&Position::grid(1, 0)));
        let moves: Vec<Position> = game.legal_moves(Position::grid(0, 0)).into_iter().map(|(p, _)| p).collect();
        assert_eq!(moves, vec![Position::grid(2, 3), Position::grid(0, 1)]);
        assert_eq!(game.board.neighbors(&Position::grid(2, 3), "edge", "s").len(), 2);
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(matches!(load_variant("{"), Err(ConfigError::Json(_))));
        assert!(matches!(
            patched(|v| v["tiles"][0]["properties"] = serde_json::json!({"height": 1.5})),
            Err(ConfigError::BadProperty { .. })
        ));
        assert!(matches!(
            patched(|v| v["placements"][0]["piece"] = "dragon".into()),
            Err(ConfigError::UnknownPiece(_))
        ));
        assert!(matches!(
            patched(|v| v["placements"][0]["team"] = "green".into()),
            Err(ConfigError::UnknownTeam(_))
        ));
        assert!(matches!(
            patched(|v| v["teams"][0]["allies"] = serde_json::json!(["green"])),
            Err(ConfigError::UnknownTeam(_))
        ));
        assert!(matches!(
            patched(|v| v["tiles"][0]["type"] = "lava".into()),
            Err(ConfigError::UnknownTileType(_))
        ));
        assert!(matches!(
            patched(|v| v["pieces"][0]["movesets"][0]["moves"][0]["steps"][0][1] = "warp".into()),
            Err(ConfigError::UnknownKind { .. })
        ));
        assert!(matches!(
            patched(|v| {
                v["pieces"][0]["movesets"][0]["min_distance"] = 3.into();
                v["pieces"][0]["movesets"][0]["max_distance"] = 2.into();
            }),
            Err(ConfigError::DistanceRange { min: 3, max: 2, .. })
        ));
        assert!(matches!(
            patched(|v| v["pieces"][0]["movesets"][0]["requirement"] = serde_json::json!({"type": "xor"})),
            Err(ConfigError::Rule { .. })
        ));
        assert!(matches!(
            patched(|v| v["pieces"][0]["movesets"][0]["mutators"] =
                serde_json::json!([{"set": {"source.position": "a1"}}])),
            Err(ConfigError::Rule { source: OperandError::ReadOnly(_), .. })
        ));
        assert!(matches!(
            patched(|v| v["placements"][0]["at"] = "z9".into()),
            Err(ConfigError::Board(BoardError::NotFound(_)))
        ));
        assert!(matches!(
            patched(|v| v["placements"][0]["at"] = "9z".into()),
            Err(ConfigError::Notation(_))
        ));
        assert!(matches!(
            patched(|v| v["placements"][0]["facing"] = "up".into()),
            Err(ConfigError::UnknownDirection(_))
        ));
        assert!(matches!(
            patched(|v| v["check_rule"] = "stalemate".into()),
            Err(ConfigError::UnknownCheckRule(_))
        ));
        assert!(matches!(
            patched(|v| v["pieces"][1]["promotion"] = "emperor".into()),
            Err(ConfigError::UnknownPiece(_))
        ));
        assert!(matches!(
            patched(|v| v["teams"][1]["name"] = "white".into()),
            Err(ConfigError::DuplicateTeam(_))
        ));
        assert!(matches!(
            patched(|v| v["teams"][1]["lose_condition"] = "eliminate_any_royal".into()),
            Err(ConfigError::NoRoyals(ref t)) if t == "black"
        ));
    }

    fn wazir(v: &mut serde_json::Value) -> &mut serde_json::Value {
        &mut v["pieces"][0]["movesets"][0]["moves"][0]
    }

    #[test]
    fn rejects_unknown_directions() {
        assert!(matches!(
            patched(|v| wazir(v)["steps"][0][0] = "ffr".into()),
            Err(ConfigError::UnknownStep { ref direction, .. }) if direction == "ffr"
        ));
        assert!(matches!(
            patched(|v| wazir(v)["end_direction"] = "zz".into()),
            Err(ConfigError::UnknownDirection(ref d)) if d == "zz"
        ));
        assert!(matches!(
            patched(|v| v["adjacencies"] = serde_json::json!([
                {"from": "a1", "to": "d3", "kind": "edge", "direction": "up"}
            ])),
            Err(ConfigError::UnknownDirection(ref d)) if d == "up"
        ));
        assert!(matches!(
            patched(|v| v["adjacencies"] = serde_json::json!([
                {"from": "a1", "to": "d3", "kind": "edge", "direction": "n", "back_direction": "f"}
            ])),
            Err(ConfigError::UnknownDirection(ref d)) if d == "f"
        ));

        // Literal kinds take the directions their edges were registered with.
        let portal = |step: &str| {
            patched(|v| {
                v["adjacencies"] = serde_json::json!([
                    {"from": "b1", "to": "b3", "kind": "warp", "direction": "warp"}
                ]);
                wazir(v)["steps"] = serde_json::json!([[step, "warp"]]);
            })
        };
        assert!(portal("warp").is_ok());
        assert!(matches!(portal("wrap"), Err(ConfigError::UnknownStep { .. })));
    }
}
