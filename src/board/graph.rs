//! Graph board: an arena of tile nodes keyed by position.
//!
//! Each node owns its tile and an adjacency table
//! `kind -> direction -> [neighbor]`. Neighbors are position keys into the
//! same arena, never references, so there is no ownership cycle. Adjacency
//! tables and the direction graph sit behind `Arc` and are shared by every
//! copy of the board; only tile and piece content is duplicated.
//!
//! The board also keeps `royal_tiles`, an incrementally maintained index of
//! where each team's royal pieces stand. Every tile mutation goes through
//! `update_tile`, which keeps the index equal to a full scan.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::direction::DirectionGraph;
use super::piece::{Piece, MAX_TEAM_SLOTS};
use super::position::Position;
use super::tile::Tile;

/// Errors raised by board construction and lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("no node at position {0}")]
    NotFound(Position),

    #[error("invalid topology reference: {0}")]
    InvalidTopologyReference(String),

    #[error("royal index for team '{team}' is {recorded:?}, board holds {actual:?}")]
    RoyalIndexMismatch {
        team: String,
        recorded: Vec<Position>,
        actual: Vec<Position>,
    },

    #[error("piece at {0} has an invalid team list")]
    InvalidPieceTeams(Position),

    #[error("current team index {index} out of range for {len} teams")]
    TurnIndexOutOfRange { index: usize, len: usize },
}

/// One outgoing edge: where a step lands and how the mover turns on arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub position: Position,
    /// Relative direction applied to the mover's heading on arrival.
    pub reorientation: String,
}

/// Per-node adjacency: `kind -> direction -> neighbors` in registration order.
pub type AdjacencyTable = BTreeMap<String, BTreeMap<String, Vec<Neighbor>>>;

/// A board node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileNode {
    position: Position,
    tile: Tile,
    adjacencies: Arc<AdjacencyTable>,
}

impl TileNode {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn tile(&self) -> &Tile {
        &self.tile
    }

    pub fn adjacencies(&self) -> &AdjacencyTable {
        &self.adjacencies
    }
}

/// A board as a directed graph of tiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphBoard {
    directions: Arc<DirectionGraph>,
    #[serde(with = "node_list")]
    nodes: BTreeMap<Position, TileNode>,
    royal_tiles: BTreeMap<String, Vec<Position>>,
    /// Index into the engine's turn order of the team to move.
    pub current_team_index: usize,
}

impl GraphBoard {
    /// Creates an empty board over the given direction topology.
    pub fn new(directions: DirectionGraph) -> Self {
        GraphBoard {
            directions: Arc::new(directions),
            nodes: BTreeMap::new(),
            royal_tiles: BTreeMap::new(),
            current_team_index: 0,
        }
    }

    pub fn directions(&self) -> &DirectionGraph {
        &self.directions
    }

    /// Adds a node, or replaces the tile of an existing one.
    pub fn add_node(&mut self, position: Position, tile: Tile) {
        let node = self.nodes.entry(position).or_insert_with(|| TileNode {
            position,
            tile: Tile::default(),
            adjacencies: Arc::new(AdjacencyTable::new()),
        });
        unindex_royals(&mut self.royal_tiles, position, &node.tile);
        node.tile = tile;
        index_royals(&mut self.royal_tiles, position, &node.tile);
    }

    /// Builder edge: `from -> to` with no reorientation, skipped unless
    /// both ends exist.
    pub(crate) fn link(&mut self, from: Position, to: Position, kind: &str, direction: &str) {
        if !self.nodes.contains_key(&to) {
            return;
        }
        if let Some(node) = self.nodes.get_mut(&from) {
            Arc::make_mut(&mut node.adjacencies)
                .entry(kind.to_string())
                .or_default()
                .entry(direction.to_string())
                .or_default()
                .push(Neighbor {
                    position: to,
                    reorientation: "f".to_string(),
                });
        }
    }

    /// Adds a directed edge `from -> to` under `kind` and `direction`.
    ///
    /// The reverse edge is not implied. `reorientation` must be a relative
    /// direction of the board's topology (`"f"` for none).
    pub fn add_adjacency(
        &mut self,
        from: Position,
        to: Position,
        kind: &str,
        direction: &str,
        reorientation: &str,
    ) -> Result<(), BoardError> {
        if !self.nodes.contains_key(&to) {
            return Err(BoardError::NotFound(to));
        }
        if !self.directions.is_relative(reorientation) {
            return Err(BoardError::InvalidTopologyReference(format!(
                "reorientation '{}' is not a relative direction",
                reorientation
            )));
        }
        let node = self.nodes.get_mut(&from).ok_or(BoardError::NotFound(from))?;
        Arc::make_mut(&mut node.adjacencies)
            .entry(kind.to_string())
            .or_default()
            .entry(direction.to_string())
            .or_default()
            .push(Neighbor {
                position: to,
                reorientation: reorientation.to_string(),
            });
        Ok(())
    }

    /// Removes every `from -> to` edge registered under `kind` and `direction`.
    pub fn remove_adjacency(
        &mut self,
        from: Position,
        to: Position,
        kind: &str,
        direction: &str,
    ) -> Result<(), BoardError> {
        let node = self.nodes.get_mut(&from).ok_or(BoardError::NotFound(from))?;
        let table = Arc::make_mut(&mut node.adjacencies);
        if let Some(dirs) = table.get_mut(kind) {
            if let Some(list) = dirs.get_mut(direction) {
                list.retain(|n| n.position != to);
                if list.is_empty() {
                    dirs.remove(direction);
                }
            }
        }
        Ok(())
    }

    /// Removes a node and every edge leading to it, returning its tile.
    pub fn remove_node(&mut self, position: Position) -> Result<Tile, BoardError> {
        self.take_piece(position)?;
        let node = self.nodes.remove(&position).ok_or(BoardError::NotFound(position))?;
        for other in self.nodes.values_mut() {
            let points_here = other
                .adjacencies
                .values()
                .flat_map(|dirs| dirs.values())
                .any(|list| list.iter().any(|n| n.position == position));
            if !points_here {
                continue;
            }
            let table = Arc::make_mut(&mut other.adjacencies);
            for dirs in table.values_mut() {
                for list in dirs.values_mut() {
                    list.retain(|n| n.position != position);
                }
                dirs.retain(|_, list| !list.is_empty());
            }
        }
        Ok(node.tile)
    }

    /// Returns the adjacency map of a node for one kind.
    pub fn adjacency(&self, position: &Position, kind: &str) -> Option<&BTreeMap<String, Vec<Neighbor>>> {
        self.nodes.get(position)?.adjacencies.get(kind)
    }

    /// Neighbors reached from `position` by `kind` in absolute `direction`.
    pub fn neighbors(&self, position: &Position, kind: &str, direction: &str) -> &[Neighbor] {
        self.adjacency(position, kind)
            .and_then(|dirs| dirs.get(direction))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn node(&self, position: &Position) -> Result<&TileNode, BoardError> {
        self.nodes.get(position).ok_or(BoardError::NotFound(*position))
    }

    pub fn contains(&self, position: &Position) -> bool {
        self.nodes.contains_key(position)
    }

    pub fn tile(&self, position: &Position) -> Option<&Tile> {
        self.nodes.get(position).map(|n| &n.tile)
    }

    pub fn piece(&self, position: &Position) -> Option<&Piece> {
        self.tile(position)?.piece.as_ref()
    }

    /// All node positions in ascending order.
    pub fn positions(&self) -> impl Iterator<Item = &Position> + '_ {
        self.nodes.keys()
    }

    /// All nodes in ascending position order.
    pub fn nodes(&self) -> impl Iterator<Item = &TileNode> + '_ {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Applies `f` to a tile, keeping the royal index consistent.
    ///
    /// This is the single mutation path for tile content.
    pub fn update_tile<F>(&mut self, position: Position, f: F) -> Result<(), BoardError>
    where
        F: FnOnce(&mut Tile),
    {
        let node = self.nodes.get_mut(&position).ok_or(BoardError::NotFound(position))?;
        unindex_royals(&mut self.royal_tiles, position, &node.tile);
        f(&mut node.tile);
        index_royals(&mut self.royal_tiles, position, &node.tile);
        Ok(())
    }

    /// Replaces a whole tile, returning the previous one.
    pub fn set_tile(&mut self, position: Position, tile: Tile) -> Result<Tile, BoardError> {
        let mut old = None;
        self.update_tile(position, |t| old = Some(std::mem::replace(t, tile)))?;
        Ok(old.unwrap_or_default())
    }

    /// Places (or clears) the piece on a tile, returning the displaced piece.
    pub fn set_piece(&mut self, position: Position, piece: Option<Piece>) -> Result<Option<Piece>, BoardError> {
        let mut old = None;
        self.update_tile(position, |t| old = std::mem::replace(&mut t.piece, piece))?;
        Ok(old)
    }

    /// Removes and returns the piece on a tile.
    pub fn take_piece(&mut self, position: Position) -> Result<Option<Piece>, BoardError> {
        self.set_piece(position, None)
    }

    /// Applies `f` to the piece on a tile, if any.
    pub fn update_piece<F>(&mut self, position: Position, f: F) -> Result<(), BoardError>
    where
        F: FnOnce(&mut Piece),
    {
        self.update_tile(position, |t| {
            if let Some(p) = t.piece.as_mut() {
                f(p);
            }
        })
    }

    /// Positions of a team's royal pieces.
    pub fn royal_tiles(&self, team: &str) -> &[Position] {
        self.royal_tiles.get(team).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The whole royal index.
    pub fn royal_index(&self) -> &BTreeMap<String, Vec<Position>> {
        &self.royal_tiles
    }

    /// Positions of every piece that lists `team` among its slots.
    pub fn team_pieces(&self, team: &str) -> Vec<Position> {
        self.nodes
            .values()
            .filter(|n| n.tile.piece.as_ref().is_some_and(|p| p.belongs_to(team)))
            .map(|n| n.position)
            .collect()
    }

    /// Copies tile and piece content; topology stays shared.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Whether two boards share the same topology allocation.
    pub fn shares_topology_with(&self, other: &GraphBoard) -> bool {
        Arc::ptr_eq(&self.directions, &other.directions)
            && self.nodes.iter().all(|(pos, node)| {
                other
                    .nodes
                    .get(pos)
                    .is_some_and(|o| Arc::ptr_eq(&node.adjacencies, &o.adjacencies))
            })
    }

    /// Checks structural invariants: piece team lists, neighbor targets,
    /// and royal index consistency.
    pub fn validate(&self) -> Result<(), BoardError> {
        let mut scan: BTreeMap<String, BTreeSet<Position>> = BTreeMap::new();
        for node in self.nodes.values() {
            for dirs in node.adjacencies.values() {
                for list in dirs.values() {
                    if let Some(missing) = list.iter().find(|n| !self.nodes.contains_key(&n.position)) {
                        return Err(BoardError::InvalidTopologyReference(format!(
                            "{} links to missing node {}",
                            node.position, missing.position
                        )));
                    }
                }
            }
            let Some(piece) = node.tile.piece.as_ref() else {
                continue;
            };
            let teams = piece.teams();
            let unique: BTreeSet<&String> = teams.iter().collect();
            if teams.is_empty() || teams.len() > MAX_TEAM_SLOTS || unique.len() != teams.len() {
                return Err(BoardError::InvalidPieceTeams(node.position));
            }
            if piece.is_royal() {
                for team in teams {
                    scan.entry(team.clone()).or_default().insert(node.position);
                }
            }
        }

        let teams: BTreeSet<&String> = scan.keys().chain(self.royal_tiles.keys()).collect();
        for team in teams {
            let recorded: BTreeSet<Position> = self.royal_tiles(team).iter().copied().collect();
            let actual = scan.get(team).cloned().unwrap_or_default();
            if recorded != actual || recorded.len() != self.royal_tiles(team).len() {
                return Err(BoardError::RoyalIndexMismatch {
                    team: team.clone(),
                    recorded: self.royal_tiles(team).to_vec(),
                    actual: actual.into_iter().collect(),
                });
            }
        }
        Ok(())
    }
}

fn royal_teams(tile: &Tile) -> &[String] {
    match tile.piece.as_ref().filter(|p| p.is_royal()) {
        Some(piece) => piece.teams(),
        None => &[],
    }
}

fn unindex_royals(index: &mut BTreeMap<String, Vec<Position>>, position: Position, tile: &Tile) {
    for team in royal_teams(tile) {
        if let Some(list) = index.get_mut(team) {
            list.retain(|p| *p != position);
        }
    }
}

fn index_royals(index: &mut BTreeMap<String, Vec<Position>>, position: Position, tile: &Tile) {
    for team in royal_teams(tile) {
        index.entry(team.clone()).or_default().push(position);
    }
}

/// Nodes are stored as a list; positions are not valid JSON map keys.
mod node_list {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Position, TileNode};

    pub fn serialize<S: Serializer>(nodes: &BTreeMap<Position, TileNode>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(nodes.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<Position, TileNode>, D::Error> {
        let list = Vec::<TileNode>::deserialize(d)?;
        let mut nodes = BTreeMap::new();
        for node in list {
            if nodes.insert(node.position, node).is_some() {
                return Err(serde::de::Error::custom("duplicate node position"));
            }
        }
        Ok(nodes)
    }
}
