//! The rule engine.
//!
//! Owns the rule table, teams, promotion tiles, and live turn order of one
//! game. Boards are passed in by reference and never mutated by queries;
//! playing a move returns a new board.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::board::{BoardError, GraphBoard, LoseCondition, Piece, Position, Team};
use crate::movegen::{ally_set, moveset_destinations, CheckRule, Destination};
use crate::movement::{EvalContext, RuleSet, RuleTable};

/// Why a move request was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("no piece at {0}")]
    EmptySource(Position),

    #[error("{end} is not a legal destination from {start}")]
    IllegalDestination { start: Position, end: Position },

    #[error("piece at {position} does not belong to {team}, whose turn it is")]
    NotYourTurn { position: Position, team: String },

    #[error("no teams left in the turn order")]
    NoTeams,

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Engine switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Moved multi-team pieces use the intersection of their slots' allies.
    pub multiteam_capture_ally: bool,
}

/// Legal move generation, move application, and elimination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEngine {
    rules: RuleTable,
    teams: BTreeMap<String, Team>,
    promotion_tiles: BTreeMap<String, BTreeSet<Position>>,
    turn_order: Vec<String>,
    pub options: EngineOptions,
    /// Royal counts per team at setup, for `eliminate_any_royal`.
    initial_royals: BTreeMap<String, usize>,
    #[serde(skip)]
    check_rule: Option<Arc<dyn CheckRule>>,
}

impl RuleEngine {
    /// Creates an engine; the turn order follows the order of `teams`.
    pub fn new(rules: RuleTable, teams: Vec<Team>) -> Self {
        let turn_order = teams.iter().map(|t| t.name.clone()).collect();
        RuleEngine {
            rules,
            teams: teams.into_iter().map(|t| (t.name.clone(), t)).collect(),
            promotion_tiles: BTreeMap::new(),
            turn_order,
            options: EngineOptions::default(),
            initial_royals: BTreeMap::new(),
            check_rule: None,
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_turn_order(mut self, order: Vec<String>) -> Self {
        self.turn_order = order;
        self
    }

    pub fn with_promotion_tiles(mut self, team: &str, tiles: impl IntoIterator<Item = Position>) -> Self {
        self.promotion_tiles.entry(team.to_string()).or_default().extend(tiles);
        self
    }

    pub fn with_check_rule(mut self, rule: Arc<dyn CheckRule>) -> Self {
        self.check_rule = Some(rule);
        self
    }

    pub fn set_check_rule(&mut self, rule: Option<Arc<dyn CheckRule>>) {
        self.check_rule = rule;
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn rule(&self, piece_type: &str) -> Option<&RuleSet> {
        self.rules.get(piece_type)
    }

    pub fn points(&self, piece_type: &str) -> i32 {
        self.rules.get(piece_type).map_or(0, |r| r.points)
    }

    pub fn teams(&self) -> &BTreeMap<String, Team> {
        &self.teams
    }

    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.get(name)
    }

    pub fn turn_order(&self) -> &[String] {
        &self.turn_order
    }

    pub fn promotion_tiles(&self, team: &str) -> Option<&BTreeSet<Position>> {
        self.promotion_tiles.get(team)
    }

    /// The team to move on `board`, if any team is left.
    pub fn current_team<'a>(&'a self, board: &GraphBoard) -> Option<&'a str> {
        if self.turn_order.is_empty() {
            return None;
        }
        let i = board.current_team_index % self.turn_order.len();
        Some(self.turn_order[i].as_str())
    }

    /// One team (or none) left.
    pub fn is_finished(&self) -> bool {
        self.turn_order.len() <= 1
    }

    /// The last team standing.
    pub fn winner(&self) -> Option<&str> {
        match self.turn_order.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Creates a piece whose royal flag comes from its rule set.
    pub fn new_piece(&self, name: &str, team: &str, facing: &str) -> Piece {
        let royal = self.rules.get(name).is_some_and(|r| r.royal);
        Piece::new(name, team, facing).with_royal(royal)
    }

    /// Records each team's royal count as the baseline for
    /// `eliminate_any_royal`.
    pub fn record_royal_counts(&mut self, board: &GraphBoard) {
        self.initial_royals = self
            .teams
            .keys()
            .map(|t| (t.clone(), board.royal_tiles(t).len()))
            .collect();
    }

    pub fn initial_royals(&self, team: &str) -> usize {
        self.initial_royals.get(team).copied().unwrap_or(0)
    }

    pub(crate) fn context<'a>(
        &'a self,
        board: &'a GraphBoard,
        source: Position,
        target: Option<Position>,
        team: &'a str,
    ) -> EvalContext<'a> {
        EvalContext {
            board,
            source,
            target,
            team,
            teams: &self.teams,
            turn_order: &self.turn_order,
        }
    }

    /// Destinations for the piece at `position`, ignoring any check rule.
    pub fn pseudo_legal_destinations(&self, position: Position, board: &GraphBoard) -> Vec<Destination<'_>> {
        let mut out = Vec::new();
        let Some(piece) = board.piece(&position) else {
            return out;
        };
        let Some(rules) = self.rules.get(&piece.name) else {
            return out;
        };
        let ctx = self.context(board, position, None, piece.team());
        let allies = ally_set(piece, &self.teams, self.options.multiteam_capture_ally);
        for moveset in &rules.movesets {
            if !moveset.meets_requirement(&ctx) {
                continue;
            }
            let view = moveset.resolve(&ctx);
            moveset_destinations(board, position, piece, &view, &allies, &mut out);
        }
        out
    }

    /// Destinations for the piece at `position`, after check filtering.
    pub fn legal_destinations(&self, position: Position, board: &GraphBoard) -> Vec<Destination<'_>> {
        let mut out = self.pseudo_legal_destinations(position, board);
        let (Some(rule), Some(piece)) = (&self.check_rule, board.piece(&position)) else {
            return out;
        };
        out.retain(|d| {
            let mut sim = board.copy();
            if relocate(&mut sim, position, d.position, &d.facing).is_err() {
                return false;
            }
            !piece.teams().iter().any(|t| rule.in_check(self, &sim, t))
        });
        out
    }

    /// `(destination, facing)` pairs for the piece at `position`.
    ///
    /// Empty for empty or missing tiles and unknown piece types.
    pub fn get_legal_moves(&self, position: Position, board: &GraphBoard) -> Vec<(Position, String)> {
        self.legal_destinations(position, board)
            .into_iter()
            .map(|d| (d.position, d.facing))
            .collect()
    }

    /// `(start, end)` pairs for every piece listing `team`.
    pub fn get_all_legal_moves(&self, team: &str, board: &GraphBoard) -> Vec<(Position, Position)> {
        let mut moves = Vec::new();
        for start in board.team_pieces(team) {
            let mut ends: Vec<Position> = Vec::new();
            for d in self.legal_destinations(start, board) {
                if !ends.contains(&d.position) {
                    ends.push(d.position);
                }
            }
            moves.extend(ends.into_iter().map(|end| (start, end)));
        }
        moves
    }

    /// Plays a move, returning the new board.
    ///
    /// The input board is never modified. With `allow_illegal` the
    /// destination need not be legal, but the piece must still belong to the
    /// team to move.
    pub fn try_play_move(
        &self,
        board: &GraphBoard,
        start: Position,
        end: Position,
        allow_illegal: bool,
    ) -> Result<GraphBoard, MoveError> {
        let team = self.current_team(board).ok_or(MoveError::NoTeams)?.to_string();
        let piece = board.piece(&start).ok_or(MoveError::EmptySource(start))?;
        if !board.contains(&end) {
            return Err(BoardError::NotFound(end).into());
        }

        let legal = self.legal_destinations(start, board);
        let chosen = legal.iter().find(|d| d.position == end);
        if chosen.is_none() && !allow_illegal {
            return Err(MoveError::IllegalDestination { start, end });
        }
        if !piece.belongs_to(&team) {
            return Err(MoveError::NotYourTurn { position: start, team });
        }

        let facing = chosen.map_or_else(|| piece.facing.clone(), |d| d.facing.clone());
        let mover_teams = piece.teams().to_vec();
        let mut next = board.copy();
        if let Some(captured) = relocate(&mut next, start, end, &facing)? {
            debug!(at = %end, piece = %captured.name, team = %captured.team(), "capture");
        }

        if let Some(d) = chosen {
            for mutator in d.mutators {
                mutator.apply(&mut next, start, end, &team, &self.teams, &self.turn_order)?;
            }
        }

        self.promote(&mut next, end, &mover_teams)?;
        next.current_team_index = (board.current_team_index + 1) % self.turn_order.len();
        Ok(next)
    }

    /// Plays a move, or logs why it was refused and returns a copy of the
    /// unchanged board.
    pub fn play_move(&self, board: &GraphBoard, start: Position, end: Position, allow_illegal: bool) -> GraphBoard {
        match self.try_play_move(board, start, end, allow_illegal) {
            Ok(next) => next,
            Err(e) => {
                warn!(%start, %end, "move refused: {}", e);
                board.copy()
            }
        }
    }

    /// Promotes the piece at `end` if its type promotes and `end` is a
    /// promotion tile of one of `mover_teams`.
    fn promote(&self, board: &mut GraphBoard, end: Position, mover_teams: &[String]) -> Result<(), BoardError> {
        let Some(piece) = board.piece(&end) else {
            return Ok(());
        };
        let Some(target) = self.rules.get(&piece.name).and_then(|r| r.promotion.clone()) else {
            return Ok(());
        };
        let on_promotion_tile = mover_teams
            .iter()
            .any(|t| self.promotion_tiles.get(t).is_some_and(|tiles| tiles.contains(&end)));
        if on_promotion_tile {
            debug!(at = %end, from = %piece.name, to = %target, "promotion");
            board.update_piece(end, |p| p.name = target)?;
        }
        Ok(())
    }

    /// Whether `team` meets its lose condition on `board`.
    pub fn has_lost(&self, team: &str, board: &GraphBoard) -> bool {
        if board.team_pieces(team).is_empty() {
            return true;
        }
        let royals = board.royal_tiles(team).len();
        match self.teams.get(team).map(|t| t.lose_condition).unwrap_or_default() {
            LoseCondition::EliminateRoyals => royals == 0,
            LoseCondition::EliminateAnyRoyal => royals < self.initial_royals(team),
            LoseCondition::NoPieces => false,
        }
    }

    /// Removes every team that has lost from the turn order and keeps
    /// `board.current_team_index` on the same team where possible.
    ///
    /// Returns the eliminated teams in turn order.
    pub fn eliminate_teams(&mut self, board: &mut GraphBoard) -> Vec<String> {
        let eliminated: Vec<String> = self
            .turn_order
            .iter()
            .filter(|t| self.has_lost(t, board))
            .cloned()
            .collect();
        if eliminated.is_empty() {
            return eliminated;
        }

        let index = board.current_team_index;
        let removed_before = self.turn_order[..index.min(self.turn_order.len())]
            .iter()
            .filter(|t| eliminated.contains(t))
            .count();
        self.turn_order.retain(|t| !eliminated.contains(t));
        for team in &eliminated {
            info!(team = %team, remaining = self.turn_order.len(), "team eliminated");
        }

        board.current_team_index = match self.turn_order.len() {
            0 => 0,
            n => (index - removed_before) % n,
        };
        eliminated
    }

    /// Passes the turn without moving.
    pub fn pass_turn(&self, board: &mut GraphBoard) {
        if !self.turn_order.is_empty() {
            board.current_team_index = (board.current_team_index + 1) % self.turn_order.len();
        }
    }

    /// Checks that the turn index fits the turn order.
    pub fn validate_turn(&self, board: &GraphBoard) -> Result<(), BoardError> {
        let len = self.turn_order.len();
        if (len == 0 && board.current_team_index != 0) || (len > 0 && board.current_team_index >= len) {
            return Err(BoardError::TurnIndexOutOfRange {
                index: board.current_team_index,
                len,
            });
        }
        Ok(())
    }
}

/// Moves the piece at `start` to `end` with the given facing, marking it as
/// moved. Returns the captured piece, if any.
fn relocate(board: &mut GraphBoard, start: Position, end: Position, facing: &str) -> Result<Option<Piece>, BoardError> {
    let Some(mut piece) = board.take_piece(start)? else {
        return Ok(None);
    };
    piece.has_moved = true;
    piece.facing = facing.to_string();
    board.set_piece(end, Some(piece))
}
