//! Game driver.
//!
//! Pairs a rule engine with its board and runs the turn cycle: a move is
//! played, losing teams are eliminated, and the game ends when one team (or
//! none) is left. Games serialize to JSON and are re-validated on load.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::presets::{glinski_board, hex_cell, standard_board};
use crate::board::{BoardError, GraphBoard, Position, Team};
use crate::engine::{MoveError, RuleEngine};
use crate::movement::presets::{GLINSKI, STANDARD};
use crate::search::{ai_select, Strategy};

/// Errors from driving or loading a game.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("the game is over")]
    Finished,

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("invalid game snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the turn cycle stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameState {
    AwaitingMove(String),
    /// `winner` is `None` when every team was eliminated at once.
    Finished { winner: Option<String> },
}

/// One game in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub engine: RuleEngine,
    pub board: GraphBoard,
    /// Turns taken so far, passes included.
    pub turns: usize,
}

impl Game {
    /// Starts a game on `board`, recording each team's royal count.
    ///
    /// Teams that have already lost are eliminated before the first move.
    pub fn new(mut engine: RuleEngine, mut board: GraphBoard) -> Self {
        engine.record_royal_counts(&board);
        let eliminated = engine.eliminate_teams(&mut board);
        if !eliminated.is_empty() {
            info!(?eliminated, "teams lost at setup");
        }
        Game { engine, board, turns: 0 }
    }

    /// Standard chess, white to move.
    pub fn standard() -> Self {
        let engine = RuleEngine::new(STANDARD.clone(), vec![Team::new("white"), Team::new("black")])
            .with_promotion_tiles("white", (0..8).map(|c| Position::grid(7, c)))
            .with_promotion_tiles("black", (0..8).map(|c| Position::grid(0, c)));
        Game::new(engine, standard_board("white", "black"))
    }

    /// Glinski's hexagonal chess. Pawns promote on the far end of each file.
    pub fn glinski() -> Self {
        const RADIUS: i32 = 5;
        let engine = RuleEngine::new(GLINSKI.clone(), vec![Team::new("white"), Team::new("black")])
            .with_promotion_tiles("white", (-RADIUS..=RADIUS).map(|q| hex_cell(RADIUS, q, 1, true)))
            .with_promotion_tiles("black", (-RADIUS..=RADIUS).map(|q| hex_cell(RADIUS, q, 1, false)));
        Game::new(engine, glinski_board("white", "black"))
    }

    pub fn state(&self) -> GameState {
        if self.engine.is_finished() {
            return GameState::Finished {
                winner: self.engine.winner().map(str::to_string),
            };
        }
        match self.engine.current_team(&self.board) {
            Some(team) => GameState::AwaitingMove(team.to_string()),
            None => GameState::Finished { winner: None },
        }
    }

    pub fn current_team(&self) -> Option<&str> {
        if self.engine.is_finished() {
            return None;
        }
        self.engine.current_team(&self.board)
    }

    /// `(destination, facing)` pairs for the piece at `position`.
    pub fn legal_moves(&self, position: Position) -> Vec<(Position, String)> {
        self.engine.get_legal_moves(position, &self.board)
    }

    /// Plays a move for the team to move and runs elimination.
    ///
    /// Returns the teams eliminated by the move. On error nothing changes.
    pub fn play(&mut self, start: Position, end: Position) -> Result<Vec<String>, GameError> {
        if self.engine.is_finished() {
            return Err(GameError::Finished);
        }
        self.board = self.engine.try_play_move(&self.board, start, end, false)?;
        Ok(self.end_turn())
    }

    /// Passes the turn of a team that cannot move and runs elimination.
    pub fn pass(&mut self) -> Result<Vec<String>, GameError> {
        if self.engine.is_finished() {
            return Err(GameError::Finished);
        }
        self.engine.pass_turn(&mut self.board);
        Ok(self.end_turn())
    }

    /// Lets `strategy` move for the team to move, passing when it has no
    /// legal move. Returns the move played.
    pub fn play_ai<R: Rng + ?Sized>(
        &mut self,
        strategy: &Strategy,
        rng: &mut R,
    ) -> Result<Option<(Position, Position)>, GameError> {
        if self.engine.is_finished() {
            return Err(GameError::Finished);
        }
        match ai_select(&self.engine, &self.board, strategy, rng) {
            Some((start, end)) => {
                self.play(start, end)?;
                Ok(Some((start, end)))
            }
            None => {
                self.pass()?;
                Ok(None)
            }
        }
    }

    fn end_turn(&mut self) -> Vec<String> {
        self.turns += 1;
        let eliminated = self.engine.eliminate_teams(&mut self.board);
        if self.engine.is_finished() {
            info!(winner = ?self.engine.winner(), turns = self.turns, "game over");
        }
        eliminated
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Loads a snapshot, rejecting a corrupted royal index or turn index.
    ///
    /// Check rules are not part of a snapshot and must be reinstalled.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let game: Game = serde_json::from_str(json)?;
        game.board.validate()?;
        game.engine.validate_turn(&game.board)?;
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::presets::rectangular_grid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn standard_game_starts_with_white() {
        let game = Game::standard();
        assert_eq!(game.state(), GameState::AwaitingMove("white".into()));
        assert_eq!(game.engine.initial_royals("white"), 1);
        assert_eq!(game.legal_moves(Position::grid(1, 4)).len(), 2);
    }

    #[test]
    fn illegal_moves_leave_the_game_untouched() {
        let mut game = Game::standard();
        let err = game.play(Position::grid(1, 4), Position::grid(4, 4));
        assert!(matches!(err, Err(GameError::Move(MoveError::IllegalDestination { .. }))));
        assert_eq!(game.turns, 0);
        assert_eq!(game.current_team(), Some("white"));
    }

    #[test]
    fn capturing_the_last_king_finishes() {
        let mut game = Game::standard();
        // Open lines from d1 to e8.
        let mut board = game.board.copy();
        board.take_piece(Position::grid(7, 5)).unwrap();
        board.take_piece(Position::grid(6, 5)).unwrap();
        board.take_piece(Position::grid(1, 4)).unwrap();
        game.board = board;
        game.play(Position::grid(0, 3), Position::grid(4, 7)).unwrap();
        game.play(Position::grid(6, 0), Position::grid(5, 0)).unwrap();
        let eliminated = game.play(Position::grid(4, 7), Position::grid(7, 4)).unwrap();
        assert_eq!(eliminated, vec!["black".to_string()]);
        assert_eq!(game.state(), GameState::Finished { winner: Some("white".into()) });
        assert!(matches!(game.pass(), Err(GameError::Finished)));
    }

    #[test]
    fn snapshot_round_trip() {
        let mut game = Game::standard();
        game.play(Position::grid(1, 4), Position::grid(3, 4)).unwrap();
        let json = game.to_json().unwrap();
        let loaded = Game::from_json(&json).unwrap();
        assert_eq!(loaded.turns, 1);
        assert_eq!(loaded.current_team(), Some("black"));
        assert_eq!(loaded.board.piece(&Position::grid(3, 4)).unwrap().name, "pawn");
        assert_eq!(loaded.engine.get_all_legal_moves("black", &loaded.board).len(), 20);
    }

    #[test]
    fn corrupted_snapshots_are_rejected() {
        let game = Game::standard();
        let mut value: serde_json::Value = serde_json::from_str(&game.to_json().unwrap()).unwrap();
        value["board"]["current_team_index"] = 5.into();
        let err = Game::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, GameError::Board(BoardError::TurnIndexOutOfRange { .. })));

        let mut value: serde_json::Value = serde_json::from_str(&game.to_json().unwrap()).unwrap();
        value["board"]["royal_tiles"]["white"] = serde_json::json!([]);
        let err = Game::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, GameError::Board(BoardError::RoyalIndexMismatch { .. })));

        assert!(matches!(Game::from_json("{"), Err(GameError::Json(_))));
    }

    #[test]
    fn glinski_promotion_tiles_cover_every_file() {
        let game = Game::glinski();
        assert_eq!(game.engine.promotion_tiles("white").unwrap().len(), 11);
        assert_eq!(game.engine.promotion_tiles("black").unwrap().len(), 11);
        // The centre pawn is blocked after one step; a flank pawn has two.
        assert_eq!(game.legal_moves(hex_cell(5, 0, 5, false)).len(), 1);
        assert_eq!(game.legal_moves(hex_cell(5, -3, 2, false)).len(), 2);
    }

    fn lone_kings() -> (RuleEngine, GraphBoard) {
        let engine = RuleEngine::new(STANDARD.clone(), vec![Team::new("white"), Team::new("black")]);
        let mut board = rectangular_grid(3, 3);
        board.set_piece(Position::grid(0, 0), Some(engine.new_piece("king", "white", "n"))).unwrap();
        board.set_piece(Position::grid(2, 2), Some(engine.new_piece("rook", "black", "s"))).unwrap();
        (engine, board)
    }

    #[test]
    fn teams_without_royals_lose_at_setup() {
        let (engine, board) = lone_kings();
        let game = Game::new(engine, board);
        assert_eq!(game.engine.turn_order(), &["white".to_string()]);
        assert_eq!(game.state(), GameState::Finished { winner: Some("white".into()) });
        assert_eq!(game.turns, 0);
    }

    #[test]
    fn passing_runs_elimination() {
        let (engine, mut board) = lone_kings();
        board.set_piece(Position::grid(2, 0), Some(engine.new_piece("king", "black", "s"))).unwrap();
        let mut game = Game::new(engine, board);
        assert_eq!(game.state(), GameState::AwaitingMove("white".into()));

        game.board.take_piece(Position::grid(2, 0)).unwrap();
        assert_eq!(game.pass().unwrap(), vec!["black".to_string()]);
        assert_eq!(game.turns, 1);
        assert_eq!(game.state(), GameState::Finished { winner: Some("white".into()) });
    }

    #[test]
    fn ai_games_advance() {
        let mut game = Game::standard();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..6 {
            game.play_ai(&Strategy::Random, &mut rng).unwrap();
        }
        assert_eq!(game.turns, 6);
        assert_eq!(game.current_team(), Some("white"));
    }
}
