//! Self-play between AI strategies.
//!
//! Plays independent games in parallel on a rayon pool. Each game gets its
//! own `SmallRng` seeded from the master seed and the game id, so a run is
//! reproducible regardless of thread count or scheduling. Seats rotate
//! between games so every strategy plays every team.

use std::collections::BTreeMap;
use std::io::Write;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::game::Game;
use crate::search::Strategy;

/// Errors from running a self-play batch.
#[derive(Debug, thiserror::Error)]
pub enum SelfPlayError {
    #[error("at least one strategy is required")]
    NoStrategies,

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration for a self-play batch.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Strategies seated in turn order, rotated by one seat per game.
    pub strategies: Vec<Strategy>,
    /// Starting position every game is cloned from.
    pub start: Game,
    /// Turns after which an unfinished game is a draw.
    pub max_turns: usize,
    /// Worker threads; 1 plays sequentially.
    pub threads: usize,
    /// Master seed (0 = draw one from entropy).
    pub seed: u64,
    /// Suppress per-game progress output.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            strategies: vec![Strategy::minmax(1), Strategy::Random],
            start: Game::standard(),
            max_turns: 200,
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

/// Outcome of one self-play game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub seed: u64,
    /// Team name to strategy name.
    pub seats: BTreeMap<String, String>,
    pub winner: Option<String>,
    pub winner_strategy: Option<String>,
    pub turns: usize,
    /// Moves as `start-end`; passes are `pass`.
    pub moves: Vec<String>,
    /// Teams in the order they were eliminated.
    pub eliminated: Vec<String>,
}

impl GameRecord {
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Seats for game `game_id`: the team at turn-order slot `t` plays
/// `strategies[(t + game_id) % n]`.
pub fn seats(start: &Game, strategies: &[Strategy], game_id: usize) -> BTreeMap<String, Strategy> {
    start
        .engine
        .turn_order()
        .iter()
        .enumerate()
        .map(|(t, team)| (team.clone(), strategies[(t + game_id) % strategies.len()]))
        .collect()
}

/// Plays one game to completion or `config.max_turns`.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, seed: u64) -> GameRecord {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut game = config.start.clone();
    let seating = seats(&game, &config.strategies, game_id);
    let mut moves = Vec::new();
    let mut eliminated = Vec::new();

    while game.turns < config.max_turns {
        let Some(team) = game.current_team().map(str::to_string) else {
            break;
        };
        let Some(strategy) = seating.get(&team) else {
            warn!(game_id, team = %team, "team has no seat");
            break;
        };
        let before = game.engine.turn_order().to_vec();
        match game.play_ai(strategy, &mut rng) {
            Ok(Some((start, end))) => moves.push(format!("{}-{}", start, end)),
            Ok(None) => moves.push("pass".to_string()),
            Err(e) => {
                warn!(game_id, "self-play stopped: {}", e);
                break;
            }
        }
        let after = game.engine.turn_order();
        eliminated.extend(before.into_iter().filter(|t| !after.contains(t)));
    }

    let winner = game.engine.winner().map(str::to_string);
    GameRecord {
        game_id,
        seed,
        winner_strategy: winner.as_ref().and_then(|w| seating.get(w)).map(|s| s.to_string()),
        seats: seating.iter().map(|(t, s)| (t.clone(), s.to_string())).collect(),
        winner,
        turns: game.turns,
        moves,
        eliminated,
    }
}

/// Per-game seed derived from the master seed.
fn game_seed(master: u64, game_id: usize) -> u64 {
    master.wrapping_add(game_id as u64)
}

/// Plays `config.num_games` games and returns their records ordered by id.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>, SelfPlayError> {
    use rayon::prelude::*;

    if config.strategies.is_empty() {
        return Err(SelfPlayError::NoStrategies);
    }
    let master = if config.seed != 0 {
        config.seed
    } else {
        SmallRng::from_entropy().gen()
    };

    let run_one = |i: usize| {
        let game_start = Instant::now();
        let record = play_game(config, i, game_seed(master, i));
        if !config.quiet {
            let outcome = match (&record.winner, &record.winner_strategy) {
                (Some(w), Some(s)) => format!("{} ({}) wins", w, s),
                (Some(w), None) => format!("{} wins", w),
                _ => "draw".to_string(),
            };
            eprintln!(
                "Game {}/{}: {} after {} turns ({:.1}s)",
                i + 1,
                config.num_games,
                outcome,
                record.turns,
                game_start.elapsed().as_secs_f64(),
            );
        }
        record
    };

    let mut games: Vec<GameRecord> = if config.threads > 1 {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(config.threads).build()?;
        pool.install(|| (0..config.num_games).into_par_iter().map(run_one).collect())
    } else {
        (0..config.num_games).map(run_one).collect()
    };
    games.sort_by_key(|g| g.game_id);
    info!(games = games.len(), master_seed = master, "self-play finished");
    Ok(games)
}

/// Writes one JSON object per game, one per line.
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> Result<(), SelfPlayError> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Aggregate results of a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub games: usize,
    pub draws: usize,
    pub wins_by_strategy: BTreeMap<String, usize>,
    pub wins_by_team: BTreeMap<String, usize>,
    pub avg_turns: f64,
}

impl Summary {
    /// Share of games won by `strategy`, in percent.
    pub fn win_rate(&self, strategy: &str) -> f64 {
        let wins = self.wins_by_strategy.get(strategy).copied().unwrap_or(0);
        100.0 * wins as f64 / self.games.max(1) as f64
    }
}

pub fn summarize(games: &[GameRecord]) -> Summary {
    let mut summary = Summary {
        games: games.len(),
        ..Summary::default()
    };
    let mut total_turns = 0usize;
    for game in games {
        total_turns += game.turns;
        match (&game.winner, &game.winner_strategy) {
            (Some(team), strategy) => {
                *summary.wins_by_team.entry(team.clone()).or_default() += 1;
                if let Some(s) = strategy {
                    *summary.wins_by_strategy.entry(s.clone()).or_default() += 1;
                }
            }
            (None, _) => summary.draws += 1,
        }
    }
    summary.avg_turns = total_turns as f64 / games.len().max(1) as f64;
    summary
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(games: &[GameRecord], strategies: &[Strategy]) {
    let summary = summarize(games);
    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", summary.games);
    eprintln!("Avg turns/game: {:.1}", summary.avg_turns);
    eprintln!("Draws: {}", summary.draws);
    eprintln!("Win rate by strategy:");
    let mut named: Vec<String> = strategies.iter().map(|s| s.to_string()).collect();
    named.dedup();
    for name in named {
        let wins = summary.wins_by_strategy.get(&name).copied().unwrap_or(0);
        eprintln!("  {:>20}: {} ({:.1}%)", name, wins, summary.win_rate(&name));
    }
    eprintln!("Wins by team:");
    for (team, wins) in &summary.wins_by_team {
        eprintln!("  {:>20}: {}", team, wins);
    }
}
