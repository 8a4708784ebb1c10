//! Move selection for AI players.
//!
//! The `minmax` family is a greedy lookahead: every side in the simulated
//! continuation picks its own best reply with a shallower search, and the
//! material deltas along that single line are summed from the mover's
//! side. It never branches over replies.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::strategy::Strategy;
use crate::board::{GraphBoard, Position};
use crate::engine::RuleEngine;
use crate::eval::{accumulate, aggregate, get_move_score, ScoreDelta};

/// Scores closer than this count as tied.
const TIE_EPSILON: f64 = 1e-9;

/// Picks a move for the team to move, or `None` when it has no legal move
/// or no team is left.
pub fn ai_select<R: Rng + ?Sized>(
    engine: &RuleEngine,
    board: &GraphBoard,
    strategy: &Strategy,
    rng: &mut R,
) -> Option<(Position, Position)> {
    let team = engine.current_team(board)?;
    let moves = engine.get_all_legal_moves(team, board);
    if moves.is_empty() {
        return None;
    }

    match *strategy {
        Strategy::Random => moves.choose(rng).copied(),
        Strategy::Minmax { depth, .. } => {
            let scores: Vec<f64> = moves
                .iter()
                .map(|&(start, end)| {
                    if depth == 0 {
                        aggregate(engine, &get_move_score(engine, board, start, end), team)
                    } else {
                        let line = simulate_line(engine, board, start, end, strategy, rng);
                        aggregate(engine, &line, team)
                    }
                })
                .collect();
            let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let tied: Vec<(Position, Position)> = moves
                .iter()
                .zip(&scores)
                .filter(|&(_, &s)| (s - best).abs() < TIE_EPSILON)
                .map(|(&m, _)| m)
                .collect();
            let choice = tied.choose(rng).copied();
            debug!(
                team,
                %strategy,
                candidates = moves.len(),
                tied = tied.len(),
                best,
                "selected move"
            );
            choice
        }
    }
}

/// Plays the move `ai_select` picks and returns the new board.
///
/// A team with no legal move passes.
pub fn ai_play<R: Rng + ?Sized>(
    engine: &RuleEngine,
    board: &GraphBoard,
    strategy: &Strategy,
    rng: &mut R,
) -> GraphBoard {
    match ai_select(engine, board, strategy, rng) {
        Some((start, end)) => engine.play_move(board, start, end, false),
        None => {
            let mut next = board.copy();
            engine.pass_turn(&mut next);
            next
        }
    }
}

/// Plays `start -> end` on a copy, then `depth` more turns where each side
/// answers with the reply strategy, and returns the weighted sum of the
/// material deltas along the way.
fn simulate_line<R: Rng + ?Sized>(
    engine: &RuleEngine,
    board: &GraphBoard,
    start: Position,
    end: Position,
    strategy: &Strategy,
    rng: &mut R,
) -> ScoreDelta {
    let Strategy::Minmax { depth, weighting, .. } = *strategy else {
        return ScoreDelta::new();
    };
    let Some(reply) = strategy.reply() else {
        return ScoreDelta::new();
    };

    let mut total = ScoreDelta::new();
    accumulate(&mut total, &get_move_score(engine, board, start, end), weighting.weight(0));

    let mut sim_engine = engine.clone();
    let Ok(mut sim) = sim_engine.try_play_move(board, start, end, false) else {
        return total;
    };
    sim_engine.eliminate_teams(&mut sim);

    for ply in 1..=depth as usize {
        if sim_engine.is_finished() {
            break;
        }
        let Some((s, e)) = ai_select(&sim_engine, &sim, &reply, rng) else {
            sim_engine.pass_turn(&mut sim);
            continue;
        };
        accumulate(&mut total, &get_move_score(&sim_engine, &sim, s, e), weighting.weight(ply));
        match sim_engine.try_play_move(&sim, s, e, false) {
            Ok(next) => sim = next,
            Err(_) => break,
        }
        sim_engine.eliminate_teams(&mut sim);
    }
    total
}
