//! Material deltas.
//!
//! A move is scored as per-team point changes: a capture costs every team
//! of the victim its point value, and a promotion gives every team of the
//! mover the difference between the promoted type and the piece's own.

use std::collections::BTreeMap;

use crate::board::{GraphBoard, Position};
use crate::engine::RuleEngine;

/// Point change per team.
pub type ScoreDelta = BTreeMap<String, f64>;

/// Scores moving the piece at `start` to `end` on `board`.
pub fn get_move_score(engine: &RuleEngine, board: &GraphBoard, start: Position, end: Position) -> ScoreDelta {
    let mut delta = ScoreDelta::new();
    if let Some(victim) = board.piece(&end) {
        let points = f64::from(engine.points(&victim.name));
        for team in victim.teams() {
            *delta.entry(team.clone()).or_default() -= points;
        }
    }

    let Some(mover) = board.piece(&start) else {
        return delta;
    };
    let Some(target) = engine.rule(&mover.name).and_then(|r| r.promotion.as_deref()) else {
        return delta;
    };
    let promotes = mover
        .teams()
        .iter()
        .any(|t| engine.promotion_tiles(t).is_some_and(|tiles| tiles.contains(&end)));
    if promotes {
        let gain = f64::from(engine.points(target) - engine.points(&mover.name));
        for team in mover.teams() {
            *delta.entry(team.clone()).or_default() += gain;
        }
    }
    delta
}

/// Collapses a delta into one number from `perspective`'s side: allies
/// count for, everyone else against.
pub fn aggregate(engine: &RuleEngine, delta: &ScoreDelta, perspective: &str) -> f64 {
    let is_ally = |team: &str| match engine.team(perspective) {
        Some(p) => p.is_ally(team),
        None => team == perspective,
    };
    delta
        .iter()
        .map(|(team, d)| if is_ally(team) { *d } else { -*d })
        .sum()
}

/// Adds `weight * other` into `acc`.
pub fn accumulate(acc: &mut ScoreDelta, other: &ScoreDelta, weight: f64) {
    for (team, d) in other {
        *acc.entry(team.clone()).or_default() += weight * d;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::presets::rectangular_grid;
    use crate::board::Team;
    use crate::movement::presets::STANDARD;

    fn engine() -> RuleEngine {
        RuleEngine::new(
            STANDARD.clone(),
            vec![Team::new("white").with_ally("green"), Team::new("black"), Team::new("green")],
        )
        .with_promotion_tiles("white", [Position::grid(7, 0)])
    }

    #[test]
    fn capture_costs_every_victim_team() {
        let engine = engine();
        let mut board = rectangular_grid(8, 8);
        board.set_piece(Position::grid(0, 0), Some(engine.new_piece("rook", "white", "n"))).unwrap();
        board
            .set_piece(Position::grid(5, 0), Some(engine.new_piece("knight", "black", "s").with_team("green")))
            .unwrap();
        let delta = get_move_score(&engine, &board, Position::grid(0, 0), Position::grid(5, 0));
        assert_eq!(delta.get("black"), Some(&-30.0));
        assert_eq!(delta.get("green"), Some(&-30.0));
        assert_eq!(delta.get("white"), None);
        // Green is white's ally, so its loss offsets black's.
        assert_eq!(aggregate(&engine, &delta, "white"), 0.0);
        let solo = ScoreDelta::from([("black".to_string(), -30.0)]);
        assert_eq!(aggregate(&engine, &solo, "white"), 30.0);
        assert_eq!(aggregate(&engine, &solo, "black"), -30.0);
    }

    #[test]
    fn promotion_gain() {
        let engine = engine();
        let mut board = rectangular_grid(8, 8);
        board.set_piece(Position::grid(6, 0), Some(engine.new_piece("pawn", "white", "n"))).unwrap();
        let delta = get_move_score(&engine, &board, Position::grid(6, 0), Position::grid(7, 0));
        assert_eq!(delta.get("white"), Some(&80.0));
        assert_eq!(aggregate(&engine, &delta, "white"), 80.0);
        assert_eq!(aggregate(&engine, &delta, "black"), -80.0);

        let quiet = get_move_score(&engine, &board, Position::grid(6, 0), Position::grid(6, 1));
        assert!(quiet.is_empty());
    }

    #[test]
    fn accumulate_weights() {
        let mut acc = ScoreDelta::new();
        let one = ScoreDelta::from([("white".to_string(), 10.0)]);
        accumulate(&mut acc, &one, 0.5);
        accumulate(&mut acc, &one, 2.0);
        assert_eq!(acc["white"], 25.0);
    }
}
