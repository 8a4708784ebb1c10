//! Who may capture whom.
//!
//! A mover's ally set is the union of the allies of its team slots. With
//! `multiteam_capture_ally` enabled, a piece that has moved uses the
//! intersection instead, so a joint piece only spares pieces every one of
//! its teams is allied with. A target is protected when any of its teams is
//! in the mover's ally set.

use std::collections::{BTreeMap, BTreeSet};

use crate::board::{Piece, Team};

fn allies_of(team: &str, teams: &BTreeMap<String, Team>) -> BTreeSet<String> {
    match teams.get(team) {
        Some(t) => t.allies().iter().cloned().collect(),
        None => BTreeSet::from([team.to_string()]),
    }
}

/// The ally set used when `piece` attacks.
pub fn ally_set(piece: &Piece, teams: &BTreeMap<String, Team>, multiteam_capture_ally: bool) -> BTreeSet<String> {
    let mut slots = piece.teams().iter().map(|t| allies_of(t, teams));
    let Some(first) = slots.next() else {
        return BTreeSet::new();
    };
    if multiteam_capture_ally && piece.has_moved {
        slots.fold(first, |acc, s| acc.intersection(&s).cloned().collect())
    } else {
        slots.fold(first, |mut acc, s| {
            acc.extend(s);
            acc
        })
    }
}

/// Whether a piece with the given ally set may capture `target`.
pub fn is_capturable(allies: &BTreeSet<String>, target: &Piece) -> bool {
    !target.teams().iter().any(|t| allies.contains(t))
}
