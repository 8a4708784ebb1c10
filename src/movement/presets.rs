//! Built-in rule tables.
//!
//! Process-wide and immutable; engines clone a table and own the copy.

use std::sync::{Arc, LazyLock};

use super::condition::Condition;
use super::moves::Move;
use super::moveset::Moveset;
use super::ruleset::{rule_table, RuleSet, RuleTable};

fn slides(steps: &[(&str, &str)]) -> Vec<Move> {
    steps.iter().map(|s| Move::new(&[*s])).collect()
}

fn jumps(paths: &[[&str; 3]], kind: &str) -> Vec<Move> {
    paths
        .iter()
        .map(|p| Move::new(&[(p[0], kind), (p[1], kind), (p[2], kind)]))
        .collect()
}

const SQUARE_ROOK: [(&str, &str); 4] = [("f", "edge"), ("b", "edge"), ("l", "edge"), ("r", "edge")];
const SQUARE_BISHOP: [(&str, &str); 4] = [("fl", "vertex"), ("fr", "vertex"), ("bl", "vertex"), ("br", "vertex")];

// Knight paths: two straight steps then a turn, or one step, a turn, and a step.
const SQUARE_KNIGHT: [[&str; 3]; 16] = [
    ["f", "f", "l"],
    ["f", "f", "r"],
    ["b", "f", "l"],
    ["b", "f", "r"],
    ["l", "f", "l"],
    ["l", "f", "r"],
    ["r", "f", "l"],
    ["r", "f", "r"],
    ["f", "l", "f"],
    ["f", "r", "f"],
    ["b", "l", "f"],
    ["b", "r", "f"],
    ["l", "l", "f"],
    ["l", "r", "f"],
    ["r", "l", "f"],
    ["r", "r", "f"],
];

const HEX_ROOK: [(&str, &str); 6] = [
    ("f", "edge"),
    ("fr", "edge"),
    ("br", "edge"),
    ("b", "edge"),
    ("bl", "edge"),
    ("fl", "edge"),
];
const HEX_BISHOP: [(&str, &str); 6] = [
    ("ffr", "vertex"),
    ("r", "vertex"),
    ("bbr", "vertex"),
    ("bbl", "vertex"),
    ("l", "vertex"),
    ("ffl", "vertex"),
];

const HEX_KNIGHT: [[&str; 3]; 24] = [
    ["f", "f", "fl"],
    ["f", "f", "fr"],
    ["b", "f", "fl"],
    ["b", "f", "fr"],
    ["fl", "f", "fl"],
    ["fl", "f", "fr"],
    ["fr", "f", "fl"],
    ["fr", "f", "fr"],
    ["bl", "f", "fl"],
    ["bl", "f", "fr"],
    ["br", "f", "fl"],
    ["br", "f", "fr"],
    ["f", "fl", "f"],
    ["f", "fr", "f"],
    ["b", "fl", "f"],
    ["b", "fr", "f"],
    ["fl", "fl", "f"],
    ["fl", "fr", "f"],
    ["fr", "fl", "f"],
    ["fr", "fr", "f"],
    ["bl", "fl", "f"],
    ["bl", "fr", "f"],
    ["br", "fl", "f"],
    ["br", "fr", "f"],
];

/// Single forward step, or two while unmoved. Never captures.
pub fn pawn_move() -> Moveset {
    let double = Moveset::new(slides(&[("f", "edge")])).with_max_distance(2).move_only();
    Moveset::new(slides(&[("f", "edge")]))
        .with_max_distance(1)
        .move_only()
        .with_override(Condition::unmoved(), double)
}

/// The eight `long:short` leaps: `long` steps one way, a quarter turn,
/// then `short` steps.
fn leaps(long: usize, short: usize) -> Vec<Move> {
    let mut moves = Vec::with_capacity(8);
    for first in ["f", "b", "l", "r"] {
        for turn in ["l", "r"] {
            let mut steps = vec![(first, "edge")];
            steps.extend(std::iter::repeat(("f", "edge")).take(long - 1));
            steps.push((turn, "edge"));
            steps.extend(std::iter::repeat(("f", "edge")).take(short - 1));
            moves.push(Move::new(&steps));
        }
    }
    moves
}

/// 3:1 leaper (the camel).
pub fn long_knight() -> Moveset {
    Moveset::new(leaps(3, 1)).with_max_distance(1)
}

/// 3:2 leaper.
pub fn zebra() -> Moveset {
    Moveset::new(leaps(3, 2)).with_max_distance(1)
}

/// 4:1 leaper.
pub fn giraffe() -> Moveset {
    Moveset::new(leaps(4, 1)).with_max_distance(1)
}

/// Knight leaps repeated along a line until blocked.
pub fn knight_rider() -> Moveset {
    Moveset::new(jumps(&SQUARE_KNIGHT, "edge"))
}

/// One step through a `warp` portal.
pub fn warp() -> Moveset {
    Moveset::new(slides(&[("warp", "warp")])).with_max_distance(1).move_only()
}

pub fn rook() -> Moveset {
    Moveset::new(slides(&SQUARE_ROOK))
}

pub fn bishop() -> Moveset {
    Moveset::new(slides(&SQUARE_BISHOP))
}

pub fn knight() -> Moveset {
    Moveset::new(jumps(&SQUARE_KNIGHT, "edge")).with_max_distance(1)
}

pub fn queen() -> Moveset {
    Moveset::new(slides(&[SQUARE_ROOK, SQUARE_BISHOP].concat()))
}

pub fn king() -> Moveset {
    queen().with_max_distance(1)
}

/// Standard chess rules. Pawns promote to queens; kings are royal.
pub static STANDARD: LazyLock<RuleTable> = LazyLock::new(|| {
    let pawn_capture = Moveset::new(slides(&[("fl", "vertex"), ("fr", "vertex")]))
        .with_max_distance(1)
        .capture_only();
    rule_table([
        RuleSet::new("pawn", 10)
            .with_moveset(pawn_move())
            .with_moveset(pawn_capture)
            .with_promotion("queen"),
        RuleSet::new("knight", 30).with_moveset(knight()),
        RuleSet::new("bishop", 30).with_moveset(bishop()),
        RuleSet::new("rook", 50).with_moveset(rook()),
        RuleSet::new("queen", 90).with_moveset(queen()),
        RuleSet::new("king", 900).with_moveset(king()).royal(),
    ])
});

/// Glinski hexagonal chess rules.
pub static GLINSKI: LazyLock<RuleTable> = LazyLock::new(|| {
    let pawn_capture = Moveset::new(slides(&[("fl", "edge"), ("fr", "edge")]))
        .with_max_distance(1)
        .capture_only();
    let hex_queen = || Moveset::new(slides(&[HEX_ROOK.as_slice(), HEX_BISHOP.as_slice()].concat()));
    rule_table([
        RuleSet::new("pawn", 10)
            .with_moveset(pawn_move())
            .with_moveset(pawn_capture)
            .with_promotion("queen"),
        RuleSet::new("knight", 30).with_moveset(Moveset::new(jumps(&HEX_KNIGHT, "edge")).with_max_distance(1)),
        RuleSet::new("bishop", 30).with_moveset(Moveset::new(slides(&HEX_BISHOP))),
        RuleSet::new("rook", 50).with_moveset(Moveset::new(slides(&HEX_ROOK))),
        RuleSet::new("queen", 90).with_moveset(hex_queen()),
        RuleSet::new("king", 900).with_moveset(hex_queen().with_max_distance(1)).royal(),
    ])
});

/// Standard rules where every piece may also step through `warp` portals.
pub static WARP: LazyLock<RuleTable> = LazyLock::new(|| {
    let portal = Arc::new(warp());
    STANDARD
        .iter()
        .map(|(name, rules)| (name.clone(), rules.clone().with_shared(Arc::clone(&portal))))
        .collect()
});

/// Standard rules plus fairy leapers for square boards.
pub static FANTASY: LazyLock<RuleTable> = LazyLock::new(|| {
    let mut table = STANDARD.clone();
    table.extend(rule_table([
        RuleSet::new("long_knight", 30).with_moveset(long_knight()),
        RuleSet::new("dragon", 60)
            .with_moveset(knight())
            .with_moveset(long_knight()),
        RuleSet::new("zebra", 30).with_moveset(zebra()),
        RuleSet::new("giraffe", 30).with_moveset(giraffe()),
        RuleSet::new("unicorn", 70).with_moveset(knight_rider()),
    ]));
    table
});

/// Looks up a built-in table by name.
pub fn by_name(name: &str) -> Option<&'static RuleTable> {
    match name {
        "standard" => Some(&*STANDARD),
        "glinski" => Some(&*GLINSKI),
        "warp" => Some(&*WARP),
        "fantasy" => Some(&*FANTASY),
        _ => None,
    }
}
