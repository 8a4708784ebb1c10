use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::Duration;

use graphchess::board::Position;
use graphchess::eval::get_move_score;
use graphchess::game::Game;
use graphchess::protocol::{load_variant, parse_square};
use graphchess::search::{ai_select, Strategy};

const WARP_CHESS: &str = include_str!("../variants/warp_chess.json");

fn sq(s: &str) -> Position {
    parse_square(s).unwrap()
}

fn bench_movegen_standard(c: &mut Criterion) {
    let game = Game::standard();
    c.bench_function("movegen_standard_white", |b| {
        b.iter(|| game.engine.get_all_legal_moves(black_box("white"), black_box(&game.board)))
    });
}

fn bench_movegen_glinski(c: &mut Criterion) {
    let game = Game::glinski();
    c.bench_function("movegen_glinski_white", |b| {
        b.iter(|| game.engine.get_all_legal_moves(black_box("white"), black_box(&game.board)))
    });
}

fn bench_movegen_warp(c: &mut Criterion) {
    let mut game = load_variant(WARP_CHESS).unwrap();
    game.play(sq("c2"), sq("c3")).unwrap();
    game.play(sq("f7"), sq("f5")).unwrap();
    c.bench_function("movegen_warp_midgame", |b| {
        b.iter(|| game.engine.get_all_legal_moves(black_box("white"), black_box(&game.board)))
    });
}

fn bench_play_move(c: &mut Criterion) {
    let game = Game::standard();
    let (e2, e4) = (sq("e2"), sq("e4"));
    c.bench_function("play_move_e2e4", |b| {
        b.iter(|| game.engine.play_move(black_box(&game.board), e2, e4, false))
    });
}

fn bench_board_copy(c: &mut Criterion) {
    let game = Game::glinski();
    c.bench_function("board_copy_glinski", |b| b.iter(|| black_box(&game.board).copy()));
}

fn bench_move_score(c: &mut Criterion) {
    let mut game = Game::standard();
    for (start, end) in [("e2", "e4"), ("d7", "d5")] {
        game.play(sq(start), sq(end)).unwrap();
    }
    let (e4, d5) = (sq("e4"), sq("d5"));
    c.bench_function("move_score_capture", |b| {
        b.iter(|| get_move_score(&game.engine, black_box(&game.board), e4, d5))
    });
}

fn bench_ai_select(c: &mut Criterion) {
    let game = Game::standard();
    let mut group = c.benchmark_group("ai_select_standard");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    for name in ["random", "minmax-0", "minmax-1", "minmax-2"] {
        let strategy: Strategy = name.parse().unwrap();
        group.bench_function(name, |b| {
            let mut rng = SmallRng::seed_from_u64(7);
            b.iter(|| ai_select(&game.engine, black_box(&game.board), &strategy, &mut rng))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_movegen_standard,
    bench_movegen_glinski,
    bench_movegen_warp,
    bench_play_move,
    bench_board_copy,
    bench_move_score,
    bench_ai_select,
);
criterion_main!(benches);
