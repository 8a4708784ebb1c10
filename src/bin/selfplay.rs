//! Self-play CLI.
//!
//! Plays AI strategies against each other on a built-in or JSON variant and
//! prints win rates. Game records can be written as JSONL.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- --games 20 --strategies minmax-1,random
//!   cargo run --release --bin selfplay -- --variant variants/warp_chess.json --output games.jsonl
//!
//! Logging goes through `RUST_LOG` (e.g. `RUST_LOG=graphchess=debug`).

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use graphchess::game::Game;
use graphchess::protocol::load_variant;
use graphchess::search::Strategy;
use graphchess::selfplay::{self, SelfPlayConfig};

#[derive(Parser, Debug)]
#[command(name = "selfplay", version, about = "Run AI self-play between strategies")]
struct Cli {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,

    /// Comma-separated strategies, seated in turn order
    #[arg(long, value_delimiter = ',', default_value = "minmax-1,random")]
    strategies: Vec<Strategy>,

    /// `standard`, `glinski`, or a path to a variant JSON file
    #[arg(long, default_value = "standard")]
    variant: String,

    /// Turns before a game is scored as a draw
    #[arg(long, default_value_t = 200)]
    max_turns: usize,

    /// Worker threads
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Master seed, 0 for entropy
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Write JSONL game records here ("-" for stdout)
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Suppress progress and summary output
    #[arg(long)]
    quiet: bool,
}

fn load_start(variant: &str) -> Result<Game, String> {
    match variant {
        "standard" => Ok(Game::standard()),
        "glinski" => Ok(Game::glinski()),
        path => {
            let text = fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path, e))?;
            load_variant(&text).map_err(|e| format!("invalid variant {}: {}", path, e))
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let start = match load_start(&cli.variant) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let config = SelfPlayConfig {
        num_games: cli.games,
        strategies: cli.strategies,
        start,
        max_turns: cli.max_turns,
        threads: cli.threads,
        seed: cli.seed,
        quiet: cli.quiet,
    };

    if !config.quiet {
        let names: Vec<String> = config.strategies.iter().map(|s| s.to_string()).collect();
        eprintln!(
            "Self-play: {} games of {}, strategies [{}], max {} turns, {} threads",
            config.num_games,
            cli.variant,
            names.join(", "),
            config.max_turns,
            config.threads
        );
    }

    let started = Instant::now();
    let games = match selfplay::run_self_play(&config) {
        Ok(games) => games,
        Err(e) => {
            eprintln!("self-play failed: {}", e);
            process::exit(1);
        }
    };

    if !config.quiet {
        eprintln!("Completed {} games in {:.1}s", games.len(), started.elapsed().as_secs_f64());
        selfplay::print_summary(&games, &config.strategies);
    }

    let written = match cli.output {
        Some(path) if path.as_os_str() == "-" => {
            let stdout = io::stdout();
            selfplay::write_jsonl(&games, &mut BufWriter::new(stdout.lock()))
        }
        Some(path) => match File::create(&path) {
            Ok(file) => selfplay::write_jsonl(&games, &mut BufWriter::new(file)).map(|()| {
                if !config.quiet {
                    eprintln!("Wrote {} games to {}", games.len(), path.display());
                }
            }),
            Err(e) => Err(e.into()),
        },
        None => Ok(()),
    };
    if let Err(e) = written {
        eprintln!("failed to write output: {}", e);
        process::exit(1);
    }
}
