//! Command-line front end for the chess engine.
//!
//! Counts perft nodes, inspects positions, plays SAN move sequences and
//! prints Zobrist keys.

use anyhow::{bail, Context};
use chess_core::FenFields;
use chess_engine::{
    move_to_san, perft, perft_divide, Game, GameConfig, Position, PushOptions,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess")]
#[command(about = "Chess rules engine toolbox")]
struct Cli {
    /// Log engine activity to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count leaf nodes of the legal move tree
    Perft {
        /// Depth in plies
        #[arg(short, long)]
        depth: u32,
        /// Start position
        #[arg(long, default_value = FenFields::STARTPOS)]
        fen: String,
        /// Print the count below each root move
        #[arg(long)]
        divide: bool,
    },
    /// Print a position with its key and legal moves
    Show {
        #[arg(long, default_value = FenFields::STARTPOS)]
        fen: String,
    },
    /// Play SAN moves and print the resulting game
    Play {
        #[arg(long, default_value = FenFields::STARTPOS)]
        fen: String,
        /// Draw rules configuration
        #[arg(short, long, default_value = GameConfig::DEFAULT_FILE)]
        config: PathBuf,
        /// Header tag as Key=Value, may be repeated
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
        /// Moves in SAN, e.g. e4 e5 Nf3
        moves: Vec<String>,
    },
    /// Print the Zobrist key of a FEN
    Hash { fen: String },
}

fn parse_tag(text: &str) -> Result<(String, String), String> {
    match text.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected Key=Value, got {text:?}")),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Perft { depth, fen, divide } => run_perft(&fen, depth, divide),
        Commands::Show { fen } => show(&fen),
        Commands::Play {
            fen,
            config,
            tags,
            moves,
        } => play(&fen, &config, tags, &moves),
        Commands::Hash { fen } => {
            let key = chess_engine::hash_fen(&fen).context("invalid FEN")?;
            println!("{key:016x}");
            Ok(())
        }
    }
}

fn run_perft(fen: &str, depth: u32, divide: bool) -> anyhow::Result<()> {
    let position = Position::from_fen(fen).context("invalid FEN")?;
    let started = Instant::now();

    let nodes = if divide {
        let counts = perft_divide(&position, depth);
        for (m, count) in &counts {
            println!("{}: {count}", m.to_uci());
        }
        println!();
        counts.iter().map(|(_, count)| count).sum()
    } else {
        perft(&position, depth)
    };

    let elapsed = started.elapsed();
    tracing::info!(depth, nodes, ?elapsed, "perft finished");
    println!("nodes: {nodes}");
    println!("time:  {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn show(fen: &str) -> anyhow::Result<()> {
    let position = Position::from_fen(fen).context("invalid FEN")?;
    println!("{position}");
    println!("key:   {:016x}", position.zobrist_hash());
    if position.is_check() {
        println!("check");
    }

    let legal = position.legal_moves();
    let sans: Vec<String> = legal.iter().map(|m| move_to_san(&position, *m)).collect();
    println!("moves: {} {}", legal.len(), sans.join(" "));
    Ok(())
}

fn play(
    fen: &str,
    config_path: &Path,
    tags: Vec<(String, String)>,
    moves: &[String],
) -> anyhow::Result<()> {
    let config = GameConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let mut game = Game::from_fen(fen).context("invalid FEN")?.with_config(config);
    for (key, value) in tags {
        game.add_tag_pair(key, value);
    }

    for (ply, san) in moves.iter().enumerate() {
        if game.is_over() {
            bail!(
                "game ended by {} before move {} ({san})",
                game.method(),
                ply + 1
            );
        }
        game.push_move(san, PushOptions::default())
            .with_context(|| format!("move {} ({san})", ply + 1))?;
    }

    println!("{game}");
    println!();
    println!("fen:     {}", game.to_fen());
    if game.is_over() {
        println!("outcome: {} by {}", game.outcome(), game.method());
    } else {
        println!("outcome: {}", game.outcome());
    }

    let draws = game.eligible_draws();
    if !draws.is_empty() {
        let names: Vec<String> = draws.iter().map(ToString::to_string).collect();
        println!("claimable: {}", names.join(", "));
    }
    Ok(())
}
