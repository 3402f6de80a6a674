use anyhow::Context;
use clap::{Parser, Subcommand};

use cuprite::board::Board;
use cuprite::perft;
use cuprite::player::{Engine, DEFAULT_HASH_MB};
use cuprite::timemgmt::SearchLimit;
use cuprite::NAME;

#[derive(Parser)]
#[command(name = "cuprite", about = "a classical alpha-beta chess engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search a position and print the chosen move.
    Analyse {
        /// Position to search, in FEN; defaults to the starting position.
        fen: Option<String>,
        /// Nominal search depth.
        #[arg(long, default_value_t = 10)]
        depth: usize,
        /// Fixed time per move in milliseconds; overrides the depth.
        #[arg(long)]
        movetime: Option<u64>,
        /// Transposition table size in mebibytes.
        #[arg(long, default_value_t = DEFAULT_HASH_MB)]
        hash: usize,
    },
    /// Count leaf nodes of the move generator to a given depth.
    Perft {
        depth: usize,
        /// Position to expand; defaults to the starting position.
        #[arg(long)]
        fen: Option<String>,
        /// Print per-move counts at the root.
        #[arg(long)]
        divide: bool,
    },
    /// Fixed-depth searches over a small position set, for benchmarking.
    Bench {
        #[arg(long, default_value_t = 8)]
        depth: usize,
    },
}

static BENCH_POSITIONS: [&str; 5] = [
    Board::STARTING_FEN,
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    "8/k7/3p4/p2P1p2/P2P1P2/8/8/K7 w - - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
];

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Analyse { fen, depth, movetime, hash } => {
            let fen = fen.as_deref().unwrap_or(Board::STARTING_FEN);
            let mut pos = Board::from_fen(fen).with_context(|| format!("bad FEN {fen:?}"))?;
            let limit = match movetime {
                Some(ms) => SearchLimit::MoveTime(ms),
                None => SearchLimit::Depth(depth),
            };
            let mut engine = Engine::new(NAME, hash, limit);
            engine.get_move(&mut pos).context("no legal moves in this position")?;
            Ok(())
        }
        Command::Perft { depth, fen, divide } => {
            let fen = fen.as_deref().unwrap_or(Board::STARTING_FEN);
            let mut pos = Board::from_fen(fen).with_context(|| format!("bad FEN {fen:?}"))?;
            let start = std::time::Instant::now();
            let count = if divide {
                perft::divide(&mut pos, depth)
            } else {
                perft::perft(&mut pos, depth)
            };
            let elapsed = start.elapsed();
            println!(
                "perft({depth}) = {count} in {}ms ({:.1} Mnps)",
                elapsed.as_millis(),
                count as f64 / elapsed.as_secs_f64() / 1e6,
            );
            Ok(())
        }
        Command::Bench { depth } => {
            let start = std::time::Instant::now();
            let mut nodes = 0;
            let mut engine = Engine::new(NAME, DEFAULT_HASH_MB, SearchLimit::Depth(depth));
            for fen in BENCH_POSITIONS {
                let mut pos = Board::from_fen(fen).with_context(|| format!("bad FEN {fen:?}"))?;
                engine.get_move_quiet(&mut pos);
                nodes += engine.nodes();
                engine.reset();
            }
            let elapsed = start.elapsed();
            println!(
                "{nodes} nodes in {}ms ({:.0} nps)",
                elapsed.as_millis(),
                nodes as f64 / elapsed.as_secs_f64(),
            );
            Ok(())
        }
    }
}
