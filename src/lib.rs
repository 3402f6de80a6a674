//! Cuprite, a classical alpha-beta chess engine.
//!
//! The crate is organised leaves-first: bit primitives and encodings at
//! the bottom, the board and its move generator above them, and the
//! search driver and player contract on top.

#[macro_use]
pub mod macros;

pub mod attacks;
pub mod bitboard;
pub mod board;
pub mod chessmove;
pub mod errors;
pub mod perft;
pub mod piece;
pub mod piecesquaretable;
pub mod player;
pub mod rng;
pub mod search;
pub mod searchinfo;
pub mod timemgmt;
pub mod transpositiontable;
pub mod zobrist;

pub static NAME: &str = "Cuprite";
pub static VERSION: &str = env!("CARGO_PKG_VERSION");
