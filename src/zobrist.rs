//! Zobrist hashing.
//!
//! The tables are filled deterministically from the xorshift generator at
//! compile time. The en passant word is indexed by file only: en passant
//! targets can only ever sit on two ranks, and those ranks never coexist
//! for the same side to move, so rank replication would buy nothing.

use crate::bitboard::{file_of, NO_SQUARE};
use crate::cfor;
use crate::piece::{piece_valid, PIECE_ID_COUNT};
use crate::rng::XorShiftState;

/// Seed for the key tables. Any non-zero value works; this one is the
/// fractional part of the golden ratio, scaled to 64 bits.
const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

type Keys = ([[u64; 64]; PIECE_ID_COUNT], [u64; 2], [u64; 2], [u64; 8], u64);

const fn init_keys() -> Keys {
    let mut state = XorShiftState::new(ZOBRIST_SEED);
    let mut piece_keys = [[0; 64]; PIECE_ID_COUNT];
    cfor!(let mut piece = 2; piece < PIECE_ID_COUNT; piece += 1; {
        cfor!(let mut sq = 0; sq < 64; sq += 1; {
            let key;
            (key, state) = state.next_self();
            piece_keys[piece][sq] = key;
        });
    });
    let mut castle_ks = [0; 2];
    let mut castle_qs = [0; 2];
    cfor!(let mut side = 0; side < 2; side += 1; {
        let key;
        (key, state) = state.next_self();
        castle_ks[side] = key;
        let key;
        (key, state) = state.next_self();
        castle_qs[side] = key;
    });
    let mut ep_file = [0; 8];
    cfor!(let mut file = 0; file < 8; file += 1; {
        let key;
        (key, state) = state.next_self();
        ep_file[file] = key;
    });
    let (side_key, _) = state.next_self();
    (piece_keys, castle_ks, castle_qs, ep_file, side_key)
}

pub static PIECE_KEYS: [[u64; 64]; PIECE_ID_COUNT] = init_keys().0;
pub static CASTLE_KS_KEYS: [u64; 2] = init_keys().1;
pub static CASTLE_QS_KEYS: [u64; 2] = init_keys().2;
pub static EP_FILE_KEYS: [u64; 8] = init_keys().3;
pub const SIDE_KEY: u64 = init_keys().4;

pub fn hash_piece(key: &mut u64, piece: u8, sq: u8) {
    debug_assert!(piece_valid(piece));
    debug_assert!(sq < 64);
    *key ^= PIECE_KEYS[piece as usize][sq as usize];
}

pub fn hash_side(key: &mut u64) {
    *key ^= SIDE_KEY;
}

pub fn hash_ep(key: &mut u64, ep_sq: u8) {
    debug_assert!(ep_sq != NO_SQUARE);
    *key ^= EP_FILE_KEYS[file_of(ep_sq) as usize];
}

pub fn hash_castle_kingside(key: &mut u64, colour: u8) {
    *key ^= CASTLE_KS_KEYS[colour as usize];
}

pub fn hash_castle_queenside(key: &mut u64, colour: u8) {
    *key ^= CASTLE_QS_KEYS[colour as usize];
}

mod tests {
    #![allow(unused_imports)]
    use super::*;

    #[test]
    fn all_keys_distinct() {
        let mut keys: Vec<u64> = PIECE_KEYS[2..].iter().flatten().copied().collect();
        keys.extend_from_slice(&CASTLE_KS_KEYS);
        keys.extend_from_slice(&CASTLE_QS_KEYS);
        keys.extend_from_slice(&EP_FILE_KEYS);
        keys.push(SIDE_KEY);
        let len_before = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(len_before, keys.len());
        assert!(!keys.contains(&0));
    }

    #[test]
    fn ep_keys_are_per_file() {
        // c6 and c3 carry the same en passant word.
        let c6 = crate::bitboard::square_from(2, 2);
        let c3 = crate::bitboard::square_from(2, 5);
        let mut a = 0;
        let mut b = 0;
        hash_ep(&mut a, c6);
        hash_ep(&mut b, c3);
        assert_eq!(a, b);
    }
}
