//! Perft: exhaustive move-generation counting, the ground truth for the
//! legal move generator. Because the generator is strictly legal there is
//! no per-move legality filter here.

use crate::board::movegen::MoveList;
use crate::board::Board;

pub fn perft(pos: &mut Board, depth: usize) -> u64 {
    #[cfg(debug_assertions)]
    pos.check_validity().unwrap();

    if depth == 0 {
        return 1;
    }

    let mut list = MoveList::new();
    pos.generate_moves(&mut list);

    if depth == 1 {
        return list.len() as u64;
    }

    let mut count = 0;
    for m in list.iter() {
        pos.make_move(m);
        count += perft(pos, depth - 1);
        pos.unmake_move();
    }

    count
}

/// Per-move breakdown at the root, in the format engines traditionally
/// print for movegen debugging.
pub fn divide(pos: &mut Board, depth: usize) -> u64 {
    let mut list = MoveList::new();
    pos.generate_moves(&mut list);
    let mut total = 0;
    for m in list.iter() {
        pos.make_move(m);
        let count = if depth > 1 { perft(pos, depth - 1) } else { 1 };
        pos.unmake_move();
        println!("{m}: {count}");
        total += count;
    }
    println!("total: {total}");
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    pub const KIWIPETE: &str =
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    pub const FINE_70: &str = "8/k7/3p4/p2P1p2/P2P1P2/8/8/K7 w - - 0 1";

    fn expect(fen: &str, counts: &[u64]) {
        let mut pos = Board::from_fen(fen).unwrap();
        for (depth, &count) in counts.iter().enumerate() {
            assert_eq!(
                perft(&mut pos, depth + 1),
                count,
                "perft({}) mismatch for {fen}",
                depth + 1,
            );
        }
    }

    #[test]
    fn startpos_shallow() {
        expect(Board::STARTING_FEN, &[20, 400, 8_902, 197_281]);
    }

    #[test]
    #[ignore = "several minutes in a debug build"]
    fn startpos_deep() {
        expect(Board::STARTING_FEN, &[20, 400, 8_902, 197_281, 4_865_609, 119_060_324]);
    }

    #[test]
    fn kiwipete_shallow() {
        expect(KIWIPETE, &[48, 2_039, 97_862]);
    }

    #[test]
    #[ignore = "several minutes in a debug build"]
    fn kiwipete_deep() {
        expect(KIWIPETE, &[48, 2_039, 97_862, 4_085_603]);
    }

    #[test]
    fn fine_70_counts() {
        // the king-and-pawn zugzwang study: every pawn is blockaded, so
        // only the kings can move.
        expect(FINE_70, &[3, 15, 90]);
    }

    #[test]
    fn en_passant_and_promotion_heavy_positions() {
        // position 3 from the CPW perft suite: en passant everywhere.
        expect("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1", &[14, 191, 2_812, 43_238]);
        // position 4: castling, promotions, checks.
        expect(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            &[6, 264, 9_467],
        );
        // its mirror.
        expect(
            "r2q1rk1/pP1p2pp/Q4n2/bbp1p3/Np6/1B3NBn/pPPP1PPP/R3K2R b KQ - 0 1",
            &[6, 264, 9_467],
        );
        // position 5: a discovered-check minefield.
        expect("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8", &[44, 1_486, 62_379]);
        // position 6: a quiet middlegame.
        expect(
            "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
            &[46, 2_079, 89_890],
        );
    }
}
