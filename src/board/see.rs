//! Static exchange evaluation.
//!
//! The board is mutated minimally (bitboards, occupancy and the square
//! array only, no keys or clocks), the capture sequence is played out by
//! smallest attacker, and everything is reverted on the way back up.

use super::Board;
use crate::attacks;
use crate::bitboard::{bit, scan_forward};
use crate::chessmove::Move;
use crate::piece::{
    colour_of, exchange_value_of, make_piece, value_of, BISHOP, EMPTY, KING, KNIGHT, PAWN, QUEEN,
    ROOK, WHITE,
};

impl Board {
    /// The square of the cheapest piece of `colour` attacking `sq` under
    /// the current occupancy, scanning pawn, knight, bishop, rook, queen,
    /// king.
    pub fn smallest_attacker_square(&self, colour: u8, sq: u8) -> Option<u8> {
        let pawns = self.bb[(PAWN | colour) as usize] & attacks::pawn(sq, colour ^ 1);
        if pawns != 0 {
            return Some(scan_forward(pawns));
        }
        let knights = self.bb[(KNIGHT | colour) as usize] & attacks::knight(sq);
        if knights != 0 {
            return Some(scan_forward(knights));
        }
        let diag = self.bishop_attacks(sq, self.occupied);
        let bishops = self.bb[(BISHOP | colour) as usize] & diag;
        if bishops != 0 {
            return Some(scan_forward(bishops));
        }
        let axis = self.rook_attacks(sq, self.occupied);
        let rooks = self.bb[(ROOK | colour) as usize] & axis;
        if rooks != 0 {
            return Some(scan_forward(rooks));
        }
        let queens = self.bb[(QUEEN | colour) as usize] & (diag | axis);
        if queens != 0 {
            return Some(scan_forward(queens));
        }
        let kings = self.bb[(KING | colour) as usize] & attacks::king(sq);
        if kings != 0 {
            return Some(scan_forward(kings));
        }
        None
    }

    fn see_toggle(&mut self, piece: u8, sq: u8) {
        let mask = bit(sq);
        self.bb[piece as usize] ^= mask;
        self.bb[colour_of(piece) as usize] ^= mask;
        self.occupied ^= mask;
    }

    /// Best gain for `colour` continuing the capture sequence on `sq`.
    /// Standing pat is always available, hence the zero floor.
    fn exchange(&mut self, colour: u8, sq: u8) -> i32 {
        let Some(from) = self.smallest_attacker_square(colour, sq) else {
            return 0;
        };
        let attacker = self.square[from as usize];
        let victim = self.square[sq as usize];
        debug_assert!(victim != EMPTY);

        self.see_toggle(victim, sq);
        self.see_toggle(attacker, from);
        self.see_toggle(attacker, sq);
        self.square[from as usize] = EMPTY;
        self.square[sq as usize] = attacker;

        let score = 0.max(exchange_value_of(victim) - self.exchange(colour ^ 1, sq));

        self.square[sq as usize] = victim;
        self.square[from as usize] = attacker;
        self.see_toggle(attacker, sq);
        self.see_toggle(attacker, from);
        self.see_toggle(victim, sq);

        score
    }

    /// Net material outcome of playing `m` and letting both sides keep
    /// capturing on the destination square with their cheapest attackers.
    pub fn see(&mut self, m: Move) -> i32 {
        let from = m.from();
        let to = m.to();
        let piece = m.piece();
        let us = colour_of(piece);

        let captured_sq = if m.is_en_passant() {
            if us == WHITE {
                to + 8
            } else {
                to - 8
            }
        } else {
            to
        };
        let captured = self.square[captured_sq as usize];

        let mut gain = if captured == EMPTY { 0 } else { value_of(captured) };
        let end_piece = match m.promotion() {
            Some(promo) => {
                gain += value_of(promo) - value_of(make_piece(PAWN, us));
                promo
            }
            None => piece,
        };

        if captured != EMPTY {
            self.see_toggle(captured, captured_sq);
            self.square[captured_sq as usize] = EMPTY;
        }
        self.see_toggle(piece, from);
        self.square[from as usize] = EMPTY;
        self.see_toggle(end_piece, to);
        self.square[to as usize] = end_piece;

        gain -= self.exchange(us ^ 1, to);

        self.square[to as usize] = EMPTY;
        self.see_toggle(end_piece, to);
        self.square[from as usize] = piece;
        self.see_toggle(piece, from);
        if captured != EMPTY {
            self.square[captured_sq as usize] = captured;
            self.see_toggle(captured, captured_sq);
        }

        gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::BLACK;

    #[test]
    fn attacker_scan_matches_the_attack_test() {
        for fen in [
            Board::STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "4k3/8/2n5/4p3/8/8/4R3/4K3 w - - 0 1",
        ] {
            let board = Board::from_fen(fen).unwrap();
            for colour in [WHITE, BLACK] {
                for sq in 0..64u8 {
                    assert_eq!(
                        board.smallest_attacker_square(colour, sq).is_some(),
                        board.sq_attacked(sq, colour),
                        "attacker scan and attack test disagree on {} for colour {colour} in {fen}",
                        crate::bitboard::square_name(sq).unwrap(),
                    );
                }
            }
        }
    }

    #[test]
    fn rook_takes_defended_pawn_loses_the_exchange() {
        // the c6 knight guards the e5 pawn.
        let mut board = Board::from_fen("4k3/8/2n5/4p3/8/8/4R3/4K3 w - - 0 1").unwrap();
        let m = board.parse_uci_move("e2e5").unwrap();
        let before = board.clone();
        let see = board.see(m);
        assert_eq!(see, value_of(crate::piece::WP) - value_of(crate::piece::WR));
        assert!(see < 0);
        assert_eq!(board, before, "see must leave the board untouched");
    }

    #[test]
    fn winning_and_even_exchanges() {
        // undefended pawn: clean win.
        let mut board = Board::from_fen("4k3/8/8/4p3/8/8/4R3/4K3 w - - 0 1").unwrap();
        let m = board.parse_uci_move("e2e5").unwrap();
        assert_eq!(board.see(m), 100);

        // queen takes a pawn defended by a pawn: loses the queen.
        let mut board = Board::from_fen("4k3/8/5p2/4p3/8/8/8/Q3K3 w - - 0 1").unwrap();
        let m = board.parse_uci_move("a1e5").unwrap();
        assert_eq!(board.see(m), 100 - 900);
    }

    #[test]
    fn quiet_moves_can_still_lose_the_mover() {
        // stepping the rook onto a pawn-defended square scores it away.
        let mut board = Board::from_fen("4k3/8/5p2/8/4R3/8/8/4K3 w - - 0 1").unwrap();
        let m = board.parse_uci_move("e4e5").unwrap();
        assert!(!m.is_capture());
        assert!(board.see(m) < 0);
    }

    #[test]
    fn en_passant_exchange_counts_the_pawn() {
        let mut board = Board::from_fen("8/8/8/1Pp5/8/8/8/4K2k w - c6 0 1").unwrap();
        let m = board.parse_uci_move("b5c6").unwrap();
        assert_eq!(board.see(m), 100);
    }

    #[test]
    fn see_mutations_revert_on_every_legal_capture() {
        let mut board = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let before = board.clone();
        let mut list = crate::board::movegen::MoveList::new();
        board.generate_moves(&mut list);
        for m in list.iter() {
            let _ = board.see(m);
            assert_eq!(board, before, "see of {m} left residue");
        }
    }
}
