//! Standard Algebraic Notation output.

use super::movegen::MoveList;
use super::Board;
use crate::bitboard::{file_of, row_of, square_name};
use crate::chessmove::Move;
use crate::errors::SanError;
use crate::piece::{make_piece, piece_char, type_of, PAWN, WHITE};

impl Board {
    /// Renders a legal move in SAN, with disambiguation by file, then
    /// rank, then the full square, and a trailing `+` or `#` as needed.
    pub fn san(&mut self, m: Move) -> Result<String, SanError> {
        if !self.is_legal(m) {
            return Err(SanError::IllegalMove(m.to_string()));
        }

        let mut out = String::with_capacity(8);
        if m.is_castle() {
            out.push_str(if file_of(m.to()) == 6 { "O-O" } else { "O-O-O" });
        } else {
            let is_pawn = type_of(m.piece()) == PAWN;
            let takes = m.is_capture() || m.is_en_passant();
            if is_pawn {
                if takes {
                    out.push((b'a' + file_of(m.from())) as char);
                }
            } else {
                let letter = piece_char(make_piece(type_of(m.piece()), WHITE))
                    .expect("a moving piece always has a label");
                out.push(letter);

                let mut list = MoveList::new();
                self.generate_moves(&mut list);
                let rivals: Vec<Move> = list
                    .iter()
                    .filter(|other| {
                        other.piece() == m.piece()
                            && other.to() == m.to()
                            && other.from() != m.from()
                    })
                    .collect();
                if !rivals.is_empty() {
                    let file_clash =
                        rivals.iter().any(|other| file_of(other.from()) == file_of(m.from()));
                    let rank_clash =
                        rivals.iter().any(|other| row_of(other.from()) == row_of(m.from()));
                    if !file_clash {
                        out.push((b'a' + file_of(m.from())) as char);
                    } else if !rank_clash {
                        out.push((b'8' - row_of(m.from())) as char);
                    } else {
                        out.push_str(square_name(m.from()).unwrap_or("??"));
                    }
                }
            }
            if takes {
                out.push('x');
            }
            out.push_str(square_name(m.to()).unwrap_or("??"));
            if let Some(promo) = m.promotion() {
                out.push('=');
                let letter = piece_char(make_piece(type_of(promo), WHITE))
                    .expect("a promotion target always has a label");
                out.push(letter);
            }
        }

        self.make_move(m);
        if self.in_check() {
            let mut replies = MoveList::new();
            self.generate_moves(&mut replies);
            out.push(if replies.is_empty() { '#' } else { '+' });
        }
        self.unmake_move();

        Ok(out)
    }
}
