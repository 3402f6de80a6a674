//! The search kernel: iterative deepening with aspiration windows at the
//! root, principal variation search with transposition table, null-move
//! pruning, late-move reductions, futility pruning and killer ordering in
//! the tree, and a SEE-gated quiescence search at the frontier.

use crate::board::evaluation::{
    draw_score, is_mate_score, CHECKMATE, DRAW_VALUE, INFINITY, NEAR_CHECKMATE,
};
use crate::board::movegen::MoveList;
use crate::board::Board;
use crate::bitboard::bit;
use crate::chessmove::Move;
use crate::piece::{exchange_value_of, type_of, value_of, EMPTY, PAWN, WP};
use crate::searchinfo::{PVariation, SearchInfo, DEPTH_LIMIT, PLY_LIMIT};
use crate::timemgmt::SearchLimit;
use crate::transpositiontable::{Bound, TranspositionTable};

const ASPIRATION_WINDOW: i32 = 17;
const NULL_MOVE_REDUCTION: i32 = 3;
const LATE_MOVE_REDUCTION: i32 = 2;
static FUTILITY_MARGINS: [i32; 6] = [0, 104, 125, 250, 271, 375];

// Move-ordering scores. The hash move goes first, then captures by
// victim over attacker, then the killers; everything else keeps a zero
// score and is eligible for reduction.
const HASH_MOVE_SCORE: i32 = 2_000_000;
const CAPTURE_BASE_SCORE: i32 = 1_000_000;
const QUEEN_PROMOTION_BONUS: i32 = 300_000;
const FIRST_KILLER_SCORE: i32 = 900_000;
const SECOND_KILLER_SCORE: i32 = 800_000;

fn move_score(m: Move, killers: [Option<Move>; 2], hash_move: Option<Move>) -> i32 {
    if hash_move == Some(m) {
        return HASH_MOVE_SCORE;
    }
    let mut score = 0;
    if m.is_capture() || m.is_en_passant() {
        let victim = if m.is_en_passant() { value_of(WP) } else { value_of(m.capture()) };
        score = CAPTURE_BASE_SCORE + victim * 64 / exchange_value_of(m.piece());
    }
    if m.is_queen_promotion() {
        score = score.max(CAPTURE_BASE_SCORE) + QUEEN_PROMOTION_BONUS;
    }
    if score == 0 {
        if killers[0] == Some(m) {
            score = FIRST_KILLER_SCORE;
        } else if killers[1] == Some(m) {
            score = SECOND_KILLER_SCORE;
        }
    }
    score
}

fn score_moves(list: &mut MoveList, killers: [Option<Move>; 2], hash_move: Option<Move>) {
    for entry in list.entries_mut() {
        if let Some(m) = entry.mov {
            entry.score = move_score(m, killers, hash_move);
        }
    }
}

/// A pawn push into territory no enemy pawn controls or can come to
/// control is a runner and must not be reduced or pruned.
fn is_dangerous_pawn_advance(m: Move, prevention: u64) -> bool {
    type_of(m.piece()) == PAWN
        && m.capture() == EMPTY
        && !m.is_en_passant()
        && bit(m.to()) & prevention == 0
}

#[allow(clippy::too_many_arguments, clippy::too_many_lines)]
pub fn alpha_beta(
    pos: &mut Board,
    info: &mut SearchInfo,
    tt: &mut TranspositionTable,
    mut depth: i32,
    mut alpha: i32,
    mut beta: i32,
    ply: usize,
    pv: &mut PVariation,
    null_allowed: bool,
) -> i32 {
    pv.clear();

    let in_check = pos.in_check();
    if depth <= 0 && !in_check {
        return quiescence(pos, info, tt, alpha, beta, ply);
    }

    info.bump_node();
    if info.stopped() {
        return INFINITY;
    }

    if ply > 0 {
        let repetitions = pos.repetitions();
        if pos.fifty_move_counter() >= 100
            || pos.insufficient_material()
            || repetitions >= 2
            || (repetitions >= 1 && ply >= 2)
        {
            return draw_score(ply);
        }
        if ply >= PLY_LIMIT - 1 {
            return pos.evaluate();
        }

        // mate-distance pruning: even the fastest mate from here cannot
        // beat one already found closer to the root.
        alpha = alpha.max(ply as i32 - CHECKMATE);
        beta = beta.min(CHECKMATE - ply as i32 - 1);
        if alpha >= beta {
            return alpha;
        }
    }

    let mut hash_move = None;
    if let Some(hit) = tt.probe(pos.hash_key(), ply) {
        hash_move = hit.mov;
        if ply > 0 && hit.depth >= depth {
            match hit.bound {
                Bound::Exact => return hit.value,
                Bound::Lower if hit.value >= beta => return hit.value,
                Bound::Upper if hit.value <= alpha => return hit.value,
                _ => {}
            }
        }
    }

    let us = pos.turn();
    if null_allowed
        && !in_check
        && ply > 0
        && depth >= 3
        && pos.has_non_pawn_material(us)
    {
        let reduction = NULL_MOVE_REDUCTION + i32::from(depth >= 7);
        let mut line = PVariation::default();
        pos.make_nullmove();
        let score = -alpha_beta(
            pos,
            info,
            tt,
            depth - 1 - reduction,
            -beta,
            -beta + 1,
            ply + 1,
            &mut line,
            false,
        );
        pos.unmake_nullmove();
        if info.stopped() {
            return INFINITY;
        }
        if score >= beta {
            return score;
        }
    }

    let mut list = MoveList::new();
    pos.generate_moves(&mut list);
    if list.is_empty() {
        return if in_check { ply as i32 - CHECKMATE } else { draw_score(ply) };
    }

    // extend forced situations rather than trusting a shallow verdict.
    if in_check || list.len() == 1 {
        depth += 1;
    }

    score_moves(&mut list, info.killer_moves(ply), hash_move);
    list.sort();
    let irreducible = list.entries_mut().iter().take_while(|e| e.score > 0).count();

    let prevention = pos.pawn_prevention_mask(us);
    let futility_applicable = (depth as usize) < FUTILITY_MARGINS.len() && !in_check;
    let static_eval = if futility_applicable { pos.evaluate() } else { 0 };

    let original_alpha = alpha;
    let mut best_move = None;
    let mut child_pv = PVariation::default();

    for (i, m) in list.iter().enumerate() {
        pos.make_move(m);
        let gives_check = pos.in_check();
        let dangerous = in_check
            || gives_check
            || alpha < -NEAR_CHECKMATE
            || is_dangerous_pawn_advance(m, prevention);

        if futility_applicable
            && !dangerous
            && static_eval + FUTILITY_MARGINS[depth as usize] + value_of(m.capture()) <= alpha
        {
            pos.unmake_move();
            continue;
        }

        let mut score;
        if i >= irreducible && !dangerous {
            // late quiet move: probe at reduced depth with a zero window.
            score = -alpha_beta(
                pos,
                info,
                tt,
                depth - 1 - LATE_MOVE_REDUCTION,
                -alpha - 1,
                -alpha,
                ply + 1,
                &mut child_pv,
                true,
            );
        } else if i > 0 {
            score =
                -alpha_beta(pos, info, tt, depth - 1, -alpha - 1, -alpha, ply + 1, &mut child_pv, true);
        } else {
            // the first move is searched with the full window below.
            score = alpha + 1;
        }
        if score > alpha {
            score = -alpha_beta(pos, info, tt, depth - 1, -beta, -alpha, ply + 1, &mut child_pv, true);
        }
        pos.unmake_move();

        if info.stopped() {
            return INFINITY;
        }

        if score >= beta {
            tt.store(pos.hash_key(), ply, Some(m), score, Bound::Lower, depth);
            if i >= irreducible {
                info.insert_killer(ply, m);
            }
            return score;
        }
        if score > alpha {
            alpha = score;
            best_move = Some(m);
            pv.load(m, &child_pv);
        }
    }

    let bound = if alpha == original_alpha { Bound::Upper } else { Bound::Exact };
    tt.store(pos.hash_key(), ply, best_move, alpha, bound, depth);
    alpha
}

fn quiescence(
    pos: &mut Board,
    info: &mut SearchInfo,
    tt: &mut TranspositionTable,
    mut alpha: i32,
    beta: i32,
    ply: usize,
) -> i32 {
    info.bump_node();
    if info.stopped() {
        return INFINITY;
    }
    if ply >= PLY_LIMIT - 1 {
        return pos.evaluate();
    }

    let stand_pat = pos.evaluate();
    if stand_pat >= beta {
        return stand_pat;
    }
    alpha = alpha.max(stand_pat);

    let mut hash_move = None;
    if let Some(hit) = tt.probe(pos.hash_key(), ply) {
        match hit.bound {
            Bound::Exact => return hit.value,
            Bound::Lower if hit.value >= beta => return hit.value,
            Bound::Upper if hit.value <= alpha => return hit.value,
            _ => {}
        }
        if let Some(m) = hit.mov {
            if m.is_capture() {
                hash_move = Some(m);
            }
        }
    }

    let mut list = MoveList::new();
    pos.generate_quiescence_moves(&mut list);
    if list.is_empty() {
        return alpha;
    }
    score_moves(&mut list, [None; 2], hash_move);
    list.sort();

    let us = pos.turn();
    let original_alpha = alpha;
    let mut best_move = None;

    for m in list.iter() {
        // captures that lose material outright are not worth resolving.
        if pos.see(m) < 0 {
            continue;
        }
        pos.make_move(m);
        if pos.king_attacked(us) {
            pos.unmake_move();
            continue;
        }
        let score = -quiescence(pos, info, tt, -beta, -alpha, ply + 1);
        pos.unmake_move();
        if info.stopped() {
            return INFINITY;
        }
        if score >= beta {
            tt.store(pos.hash_key(), ply, Some(m), score, Bound::Lower, 0);
            return score;
        }
        if score > alpha {
            alpha = score;
            best_move = Some(m);
        }
    }

    let bound = if alpha == original_alpha { Bound::Upper } else { Bound::Exact };
    tt.store(pos.hash_key(), ply, best_move, alpha, bound, 0);
    alpha
}

fn format_score(score: i32) -> String {
    if is_mate_score(score) {
        let moves_to_mate = (CHECKMATE - score.abs() + 1) / 2;
        if score > 0 {
            format!("mate {moves_to_mate}")
        } else {
            format!("mate -{moves_to_mate}")
        }
    } else {
        format!("cp {score}")
    }
}

/// Iterative deepening driver. Returns the best move found and its
/// score from the side to move's point of view; `None` only when the
/// position has no legal moves at all.
pub fn search_position<const REPORT: bool>(
    pos: &mut Board,
    info: &mut SearchInfo,
    tt: &mut TranspositionTable,
) -> (Option<Move>, i32) {
    info.clear_for_search();
    info.time_manager.start_search(pos.half_moves());

    let mut list = MoveList::new();
    pos.generate_moves(&mut list);
    if list.is_empty() {
        let score = if pos.in_check() { -CHECKMATE } else { DRAW_VALUE };
        return (None, score);
    }
    let mut root_moves: Vec<Move> = list.iter().collect();

    // with a single reply there is nothing to deliberate about on a
    // running clock.
    if root_moves.len() == 1 && matches!(info.time_manager.limit, SearchLimit::Fischer { .. }) {
        return (Some(root_moves[0]), info.time_manager.prev_score);
    }

    let depth_limit = info.time_manager.depth_limit().unwrap_or(DEPTH_LIMIT).min(DEPTH_LIMIT);
    let mut best_move = root_moves[0];
    let mut best_score = 0;

    'deepening: for depth in 1..=depth_limit as i32 {
        // the collapse detector compares against the previous iteration.
        info.final_alpha = info.root_alpha;

        let mut alpha = -INFINITY;
        let mut iteration_best = None;
        let mut pv = PVariation::default();
        let mut child_pv = PVariation::default();

        for i in 0..root_moves.len() {
            let m = root_moves[i];
            pos.make_move(m);
            let mut score;
            if i == 0 {
                // the move that led the previous iteration gets an
                // aspiration window around its old score.
                let (a, b) = if depth == 1 {
                    (-INFINITY, INFINITY)
                } else {
                    (info.root_alpha - ASPIRATION_WINDOW, info.root_alpha + ASPIRATION_WINDOW)
                };
                score = -alpha_beta(pos, info, tt, depth - 1, -b, -a, 1, &mut child_pv, true);
                if !info.stopped() && (score <= a || score >= b) {
                    info.time_manager.grant_research_extension();
                    score = -alpha_beta(
                        pos, info, tt, depth - 1, -INFINITY, INFINITY, 1, &mut child_pv, true,
                    );
                }
            } else {
                score =
                    -alpha_beta(pos, info, tt, depth - 1, -alpha - 1, -alpha, 1, &mut child_pv, true);
                if !info.stopped() && score > alpha {
                    score = -alpha_beta(
                        pos, info, tt, depth - 1, -INFINITY, -alpha, 1, &mut child_pv, true,
                    );
                }
            }
            pos.unmake_move();
            if info.stopped() {
                break 'deepening;
            }
            if i == 0 || score > alpha {
                alpha = score;
                iteration_best = Some(m);
                pv.load(m, &child_pv);
                info.final_alpha = alpha;
                // promote the new best to the front, keeping the rest in
                // relative order.
                root_moves[..=i].rotate_right(1);
            }
        }

        if let Some(m) = iteration_best {
            best_move = m;
            best_score = alpha;
            info.root_alpha = alpha;
            info.time_manager.prev_score = alpha;
        }
        if REPORT {
            println!(
                "info depth {depth} score {} nodes {} time {} pv {pv}",
                format_score(best_score),
                info.nodes,
                info.time_manager.elapsed().as_millis(),
            );
        }
        if info.time_manager.past_soft_limit() && !info.time_manager.extension_pending() {
            break;
        }
    }

    info.final_alpha = info.root_alpha;
    if REPORT {
        println!("bestmove {best_move}");
    }
    (Some(best_move), best_score)
}
