//! Per-search state: node accounting, the abort flag, killer slots and
//! principal variation lines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::chessmove::Move;
use crate::timemgmt::TimeManager;

/// Hard ceiling on nominal search depth.
pub const DEPTH_LIMIT: usize = 64;
/// Hard ceiling on the distance from root, extensions included.
pub const PLY_LIMIT: usize = 128;
/// How many nodes pass between abort and clock checks.
pub const NODE_RESOLUTION: u64 = 1000;

/// A principal variation line. Child lines are prepended into parents as
/// the search unwinds, which amounts to the classic triangular PV table
/// held on the recursion stack.
#[derive(Clone, Debug, Default)]
pub struct PVariation {
    pub line: ArrayVec<Move, PLY_LIMIT>,
}

impl PVariation {
    pub fn clear(&mut self) {
        self.line.clear();
    }

    pub fn first(&self) -> Option<Move> {
        self.line.first().copied()
    }

    /// `self = m + rest`, the PV prepend step.
    pub fn load(&mut self, m: Move, rest: &Self) {
        self.line.clear();
        self.line.push(m);
        for &follow_up in rest.line.iter().take(PLY_LIMIT - 1) {
            self.line.push(follow_up);
        }
    }
}

impl std::fmt::Display for PVariation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        for m in &self.line {
            write!(f, "{sep}{m}")?;
            sep = " ";
        }
        Ok(())
    }
}

pub struct SearchInfo {
    pub time_manager: TimeManager,
    /// Set from outside to abort the search; polled, never waited on.
    pub abort: Arc<AtomicBool>,
    /// Local mirror of the abort state so hot paths avoid the atomic.
    stopped: bool,
    pub nodes: u64,
    node_countdown: u64,
    /// Best root score of the previous completed iteration.
    pub root_alpha: i32,
    /// Best root score of the iteration in progress.
    pub final_alpha: i32,
    killers: [[Option<Move>; 2]; PLY_LIMIT],
}

impl SearchInfo {
    pub fn new(abort: Arc<AtomicBool>) -> Self {
        Self {
            time_manager: TimeManager::default(),
            abort,
            stopped: false,
            nodes: 0,
            node_countdown: NODE_RESOLUTION,
            root_alpha: 0,
            final_alpha: 0,
            killers: [[None; 2]; PLY_LIMIT],
        }
    }

    /// Per-search reset. The abort flag is deliberately left alone: the
    /// owner of the flag decides when a stop request is consumed.
    pub fn clear_for_search(&mut self) {
        self.stopped = false;
        self.nodes = 0;
        self.node_countdown = NODE_RESOLUTION;
        self.killers = [[None; 2]; PLY_LIMIT];
    }

    pub fn reset(&mut self) {
        self.clear_for_search();
        self.root_alpha = 0;
        self.final_alpha = 0;
        self.time_manager.prev_score = 0;
    }

    /// Counts a node, and every [`NODE_RESOLUTION`] nodes looks at the
    /// clock, the abort flag and a possible root-score collapse.
    pub fn bump_node(&mut self) {
        self.nodes += 1;
        self.node_countdown -= 1;
        if self.node_countdown == 0 {
            self.node_countdown = NODE_RESOLUTION;
            self.check_up();
        }
    }

    pub fn check_up(&mut self) {
        let loss = self.root_alpha - self.final_alpha;
        if loss >= 40 {
            self.time_manager.grant_loss_extension(loss);
        }
        if self.abort.load(Ordering::Relaxed) || self.time_manager.past_limit() {
            self.stopped = true;
        }
    }

    pub const fn stopped(&self) -> bool {
        self.stopped
    }

    pub fn killer_moves(&self, ply: usize) -> [Option<Move>; 2] {
        self.killers[ply]
    }

    /// Shifts the slots and records a fresh killer at `ply`.
    pub fn insert_killer(&mut self, ply: usize, m: Move) {
        debug_assert!(ply < PLY_LIMIT);
        let entry = &mut self.killers[ply];
        if entry[0] != Some(m) {
            entry[1] = entry[0];
            entry[0] = Some(m);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::{WN, WP};

    #[test]
    fn killers_shift_and_deduplicate() {
        let mut info = SearchInfo::new(Arc::new(AtomicBool::new(false)));
        let a = Move::new(48, 40, WP, 0, 0);
        let b = Move::new(57, 42, WN, 0, 0);
        info.insert_killer(3, a);
        assert_eq!(info.killer_moves(3), [Some(a), None]);
        info.insert_killer(3, a);
        assert_eq!(info.killer_moves(3), [Some(a), None]);
        info.insert_killer(3, b);
        assert_eq!(info.killer_moves(3), [Some(b), Some(a)]);
        assert_eq!(info.killer_moves(4), [None, None]);
    }

    #[test]
    fn abort_flag_is_observed_on_the_node_boundary() {
        let abort = Arc::new(AtomicBool::new(false));
        let mut info = SearchInfo::new(Arc::clone(&abort));
        for _ in 0..NODE_RESOLUTION - 1 {
            info.bump_node();
        }
        abort.store(true, Ordering::Relaxed);
        assert!(!info.stopped());
        info.bump_node();
        assert!(info.stopped());
    }

    #[test]
    fn pv_prepend_builds_lines() {
        let mut child = PVariation::default();
        let mut parent = PVariation::default();
        let a = Move::new(48, 40, WP, 0, 0);
        let b = Move::new(57, 42, WN, 0, 0);
        child.load(b, &PVariation::default());
        parent.load(a, &child);
        assert_eq!(parent.line.as_slice(), &[a, b]);
        assert_eq!(parent.first(), Some(a));
        assert_eq!(parent.to_string(), format!("{a} {b}"));
    }
}
