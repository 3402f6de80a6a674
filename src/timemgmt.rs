//! Time management.
//!
//! The base window for a Fischer clock is
//! `(time_left - increment) / max(40, 100 - half_moves / 2) + increment`,
//! less a latency allowance. Extensions (a failed aspiration research, or
//! the root score collapsing) may grow the window, but never beyond the
//! ceiling of `0.3 * (time_left - increment)` over the base.

use std::time::{Duration, Instant};

/// Milliseconds assumed lost to process and I/O overhead per move.
const EXPECTED_LATENCY_MS: f64 = 5.0;

/// Fraction of the base window that must have elapsed before a failed
/// first-move aspiration buys more time, and the fraction granted.
const RESEARCH_EXTENSION_THRESHOLD: f64 = 0.5;
const RESEARCH_EXTENSION: f64 = 0.8;

/// Extra window fraction by severity of the score collapse at the root,
/// indexed by `min(loss / 40, 4)`.
const LOSS_EXTENSIONS: [f64; 5] = [0.0, 0.6, 0.9, 1.2, 1.5];

/// Elapsed fraction of the window after which a finished depth is the
/// last one.
const SOFT_STOP_FRACTION: f64 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchLimit {
    Infinite,
    /// Fixed depth, no clock.
    Depth(usize),
    /// Exactly this many milliseconds.
    MoveTime(u64),
    /// A Fischer clock: remaining time and per-move increment.
    Fischer { time_left: u64, increment: u64 },
}

impl Default for SearchLimit {
    fn default() -> Self {
        Self::Infinite
    }
}

#[derive(Clone, Debug)]
pub struct TimeManager {
    pub start: Instant,
    pub limit: SearchLimit,
    /// The window as originally allocated, in milliseconds.
    base_window: f64,
    /// The window including any extensions granted so far.
    window: f64,
    /// Upper bound on the extended window.
    max_window: f64,
    loss_level: usize,
    research_extended: bool,
    /// Best root score of the previous completed iteration.
    pub prev_score: i32,
}

impl Default for TimeManager {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            limit: SearchLimit::Infinite,
            base_window: 0.0,
            window: 0.0,
            max_window: 0.0,
            loss_level: 0,
            research_extended: false,
            prev_score: 0,
        }
    }
}

impl TimeManager {
    /// Starts the clock and allocates the window for one move.
    pub fn start_search(&mut self, half_moves: usize) {
        self.start = Instant::now();
        self.loss_level = 0;
        self.research_extended = false;
        match self.limit {
            SearchLimit::Infinite | SearchLimit::Depth(_) => {
                self.base_window = f64::INFINITY;
                self.window = f64::INFINITY;
                self.max_window = f64::INFINITY;
            }
            SearchLimit::MoveTime(ms) => {
                let window = (ms as f64 - EXPECTED_LATENCY_MS).max(1.0);
                self.base_window = window;
                self.window = window;
                self.max_window = window;
            }
            SearchLimit::Fischer { time_left, increment } => {
                let time_left = time_left as f64;
                let increment = increment as f64;
                let usable = (time_left - increment).max(0.0);
                let divisor = (100.0 - half_moves as f64 / 2.0).max(40.0);
                let window = (usable / divisor + increment - EXPECTED_LATENCY_MS).max(1.0);
                // never budget more than the clock actually holds.
                let hard_cap = (time_left - EXPECTED_LATENCY_MS).max(1.0);
                self.base_window = window.min(hard_cap);
                self.window = self.base_window;
                self.max_window = (self.base_window + 0.3 * usable).min(hard_cap);
            }
        }
    }

    pub fn depth_limit(&self) -> Option<usize> {
        match self.limit {
            SearchLimit::Depth(d) => Some(d),
            _ => None,
        }
    }

    pub const fn is_timed(&self) -> bool {
        matches!(self.limit, SearchLimit::MoveTime(_) | SearchLimit::Fischer { .. })
    }

    fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Hard stop: the window is spent.
    pub fn past_limit(&self) -> bool {
        self.is_timed() && self.elapsed_ms() >= self.window
    }

    /// Soft stop: enough of the window is gone that starting another
    /// depth would be wasted work.
    pub fn past_soft_limit(&self) -> bool {
        self.is_timed() && self.elapsed_ms() >= SOFT_STOP_FRACTION * self.window
    }

    pub const fn extension_pending(&self) -> bool {
        self.loss_level > 0 || self.research_extended
    }

    /// Called when the first root move falls out of its aspiration
    /// window late in the allocated time.
    pub fn grant_research_extension(&mut self) {
        if !self.research_extended
            && self.is_timed()
            && self.elapsed_ms() >= RESEARCH_EXTENSION_THRESHOLD * self.base_window
        {
            self.research_extended = true;
            self.window = (self.window + RESEARCH_EXTENSION * self.base_window).min(self.max_window);
        }
    }

    /// Called when the root score has dropped `loss` centipawns below the
    /// previous iteration; a deeper collapse buys a wider window.
    pub fn grant_loss_extension(&mut self, loss: i32) {
        if loss < 40 || !self.is_timed() {
            return;
        }
        let level = ((loss / 40) as usize).min(LOSS_EXTENSIONS.len() - 1);
        if level > self.loss_level {
            self.loss_level = level;
            self.window =
                (self.base_window + LOSS_EXTENSIONS[level] * self.base_window).min(self.max_window);
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untimed_limits_never_stop() {
        let mut tm = TimeManager::default();
        tm.start_search(0);
        assert!(!tm.past_limit());
        assert!(!tm.past_soft_limit());

        tm.limit = SearchLimit::Depth(5);
        tm.start_search(0);
        assert!(!tm.past_limit());
        assert_eq!(tm.depth_limit(), Some(5));
    }

    #[test]
    fn movetime_is_taken_nearly_whole() {
        let mut tm = TimeManager { limit: SearchLimit::MoveTime(100), ..Default::default() };
        tm.start_search(0);
        assert!(!tm.past_limit());
        assert!((tm.window - 95.0).abs() < 1e-9);
    }

    #[test]
    fn fischer_allocation_shrinks_early_and_respects_the_clock() {
        let mut tm = TimeManager {
            limit: SearchLimit::Fischer { time_left: 60_000, increment: 1_000 },
            ..Default::default()
        };
        tm.start_search(0);
        let early = tm.window;
        tm.start_search(160);
        let late = tm.window;
        // with fewer moves left to plan for, each move gets more time.
        assert!(late > early);
        // the window must always fit inside the remaining clock.
        let mut desperate = TimeManager {
            limit: SearchLimit::Fischer { time_left: 50, increment: 0 },
            ..Default::default()
        };
        desperate.start_search(40);
        assert!(desperate.window <= 50.0);
    }

    #[test]
    fn loss_extensions_grow_with_severity_and_cap() {
        let mut tm = TimeManager {
            limit: SearchLimit::Fischer { time_left: 60_000, increment: 0 },
            ..Default::default()
        };
        tm.start_search(0);
        let base = tm.window;
        tm.grant_loss_extension(39);
        assert_eq!(tm.window, base);
        assert!(!tm.extension_pending());
        tm.grant_loss_extension(40);
        let once = tm.window;
        assert!(once > base);
        assert!(tm.extension_pending());
        // a lighter loss later never shrinks the window back.
        tm.grant_loss_extension(40);
        assert_eq!(tm.window, once);
        tm.grant_loss_extension(400);
        assert!(tm.window >= once);
        assert!(tm.window <= tm.max_window);
    }
}
