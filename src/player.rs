//! The player contract consumed by front ends: a tagged variant over a
//! human (moves arrive on a channel) and the engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use crate::board::evaluation::DRAW_VALUE;
use crate::board::Board;
use crate::chessmove::Move;
use crate::search::search_position;
use crate::searchinfo::SearchInfo;
use crate::timemgmt::SearchLimit;
use crate::transpositiontable::TranspositionTable;

pub const MEGABYTE: usize = 1024 * 1024;
pub const DEFAULT_HASH_MB: usize = 64;

/// The engine half of the player contract. Owns its transposition table,
/// killer tables and search bookkeeping; searches on the caller's board
/// and leaves it bit-identical.
pub struct Engine {
    name: String,
    tt: TranspositionTable,
    info: SearchInfo,
}

impl Engine {
    pub fn new(name: impl Into<String>, hash_mb: usize, limit: SearchLimit) -> Self {
        let abort = Arc::new(AtomicBool::new(false));
        let mut info = SearchInfo::new(abort);
        info.time_manager.limit = limit;
        Self { name: name.into(), tt: TranspositionTable::new(hash_mb * MEGABYTE), info }
    }

    pub fn set_limit(&mut self, limit: SearchLimit) {
        self.info.time_manager.limit = limit;
    }

    /// A handle that aborts the running (or next) search when set. This
    /// is how an arbiter stops the engine from another thread while
    /// `get_move` holds the engine itself.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.info.abort)
    }

    pub fn get_move(&mut self, pos: &mut Board) -> Option<Move> {
        self.info.abort.store(false, Ordering::Relaxed);
        let (best, _) = search_position::<true>(pos, &mut self.info, &mut self.tt);
        best
    }

    /// Quiet searches for harnesses: no info lines on stdout.
    pub fn get_move_quiet(&mut self, pos: &mut Board) -> Option<Move> {
        self.info.abort.store(false, Ordering::Relaxed);
        let (best, _) = search_position::<false>(pos, &mut self.info, &mut self.tt);
        best
    }

    pub fn stop(&self) {
        self.info.abort.store(true, Ordering::Relaxed);
    }

    pub fn accepts_draw(&self) -> bool {
        self.info.final_alpha <= DRAW_VALUE
    }

    pub fn reset(&mut self) {
        self.tt.clear();
        self.info.reset();
    }

    pub fn nodes(&self) -> u64 {
        self.info.nodes
    }
}

/// A human player: `get_move` blocks until the front end pushes a move
/// down the channel, or the abort flag is raised.
pub struct Human {
    name: String,
    moves: Receiver<Move>,
    abort: Arc<AtomicBool>,
}

impl Human {
    pub fn new(name: impl Into<String>) -> (Self, Sender<Move>) {
        let (tx, rx) = channel();
        (Self { name: name.into(), moves: rx, abort: Arc::new(AtomicBool::new(false)) }, tx)
    }

    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    fn get_move(&mut self) -> Option<Move> {
        self.abort.store(false, Ordering::Relaxed);
        loop {
            match self.moves.recv_timeout(Duration::from_millis(25)) {
                Ok(m) => return Some(m),
                Err(RecvTimeoutError::Timeout) => {
                    if self.abort.load(Ordering::Relaxed) {
                        return None;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

pub enum Player {
    Human(Human),
    Engine(Box<Engine>),
}

impl Player {
    pub fn name(&self) -> &str {
        match self {
            Self::Human(human) => &human.name,
            Self::Engine(engine) => &engine.name,
        }
    }

    /// Whether this player would take a draw offer right now. Humans are
    /// asked by the front end, never by the core.
    pub fn accepts_draw(&self) -> bool {
        match self {
            Self::Human(_) => false,
            Self::Engine(engine) => engine.accepts_draw(),
        }
    }

    /// Produces a move for the given position, or `None` if stopped (or,
    /// for the engine, if the position has no legal moves). The position
    /// is returned in exactly the state it was handed over.
    pub fn get_move(&mut self, pos: &mut Board) -> Option<Move> {
        match self {
            Self::Human(human) => human.get_move(),
            Self::Engine(engine) => engine.get_move(pos),
        }
    }

    /// Requests that a concurrently running `get_move` return soon.
    /// Idempotent; clone [`Engine::abort_handle`]/[`Human::abort_handle`]
    /// to signal from another thread.
    pub fn stop(&self) {
        match self {
            Self::Human(human) => human.abort.store(true, Ordering::Relaxed),
            Self::Engine(engine) => engine.stop(),
        }
    }

    /// Forgets everything learned: hash table, killers and score memory.
    pub fn reset(&mut self) {
        match self {
            Self::Human(_) => {}
            Self::Engine(engine) => engine.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::searchinfo::DEPTH_LIMIT;

    #[test]
    fn engine_leaves_the_position_untouched() {
        let mut engine = Engine::new("test", 1, SearchLimit::Depth(3));
        let mut pos = Board::startpos();
        let before = pos.clone();
        let m = engine.get_move_quiet(&mut pos).expect("startpos has moves");
        assert!(pos.is_legal(m));
        assert_eq!(pos, before);
        assert!(engine.nodes() > 0);
    }

    #[test]
    fn engine_accepts_draws_only_when_not_winning() {
        let mut engine = Engine::new("test", 1, SearchLimit::Depth(3));
        // up a queen: no draws.
        let mut pos = Board::from_fen("4k3/8/8/8/8/8/8/QK6 w - - 0 1").unwrap();
        engine.get_move_quiet(&mut pos);
        assert!(!engine.accepts_draw());
        // down a queen: yes please.
        let mut pos = Board::from_fen("4k3/8/8/8/8/8/8/QK6 b - - 0 1").unwrap();
        engine.reset();
        engine.get_move_quiet(&mut pos);
        assert!(engine.accepts_draw());
    }

    #[test]
    fn stop_handle_aborts_from_outside() {
        let mut engine = Engine::new("test", 1, SearchLimit::Depth(DEPTH_LIMIT));
        let handle = engine.abort_handle();
        let mut pos = Board::startpos();
        let searcher = std::thread::scope(|scope| {
            let worker = scope.spawn(|| engine.get_move_quiet(&mut pos));
            std::thread::sleep(Duration::from_millis(50));
            handle.store(true, Ordering::Relaxed);
            worker.join().expect("search thread must not panic")
        });
        assert!(searcher.is_some());
    }

    #[test]
    fn human_returns_channel_moves_and_honours_stop() {
        let (mut human, tx) = Human::new("a person");
        let m = Move::new(52, 36, crate::piece::WP, 0, 0);
        tx.send(m).unwrap();
        assert_eq!(human.get_move(), Some(m));

        // the flag is consumed at entry, so raise it from another thread
        // after the wait begins.
        let (mut human, _tx) = Human::new("a person");
        let handle = human.abort_handle();
        let got = std::thread::scope(|scope| {
            let worker = scope.spawn(move || human.get_move());
            std::thread::sleep(Duration::from_millis(40));
            handle.store(true, Ordering::Relaxed);
            worker.join().unwrap()
        });
        assert!(got.is_none());
    }

    #[test]
    fn player_dispatch() {
        let mut player = Player::Engine(Box::new(Engine::new("boxed", 1, SearchLimit::Depth(2))));
        assert_eq!(player.name(), "boxed");
        let mut pos = Board::startpos();
        assert!(player.get_move(&mut pos).is_some());
        player.stop();
        player.reset();

        let (human, _tx) = Human::new("someone");
        let player = Player::Human(human);
        assert_eq!(player.name(), "someone");
        assert!(!player.accepts_draw());
    }
}
