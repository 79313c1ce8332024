//! Decision strategies.
//!
//! `Strategy` is a tagged dispatch between the two engines, selected once at
//! construction. Capabilities the simple engine lacks (memory recording,
//! phase lookup, the aggressive variant) are explicit no-op or `None` arms,
//! never probed per call.

pub mod memory;
pub mod simple;

pub use memory::MemoryStrategy;
pub use simple::SimpleStrategy;

use crate::game::board::{Board, Direction};
use crate::memory::MemoryStats;
use crate::scoring::evaluation::{evaluate_board_simple, GamePhase};
use rand::RngExt;
use std::path::Path;

/// Uniform fallback used when no direction is legal. Callers must treat the
/// paired sentinel score as the no-legal-move signal, not execute the move.
pub(crate) fn random_direction() -> Direction {
    Direction::ALL[rand::rng().random_range(0..Direction::ALL.len())]
}

pub enum Strategy {
    Simple(SimpleStrategy),
    Memory(MemoryStrategy),
}

impl Strategy {
    pub fn simple() -> Self {
        Strategy::Simple(SimpleStrategy)
    }

    pub fn memory<P: AsRef<Path>>(memory_file: P) -> Self {
        Strategy::Memory(MemoryStrategy::new(memory_file))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Simple(_) => "simple",
            Strategy::Memory(_) => "memory",
        }
    }

    /// The simple engine has no phase model and always reports mid-game.
    pub fn game_phase(&self, max_tile: u32) -> GamePhase {
        match self {
            Strategy::Simple(_) => GamePhase::Mid,
            Strategy::Memory(_) => GamePhase::from_max_tile(max_tile),
        }
    }

    pub fn evaluate_position(&self, board: &Board) -> f64 {
        match self {
            Strategy::Simple(_) => evaluate_board_simple(board),
            Strategy::Memory(m) => m.evaluate_position(board),
        }
    }

    pub fn find_best_move(&mut self, board: &Board, next_tile: u32, depth: i32) -> (f64, Direction) {
        match self {
            Strategy::Simple(s) => s.find_best_move(board),
            Strategy::Memory(m) => m.find_best_move(board, next_tile, depth),
        }
    }

    /// `Some` only for engines with an aggressive variant.
    pub fn find_aggressive_move(&self, board: &Board) -> Option<(f64, Direction)> {
        match self {
            Strategy::Simple(_) => None,
            Strategy::Memory(m) => Some(m.find_aggressive_move(board)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record_move(
        &mut self,
        board: &Board,
        next_tile: u32,
        direction: Direction,
        new_board: &Board,
        score_before: f64,
        score_after: f64,
    ) {
        match self {
            Strategy::Simple(_) => {}
            Strategy::Memory(m) => {
                m.record_move(board, next_tile, direction, new_board, score_before, score_after)
            }
        }
    }

    /// Finalizes a game: the memory engine reports its counters and flushes
    /// the store when the game was worth keeping.
    pub fn end_game(&mut self, game_max_tile: u32) {
        match self {
            Strategy::Simple(_) => {}
            Strategy::Memory(m) => m.end_game(game_max_tile),
        }
    }

    pub fn memory_stats(&self) -> Option<MemoryStats> {
        match self {
            Strategy::Simple(_) => None,
            Strategy::Memory(m) => Some(m.memory_stats()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_strategy_reports_no_optional_capabilities() {
        let strategy = Strategy::simple();
        assert_eq!(strategy.name(), "simple");
        assert!(strategy.find_aggressive_move(&Board::empty()).is_none());
        assert!(strategy.memory_stats().is_none());
        assert_eq!(strategy.game_phase(384), GamePhase::Mid);
    }

    #[test]
    fn memory_strategy_exposes_phase_and_stats() {
        let strategy = Strategy::memory("does-not-exist/memory.json");
        assert_eq!(strategy.name(), "memory");
        assert_eq!(strategy.game_phase(384), GamePhase::Late);
        let stats = strategy.memory_stats().expect("memory stats expected");
        assert_eq!(stats.states_remembered, 0);
    }
}
