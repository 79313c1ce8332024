//! Memory-backed decision engine.
//!
//! Bounded-depth search over the four directions, scoring each candidate
//! against the worst-case placement of the known next tile, then blending in
//! advice from the experience store for states seen in earlier games.

use crate::game::board::{Board, Direction};
use crate::game::simulate::apply;
use crate::memory::store::{state_fingerprint, ExperienceStore, MemoryStats};
use crate::scoring::evaluation::evaluate_board;
use rand::RngExt;
use std::path::Path;

/// How many free cells the worst-case look-ahead samples, in row-major
/// order. A tunable truncation: wider is slower and rarely changes the
/// chosen direction.
pub const PLACEMENT_SAMPLE_WIDTH: usize = 2;

/// Recursive levels below the first see this stand-in next tile; placing it
/// is a no-op, so deeper levels degenerate to move-only search.
const PLACEHOLDER_NEXT_TILE: u32 = 0;

/// Exploration noise is only injected while the board maximum is below this.
const EXPLORATION_MAX_TILE: u32 = 48;
const EXPLORATION_RATE: f64 = 0.1;

pub struct MemoryStrategy {
    store: ExperienceStore,
}

impl MemoryStrategy {
    /// Loads the experience store from `memory_file`; a missing or corrupt
    /// file starts an empty memory.
    pub fn new<P: AsRef<Path>>(memory_file: P) -> Self {
        MemoryStrategy {
            store: ExperienceStore::load(memory_file),
        }
    }

    pub fn evaluate_position(&self, board: &Board) -> f64 {
        evaluate_board(board)
    }

    /// Picks a direction for `board` knowing the upcoming tile.
    ///
    /// Every legal direction is scored by the worst-case value of its
    /// resulting board; the direction the store recommends for this exact
    /// state gets a bonus of `max(50, memory_score / 2)`. Ties go to the
    /// earlier direction in Left/Right/Up/Down order. While the maximum is
    /// still small, a 10% exploration roll returns a random legal candidate
    /// instead, to diversify what gets recorded.
    ///
    /// With no legal direction the sentinel `(NEG_INFINITY, random)` is
    /// returned; callers must treat it as game over.
    pub fn find_best_move(&mut self, board: &Board, next_tile: u32, depth: i32) -> (f64, Direction) {
        let advised = self.store.advice(&state_fingerprint(board, next_tile));

        let mut best: Option<(f64, Direction)> = None;
        let mut candidates: Vec<(f64, Direction)> = Vec::new();

        for direction in Direction::ALL {
            let outcome = apply(board, direction);
            if !outcome.changed {
                continue;
            }

            let mut score = self.worst_case_value(&outcome.board, next_tile, depth - 1);
            if let Some((advised_direction, memory_score)) = advised {
                if direction == advised_direction {
                    score += (0.5 * memory_score).max(50.0);
                }
            }

            candidates.push((score, direction));
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, direction));
            }
        }

        let Some(best) = best else {
            return (f64::NEG_INFINITY, super::random_direction());
        };

        if board.max_tile() < EXPLORATION_MAX_TILE && rand::rng().random_bool(EXPLORATION_RATE) {
            let (score, direction) = candidates[rand::rng().random_range(0..candidates.len())];
            log::debug!("Exploring: {}", direction);
            return (score, direction);
        }

        best
    }

    /// Adversarial estimate of a board's value: place the upcoming tile at
    /// each of the first few free cells and keep the minimum of the
    /// recursive scores. Robust lines beat lucky ones.
    fn worst_case_value(&mut self, board: &Board, next_tile: u32, depth: i32) -> f64 {
        if depth <= 0 {
            return evaluate_board(board);
        }

        let free = board.free_positions();
        if free.is_empty() {
            return evaluate_board(board);
        }

        let mut worst = f64::INFINITY;
        for &(row, col) in free.iter().take(PLACEMENT_SAMPLE_WIDTH) {
            let placed = board.with_tile(row, col, next_tile);
            let (score, _) = self.find_best_move(&placed, PLACEHOLDER_NEXT_TILE, depth - 1);
            if score < worst {
                worst = score;
            }
        }

        worst
    }

    /// Pressure-mode selection: evaluator-only, one ply deep, no memory
    /// bonus and no engine-state changes. Used when the board is nearly
    /// full and the stakes are high.
    pub fn find_aggressive_move(&self, board: &Board) -> (f64, Direction) {
        let mut best: Option<(f64, Direction)> = None;

        for direction in Direction::ALL {
            let outcome = apply(board, direction);
            if !outcome.changed {
                continue;
            }
            let score = evaluate_board(&outcome.board);
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, direction));
            }
        }

        best.unwrap_or_else(|| (f64::NEG_INFINITY, super::random_direction()))
    }

    /// Feeds the observed outcome of an executed move back into the store.
    pub fn record_move(
        &mut self,
        board: &Board,
        next_tile: u32,
        direction: Direction,
        new_board: &Board,
        score_before: f64,
        score_after: f64,
    ) {
        let fingerprint = state_fingerprint(board, next_tile);
        self.store
            .record(&fingerprint, direction, score_after - score_before, new_board.max_tile());
    }

    /// Reports memory counters and flushes the store when the finished game
    /// qualifies.
    pub fn end_game(&mut self, game_max_tile: u32) {
        let stats = self.store.stats();
        log::info!(
            "Memory stats: {}/{} hits ({:.1}%), {} states remembered",
            stats.memory_hits,
            stats.game_states_seen,
            stats.hit_rate * 100.0,
            stats.states_remembered
        );
        self.store.end_game(game_max_tile);
    }

    pub fn memory_stats(&self) -> MemoryStats {
        self.store.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> MemoryStrategy {
        MemoryStrategy::new("does-not-exist/memory.json")
    }

    // Boards with max >= 48 keep the exploration roll out of the way.

    #[test]
    fn never_selects_a_no_op_direction() {
        let board = Board::from_rows([
            [48, 6, 12, 24],
            [6, 12, 24, 48],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let mut strategy = fresh();
        let (score, direction) = strategy.find_best_move(&board, 3, 2);
        assert!(score.is_finite());
        let outcome = apply(&board, direction);
        assert!(outcome.changed);
    }

    #[test]
    fn terminal_board_yields_the_sentinel() {
        let board = Board::from_rows([
            [48, 3, 1, 3],
            [3, 1, 3, 1],
            [1, 3, 1, 3],
            [3, 1, 3, 1],
        ]);
        let mut strategy = fresh();
        let (score, _) = strategy.find_best_move(&board, 3, 3);
        assert_eq!(score, f64::NEG_INFINITY);
    }

    #[test]
    fn depth_zero_scores_equal_the_evaluator_on_the_result() {
        // depth 1: candidates are scored at depth 0, i.e. the evaluator on
        // the moved board with no placement look-ahead.
        let board = Board::from_rows([
            [96, 48, 0, 0],
            [12, 6, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let mut strategy = fresh();
        let (score, direction) = strategy.find_best_move(&board, 3, 1);
        let replay = apply(&board, direction);
        assert_eq!(score, evaluate_board(&replay.board));
    }

    #[test]
    fn advice_bonus_steers_the_choice() {
        let board = Board::from_rows([
            [96, 48, 0, 0],
            [12, 6, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let mut plain = fresh();
        let (_, unbiased) = plain.find_best_move(&board, 3, 1);

        // Teach the store that some *other* legal direction from this exact
        // state works out extremely well.
        let steered_to = Direction::ALL
            .into_iter()
            .find(|&d| d != unbiased && apply(&board, d).changed)
            .expect("another legal direction expected");
        let mut taught = fresh();
        let fingerprint = state_fingerprint(&board, 3);
        for step in 0..5u32 {
            taught
                .store
                .record(&fingerprint, steered_to, 5000.0, 96 + step);
        }

        let (_, biased) = taught.find_best_move(&board, 3, 1);
        assert_eq!(biased, steered_to);
    }

    #[test]
    fn aggressive_variant_is_stateless_and_legal() {
        let board = Board::from_rows([
            [96, 6, 12, 24],
            [6, 12, 24, 48],
            [3, 6, 12, 24],
            [0, 3, 6, 12],
        ]);
        let strategy = fresh();
        let (score, direction) = strategy.find_aggressive_move(&board);
        assert!(score.is_finite());
        assert!(apply(&board, direction).changed);
        assert_eq!(strategy.memory_stats().game_states_seen, 0);
    }

    #[test]
    fn record_move_feeds_the_store() {
        let board = Board::from_rows([
            [48, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let moved = apply(&board, Direction::Right).board;
        let mut strategy = fresh();
        strategy.record_move(&board, 3, Direction::Right, &moved, 100.0, 140.0);
        let stats = strategy.memory_stats();
        assert_eq!(stats.states_remembered, 1);
    }
}
