use crate::game::board::{Board, Direction};
use crate::game::simulate::apply;
use crate::scoring::evaluation::evaluate_board_simple;

/// Greedy one-ply strategy over the fallback evaluator. No look-ahead, no
/// memory, no per-game state.
pub struct SimpleStrategy;

impl SimpleStrategy {
    /// Scores each legal direction by the resulting board alone and picks
    /// the first strict maximum in Left/Right/Up/Down order.
    pub fn find_best_move(&self, board: &Board) -> (f64, Direction) {
        let mut best: Option<(f64, Direction)> = None;

        for direction in Direction::ALL {
            let outcome = apply(board, direction);
            if !outcome.changed {
                continue;
            }
            let score = evaluate_board_simple(&outcome.board);
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, direction));
            }
        }

        best.unwrap_or_else(|| (f64::NEG_INFINITY, super::random_direction()))
    }
}
