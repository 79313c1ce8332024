pub mod board;
pub mod simulate;

pub use board::{Board, Direction, MoveOutcome};
pub use simulate::{apply, can_merge, is_game_over};
