pub mod evaluation;

pub use evaluation::{evaluate_board, evaluate_board_simple, EvaluationWeights, GamePhase};
