//! Seams toward the game being played.
//!
//! The solver core never parses pixels or synthesizes key events itself; it
//! talks to a perception collaborator (screen → board) and an automation
//! collaborator (direction → input). Failures surface as explicit `Result`
//! values for the game loop's retry budget, never as panics.

pub mod simulated;

pub use simulated::SimulatedThrees;

use crate::game::board::{Board, Direction};
use crate::Result;
use std::time::Duration;

/// Reads game state from the outside world (screen capture, calibration and
/// color matching in a real deployment). Returns how long the read took.
pub trait Perception {
    fn parse_board(&mut self) -> Result<(Board, Duration)>;

    /// The upcoming tile as the surface reports it. Values outside the legal
    /// next-tile set are the caller's problem; the loop substitutes a random
    /// low tile.
    fn parse_next_tile(&mut self) -> Result<(u32, Duration)>;
}

/// Issues moves to the game. Fire-and-forget: the core never inspects a
/// return value beyond the error, it re-reads the board instead.
pub trait Automation {
    fn execute(&mut self, direction: Direction) -> Result<()>;

    /// Brings the surface back to a fresh game after game over.
    fn restart(&mut self) -> Result<()>;
}
