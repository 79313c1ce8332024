//! # Threes Solver Library
//!
//! An automatic player for the Threes sliding-tile game.
//!
//! ## Features
//!
//! - **Simulation Engine**: exact move/merge semantics for the 4×4 board
//! - **Heuristic Evaluator**: phase-weighted structural board scoring
//! - **Search Engine**: bounded-depth search against worst-case tile placement
//! - **Experience Store**: persistent per-state move statistics that bias
//!   future decisions
//! - **Game Loop**: drives repeated games against a perception/automation
//!   surface, with retry budgets and run statistics
//!
//! ## Usage
//!
//! ```rust
//! use threes_solver::{
//!     strategy::Strategy,
//!     surface::SimulatedThrees,
//!     solver::{Solver, SolverConfig},
//! };
//!
//! let surface = SimulatedThrees::new(42);
//! let strategy = Strategy::simple();
//! let mut solver = Solver::new(surface, strategy, SolverConfig::for_tests());
//! let summary = solver.play();
//! assert!(summary.games_played >= 1);
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Board model and move simulation
pub mod game;

/// Heuristic evaluators and phase weights
pub mod scoring;

/// Decision strategies (simple and memory-backed)
pub mod strategy;

/// Persistent experience store
pub mod memory;

/// Perception/automation collaborator seams and the simulated surface
pub mod surface;

/// Game loop controller and run statistics
pub mod solver;

/// Log setup
pub mod logging;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Main error type for the Threes solver library
#[derive(Debug, thiserror::Error)]
pub enum ThreesSolverError {
    #[error("Perception error: {0}")]
    Perception(String),

    #[error("Automation error: {0}")]
    Automation(String),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ThreesSolverError>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
