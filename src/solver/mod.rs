//! Game loop controller.
//!
//! Drives one game at a time against the perception/automation surface:
//! read, decide, execute, re-read, record. Per-move failures are retried in
//! place up to a consecutive-failure budget; a finished or aborted game
//! always reports its move count and maximum tile before the surface is
//! restarted for the next one.

pub mod results;

pub use results::ResultsWriter;

use crate::game::board::Direction;
use crate::game::simulate::is_game_over;
use crate::strategy::Strategy;
use crate::surface::{Automation, Perception};
use crate::Result;
use rand::RngExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Values the vision collaborator can legally report as the next tile.
const VALID_NEXT_TILES: [u32; 5] = [1, 2, 3, 6, 12];

/// Consecutive per-move failures tolerated before the game is aborted.
const MAX_CONSECUTIVE_FAILURES: u32 = 5;

/// Search depth rises from 2 to 3 once free cells drop to this.
const TIGHT_BOARD_FREE_CELLS: usize = 4;

/// The aggressive variant kicks in at most this many free cells...
const AGGRESSIVE_FREE_CELLS: usize = 3;
/// ...and at least this maximum tile.
const AGGRESSIVE_MIN_MAX_TILE: u32 = 48;

/// Executed directions kept for the move log.
const LAST_MOVES_KEPT: usize = 10;

#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Tile value that ends a game as a win.
    pub target_tile: u32,
    /// Games to play before stopping; `None` plays until interrupted.
    pub max_games: Option<u32>,
    /// Log the compact board after every read.
    pub debug: bool,
    /// Wall-clock countdown before each game starts.
    pub countdown: Duration,
    /// Pause between issuing a move and re-reading the board, so the game
    /// surface has time to render.
    pub settle_delay: Duration,
    /// Pause before retrying after a per-move failure.
    pub retry_pause: Duration,
    /// Pause between games after a restart.
    pub between_games_pause: Duration,
    /// Per-game results CSV, appended at every game end.
    pub results_file: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            target_tile: 384,
            max_games: None,
            debug: false,
            countdown: Duration::from_secs(3),
            settle_delay: Duration::from_millis(200),
            retry_pause: Duration::from_secs(1),
            between_games_pause: Duration::from_secs(1),
            results_file: None,
        }
    }
}

impl SolverConfig {
    /// Zero-delay single-game configuration for tests.
    pub fn for_tests() -> Self {
        SolverConfig {
            target_tile: 384,
            max_games: Some(1),
            debug: false,
            countdown: Duration::ZERO,
            settle_delay: Duration::ZERO,
            retry_pause: Duration::ZERO,
            between_games_pause: Duration::ZERO,
            results_file: None,
        }
    }
}

/// What one finished (or aborted) game looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub moves: u32,
    pub max_tile: u32,
    pub reached_target: bool,
}

/// Totals across a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub games_played: u32,
    pub best_tile: u32,
    pub total_moves: u64,
}

impl RunSummary {
    pub fn average_moves(&self) -> f64 {
        self.total_moves as f64 / self.games_played.max(1) as f64
    }
}

enum StepOutcome {
    Continue,
    TargetReached,
    GameOver,
}

/// Synchronous, single-threaded game driver. The surface is the only
/// collaborator; the strategy is the only mutable engine state.
pub struct Solver<S: Perception + Automation> {
    surface: S,
    strategy: Strategy,
    config: SolverConfig,
    results: Option<ResultsWriter>,
    stop_flag: Arc<AtomicBool>,
    move_count: u32,
    last_moves: Vec<Direction>,
    consecutive_failures: u32,
    max_tile_reached: u32,
}

impl<S: Perception + Automation> Solver<S> {
    pub fn new(surface: S, strategy: Strategy, config: SolverConfig) -> Self {
        let results = config.results_file.as_ref().map(ResultsWriter::new);
        Solver {
            surface,
            strategy,
            config,
            results,
            stop_flag: Arc::new(AtomicBool::new(false)),
            move_count: 0,
            last_moves: Vec::new(),
            consecutive_failures: 0,
            max_tile_reached: 0,
        }
    }

    /// Shared flag for cooperative cancellation: set it from anywhere and
    /// the loop stops starting new moves/games, finishes persisting and
    /// returns.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Plays games until the configured bound, a stop request or a restart
    /// failure, and returns the run totals.
    pub fn play(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();

        while self
            .config
            .max_games
            .map_or(true, |max| summary.games_played < max)
        {
            if self.stop_flag.load(Ordering::Relaxed) {
                log::info!("Run interrupted by user");
                break;
            }

            let game_index = summary.games_played + 1;
            log::info!("=== STARTING GAME {} ===", game_index);

            let game = self.play_single_game();
            summary.games_played = game_index;
            summary.total_moves += game.moves as u64;
            if game.max_tile > summary.best_tile {
                summary.best_tile = game.max_tile;
            }

            log::info!(
                "Game {} completed: Max tile = {}, Moves = {}",
                game_index,
                game.max_tile,
                game.moves
            );
            log::info!("Best score so far: {}", summary.best_tile);

            if let Some(writer) = &self.results {
                if let Err(e) =
                    writer.append(game_index, self.strategy.name(), game.moves, game.max_tile)
                {
                    log::error!("Unable to append to results file: {}", e);
                }
            }

            if self.stop_flag.load(Ordering::Relaxed) {
                log::info!("Run interrupted by user");
                break;
            }

            if let Err(e) = self.surface.restart() {
                log::error!("Failed to restart game: {}", e);
                break;
            }
            self.reset_game_stats();
            thread::sleep(self.config.between_games_pause);
        }

        log::info!("=== FINAL STATISTICS ===");
        log::info!("Games played: {}", summary.games_played);
        log::info!("Best score: {}", summary.best_tile);
        log::info!("Average moves per game: {:.1}", summary.average_moves());

        summary
    }

    /// Runs one game to target, terminal board, stop request or an
    /// exhausted failure budget. Statistics are finalized on every exit
    /// path.
    pub fn play_single_game(&mut self) -> GameSummary {
        log::info!("Starting new game - target: {}", self.config.target_tile);
        self.countdown();

        let mut reached_target = false;

        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                break;
            }

            match self.step() {
                Ok(StepOutcome::Continue) => {
                    self.consecutive_failures = 0;
                }
                Ok(StepOutcome::TargetReached) => {
                    reached_target = true;
                    break;
                }
                Ok(StepOutcome::GameOver) => break,
                Err(e) => {
                    log::error!("Error: {}", e);
                    self.consecutive_failures += 1;
                    if self.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                        log::error!("Too many consecutive errors, stopping");
                        break;
                    }
                    thread::sleep(self.config.retry_pause);
                }
            }
        }

        let summary = GameSummary {
            moves: self.move_count,
            max_tile: self.max_tile_reached,
            reached_target,
        };
        log::info!(
            "Game finished - Moves: {}, Max tile: {}",
            summary.moves,
            summary.max_tile
        );
        self.strategy.end_game(summary.max_tile);
        summary
    }

    /// One observe-decide-execute-record iteration.
    fn step(&mut self) -> Result<StepOutcome> {
        let (board, _elapsed) = self.surface.parse_board()?;
        let next_tile = self.next_tile_checked();

        let current_max = board.max_tile();
        if current_max > self.max_tile_reached {
            self.max_tile_reached = current_max;
        }
        let free_cells = board.free_cells();
        let phase = self.strategy.game_phase(current_max);

        log::info!(
            "Move {:2} | Max: {:3} | Free: {} | Next: {:2} | Phase: {}",
            self.move_count + 1,
            current_max,
            free_cells,
            next_tile,
            phase
        );
        if self.config.debug {
            log::debug!("\n{}", board);
        }

        if board.has_reached(self.config.target_tile) {
            log::info!("TARGET {} REACHED!", self.config.target_tile);
            return Ok(StepOutcome::TargetReached);
        }
        if is_game_over(&board) {
            log::info!("GAME OVER - NO MOVES LEFT");
            return Ok(StepOutcome::GameOver);
        }

        let score_before = self.strategy.evaluate_position(&board);

        let depth = if free_cells <= TIGHT_BOARD_FREE_CELLS { 3 } else { 2 };
        let aggressive =
            free_cells <= AGGRESSIVE_FREE_CELLS && current_max >= AGGRESSIVE_MIN_MAX_TILE;
        let (score, direction) = if aggressive {
            match self.strategy.find_aggressive_move(&board) {
                Some(pick) => {
                    log::info!("ACTIVATING AGGRESSIVE MODE - few free cells and high tiles");
                    pick
                }
                None => self.strategy.find_best_move(&board, next_tile, depth),
            }
        } else {
            self.strategy.find_best_move(&board, next_tile, depth)
        };

        // The sentinel means no direction is legal; never execute it.
        if score == f64::NEG_INFINITY {
            log::info!("GAME OVER - NO MOVES LEFT");
            return Ok(StepOutcome::GameOver);
        }

        log::debug!("Executing: {}", direction);
        self.surface.execute(direction)?;
        self.move_count += 1;
        self.last_moves.push(direction);
        if self.last_moves.len() > LAST_MOVES_KEPT {
            self.last_moves.remove(0);
        }
        thread::sleep(self.config.settle_delay);

        let (new_board, _elapsed) = self.surface.parse_board()?;
        let new_max = new_board.max_tile();
        if new_max > self.max_tile_reached {
            self.max_tile_reached = new_max;
        }

        let score_after = self.strategy.evaluate_position(&new_board);
        self.strategy
            .record_move(&board, next_tile, direction, &new_board, score_before, score_after);

        Ok(StepOutcome::Continue)
    }

    /// Validates the reported next tile. Anything unreadable or outside the
    /// legal set falls back to a uniform choice of the two low cards; a bad
    /// next tile is never worth aborting the iteration over.
    fn next_tile_checked(&mut self) -> u32 {
        match self.surface.parse_next_tile() {
            Ok((raw, _elapsed)) if VALID_NEXT_TILES.contains(&raw) => return raw,
            Ok((raw, _elapsed)) => {
                log::warn!(
                    "Next tile recognition failed (invalid value: {}), using fallback",
                    raw
                );
            }
            Err(e) => {
                log::warn!("Next tile recognition failed ({}), using fallback", e);
            }
        }
        if rand::rng().random_bool(0.5) {
            1
        } else {
            2
        }
    }

    fn countdown(&self) {
        for remaining in (1..=self.config.countdown.as_secs()).rev() {
            log::info!("Starting in {}...", remaining);
            thread::sleep(Duration::from_secs(1));
        }
    }

    fn reset_game_stats(&mut self) {
        self.move_count = 0;
        self.last_moves.clear();
        self.consecutive_failures = 0;
        self.max_tile_reached = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Board;
    use crate::ThreesSolverError;
    use std::time::Duration;

    /// A surface whose perception always fails, to exercise the retry
    /// budget.
    struct BlindSurface {
        board_reads: u32,
    }

    impl Perception for BlindSurface {
        fn parse_board(&mut self) -> Result<(Board, Duration)> {
            self.board_reads += 1;
            Err(ThreesSolverError::Perception("no calibration".to_string()))
        }

        fn parse_next_tile(&mut self) -> Result<(u32, Duration)> {
            Err(ThreesSolverError::Perception("no calibration".to_string()))
        }
    }

    impl Automation for BlindSurface {
        fn execute(&mut self, _direction: Direction) -> Result<()> {
            Ok(())
        }

        fn restart(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failure_budget_aborts_the_game_after_five_retries() {
        let surface = BlindSurface { board_reads: 0 };
        let mut solver = Solver::new(surface, Strategy::simple(), SolverConfig::for_tests());
        let game = solver.play_single_game();
        assert_eq!(game.moves, 0);
        assert_eq!(game.max_tile, 0);
        assert!(!game.reached_target);
        assert_eq!(solver.surface.board_reads, MAX_CONSECUTIVE_FAILURES);
    }

    /// A surface that reports a fixed board but an unparseable next tile.
    struct GarbledNextTile {
        board: Board,
        executed: Vec<Direction>,
    }

    impl Perception for GarbledNextTile {
        fn parse_board(&mut self) -> Result<(Board, Duration)> {
            Ok((self.board, Duration::ZERO))
        }

        fn parse_next_tile(&mut self) -> Result<(u32, Duration)> {
            Ok((999, Duration::ZERO))
        }
    }

    impl Automation for GarbledNextTile {
        fn execute(&mut self, direction: Direction) -> Result<()> {
            self.executed.push(direction);
            Ok(())
        }

        fn restart(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn invalid_next_tile_falls_back_instead_of_failing() {
        let surface = GarbledNextTile {
            board: Board::empty().with_tile(0, 0, 3).with_tile(0, 1, 3),
            executed: Vec::new(),
        };
        let mut solver = Solver::new(surface, Strategy::simple(), SolverConfig::for_tests());
        let outcome = solver.step().expect("step should recover");
        assert!(matches!(outcome, StepOutcome::Continue));
        assert_eq!(solver.surface.executed.len(), 1);
    }

    #[test]
    fn stop_flag_ends_the_run_before_the_next_game() {
        let surface = BlindSurface { board_reads: 0 };
        let mut config = SolverConfig::for_tests();
        config.max_games = Some(100);
        let mut solver = Solver::new(surface, Strategy::simple(), config);
        solver.stop_flag().store(true, Ordering::Relaxed);
        let summary = solver.play();
        assert_eq!(summary.games_played, 0);
    }
}
