use clap::Parser;
use rand::RngExt;
use std::path::PathBuf;
use std::time::Duration;

use threes_solver::logging::setup_logging;
use threes_solver::solver::{Solver, SolverConfig};
use threes_solver::strategy::Strategy;
use threes_solver::surface::SimulatedThrees;

#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Eq)]
enum StrategyCli {
    Simple,
    Memory,
}

#[derive(Parser, Debug)]
#[command(name = "threes_solver", about = "Automatic Threes player")]
struct Config {
    /// Strategy to use
    #[arg(short = 's', long, value_enum, default_value = "simple")]
    strategy: StrategyCli,

    /// Target tile value to reach
    #[arg(short = 't', long, default_value_t = 384)]
    target: u32,

    /// Maximum number of games to play (unlimited when omitted)
    #[arg(short = 'g', long)]
    games: Option<u32>,

    /// Enable debug output
    #[arg(short = 'd', long, default_value_t = false)]
    debug: bool,

    /// Path of the persisted experience store
    #[arg(long, default_value = "memory/game_memory.json")]
    memory_file: String,

    /// Directory for run logs
    #[arg(long, default_value = "logs")]
    log_dir: String,

    /// Per-game results CSV (disabled when omitted)
    #[arg(long)]
    results_file: Option<PathBuf>,

    /// Seed for the simulated game surface (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Countdown before each game, in seconds
    #[arg(long, default_value_t = 3)]
    countdown_secs: u64,

    /// Settle delay after each move, in milliseconds
    #[arg(long, default_value_t = 200)]
    settle_ms: u64,
}

fn main() {
    let config = Config::parse();
    let _logger = setup_logging(&config.log_dir, config.debug);

    let strategy = match config.strategy {
        StrategyCli::Simple => Strategy::simple(),
        StrategyCli::Memory => Strategy::memory(&config.memory_file),
    };

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("=== THREES SOLVER ===");
    log::info!(
        "Strategy: {} | Target: {} | Seed: {}",
        strategy.name(),
        config.target,
        seed
    );

    let surface = SimulatedThrees::new(seed);
    let solver_config = SolverConfig {
        target_tile: config.target,
        max_games: config.games,
        debug: config.debug,
        countdown: Duration::from_secs(config.countdown_secs),
        settle_delay: Duration::from_millis(config.settle_ms),
        results_file: config.results_file,
        ..SolverConfig::default()
    };

    let mut solver = Solver::new(surface, strategy, solver_config);
    let summary = solver.play();

    println!(
        "Games played: {}, Best tile: {}, Average moves: {:.1}",
        summary.games_played,
        summary.best_tile,
        summary.average_moves()
    );
}
