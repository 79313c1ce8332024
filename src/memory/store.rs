//! Persistent experience store.
//!
//! Maps a (board, next tile) fingerprint to per-direction outcome statistics
//! gathered over past games. The store is loaded once at strategy
//! construction, mutated after every recorded move and flushed at game end
//! when the game was strong enough to be worth remembering.

use crate::game::board::{Board, Direction};
use crate::{Result, ThreesSolverError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Recent-delta list is trimmed back to this many entries...
const RECENT_DELTAS_KEEP: usize = 5;
/// ...once it grows past this many.
const RECENT_DELTAS_CAP: usize = 10;

/// Advice is only worth following above this memory score.
const ADVICE_THRESHOLD: f64 = 50.0;

/// A game only deserves persisting once it reached this tile.
const PERSIST_MIN_TILE: u32 = 96;

/// Deterministic lookup key: row-major cell values plus the known next tile.
pub fn state_fingerprint(board: &Board, next_tile: u32) -> String {
    let cells: Vec<String> = board.cells_row_major().map(|v| v.to_string()).collect();
    format!("{}:{}", cells.join(","), next_tile)
}

/// Outcome statistics for one direction taken from one state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveStatistics {
    /// Most recent score deltas observed after taking this direction.
    pub score_changes: Vec<f64>,
    /// Times this direction produced a new personal-best result tile.
    pub success_count: u32,
    pub total_count: u32,
    /// Best result tile ever achieved via this direction.
    pub max_score_achieved: u32,
}

/// Everything remembered about one fingerprinted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateMemory {
    pub moves: HashMap<Direction, MoveStatistics>,
    /// Best result tile seen from this state via any direction.
    pub best_score: u32,
    pub visit_count: u32,
}

/// Reporting counters, surfaced at game end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryStats {
    pub states_remembered: usize,
    pub memory_hits: u64,
    pub game_states_seen: u64,
    pub hit_rate: f64,
}

/// In-memory experience store with JSON persistence.
///
/// Single-writer by contract: the synchronous game loop is the only mutator.
#[derive(Debug)]
pub struct ExperienceStore {
    path: PathBuf,
    states: HashMap<String, StateMemory>,
    states_seen: u64,
    hits: u64,
}

impl ExperienceStore {
    /// Loads the store from `path`. A missing or corrupt file degrades to an
    /// empty store; construction never fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let states = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(states) => states,
                Err(e) => {
                    log::warn!(
                        "Memory file '{}' is corrupt ({}), starting with an empty store",
                        path.display(),
                        e
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                log::warn!(
                    "Memory file '{}' could not be read ({}), starting with an empty store",
                    path.display(),
                    e
                );
                HashMap::new()
            }
        };

        if !states.is_empty() {
            log::info!("Loaded {} remembered states from '{}'", states.len(), path.display());
        }

        ExperienceStore {
            path,
            states,
            states_seen: 0,
            hits: 0,
        }
    }

    /// Best remembered direction for this fingerprint, if its memory score
    /// clears the advice threshold.
    ///
    /// Every lookup counts toward `game_states_seen`; a hit also bumps the
    /// hit counter and the entry's visit count.
    pub fn advice(&mut self, fingerprint: &str) -> Option<(Direction, f64)> {
        self.states_seen += 1;

        let entry = self.states.get_mut(fingerprint)?;
        self.hits += 1;
        entry.visit_count += 1;

        let mut best: Option<(Direction, f64)> = None;
        for direction in Direction::ALL {
            let Some(stats) = entry.moves.get(&direction) else {
                continue;
            };
            if stats.total_count == 0 {
                continue;
            }

            let success_rate = stats.success_count as f64 / stats.total_count as f64;
            let avg_score_change = if stats.score_changes.is_empty() {
                0.0
            } else {
                stats.score_changes.iter().sum::<f64>() / stats.score_changes.len() as f64
            };
            let memory_score =
                success_rate * 100.0 + avg_score_change + stats.max_score_achieved as f64 * 0.1;

            if best.map_or(true, |(_, score)| memory_score > score) {
                best = Some((direction, memory_score));
            }
        }

        best.filter(|&(_, score)| score > ADVICE_THRESHOLD)
    }

    /// Records the outcome of taking `direction` from the fingerprinted state.
    ///
    /// The success count only grows when `result_max_tile` beats the
    /// direction's previous best from this state, so unexplored directions
    /// accumulate no bias.
    pub fn record(
        &mut self,
        fingerprint: &str,
        direction: Direction,
        score_change: f64,
        result_max_tile: u32,
    ) {
        let entry = self
            .states
            .entry(fingerprint.to_string())
            .or_insert_with(|| StateMemory {
                moves: HashMap::new(),
                best_score: result_max_tile,
                visit_count: 0,
            });
        let stats = entry
            .moves
            .entry(direction)
            .or_insert_with(|| MoveStatistics {
                max_score_achieved: result_max_tile,
                ..MoveStatistics::default()
            });

        stats.score_changes.push(score_change);
        stats.total_count += 1;

        if result_max_tile > entry.best_score {
            entry.best_score = result_max_tile;
        }
        if result_max_tile > stats.max_score_achieved {
            stats.max_score_achieved = result_max_tile;
            stats.success_count += 1;
        }

        if stats.score_changes.len() > RECENT_DELTAS_CAP {
            let drop = stats.score_changes.len() - RECENT_DELTAS_KEEP;
            stats.score_changes.drain(..drop);
        }
    }

    /// Flushes the store if the finished game earned it (max tile ≥ 96).
    /// Save failures are logged, never propagated into gameplay.
    pub fn end_game(&mut self, game_max_tile: u32) {
        if game_max_tile < PERSIST_MIN_TILE {
            return;
        }
        match self.save() {
            Ok(()) => log::info!("Game memory saved ({} states)", self.states.len()),
            Err(e) => log::error!("Memory save error: {}", e),
        }
    }

    /// Atomically writes the store: serialize to a sibling temp file, then
    /// rename over the target so an interrupt can never leave a torn file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let raw = serde_json::to_string_pretty(&self.states)
            .map_err(|e| ThreesSolverError::Memory(format!("serialize failed: {}", e)))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            states_remembered: self.states.len(),
            memory_hits: self.hits,
            game_states_seen: self.states_seen,
            hit_rate: self.hits as f64 / self.states_seen.max(1) as f64,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn states(&self) -> &HashMap<String, StateMemory> {
        &self.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_store() -> ExperienceStore {
        ExperienceStore::load("does-not-exist/memory.json")
    }

    #[test]
    fn fingerprint_is_deterministic_and_tile_sensitive() {
        let board = Board::empty().with_tile(0, 0, 1).with_tile(2, 3, 6);
        assert_eq!(
            state_fingerprint(&board, 3),
            state_fingerprint(&board, 3)
        );
        assert_ne!(
            state_fingerprint(&board, 3),
            state_fingerprint(&board, 6)
        );
        assert_eq!(
            state_fingerprint(&Board::empty(), 1),
            "0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0:1"
        );
    }

    #[test]
    fn unseen_fingerprint_gives_no_advice_but_counts_the_lookup() {
        let mut store = scratch_store();
        assert_eq!(store.advice("nope"), None);
        let stats = store.stats();
        assert_eq!(stats.game_states_seen, 1);
        assert_eq!(stats.memory_hits, 0);
    }

    #[test]
    fn advice_requires_score_above_threshold() {
        let mut store = scratch_store();
        // One mediocre attempt: success_rate 0, avg delta 4, max 24.
        // memory score = 0 + 4 + 2.4 = 6.4 < 50 -> no advice.
        store.record("fp", Direction::Left, 4.0, 24);
        store.record("fp", Direction::Left, 4.0, 24);
        assert_eq!(store.advice("fp"), None);
        let stats = store.stats();
        assert_eq!(stats.memory_hits, 1);
        assert_eq!(stats.game_states_seen, 1);
    }

    #[test]
    fn advice_returns_the_best_scoring_direction() {
        let mut store = scratch_store();
        store.record("fp", Direction::Left, 2.0, 24);
        // The first Right record seeds its best at 96; the second beats it,
        // which is the only success. That still clears the threshold.
        store.record("fp", Direction::Right, 30.0, 96);
        store.record("fp", Direction::Right, 40.0, 192);
        let (direction, score) = store.advice("fp").expect("advice expected");
        assert_eq!(direction, Direction::Right);
        // success 1/2 -> 50, avg 35, max 192 * 0.1 = 19.2
        assert!((score - 104.2).abs() < 1e-9);
    }

    #[test]
    fn success_count_is_a_ratchet_on_new_personal_bests() {
        let mut store = scratch_store();
        store.record("fp", Direction::Up, 1.0, 48);
        store.record("fp", Direction::Up, 1.0, 48);
        store.record("fp", Direction::Up, 1.0, 96);
        let stats = &store.states()["fp"].moves[&Direction::Up];
        // The first record seeds max_score_achieved, so only the jump to 96
        // counts as a success.
        assert_eq!(stats.success_count, 1);
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.max_score_achieved, 96);
        assert_eq!(store.states()["fp"].best_score, 96);
    }

    #[test]
    fn recent_deltas_are_trimmed_to_five_after_ten() {
        let mut store = scratch_store();
        for i in 0..11 {
            store.record("fp", Direction::Down, i as f64, 12);
        }
        let stats = &store.states()["fp"].moves[&Direction::Down];
        assert_eq!(stats.score_changes, vec![6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(stats.total_count, 11);
    }

    #[test]
    fn save_and_load_round_trip_identically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory/game_memory.json");

        let mut store = ExperienceStore::load(&path);
        store.record("a", Direction::Left, 12.5, 48);
        store.record("a", Direction::Left, -3.0, 48);
        store.record("a", Direction::Up, 40.0, 96);
        store.record("b", Direction::Down, -10.0, 6);
        store.save().unwrap();

        let reloaded = ExperienceStore::load(&path);
        assert_eq!(store.states(), reloaded.states());
    }

    #[test]
    fn corrupt_file_degrades_to_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_memory.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = ExperienceStore::load(&path);
        assert!(store.is_empty());
    }

    #[test]
    fn end_game_persists_only_strong_games() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game_memory.json");

        let mut store = ExperienceStore::load(&path);
        store.record("a", Direction::Left, 5.0, 48);

        store.end_game(48);
        assert!(!path.exists());

        store.end_game(96);
        assert!(path.exists());
        assert_eq!(ExperienceStore::load(&path).len(), 1);
    }

    #[test]
    fn visit_count_grows_only_on_hits() {
        let mut store = scratch_store();
        store.record("fp", Direction::Left, 60.0, 96);
        store.record("fp", Direction::Left, 60.0, 192);
        let _ = store.advice("fp");
        let _ = store.advice("fp");
        assert_eq!(store.states()["fp"].visit_count, 2);
    }
}
