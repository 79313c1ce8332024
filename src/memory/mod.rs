pub mod store;

pub use store::{state_fingerprint, ExperienceStore, MemoryStats, MoveStatistics, StateMemory};
