use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only per-game results file, one CSV line per finished game.
pub struct ResultsWriter {
    path: PathBuf,
}

impl ResultsWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ResultsWriter {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn append(
        &self,
        game_index: u32,
        strategy: &str,
        moves: u32,
        max_tile: u32,
    ) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file_exists = self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);

        if !file_exists {
            writeln!(writer, "timestamp,game,strategy,moves,max_tile")?;
        }
        writeln!(
            writer,
            "{},{},{},{},{}",
            Utc::now().to_rfc3339(),
            game_index,
            strategy,
            moves,
            max_tile
        )?;
        writer.flush()
    }
}
