use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the playing field.
pub const BOARD_SIZE: usize = 4;

/// A 4×4 Threes board. 0 marks an empty cell; occupied cells hold a tile
/// value from {1, 2, 3, 6, 12, 24, ...}.
///
/// Snapshot semantics: `Board` is `Copy` and every transformation returns a
/// new value, so callers never see their copy mutated behind their back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[u32; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn empty() -> Self {
        Board {
            cells: [[0; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn from_rows(cells: [[u32; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Board { cells }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row][col]
    }

    #[inline]
    pub fn rows(&self) -> &[[u32; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Returns a copy of this board with `value` written at (row, col).
    pub fn with_tile(&self, row: usize, col: usize, value: u32) -> Board {
        let mut next = *self;
        next.cells[row][col] = value;
        next
    }

    /// Cell values in row-major order, the canonical iteration order used by
    /// fingerprints and the bounded placement look-ahead.
    pub fn cells_row_major(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.iter().flat_map(|row| row.iter().copied())
    }

    pub fn max_tile(&self) -> u32 {
        self.cells_row_major().max().unwrap_or(0)
    }

    pub fn free_cells(&self) -> usize {
        self.cells_row_major().filter(|&v| v == 0).count()
    }

    /// Coordinates of all empty cells, row-major.
    pub fn free_positions(&self) -> Vec<(usize, usize)> {
        let mut positions = Vec::new();
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if self.cells[row][col] == 0 {
                    positions.push((row, col));
                }
            }
        }
        positions
    }

    /// True when any cell has reached `target`.
    pub fn has_reached(&self, target: u32) -> bool {
        self.cells_row_major().any(|v| v >= target)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> = row
                .iter()
                .map(|&cell| {
                    if cell > 0 {
                        format!("{:3}", cell)
                    } else {
                        "  .".to_string()
                    }
                })
                .collect();
            write!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// A swipe direction. Evaluation and tie-break order is the declaration
/// order: Left, Right, Up, Down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The result of applying a direction to a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    pub direction: Direction,
    /// False means the swipe was a no-op; such a direction is illegal while
    /// any legal direction exists.
    pub changed: bool,
}
