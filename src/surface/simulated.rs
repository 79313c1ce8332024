//! In-process stand-in for the real game surface.
//!
//! Implements both collaborator seams against an internal Threes model:
//! deck-based card draws, a nine-card opening deal and trailing-edge card
//! entry on the lines a swipe actually moved. Seedable, so full games are
//! reproducible in tests.

use crate::game::board::{Board, Direction, BOARD_SIZE};
use crate::game::simulate::apply;
use crate::surface::{Automation, Perception};
use crate::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngExt, SeedableRng};
use std::time::Duration;

/// The basic deck: four of each low card, reshuffled when exhausted.
const BASIC_DECK: [u32; 12] = [1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3];

/// Cards dealt onto the board at game start.
const OPENING_DEAL: usize = 9;

/// Once the board maximum reaches this, bonus cards join the draw...
const BONUS_MIN_MAX_TILE: u32 = 48;
/// ...with this per-draw probability, valued between 6 and max/8.
const BONUS_CHANCE: f64 = 1.0 / 21.0;

pub struct SimulatedThrees {
    board: Board,
    upcoming: u32,
    deck: Vec<u32>,
    rng: StdRng,
}

impl SimulatedThrees {
    pub fn new(seed: u64) -> Self {
        let mut surface = SimulatedThrees {
            board: Board::empty(),
            upcoming: 0,
            deck: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        };
        surface.deal();
        surface
    }

    /// Direct view of the internal board, for tests and debugging.
    pub fn board(&self) -> Board {
        self.board
    }

    fn refill_deck(&mut self) {
        self.deck = BASIC_DECK.to_vec();
        self.deck.shuffle(&mut self.rng);
    }

    fn draw_basic(&mut self) -> u32 {
        if self.deck.is_empty() {
            self.refill_deck();
        }
        self.deck.pop().unwrap_or(1)
    }

    /// Draws the next card: usually from the basic deck, occasionally a
    /// bonus card once the board has grown far enough.
    fn draw_next(&mut self) -> u32 {
        let max_tile = self.board.max_tile();
        if max_tile >= BONUS_MIN_MAX_TILE && self.rng.random_bool(BONUS_CHANCE) {
            let mut candidates = Vec::new();
            let mut value = 6;
            while value <= max_tile / 8 {
                candidates.push(value);
                value *= 2;
            }
            if !candidates.is_empty() {
                return candidates[self.rng.random_range(0..candidates.len())];
            }
        }
        self.draw_basic()
    }

    fn deal(&mut self) {
        self.board = Board::empty();
        self.refill_deck();

        let mut cells: Vec<(usize, usize)> = Vec::with_capacity(BOARD_SIZE * BOARD_SIZE);
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                cells.push((row, col));
            }
        }
        cells.shuffle(&mut self.rng);

        for &(row, col) in cells.iter().take(OPENING_DEAL) {
            let value = self.draw_basic();
            self.board = self.board.with_tile(row, col, value);
        }

        self.upcoming = self.draw_next();
    }

    /// The new card enters at the trailing edge of one of the lines the
    /// swipe moved: a changed line always ends with an empty trailing cell.
    fn spawn_card(&mut self, before: &Board, after: Board, direction: Direction) -> Board {
        let mut entries: Vec<(usize, usize)> = Vec::new();

        match direction {
            Direction::Left | Direction::Right => {
                let col = if direction == Direction::Left { BOARD_SIZE - 1 } else { 0 };
                for row in 0..BOARD_SIZE {
                    if before.rows()[row] != after.rows()[row] && after.get(row, col) == 0 {
                        entries.push((row, col));
                    }
                }
            }
            Direction::Up | Direction::Down => {
                let row = if direction == Direction::Up { BOARD_SIZE - 1 } else { 0 };
                for col in 0..BOARD_SIZE {
                    let moved = (0..BOARD_SIZE).any(|r| before.get(r, col) != after.get(r, col));
                    if moved && after.get(row, col) == 0 {
                        entries.push((row, col));
                    }
                }
            }
        }

        if entries.is_empty() {
            return after;
        }
        let (row, col) = entries[self.rng.random_range(0..entries.len())];
        after.with_tile(row, col, self.upcoming)
    }
}

impl Perception for SimulatedThrees {
    fn parse_board(&mut self) -> Result<(Board, Duration)> {
        Ok((self.board, Duration::ZERO))
    }

    fn parse_next_tile(&mut self) -> Result<(u32, Duration)> {
        Ok((self.upcoming, Duration::ZERO))
    }
}

impl Automation for SimulatedThrees {
    fn execute(&mut self, direction: Direction) -> Result<()> {
        let outcome = apply(&self.board, direction);
        if outcome.changed {
            let before = self.board;
            self.board = self.spawn_card(&before, outcome.board, direction);
            self.upcoming = self.draw_next();
        }
        Ok(())
    }

    fn restart(&mut self) -> Result<()> {
        self.deal();
        Ok(())
    }
}
