//! Move simulation with exact Threes merge semantics.
//!
//! A swipe shifts every tile by at most one cell: each line is processed in a
//! single pass from the target edge outward, so tiles never cascade through
//! several cells or merge twice in one move. This matches the real game move
//! for move, which is what lets the search trust its look-ahead.

use crate::game::board::{Board, Direction, MoveOutcome, BOARD_SIZE};

/// Merge rule: 1 and 2 combine into 3; equal tiles of 3 or more combine into
/// their sum. 1+1 and 2+2 are illegal, as is anything involving an empty cell.
pub fn can_merge(a: u32, b: u32) -> bool {
    if a == 0 || b == 0 {
        return false;
    }
    if (a == 1 && b == 2) || (a == 2 && b == 1) {
        return true;
    }
    a >= 3 && a == b
}

/// Single pass toward index 0: positions 1..=3 in order, each either sliding
/// into an empty left neighbour or merging with it.
fn process_line_left(line: &mut [u32; BOARD_SIZE]) {
    for j in 1..BOARD_SIZE {
        if line[j] == 0 {
            continue;
        }
        if line[j - 1] == 0 {
            line[j - 1] = line[j];
            line[j] = 0;
        } else if can_merge(line[j - 1], line[j]) {
            line[j - 1] += line[j];
            line[j] = 0;
        }
    }
}

/// Mirror of [`process_line_left`]: positions 2..=0 toward index 3.
fn process_line_right(line: &mut [u32; BOARD_SIZE]) {
    for j in (0..BOARD_SIZE - 1).rev() {
        if line[j] == 0 {
            continue;
        }
        if line[j + 1] == 0 {
            line[j + 1] = line[j];
            line[j] = 0;
        } else if can_merge(line[j], line[j + 1]) {
            line[j + 1] += line[j];
            line[j] = 0;
        }
    }
}

/// Applies `direction` to `board` and reports whether anything moved.
///
/// Rows are processed independently for horizontal swipes; vertical swipes
/// reuse the row logic on transposed columns. The input board is never
/// mutated.
pub fn apply(board: &Board, direction: Direction) -> MoveOutcome {
    let mut cells = *board.rows();

    match direction {
        Direction::Left => {
            for row in cells.iter_mut() {
                process_line_left(row);
            }
        }
        Direction::Right => {
            for row in cells.iter_mut() {
                process_line_right(row);
            }
        }
        Direction::Up => {
            for col in 0..BOARD_SIZE {
                let mut line = [0; BOARD_SIZE];
                for row in 0..BOARD_SIZE {
                    line[row] = cells[row][col];
                }
                process_line_left(&mut line);
                for row in 0..BOARD_SIZE {
                    cells[row][col] = line[row];
                }
            }
        }
        Direction::Down => {
            for col in 0..BOARD_SIZE {
                let mut line = [0; BOARD_SIZE];
                for row in 0..BOARD_SIZE {
                    line[row] = cells[row][col];
                }
                process_line_right(&mut line);
                for row in 0..BOARD_SIZE {
                    cells[row][col] = line[row];
                }
            }
        }
    }

    let next = Board::from_rows(cells);
    MoveOutcome {
        changed: next != *board,
        board: next,
        direction,
    }
}

/// A board is terminal iff it has no free cell and no direction changes it.
/// Recomputed from scratch on every call.
pub fn is_game_over(board: &Board) -> bool {
    if board.free_cells() > 0 {
        return false;
    }
    Direction::ALL
        .iter()
        .all(|&direction| !apply(board, direction).changed)
}
