use serde::{Deserialize, Serialize};

use crate::game::error::GameError;

/// Mark placed on the board. X always belongs to player1, O to player2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mark {
    X,
    O,
}

/// Result of evaluating a board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    None,
    Win(Mark),
    Tie,
}

/// A 3x3 tic-tac-toe grid. Placement validation lives here; turn order and
/// everything else is the registry's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [[Option<Mark>; 3]; 3],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a mark at (row, col). Fails without touching the board if the
    /// coordinates are outside the grid or the cell is already taken.
    pub fn place(&mut self, row: usize, col: usize, mark: Mark) -> Result<(), GameError> {
        if row >= 3 || col >= 3 {
            return Err(GameError::OutOfRange);
        }
        if self.cells[row][col].is_some() {
            return Err(GameError::CellOccupied);
        }
        self.cells[row][col] = Some(mark);
        Ok(())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Mark> {
        self.cells[row][col]
    }

    /// Checks the 3 rows, 3 columns and 2 diagonals for three identical
    /// marks. A full board with no winning line is a tie. Pure read.
    pub fn evaluate(&self) -> Outcome {
        for i in 0..3 {
            if self.cells[i][0] == self.cells[i][1] && self.cells[i][1] == self.cells[i][2] {
                if let Some(mark) = self.cells[i][0] {
                    return Outcome::Win(mark);
                }
            }
            if self.cells[0][i] == self.cells[1][i] && self.cells[1][i] == self.cells[2][i] {
                if let Some(mark) = self.cells[0][i] {
                    return Outcome::Win(mark);
                }
            }
        }

        if self.cells[0][0] == self.cells[1][1] && self.cells[1][1] == self.cells[2][2] {
            if let Some(mark) = self.cells[0][0] {
                return Outcome::Win(mark);
            }
        }
        if self.cells[0][2] == self.cells[1][1] && self.cells[1][1] == self.cells[2][0] {
            if let Some(mark) = self.cells[0][2] {
                return Outcome::Win(mark);
            }
        }

        if self.is_full() {
            Outcome::Tie
        } else {
            Outcome::None
        }
    }

    fn is_full(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|&cell| cell.is_some()))
    }
}
