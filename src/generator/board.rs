/*
board.rs

Copyright 2025 Hervé Quatremain

This file is part of Hitofude.

Hitofude is free software: you can redistribute it and/or modify it under the
terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Hitofude is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Hitofude. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Square board of passable and obstacle cells.
//!
//! A board can be built from an "ASCII art" representation such as:
//!
//! ```text
//! . . . .
//! . # . .
//! . . . .
//! . . # .
//! ```
//!
//! - `.` or `o` represents a passable cell.
//! - `#` or `x` represents an obstacle.
//! - All other characters (spaces) are ignored.

use log::{Level, debug, log_enabled};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell::Cell;

/// Smallest grid dimension accepted by the engine.
pub const MIN_SIZE: usize = 3;

/// Largest grid dimension accepted by the engine.
pub const MAX_SIZE: usize = 20;

/// State of a board cell.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum CellState {
    #[default]
    Passable,
    Obstacle,
}

/// Board representation.
///
/// The cells are stored row-major, so that the cell at `(row, col)` is at index `row * n + col`.
/// The board is serialized as a list of rows in the "ASCII art" format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Board {
    /// Grid dimension.
    n: usize,

    /// Cell states.
    cells: Vec<CellState>,
}

impl Board {
    /// Create an `n x n` board where all the cells are passable.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cells: vec![CellState::Passable; n * n],
        }
    }

    /// Create an `n x n` board where only the given cells are passable.
    pub fn from_passable_cells(n: usize, passable: &[Cell]) -> Self {
        let mut board: Board = Self {
            n,
            cells: vec![CellState::Obstacle; n * n],
        };
        for cell in passable {
            board.set(*cell, CellState::Passable);
        }
        board
    }

    /// Parse an "ASCII art" board.
    ///
    /// # Errors
    ///
    /// The method returns an error when the rows do not have the same number of cells, or when
    /// the board is not square.
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut rows: Vec<Vec<CellState>> = Vec::new();

        for line in source.lines() {
            let row: Vec<CellState> = line
                .chars()
                .filter_map(|c| match c {
                    '.' | 'o' | 'O' => Some(CellState::Passable),
                    '#' | 'x' | 'X' => Some(CellState::Obstacle),
                    _ => None,
                })
                .collect();
            if !row.is_empty() {
                rows.push(row);
            }
        }

        let n: usize = rows.len();
        if n == 0 {
            return Err("The board does not have any cells".to_string());
        }
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
            return Err(format!(
                "Row {i} has {} cells instead of {n} (the board must be square)",
                row.len()
            ));
        }
        Ok(Self {
            n,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Grid dimension.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Return the state of the given cell.
    pub fn get(&self, cell: Cell) -> CellState {
        self.cells[cell.index(self.n)]
    }

    /// Set the state of the given cell.
    pub fn set(&mut self, cell: Cell, state: CellState) {
        let index: usize = cell.index(self.n);
        self.cells[index] = state;
    }

    /// Whether the cell is inside the grid and passable.
    pub fn is_passable(&self, cell: Cell) -> bool {
        cell.row < self.n && cell.col < self.n && self.get(cell) == CellState::Passable
    }

    /// Whether the cell is inside the grid and is an obstacle.
    pub fn is_obstacle(&self, cell: Cell) -> bool {
        cell.row < self.n && cell.col < self.n && self.get(cell) == CellState::Obstacle
    }

    /// Number of passable cells.
    pub fn passable_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|s| **s == CellState::Passable)
            .count()
    }

    /// Number of obstacles.
    pub fn obstacle_count(&self) -> usize {
        self.cells.len() - self.passable_count()
    }

    /// Number of passable neighbors of the given cell.
    pub fn passable_degree(&self, cell: Cell) -> usize {
        cell.neighbors4(self.n)
            .iter()
            .filter(|c| self.is_passable(**c))
            .count()
    }

    /// Iterate over all the cells of the board, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.n * self.n).map(|i| Cell::from_index(i, self.n))
    }

    /// Iterate over the passable cells, row by row.
    pub fn passable_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells().filter(|c| self.get(*c) == CellState::Passable)
    }

    /// Iterate over the obstacles, row by row.
    pub fn obstacles(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells().filter(|c| self.get(*c) == CellState::Obstacle)
    }

    /// Return the passable cells on the border ring.
    pub fn outer_passable_cells(&self) -> Vec<Cell> {
        self.passable_cells()
            .filter(|c| c.is_outer(self.n))
            .collect()
    }

    /// Print the board in the debug log.
    pub fn debug(&self) {
        if log_enabled!(Level::Debug) {
            for line in self.to_string().lines() {
                debug!("{line}");
            }
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in Vec::<String>::from(self.clone()) {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

impl From<Board> for Vec<String> {
    fn from(board: Board) -> Self {
        board
            .cells
            .chunks(board.n.max(1))
            .map(|row| {
                row.iter()
                    .map(|s| match s {
                        CellState::Passable => '.',
                        CellState::Obstacle => '#',
                    })
                    .collect()
            })
            .collect()
    }
}

impl TryFrom<Vec<String>> for Board {
    type Error = String;

    fn try_from(rows: Vec<String>) -> Result<Self, Self::Error> {
        Board::parse(&rows.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let board: Board = Board::parse(
            "
            . . # .
            . . . .
            # . . .
            . . . .
            ",
        )
        .unwrap();

        assert_eq!(board.size(), 4);
        assert_eq!(board.obstacle_count(), 2);
        assert_eq!(board.passable_count(), 14);
        assert!(board.is_obstacle(Cell::new(0, 2)));
        assert!(board.is_obstacle(Cell::new(2, 0)));
        assert!(!board.is_passable(Cell::new(4, 0)));
        assert_eq!(board.to_string(), "..#.\n....\n#...\n....\n");
        assert_eq!(Board::parse(&board.to_string()).unwrap(), board);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Board::parse("").is_err());
        assert!(Board::parse("...\n..\n...").is_err());
        assert!(Board::parse("....\n....").is_err());
    }

    #[test]
    fn test_degree_and_outer_cells() {
        let board: Board = Board::parse(
            "
            . # .
            . . .
            . . .
            ",
        )
        .unwrap();

        assert_eq!(board.passable_degree(Cell::new(0, 0)), 1);
        assert_eq!(board.passable_degree(Cell::new(1, 1)), 3);
        assert_eq!(board.outer_passable_cells().len(), 7);
        assert_eq!(board.obstacles().collect::<Vec<Cell>>(), vec![Cell::new(0, 1)]);
    }

    #[test]
    fn test_serde_rows() {
        let board: Board = Board::from_passable_cells(3, &[Cell::new(0, 0), Cell::new(0, 1)]);
        let json: String = serde_json::to_string(&board).unwrap();
        assert_eq!(json, "[\"..#\",\"###\",\"###\"]");
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }
}
