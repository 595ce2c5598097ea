/*
path.rs

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

//! Path through the passable cells of a board.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt;

use super::board::Board;
use super::cell::Cell;

/// Reasons why a path is not a valid solution for a board.
#[derive(Debug, PartialEq)]
pub enum PathError {
    /// A solution needs at least two cells.
    TooShort,

    /// The path does not cover all the passable cells.
    WrongLength { expected: usize, actual: usize },

    /// The cell is outside the board.
    OutOfBounds(Cell),

    /// The cell is an obstacle.
    Obstacle(Cell),

    /// The cell is visited twice.
    Duplicate(Cell),

    /// Two consecutive cells do not share a side.
    NotAdjacent(Cell, Cell),

    /// An endpoint is not on the border ring.
    EndpointNotOuter(Cell),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PathError::TooShort => write!(f, "the path has less than two cells"),
            PathError::WrongLength { expected, actual } => {
                write!(f, "the path has {actual} cells instead of {expected}")
            }
            PathError::OutOfBounds(c) => write!(f, "cell {c} is outside the board"),
            PathError::Obstacle(c) => write!(f, "cell {c} is an obstacle"),
            PathError::Duplicate(c) => write!(f, "cell {c} is visited twice"),
            PathError::NotAdjacent(a, b) => write!(f, "cells {a} and {b} are not adjacent"),
            PathError::EndpointNotOuter(c) => write!(f, "endpoint {c} is not on the border"),
        }
    }
}

impl Error for PathError {}

/// Path object.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(from = "Vec<Cell>", into = "Vec<Cell>")]
pub struct Path {
    /// Path as an ordered list of cells.
    path: Vec<Cell>,

    /// Stores the visited status of the cells.
    /// Instead of looking for the cell in the [`Path::path`] vector, this
    /// [`std::collections::HashSet`] speeds up the lookup.
    visited: HashSet<Cell>,
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl From<Vec<Cell>> for Path {
    fn from(path: Vec<Cell>) -> Self {
        let visited: HashSet<Cell> = path.iter().copied().collect();
        Self { path, visited }
    }
}

impl From<Path> for Vec<Cell> {
    fn from(path: Path) -> Self {
        path.path
    }
}

impl Path {
    /// Create a [`Path`] object.
    pub fn new(num_cells: usize) -> Self {
        Self {
            path: Vec::with_capacity(num_cells),
            visited: HashSet::with_capacity(num_cells),
        }
    }

    /// Serpentine (boustrophedon) traversal of an all-passable `n x n` board.
    ///
    /// The traversal goes left to right on even rows and right to left on odd rows.
    pub fn serpentine(n: usize) -> Self {
        let mut path: Path = Path::new(n * n);
        for row in 0..n {
            for i in 0..n {
                let col: usize = if row % 2 == 0 { i } else { n - 1 - i };
                path.push(Cell::new(row, col));
            }
        }
        path
    }

    /// Remove all the cells from the path.
    pub fn clear(&mut self) {
        self.path.clear();
        self.visited.clear();
    }

    /// Add a cell to the path.
    pub fn push(&mut self, cell: Cell) {
        self.path.push(cell);
        self.visited.insert(cell);
    }

    /// Remove the last cell from the path.
    pub fn pop(&mut self) {
        if let Some(c) = self.path.pop() {
            self.visited.remove(&c);
        }
    }

    /// Get the number of cells in the path.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Whether the path is empty.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Whether the cell is in the path or not.
    pub fn contains(&self, cell: Cell) -> bool {
        self.visited.contains(&cell)
    }

    /// Return a reference to the path vector.
    pub fn get(&self) -> &[Cell] {
        &self.path
    }

    /// Return the position of the given cell in the path.
    pub fn cell_index(&self, cell: Cell) -> Option<usize> {
        self.path.iter().position(|c| *c == cell)
    }

    /// Return the first cell in the path.
    pub fn get_first(&self) -> Option<Cell> {
        self.path.first().copied()
    }

    /// Return the last cell in the path.
    pub fn get_last(&self) -> Option<Cell> {
        self.path.last().copied()
    }

    /// Number of direction changes along the path.
    pub fn turn_count(&self) -> usize {
        self.path
            .windows(3)
            .filter(|w| {
                let first: (isize, isize) = direction(w[0], w[1]);
                let second: (isize, isize) = direction(w[1], w[2]);
                first != second
            })
            .count()
    }

    /// Pick a slice of `length` consecutive cells that starts and ends on distinct border cells.
    ///
    /// Used to cut a shorter path out of a [`Path::serpentine`] traversal. Return `None` when no
    /// such slice exists.
    pub fn outer_segment<R: Rng + ?Sized>(
        &self,
        n: usize,
        length: usize,
        rng: &mut R,
    ) -> Option<Path> {
        if length < 2 || length > self.len() {
            return None;
        }
        let candidates: Vec<usize> = (0..=self.len() - length)
            .filter(|i| {
                let first: Cell = self.path[*i];
                let last: Cell = self.path[i + length - 1];
                first.is_outer(n) && last.is_outer(n) && first != last
            })
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let start: usize = candidates[rng.random_range(0..candidates.len())];
        Some(Path::from(self.path[start..start + length].to_vec()))
    }

    /// Verify that the path is a solution for the board.
    ///
    /// # Errors
    ///
    /// Return the first rule the path breaks: the path must visit every passable cell exactly
    /// once, move between adjacent cells, and start and end on distinct border cells.
    pub fn validate(&self, board: &Board) -> Result<(), PathError> {
        let n: usize = board.size();
        if self.path.len() < 2 {
            return Err(PathError::TooShort);
        }
        let expected: usize = board.passable_count();
        if self.path.len() != expected {
            return Err(PathError::WrongLength {
                expected,
                actual: self.path.len(),
            });
        }

        let mut seen: HashSet<Cell> = HashSet::with_capacity(expected);
        for (i, cell) in self.path.iter().enumerate() {
            if cell.row >= n || cell.col >= n {
                return Err(PathError::OutOfBounds(*cell));
            }
            if !board.is_passable(*cell) {
                return Err(PathError::Obstacle(*cell));
            }
            if !seen.insert(*cell) {
                return Err(PathError::Duplicate(*cell));
            }
            if i > 0 && !self.path[i - 1].is_adjacent(*cell) {
                return Err(PathError::NotAdjacent(self.path[i - 1], *cell));
            }
        }

        // The path has no duplicate and at least two cells, so the endpoints differ
        for endpoint in [self.path[0], self.path[self.path.len() - 1]] {
            if !endpoint.is_outer(n) {
                return Err(PathError::EndpointNotOuter(endpoint));
            }
        }
        Ok(())
    }

    /// Whether the path is a solution for the board.
    pub fn is_valid(&self, board: &Board) -> bool {
        self.validate(board).is_ok()
    }
}

/// Unit step between two adjacent cells.
fn direction(from: Cell, to: Cell) -> (isize, isize) {
    (
        to.row as isize - from.row as isize,
        to.col as isize - from.col as isize,
    )
}
