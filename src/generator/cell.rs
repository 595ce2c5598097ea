/*
cell.rs

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

//! Cell coordinates and grid geometry.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a cell in an `n x n` grid.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

impl Cell {
    /// Create a [`Cell`] object.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Build the cell from its row-major index.
    pub fn from_index(index: usize, n: usize) -> Self {
        Self {
            row: index / n,
            col: index % n,
        }
    }

    /// Row-major index of the cell.
    pub fn index(&self, n: usize) -> usize {
        self.row * n + self.col
    }

    /// Whether the cell lies on the border ring of the grid.
    pub fn is_outer(&self, n: usize) -> bool {
        self.row == 0 || self.col == 0 || self.row + 1 == n || self.col + 1 == n
    }

    /// Distance to the closest border. Outer cells have ring 0.
    pub fn ring(&self, n: usize) -> usize {
        self.row
            .min(self.col)
            .min(n - 1 - self.row)
            .min(n - 1 - self.col)
    }

    /// Checkerboard class of the cell: `0` when `row + col` is even, `1` otherwise.
    pub fn parity(&self) -> usize {
        (self.row + self.col) % 2
    }

    /// Whether the two cells share a side.
    pub fn is_adjacent(&self, other: Cell) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }

    /// Return the up to four cells sharing a side with this cell, in north, south, west, east
    /// order.
    pub fn neighbors4(&self, n: usize) -> Neighbors {
        let mut neighbors: Neighbors = Neighbors::default();

        if self.row > 0 {
            neighbors.push(Cell::new(self.row - 1, self.col));
        }
        if self.row + 1 < n {
            neighbors.push(Cell::new(self.row + 1, self.col));
        }
        if self.col > 0 {
            neighbors.push(Cell::new(self.row, self.col - 1));
        }
        if self.col + 1 < n {
            neighbors.push(Cell::new(self.row, self.col + 1));
        }
        neighbors
    }
}

/// Fixed-capacity list of the neighbors of a cell.
///
/// A grid cell has at most four neighbors, so the list lives on the stack.
#[derive(Debug, Copy, Clone, Default)]
pub struct Neighbors {
    cells: [Cell; 4],
    len: usize,
}

impl Neighbors {
    fn push(&mut self, cell: Cell) {
        self.cells[self.len] = cell;
        self.len += 1;
    }

    /// Number of neighbors.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the cell has no neighbor (only on a 1x1 grid).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over the neighbors.
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells[..self.len].iter()
    }

    /// Keep only the neighbors for which the predicate returns `true`.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Cell) -> bool,
    {
        let mut kept: usize = 0;
        for i in 0..self.len {
            let cell: Cell = self.cells[i];
            if keep(cell) {
                self.cells[kept] = cell;
                kept += 1;
            }
        }
        self.len = kept;
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl<'a> IntoIterator for &'a Neighbors {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_and_outer() {
        let n: usize = 6;
        assert_eq!(Cell::new(0, 3).ring(n), 0);
        assert_eq!(Cell::new(5, 5).ring(n), 0);
        assert_eq!(Cell::new(1, 4).ring(n), 1);
        assert_eq!(Cell::new(2, 3).ring(n), 2);
        assert!(Cell::new(0, 3).is_outer(n));
        assert!(Cell::new(3, 5).is_outer(n));
        assert!(!Cell::new(1, 1).is_outer(n));

        for index in 0..n * n {
            let cell: Cell = Cell::from_index(index, n);
            assert_eq!(cell.index(n), index);
            assert_eq!(cell.is_outer(n), cell.ring(n) == 0);
        }
    }

    #[test]
    fn test_neighbors() {
        let n: usize = 4;
        assert_eq!(Cell::new(0, 0).neighbors4(n).len(), 2);
        assert_eq!(Cell::new(0, 2).neighbors4(n).len(), 3);
        assert_eq!(Cell::new(2, 2).neighbors4(n).len(), 4);

        let center: Cell = Cell::new(1, 2);
        for neighbor in &center.neighbors4(n) {
            assert!(center.is_adjacent(*neighbor));
            assert_ne!(center.parity(), neighbor.parity());
        }
        assert!(!Cell::new(0, 0).is_adjacent(Cell::new(1, 1)));
        assert!(!Cell::new(0, 0).is_adjacent(Cell::new(0, 0)));
    }
}
