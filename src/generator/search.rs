/*
search.rs

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

//! Visited and degree bookkeeping shared by the solver and the path carver.
//!
//! The degree of a cell is the number of its passable neighbors that are not visited yet.
//! Visiting a cell decrements the degree of its neighbors, and leaving it on backtrack
//! increments them again, so that the degree is always available in O(1).

use std::error::Error;
use std::fmt;

use super::board::Board;
use super::cell::{Cell, Neighbors};

/// Type of errors returned by the path searches.
#[derive(Debug, PartialEq)]
pub enum SolveError {
    /// The board does not have enough passable cells, or not enough border cells to start and
    /// end a path.
    TooFewCells,

    /// No possible path.
    NoPath,

    /// The iteration cap was reached before a path was found.
    IterationLimit,
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolveError::TooFewCells => write!(f, "not enough cells for a path"),
            SolveError::NoPath => write!(f, "no path found"),
            SolveError::IterationLimit => write!(f, "iteration limit reached"),
        }
    }
}

impl Error for SolveError {}

/// Search state for one solver or carver run.
#[derive(Debug, Clone)]
pub struct SearchArena {
    /// Grid dimension.
    n: usize,

    /// Passable status, indexed by `row * n + col`.
    passable: Vec<bool>,

    /// Visited status.
    visited: Vec<bool>,

    /// Number of passable and not visited neighbors.
    degree: Vec<u8>,

    /// Number of passable cells not visited yet.
    unvisited: usize,

    /// Number of passable border cells not visited yet.
    unvisited_outer: usize,
}

impl SearchArena {
    /// Create the arena for the given board. No cell is visited.
    pub fn new(board: &Board) -> Self {
        let n: usize = board.size();
        let passable: Vec<bool> = board.cells().map(|c| board.is_passable(c)).collect();
        let mut arena: SearchArena = Self {
            n,
            passable,
            visited: vec![false; n * n],
            degree: vec![0; n * n],
            unvisited: 0,
            unvisited_outer: 0,
        };
        arena.reset();
        arena
    }

    /// Mark all the cells as not visited and recompute the degrees.
    pub fn reset(&mut self) {
        let n: usize = self.n;
        self.visited.fill(false);
        self.unvisited = 0;
        self.unvisited_outer = 0;
        for index in 0..n * n {
            let cell: Cell = Cell::from_index(index, n);
            if !self.passable[index] {
                self.degree[index] = 0;
                continue;
            }
            self.unvisited += 1;
            if cell.is_outer(n) {
                self.unvisited_outer += 1;
            }
            self.degree[index] = cell
                .neighbors4(n)
                .iter()
                .filter(|c| self.passable[c.index(n)])
                .count() as u8;
        }
    }

    /// Grid dimension.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Whether the cell is passable and not visited yet.
    pub fn is_open(&self, cell: Cell) -> bool {
        let index: usize = cell.index(self.n);
        self.passable[index] && !self.visited[index]
    }

    /// Number of open neighbors of the cell.
    pub fn degree(&self, cell: Cell) -> usize {
        self.degree[cell.index(self.n)] as usize
    }

    /// Degree of `cell` once `moved_to` is visited as well.
    pub fn degree_after(&self, cell: Cell, moved_to: Cell) -> usize {
        let degree: usize = self.degree(cell);
        if cell.is_adjacent(moved_to) {
            degree - 1
        } else {
            degree
        }
    }

    /// Open neighbors of the cell.
    pub fn open_neighbors(&self, cell: Cell) -> Neighbors {
        let mut neighbors: Neighbors = cell.neighbors4(self.n);
        neighbors.retain(|c| self.is_open(c));
        neighbors
    }

    /// Number of passable cells not visited yet.
    pub fn unvisited(&self) -> usize {
        self.unvisited
    }

    /// Number of passable border cells not visited yet.
    pub fn unvisited_outer(&self) -> usize {
        self.unvisited_outer
    }

    /// Mark the cell as visited.
    pub fn visit(&mut self, cell: Cell) {
        let n: usize = self.n;
        let index: usize = cell.index(n);
        debug_assert!(self.is_open(cell));
        self.visited[index] = true;
        self.unvisited -= 1;
        if cell.is_outer(n) {
            self.unvisited_outer -= 1;
        }
        for neighbor in &cell.neighbors4(n) {
            let i: usize = neighbor.index(n);
            if self.passable[i] {
                self.degree[i] -= 1;
            }
        }
    }

    /// Revert [`SearchArena::visit`].
    pub fn unvisit(&mut self, cell: Cell) {
        let n: usize = self.n;
        let index: usize = cell.index(n);
        debug_assert!(self.visited[index]);
        self.visited[index] = false;
        self.unvisited += 1;
        if cell.is_outer(n) {
            self.unvisited_outer += 1;
        }
        for neighbor in &cell.neighbors4(n) {
            let i: usize = neighbor.index(n);
            if self.passable[i] {
                self.degree[i] += 1;
            }
        }
    }
}
