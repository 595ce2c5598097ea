/*
carver.rs

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

//! Carve a path of a given length in an empty board.
//!
//! The cells that the path does not visit become the obstacles, so the resulting board always
//! has a solution.

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::time::Instant;

use super::board::Board;
use super::cell::Cell;
use super::path::Path;
use super::search::{SearchArena, SolveError};

/// Default iteration cap for each starting cell.
pub const MAX_ITERATIONS: usize = 20_000;

/// Default amplitude of the random noise added to the degree when ordering the moves.
pub const DEFAULT_JITTER: f64 = 1.5;

/// Number of remaining steps below which border cells are preferred.
const ENDGAME_WINDOW: usize = 4;

/// [`Carver`] object.
pub struct Carver {
    /// Grid dimension.
    n: usize,

    /// Number of cells in the path to carve.
    target_length: usize,

    /// Visited status and degrees of the cells of the empty board.
    arena: SearchArena,

    /// Iteration cap for each starting cell.
    pub max_iterations: usize,

    /// Random noise added to the degree of the candidate moves.
    pub jitter: f64,

    /// Number of iterations of the last carving, for all the starting cells.
    pub iteration: usize,

    /// Duration in seconds of the last carving.
    pub duration: f32,

    attempt_iteration: usize,
}

impl Carver {
    /// Create the object for an `n x n` board and a path of `target_length` cells.
    pub fn new(n: usize, target_length: usize) -> Self {
        Self {
            n,
            target_length,
            arena: SearchArena::new(&Board::new(n)),
            max_iterations: MAX_ITERATIONS,
            jitter: DEFAULT_JITTER,
            iteration: 0,
            duration: 0.0,
            attempt_iteration: 0,
        }
    }

    /// Set the iteration cap and the jitter.
    pub fn with_limits(mut self, max_iterations: usize, jitter: f64) -> Self {
        self.max_iterations = max_iterations;
        self.jitter = jitter.max(0.0);
        self
    }

    /// Carve a path from up to `max_starts` random border cells.
    ///
    /// # Errors
    ///
    /// The method returns [`SolveError::TooFewCells`] if the target length does not fit in the
    /// board, and the last search error if no starting cell leads to a path.
    pub fn carve<R: Rng + ?Sized>(
        &mut self,
        max_starts: usize,
        rng: &mut R,
    ) -> Result<Path, SolveError> {
        let mut starts: Vec<Cell> = Board::new(self.n).outer_passable_cells();
        starts.shuffle(rng);
        starts.truncate(max_starts.max(1));

        let start: Instant = Instant::now();
        let mut iterations: usize = 0;
        let mut res: Result<Path, SolveError> = Err(SolveError::NoPath);
        for cell in starts {
            res = self.carve_from(cell, rng);
            iterations += self.iteration;
            match res {
                Ok(_) | Err(SolveError::TooFewCells) => break,
                Err(_) => debug!("    No carving from {cell}"),
            }
        }
        self.iteration = iterations;
        self.duration = start.elapsed().as_secs_f32();
        res
    }

    /// Carve a path that starts on the given border cell.
    ///
    /// # Errors
    ///
    /// The method returns [`SolveError::TooFewCells`] if the target length does not fit in the
    /// board, [`SolveError::NoPath`] if the starting cell is not on the border or no path
    /// exists, and [`SolveError::IterationLimit`] when the cap is reached.
    pub fn carve_from<R: Rng + ?Sized>(
        &mut self,
        first: Cell,
        rng: &mut R,
    ) -> Result<Path, SolveError> {
        self.iteration = 0;
        self.duration = 0.0;
        let start: Instant = Instant::now();

        if self.target_length < 2 || self.target_length > self.n * self.n {
            return Err(SolveError::TooFewCells);
        }
        if first.row >= self.n || first.col >= self.n || !first.is_outer(self.n) {
            return Err(SolveError::NoPath);
        }

        self.arena.reset();
        self.attempt_iteration = 0;
        let mut path: Path = Path::new(self.target_length);
        self.arena.visit(first);
        path.push(first);
        let res: Result<(), SolveError> = self.extend(first, &mut path, rng);
        self.duration = start.elapsed().as_secs_f32();
        debug!(
            "Carving {} cells from {first}: iterations = {}  duration = {}",
            self.target_length, self.iteration, self.duration
        );
        res.map(|()| path)
    }

    /// Number of open cells reachable from the current cell, stopping at `limit`.
    fn reachable(&self, current: Cell, limit: usize) -> usize {
        let mut seen: Vec<bool> = vec![false; self.n * self.n];
        let mut queue: VecDeque<Cell> = VecDeque::new();
        let mut count: usize = 0;

        seen[current.index(self.n)] = true;
        queue.push_back(current);
        while let Some(cell) = queue.pop_front() {
            for neighbor in &self.arena.open_neighbors(cell) {
                let index: usize = neighbor.index(self.n);
                if !seen[index] {
                    seen[index] = true;
                    count += 1;
                    if count >= limit {
                        return count;
                    }
                    queue.push_back(*neighbor);
                }
            }
        }
        count
    }

    /// Recursively extend the path from the current cell.
    fn extend<R: Rng + ?Sized>(
        &mut self,
        current: Cell,
        path: &mut Path,
        rng: &mut R,
    ) -> Result<(), SolveError> {
        self.iteration += 1;
        self.attempt_iteration += 1;
        if self.attempt_iteration > self.max_iterations {
            return Err(SolveError::IterationLimit);
        }

        let remaining: usize = self.target_length - path.len();
        if remaining == 0 {
            return if current.is_outer(self.n) {
                Ok(())
            } else {
                Err(SolveError::NoPath)
            };
        }

        // The border must stay within reach, and the path must not be walled in
        if current.ring(self.n) > remaining || self.reachable(current, remaining) < remaining {
            return Err(SolveError::NoPath);
        }

        let endgame: bool = remaining <= ENDGAME_WINDOW;
        let mut candidates: Vec<(f64, Cell)> = self
            .arena
            .open_neighbors(current)
            .iter()
            .filter(|c| c.ring(self.n) < remaining)
            .map(|c| {
                let mut key: f64 = self.arena.degree(*c) as f64 + rng.random::<f64>() * self.jitter;
                if endgame && c.is_outer(self.n) {
                    key -= self.jitter + 1.0;
                }
                (key, *c)
            })
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (_, cell) in candidates {
            self.arena.visit(cell);
            path.push(cell);
            match self.extend(cell, path, rng) {
                Ok(()) => return Ok(()),
                Err(SolveError::IterationLimit) => return Err(SolveError::IterationLimit),
                Err(_) => (),
            }
            path.pop();
            self.arena.unvisit(cell);
        }
        Err(SolveError::NoPath)
    }
}

/// Build the board whose passable cells are the cells of the path.
pub fn board_from_path(n: usize, path: &Path) -> Board {
    Board::from_passable_cells(n, path.get())
}
