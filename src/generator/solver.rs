/*
solver.rs

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

//! Find a path that visits every passable cell of a board exactly once.
//!
//! The search is a depth-first backtracking with the following pruning:
//!
//! - a move is discarded when it would leave another open neighbor of the current cell without
//!   any open neighbor (the cell could never be visited),
//! - an inner open neighbor with one open neighbor left must be visited now, otherwise it would
//!   become a dead end. Two such cells cannot both be visited now, so the branch fails,
//! - the remaining moves are tried by increasing degree (Warnsdorff rule). Near the end of the
//!   path, border cells come first so that the path can end on the border,
//! - the search stops when no border cell is left for the path end.

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use std::time::Instant;

use super::board::Board;
use super::cell::{Cell, Neighbors};
use super::constraints;
use super::path::Path;
use super::search::{SearchArena, SolveError};

/// Default iteration cap for each starting cell.
pub const MAX_ITERATIONS: usize = 50_000;

/// Default number of starting cells to try.
pub const MAX_STARTS: usize = 8;

/// Number of remaining cells below which border cells are preferred on ties.
const ENDGAME_WINDOW: usize = 6;

/// Move candidate.
#[derive(Debug, Copy, Clone)]
struct Candidate {
    cell: Cell,

    /// Open neighbors of the cell, once the cell is entered.
    degree: usize,

    outer: bool,
}

/// [`Solver`] object.
pub struct Solver<'a> {
    /// Board to solve.
    board: &'a Board,

    /// Visited status and degrees of the cells.
    arena: SearchArena,

    /// Number of passable cells.
    num_cells: usize,

    /// Iteration cap for each starting cell.
    pub max_iterations: usize,

    /// Maximum number of starting cells to try.
    pub max_starts: usize,

    /// Number of iterations it took to solve the board, for all the starting cells.
    pub iteration: usize,

    /// Duration in seconds it took to solve the board.
    pub duration: f32,

    /// Iterations for the current starting cell.
    attempt_iteration: usize,

    /// Required final cell, when the path endpoints are imposed.
    goal: Option<Cell>,
}

impl<'a> Solver<'a> {
    /// Create the object.
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            arena: SearchArena::new(board),
            num_cells: board.passable_count(),
            max_iterations: MAX_ITERATIONS,
            max_starts: MAX_STARTS,
            iteration: 0,
            duration: 0.0,
            attempt_iteration: 0,
            goal: None,
        }
    }

    /// Set the iteration cap and the number of starting cells.
    pub fn with_limits(mut self, max_iterations: usize, max_starts: usize) -> Self {
        self.max_iterations = max_iterations;
        self.max_starts = max_starts.max(1);
        self
    }

    /// Find and return a path that starts and ends on the border.
    ///
    /// Several random border cells are tried as the starting point.
    ///
    /// # Errors
    ///
    /// The method returns an error if the board cannot have a path, or if no path is found within
    /// the iteration cap. Both are ordinary outcomes for randomly generated boards.
    pub fn solve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Path, SolveError> {
        self.goal = None;
        self.iteration = 0;
        self.duration = 0.0;
        let start: Instant = Instant::now();

        if self.num_cells < 2 {
            return Err(SolveError::TooFewCells);
        }
        let mut starts: Vec<Cell> = self.board.outer_passable_cells();
        if starts.len() < 2 {
            return Err(SolveError::TooFewCells);
        }

        // Necessary condition, checked before any backtracking
        let (even, odd): (usize, usize) = constraints::parity_counts(self.board);
        if even.abs_diff(odd) > 1 {
            debug!("Parity check failed: {even} even cells, {odd} odd cells");
            return Err(SolveError::NoPath);
        }
        // With an odd number of cells, both endpoints are in the larger class
        if even != odd {
            let class: usize = if even > odd { 0 } else { 1 };
            starts.retain(|c| c.parity() == class);
        }

        starts.shuffle(rng);
        starts.truncate(self.max_starts);

        let mut limit_reached: bool = false;
        for cell in starts {
            match self.attempt(cell, rng) {
                Ok(path) => {
                    self.duration = start.elapsed().as_secs_f32();
                    debug!(
                        "Path found from {cell}: iterations = {}  duration = {}",
                        self.iteration, self.duration
                    );
                    return Ok(path);
                }
                Err(SolveError::IterationLimit) => {
                    debug!("    Iteration limit reached from {cell}");
                    limit_reached = true;
                }
                Err(_) => debug!("    No path from {cell}"),
            }
        }
        self.duration = start.elapsed().as_secs_f32();
        if limit_reached {
            Err(SolveError::IterationLimit)
        } else {
            Err(SolveError::NoPath)
        }
    }

    /// Find a path between the two given cells.
    ///
    /// This is the search used to show the solution for imposed endpoints.
    ///
    /// # Errors
    ///
    /// The method returns [`SolveError::TooFewCells`] when the endpoints are not two distinct
    /// passable cells, and the errors of [`Solver::solve`] otherwise.
    pub fn solve_between<R: Rng + ?Sized>(
        &mut self,
        first: Cell,
        last: Cell,
        rng: &mut R,
    ) -> Result<Path, SolveError> {
        self.iteration = 0;
        self.duration = 0.0;
        let start: Instant = Instant::now();

        if first == last || !self.board.is_passable(first) || !self.board.is_passable(last) {
            return Err(SolveError::TooFewCells);
        }

        // With an even number of cells the endpoints are in different classes, otherwise both
        // are in the larger class
        let (even, odd): (usize, usize) = constraints::parity_counts(self.board);
        let parity_ok: bool = match even.abs_diff(odd) {
            0 => first.parity() != last.parity(),
            1 => {
                let class: usize = if even > odd { 0 } else { 1 };
                first.parity() == class && last.parity() == class
            }
            _ => false,
        };
        if !parity_ok {
            return Err(SolveError::NoPath);
        }

        self.goal = Some(last);
        let res: Result<Path, SolveError> = self.attempt(first, rng);
        self.goal = None;
        self.duration = start.elapsed().as_secs_f32();
        debug!(
            "Path {first} -> {last}: iterations = {}  duration = {}",
            self.iteration, self.duration
        );
        res
    }

    /// Search for a path from the given starting cell.
    fn attempt<R: Rng + ?Sized>(&mut self, first: Cell, rng: &mut R) -> Result<Path, SolveError> {
        self.arena.reset();
        self.attempt_iteration = 0;

        let mut path: Path = Path::new(self.num_cells);
        self.arena.visit(first);
        path.push(first);
        self.find_path(first, &mut path, rng)?;
        Ok(path)
    }

    /// Whether the path is allowed to end on the given cell.
    fn can_end_at(&self, cell: Cell) -> bool {
        match self.goal {
            Some(goal) => cell == goal,
            None => cell.is_outer(self.arena.size()),
        }
    }

    /// Recursively extend the path from the current cell.
    fn find_path<R: Rng + ?Sized>(
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

        let remaining: usize = self.arena.unvisited();
        if remaining == 0 {
            return if self.can_end_at(current) {
                Ok(())
            } else {
                Err(SolveError::NoPath)
            };
        }

        match self.goal {
            // The goal is entered last, so it needs an open neighbor until then
            Some(goal) => {
                if remaining > 1 && self.arena.degree(goal) == 0 {
                    return Err(SolveError::NoPath);
                }
            }
            // The last cell must be on the border
            None => {
                if self.arena.unvisited_outer() == 0 {
                    return Err(SolveError::NoPath);
                }
            }
        }

        let mut neighbors: Neighbors = self.arena.open_neighbors(current);
        if let Some(goal) = self.goal {
            neighbors.retain(|c| c != goal || remaining == 1);
        }

        let mut candidates: Vec<Candidate> = Vec::with_capacity(4);
        for cell in &neighbors {
            // Lookahead: the other open neighbors must stay reachable. A cell left without open
            // neighbors can still be entered from the new position if it is the very last one.
            let orphan: bool = neighbors.iter().filter(|u| *u != cell).any(|u| {
                self.arena.degree_after(*u, *cell) == 0
                    && !(remaining == 2 && u.is_adjacent(*cell))
            });
            if orphan {
                continue;
            }
            candidates.push(Candidate {
                cell: *cell,
                degree: self.arena.degree(*cell),
                outer: cell.is_outer(self.arena.size()),
            });
        }
        if candidates.is_empty() {
            return Err(SolveError::NoPath);
        }

        // Forced moves
        let forced: Vec<Candidate> = candidates
            .iter()
            .filter(|c| c.degree <= 1 && !self.can_end_at(c.cell))
            .copied()
            .collect();
        if forced.len() > 1 {
            return Err(SolveError::NoPath);
        }
        let ordered: Vec<Candidate> = if forced.is_empty() {
            let endgame: bool = remaining <= ENDGAME_WINDOW;
            candidates.shuffle(rng);
            candidates.sort_by_key(|c| (c.degree, endgame && !c.outer));
            candidates
        } else {
            forced
        };

        for c in ordered {
            self.arena.visit(c.cell);
            path.push(c.cell);
            match self.find_path(c.cell, path, rng) {
                Ok(()) => return Ok(()),
                Err(SolveError::IterationLimit) => return Err(SolveError::IterationLimit),
                Err(_) => (),
            }
            path.pop();
            self.arena.unvisit(c.cell);
        }
        Err(SolveError::NoPath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::path::PathError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// Board with a known path from (1,0) to (5,5).
    const OBSTACLE_BOARD: &str = "
        . . . . . .
        . # # . . .
        . . . . . .
        . . . . . .
        . . . . . .
        . . . . . .
    ";

    #[test]
    fn test_solve_open_boards() {
        let mut rng: StdRng = StdRng::seed_from_u64(1);
        for n in 3..=8 {
            let board: Board = Board::new(n);
            let path: Path = Solver::new(&board).solve(&mut rng).unwrap();
            assert_eq!(path.validate(&board), Ok(()));
        }
    }

    #[test]
    fn test_solve_with_obstacles() {
        let mut rng: StdRng = StdRng::seed_from_u64(2);
        let board: Board = Board::parse(OBSTACLE_BOARD).unwrap();
        let mut solver: Solver = Solver::new(&board);
        let path: Path = solver.solve(&mut rng).unwrap();
        assert_eq!(path.len(), 34);
        assert_eq!(path.validate(&board), Ok(()));
        assert!(solver.iteration > 0);

        // Cut out of a serpentine: only one way through the bottom rows
        let n: usize = 6;
        let snake: Vec<Cell> = Path::serpentine(n).get()[..32].to_vec();
        let board: Board = Board::from_passable_cells(n, &snake);
        let path: Path = Solver::new(&board).solve(&mut rng).unwrap();
        assert_eq!(path.validate(&board), Ok(()));
    }

    #[test]
    fn test_parity_rejected_before_search() {
        let mut rng: StdRng = StdRng::seed_from_u64(3);
        // Four even cells removed: 14 even and 18 odd passable cells
        let board: Board = Board::parse(
            "
            # . . . . .
            . # . . . .
            . . . . . .
            . . . . . .
            . . . . # .
            . . . . . #
            ",
        )
        .unwrap();
        assert_eq!(constraints::parity_counts(&board), (14, 18));
        let mut solver: Solver = Solver::new(&board);
        assert_eq!(solver.solve(&mut rng), Err(SolveError::NoPath));
        assert_eq!(solver.iteration, 0);
    }

    #[test]
    fn test_unsolvable_board() {
        let mut rng: StdRng = StdRng::seed_from_u64(4);
        // Balanced classes, but three cells with a single neighbor and a path only has two ends
        let board: Board = Board::parse(
            "
            . # . # .
            . . . . .
            . . . . .
            . . . . .
            # . . . #
            ",
        )
        .unwrap();
        assert!(constraints::parity_check(&board));
        let mut solver: Solver = Solver::new(&board);
        assert!(solver.solve(&mut rng).is_err());
    }

    #[test]
    fn test_too_few_cells() {
        let mut rng: StdRng = StdRng::seed_from_u64(5);
        let board: Board = Board::from_passable_cells(4, &[Cell::new(0, 0)]);
        assert_eq!(
            Solver::new(&board).solve(&mut rng),
            Err(SolveError::TooFewCells)
        );
    }

    #[test]
    fn test_iteration_limit() {
        let mut rng: StdRng = StdRng::seed_from_u64(6);
        let board: Board = Board::new(10);
        let mut solver: Solver = Solver::new(&board).with_limits(3, 2);
        assert_eq!(solver.solve(&mut rng), Err(SolveError::IterationLimit));
        assert_eq!(solver.iteration, 2 * 4);
    }

    #[test]
    fn test_different_seeds_give_valid_paths() {
        let board: Board = Board::parse(OBSTACLE_BOARD).unwrap();
        let mut paths: Vec<Path> = Vec::new();
        for seed in 0..6 {
            let mut rng: StdRng = StdRng::seed_from_u64(seed);
            let path: Path = Solver::new(&board).solve(&mut rng).unwrap();
            assert!(path.is_valid(&board));
            paths.push(path);
        }
    }

    #[test]
    fn test_solve_between() {
        let mut rng: StdRng = StdRng::seed_from_u64(8);
        let board: Board = Board::new(4);
        let first: Cell = Cell::new(0, 0);
        let last: Cell = Cell::new(3, 0);
        let path: Path = Solver::new(&board)
            .solve_between(first, last, &mut rng)
            .unwrap();
        assert_eq!(path.get_first(), Some(first));
        assert_eq!(path.get_last(), Some(last));
        assert!(path.is_valid(&board));

        // Same checkerboard class on a board with an even number of cells
        assert_eq!(
            Solver::new(&board).solve_between(first, Cell::new(0, 2), &mut rng),
            Err(SolveError::NoPath)
        );
        assert_eq!(
            Solver::new(&board).solve_between(first, first, &mut rng),
            Err(SolveError::TooFewCells)
        );
    }

    #[test]
    fn test_solve_between_inner_goal() {
        let mut rng: StdRng = StdRng::seed_from_u64(9);
        let board: Board = Board::new(4);
        let first: Cell = Cell::new(0, 0);
        let last: Cell = Cell::new(1, 2);
        let path: Path = Solver::new(&board)
            .solve_between(first, last, &mut rng)
            .unwrap();
        assert_eq!(path.len(), 16);
        assert_eq!(path.get_first(), Some(first));
        assert_eq!(path.get_last(), Some(last));
        // Covers the board, only the inner endpoint breaks the puzzle rules
        assert_eq!(path.validate(&board), Err(PathError::EndpointNotOuter(last)));
    }
}
