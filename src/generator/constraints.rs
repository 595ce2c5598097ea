/*
constraints.rs

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

//! Cheap board filters that run before any path search.
//!
//! - [`parity_check`] is a necessary condition for a Hamiltonian path on a grid graph.
//! - [`connected`] verifies that all the passable cells form one component.
//! - [`board_acceptable`] rejects boards where obstacles form bands along rows or columns, or
//!   concentrate on the border. The tolerances come from [`NoBandConstraints`].
//! - [`can_place_obstacle`] is the local degree test used while placing obstacles.

use log::debug;
use std::collections::VecDeque;

use super::board::Board;
use super::cell::Cell;

/// Highest supported relax level.
pub const MAX_RELAX_LEVEL: usize = 3;

/// Ratio applied to the expected number of border obstacles, per relax level.
const OUTER_RATIOS: [f64; MAX_RELAX_LEVEL + 1] = [0.7, 0.85, 1.0, 1.2];

/// Tolerances that prevent obstacles from forming bands.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NoBandConstraints {
    /// Minimum number of passable cells in each row and each column.
    pub min_passable_per_line: usize,

    /// Longest allowed run of consecutive obstacles in a row or a column.
    pub max_obstacle_run: usize,

    /// Minimum number of obstacles on the border ring.
    pub outer_min: usize,

    /// Maximum number of obstacles on the border ring.
    pub outer_max: usize,

    /// Largest obstacle count compatible with [`NoBandConstraints::min_passable_per_line`].
    pub max_obstacles_no_band: usize,

    /// Requested obstacle count.
    pub obstacle_count: usize,
}

impl NoBandConstraints {
    /// Derive the constraints for an `n x n` board with `obstacle_count` obstacles.
    ///
    /// `relax_level` goes from 0 (strict) to [`MAX_RELAX_LEVEL`]. Higher values are clamped.
    pub fn new(n: usize, obstacle_count: usize, relax_level: usize) -> Self {
        let relax_level: usize = relax_level.min(MAX_RELAX_LEVEL);
        let min_passable_per_line: usize = 2;
        let base_max_run: usize = usize::max(3, n * 6 / 10);

        let total_cells: usize = n * n;
        let outer_cells: usize = if n == 1 { 1 } else { n * 4 - 4 };
        let expected_outer: f64 = obstacle_count as f64 * outer_cells as f64 / total_cells as f64;
        let ratio_max: usize = (expected_outer * OUTER_RATIOS[relax_level]) as usize;
        let outer_max: usize = obstacle_count.min(usize::max(2, ratio_max));

        Self {
            min_passable_per_line,
            max_obstacle_run: base_max_run + relax_level,
            outer_min: 0,
            outer_max,
            max_obstacles_no_band: total_cells.saturating_sub(min_passable_per_line * n),
            obstacle_count,
        }
    }

    /// Whether a board satisfying these constraints can exist at all.
    pub fn feasible(&self) -> bool {
        self.obstacle_count <= self.max_obstacles_no_band && self.outer_min <= self.outer_max
    }
}

/// Whether the passable cells are balanced between the two checkerboard classes.
///
/// Every step of a path changes the `(row + col)` parity, so a Hamiltonian path can only exist
/// when the two classes differ by at most one cell.
pub fn parity_check(board: &Board) -> bool {
    let (even, odd): (usize, usize) = parity_counts(board);
    even.abs_diff(odd) <= 1
}

/// Number of passable cells in the even and the odd checkerboard classes.
pub fn parity_counts(board: &Board) -> (usize, usize) {
    board
        .passable_cells()
        .fold((0, 0), |(even, odd), c| match c.parity() {
            0 => (even + 1, odd),
            _ => (even, odd + 1),
        })
}

/// Whether turning the given cell into an obstacle keeps every neighbor usable.
///
/// A passable neighbor that would have no passable neighbor left is isolated. An inner
/// neighbor left with a single passable neighbor would become a dead end, which is only allowed
/// for the path endpoints, and endpoints must be on the border.
pub fn can_place_obstacle(board: &Board, cell: Cell) -> bool {
    if !board.is_passable(cell) {
        return false;
    }
    let n: usize = board.size();
    for neighbor in &cell.neighbors4(n) {
        if !board.is_passable(*neighbor) {
            continue;
        }
        // The neighbor loses the cell being turned into an obstacle
        let degree: usize = board.passable_degree(*neighbor) - 1;
        if degree == 0 {
            return false;
        }
        if degree <= 1 && !neighbor.is_outer(n) {
            return false;
        }
    }
    true
}

/// Whether the passable cells form a single 4-connected component.
pub fn connected(board: &Board) -> bool {
    let n: usize = board.size();
    let start: Cell = match board.passable_cells().next() {
        Some(c) => c,
        None => return false,
    };

    let mut visited: Vec<bool> = vec![false; n * n];
    let mut queue: VecDeque<Cell> = VecDeque::with_capacity(n * n);
    visited[start.index(n)] = true;
    queue.push_back(start);
    let mut reached: usize = 1;

    while let Some(cell) = queue.pop_front() {
        for neighbor in &cell.neighbors4(n) {
            if !board.is_passable(*neighbor) || visited[neighbor.index(n)] {
                continue;
            }
            visited[neighbor.index(n)] = true;
            reached += 1;
            queue.push_back(*neighbor);
        }
    }
    reached == board.passable_count()
}

/// Longest run of consecutive obstacles in any row or column.
pub fn max_obstacle_run(board: &Board) -> usize {
    let n: usize = board.size();
    let mut max_run: usize = 0;

    for transposed in [false, true] {
        for i in 0..n {
            let mut run: usize = 0;
            for j in 0..n {
                let cell: Cell = if transposed {
                    Cell::new(j, i)
                } else {
                    Cell::new(i, j)
                };
                if board.is_obstacle(cell) {
                    run += 1;
                    max_run = max_run.max(run);
                } else {
                    run = 0;
                }
            }
        }
    }
    max_run
}

/// Number of obstacles on the border ring.
pub fn count_outer_obstacles(board: &Board) -> usize {
    let n: usize = board.size();
    board.obstacles().filter(|c| c.is_outer(n)).count()
}

/// Whether every row and every column has at least `min_passable` passable cells.
pub fn has_min_passable_per_line(board: &Board, min_passable: usize) -> bool {
    let n: usize = board.size();
    (0..n).all(|i| {
        let in_row: usize = (0..n).filter(|j| board.is_passable(Cell::new(i, *j))).count();
        let in_col: usize = (0..n).filter(|j| board.is_passable(Cell::new(*j, i))).count();
        in_row >= min_passable && in_col >= min_passable
    })
}

/// Whether the board respects the no-band constraints for the given obstacle count.
pub fn board_acceptable(board: &Board, obstacle_count: usize, relax_level: usize) -> bool {
    let c: NoBandConstraints = NoBandConstraints::new(board.size(), obstacle_count, relax_level);

    if obstacle_count > c.max_obstacles_no_band {
        return false;
    }
    if !has_min_passable_per_line(board, c.min_passable_per_line) {
        return false;
    }
    let run: usize = max_obstacle_run(board);
    if run > c.max_obstacle_run {
        debug!("    Rejected: obstacle run {run} > {}", c.max_obstacle_run);
        return false;
    }
    let outer: usize = count_outer_obstacles(board);
    outer >= c.outer_min && outer <= c.outer_max
}
