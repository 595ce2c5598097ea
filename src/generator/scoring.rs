/*
scoring.rs

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

//! Rate the quality and the difficulty of a puzzle.
//!
//! A good puzzle has a winding solution, many places where the player can take a wrong turn,
//! and obstacles scattered near the center of the board rather than piled up on the border.

use serde::{Deserialize, Serialize};

use super::board::Board;
use super::cell::Cell;
use super::path::Path;

/// Weights of the score terms.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(default)]
pub struct ScoreWeights {
    /// Bonus for each pair of adjacent cells that are not consecutive in the path.
    pub branch: f64,

    /// Bonus for each direction change along the path.
    pub turn: f64,

    /// Bonus for each group of connected obstacles.
    pub components: f64,

    /// Bonus for obstacles closer to the center than a uniform distribution.
    pub centrality: f64,

    /// Penalty for obstacles unevenly spread between the quadrants and the border.
    pub balance: f64,

    /// Penalty for long obstacle runs and crowded rows or columns.
    pub run: f64,

    /// Penalty for each obstacle on the border.
    pub outer: f64,

    /// Penalty for each pair of adjacent obstacles.
    pub clump: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            branch: 4.0,
            turn: 0.18,
            components: 0.8,
            centrality: 3.0,
            balance: 0.9,
            run: 2.2,
            outer: 2.0,
            clump: 1.5,
        }
    }
}

impl ScoreWeights {
    /// Weights for the boards of the carving phase, which favor fewer border obstacles.
    pub fn carving() -> Self {
        Self {
            centrality: 2.5,
            outer: 3.0,
            ..Self::default()
        }
    }
}

/// Score terms of a (board, path) candidate.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct Score {
    pub turns: usize,
    pub branch_edges: usize,
    pub components: usize,
    pub centrality: f64,
    pub balance: f64,
    pub run_penalty: usize,
    pub outer_obstacles: usize,
    pub clumps: usize,

    /// Weighted sum of the terms. Higher is better.
    pub value: f64,
}

impl Score {
    /// Compute the score of the board and its solution.
    pub fn compute(board: &Board, path: &Path, weights: &ScoreWeights) -> Self {
        let n: usize = board.size();
        let mut score: Score = Self {
            turns: path.turn_count(),
            branch_edges: branch_edges(path, n),
            components: obstacle_components(board),
            centrality: centrality_bonus(board),
            balance: balance_penalty(board),
            run_penalty: run_penalty(board),
            outer_obstacles: board.obstacles().filter(|c| c.is_outer(n)).count(),
            clumps: adjacent_obstacle_pairs(board),
            value: 0.0,
        };
        score.value = score.branch_edges as f64 * weights.branch
            + score.turns as f64 * weights.turn
            + score.components as f64 * weights.components
            + score.centrality * weights.centrality
            - score.balance * weights.balance
            - score.run_penalty as f64 * weights.run
            - score.outer_obstacles as f64 * weights.outer
            - score.clumps as f64 * weights.clump;
        score
    }
}

/// Number of pairs of adjacent path cells that are not consecutive in the path.
///
/// Each of these pairs is a place where the player can leave the solution.
pub fn branch_edges(path: &Path, n: usize) -> usize {
    let mut position: Vec<Option<usize>> = vec![None; n * n];
    for (i, cell) in path.get().iter().enumerate() {
        position[cell.index(n)] = Some(i);
    }

    let mut extra: usize = 0;
    for (i, cell) in path.get().iter().enumerate() {
        for neighbor in &cell.neighbors4(n) {
            if let Some(j) = position[neighbor.index(n)]
                && i.abs_diff(j) != 1
            {
                extra += 1;
            }
        }
    }
    extra / 2
}

/// Number of 4-connected groups of obstacles.
pub fn obstacle_components(board: &Board) -> usize {
    let n: usize = board.size();
    let mut seen: Vec<bool> = vec![false; n * n];
    let mut components: usize = 0;

    for cell in board.obstacles() {
        if seen[cell.index(n)] {
            continue;
        }
        components += 1;
        seen[cell.index(n)] = true;
        let mut stack: Vec<Cell> = vec![cell];
        while let Some(c) = stack.pop() {
            for neighbor in &c.neighbors4(n) {
                if board.is_obstacle(*neighbor) && !seen[neighbor.index(n)] {
                    seen[neighbor.index(n)] = true;
                    stack.push(*neighbor);
                }
            }
        }
    }
    components
}

/// Mean ring of all the cells of an `n x n` board.
fn uniform_ring_mean(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let sum: usize = (0..n * n).map(|i| Cell::from_index(i, n).ring(n)).sum();
    sum as f64 / (n * n) as f64
}

/// Positive when the obstacles are closer to the center than uniformly spread obstacles.
pub fn centrality_bonus(board: &Board) -> f64 {
    let n: usize = board.size();
    let obstacles: usize = board.obstacle_count();
    if obstacles == 0 {
        return 0.0;
    }
    let sum: usize = board.obstacles().map(|c| c.ring(n)).sum();
    let mean: f64 = sum as f64 / obstacles as f64;
    (mean - uniform_ring_mean(n)) * obstacles as f64 * 2.5
}

/// Deviation of the obstacle distribution between the four quadrants, plus the deviation of the
/// number of border obstacles from a uniform distribution.
pub fn balance_penalty(board: &Board) -> f64 {
    let n: usize = board.size();
    let mid: usize = n / 2;
    let mut quadrants: [usize; 4] = [0; 4];
    let mut outer: usize = 0;
    let mut total: usize = 0;

    for cell in board.obstacles() {
        total += 1;
        let q: usize = (if cell.row < mid { 0 } else { 2 }) + (if cell.col < mid { 0 } else { 1 });
        quadrants[q] += 1;
        if cell.is_outer(n) {
            outer += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }

    let ideal_quadrant: f64 = total as f64 / 4.0;
    let quadrant_penalty: f64 = quadrants
        .iter()
        .map(|q| (*q as f64 - ideal_quadrant).abs())
        .sum();

    let outer_cells: usize = if n == 1 { 1 } else { n * 4 - 4 };
    let ideal_outer: f64 = total as f64 * outer_cells as f64 / (n * n) as f64;
    quadrant_penalty + (outer as f64 - ideal_outer).abs()
}

/// Penalty for obstacle runs of `max(4, n / 2)` cells or more, and for rows or columns where at
/// least three quarters of the cells are obstacles.
pub fn run_penalty(board: &Board) -> usize {
    let n: usize = board.size();
    let long_run: usize = usize::max(4, n / 2);
    let crowded: usize = n * 3 / 4;
    let mut penalty: usize = 0;

    for transposed in [false, true] {
        for i in 0..n {
            let mut run: usize = 0;
            let mut count: usize = 0;
            for j in 0..n {
                let cell: Cell = if transposed {
                    Cell::new(j, i)
                } else {
                    Cell::new(i, j)
                };
                if board.is_obstacle(cell) {
                    count += 1;
                    run += 1;
                    if run >= long_run {
                        penalty += 1;
                    }
                } else {
                    run = 0;
                }
            }
            if count >= crowded {
                penalty += 3;
            }
        }
    }
    penalty
}

/// Number of pairs of obstacles sharing a side.
pub fn adjacent_obstacle_pairs(board: &Board) -> usize {
    let n: usize = board.size();
    board
        .obstacles()
        .map(|c| {
            [Cell::new(c.row + 1, c.col), Cell::new(c.row, c.col + 1)]
                .into_iter()
                .filter(|o| o.row < n && o.col < n && board.is_obstacle(*o))
                .count()
        })
        .sum()
}

/// Difficulty rating of the puzzle, from 1.0 to 5.0 in 0.1 steps.
///
/// The rating grows with the board size, the obstacle ratio, the number of turns and branch
/// edges, and the number of obstacle groups.
pub fn difficulty(board: &Board, path: &Path) -> f64 {
    if path.len() < 2 {
        return 1.0;
    }
    let n: usize = board.size();
    let total: f64 = (n * n) as f64;
    let passable: f64 = board.passable_count() as f64;
    let obstacles: usize = board.obstacle_count();

    let size_factor: f64 = ((n as f64 - 6.0) / 4.0).clamp(0.0, 1.0);
    let obstacle_factor: f64 = (obstacles as f64 / total / 0.2).min(1.0);
    let turn_factor: f64 = (path.turn_count() as f64 / (passable * 0.8)).min(1.0);
    let branch_factor: f64 = (branch_edges(path, n) as f64 / (passable * 0.5)).min(1.0);
    let component_factor: f64 = component_factor(obstacle_components(board), obstacles);

    let raw: f64 = size_factor * 0.25
        + obstacle_factor * 0.25
        + turn_factor * 0.2
        + branch_factor * 0.2
        + component_factor * 0.1;
    ((1.0 + raw * 4.0) * 10.0).round() / 10.0
}

/// Obstacle groups relative to half the obstacles, capped at 1.0.
fn component_factor(components: usize, obstacles: usize) -> f64 {
    let max_components: f64 = obstacles as f64 / 2.0;
    if max_components > 0.0 {
        (components as f64 / max_components).min(1.0)
    } else {
        0.0
    }
}
