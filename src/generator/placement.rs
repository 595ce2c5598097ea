/*
placement.rs

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

//! Put obstacles directly on an empty board.
//!
//! Each strategy keeps a few random border cells free of obstacles, so that the path still has
//! places to start and end.

use clap::ValueEnum;
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;
use strum_macros::FromRepr;

use super::board::{Board, CellState};
use super::cell::Cell;
use super::constraints;

/// Obstacle placement strategy.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    FromRepr,
    Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementStrategy {
    /// Innermost rings first.
    CentralRing,

    /// Even checkerboard class first, innermost rings first.
    Checkerboard,

    /// Any cell.
    UniformRandom,

    /// Only where no neighbor becomes a dead end, away from other obstacles when possible.
    #[default]
    DegreeChecked,
}

impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlacementStrategy::CentralRing => write!(f, "central-ring"),
            PlacementStrategy::Checkerboard => write!(f, "checkerboard"),
            PlacementStrategy::UniformRandom => write!(f, "uniform-random"),
            PlacementStrategy::DegreeChecked => write!(f, "degree-checked"),
        }
    }
}

impl PlacementStrategy {
    /// Return all the strategies.
    pub fn all() -> Vec<Self> {
        (0..).map_while(Self::from_repr).collect()
    }

    /// Put up to `count` obstacles on the passable cells of the board.
    ///
    /// Return the number of obstacles actually placed, which can be lower than `count` when the
    /// strategy runs out of eligible cells.
    pub fn place<R: Rng + ?Sized>(self, board: &mut Board, count: usize, rng: &mut R) -> usize {
        let n: usize = board.size();
        let placed: usize = match self {
            PlacementStrategy::CentralRing => {
                let protected: HashSet<Cell> =
                    protect_outer_cells(board, usize::max(4, n * 8 / 10), rng);
                let mut cells: Vec<Cell> = eligible_cells(board, &protected);
                cells.shuffle(rng);
                cells.sort_by_key(|c| Reverse(c.ring(n)));
                place_in_order(board, &cells, count)
            }
            PlacementStrategy::Checkerboard => {
                let protected: HashSet<Cell> =
                    protect_outer_cells(board, usize::max(4, n * 6 / 10), rng);
                let mut cells: Vec<Cell> = eligible_cells(board, &protected);
                cells.shuffle(rng);
                cells.sort_by_key(|c| (c.parity(), Reverse(c.ring(n))));
                place_in_order(board, &cells, count)
            }
            PlacementStrategy::UniformRandom => {
                let protected: HashSet<Cell> =
                    protect_outer_cells(board, usize::max(6, n * 12 / 10), rng);
                let mut cells: Vec<Cell> = eligible_cells(board, &protected);
                cells.shuffle(rng);
                place_in_order(board, &cells, count)
            }
            PlacementStrategy::DegreeChecked => {
                let protected: HashSet<Cell> = protect_outer_cells(board, 4, rng);
                let mut cells: Vec<Cell> = eligible_cells(board, &protected);
                cells.shuffle(rng);
                place_degree_checked(board, &cells, count)
            }
        };
        debug!("Strategy {self}: {placed}/{count} obstacles placed");
        placed
    }
}

/// Pick `keep` random passable border cells that must stay free.
fn protect_outer_cells<R: Rng + ?Sized>(
    board: &Board,
    keep: usize,
    rng: &mut R,
) -> HashSet<Cell> {
    let mut outer: Vec<Cell> = board.outer_passable_cells();
    outer.shuffle(rng);
    outer.into_iter().take(keep).collect()
}

/// Passable cells that are not protected, in row-major order.
fn eligible_cells(board: &Board, protected: &HashSet<Cell>) -> Vec<Cell> {
    board.passable_cells().filter(|c| !protected.contains(c)).collect()
}

/// Turn the first `count` cells of the list into obstacles.
fn place_in_order(board: &mut Board, cells: &[Cell], count: usize) -> usize {
    let mut placed: usize = 0;
    for cell in cells.iter().take(count) {
        board.set(*cell, CellState::Obstacle);
        placed += 1;
    }
    placed
}

/// Place obstacles that do not create dead ends.
///
/// The first pass skips the cells next to an existing obstacle, the second pass accepts one
/// adjacent obstacle, and the last pass accepts any cell.
fn place_degree_checked(board: &mut Board, cells: &[Cell], count: usize) -> usize {
    let n: usize = board.size();
    let mut placed: usize = 0;

    for bias in 0..=2 {
        for cell in cells {
            if placed == count {
                return placed;
            }
            if board.is_obstacle(*cell) {
                continue;
            }
            let adjacent: usize = cell
                .neighbors4(n)
                .iter()
                .filter(|c| board.is_obstacle(**c))
                .count();
            if bias < 2 && adjacent > bias {
                continue;
            }
            if constraints::can_place_obstacle(board, *cell) {
                board.set(*cell, CellState::Obstacle);
                placed += 1;
            }
        }
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_all_strategies() {
        assert_eq!(
            PlacementStrategy::all(),
            vec![
                PlacementStrategy::CentralRing,
                PlacementStrategy::Checkerboard,
                PlacementStrategy::UniformRandom,
                PlacementStrategy::DegreeChecked
            ]
        );
        assert_eq!(PlacementStrategy::default(), PlacementStrategy::DegreeChecked);
    }

    #[test]
    fn test_exact_count() {
        let mut rng: StdRng = StdRng::seed_from_u64(21);
        for strategy in PlacementStrategy::all() {
            let mut board: Board = Board::new(8);
            let placed: usize = strategy.place(&mut board, 6, &mut rng);
            assert_eq!(placed, 6, "{strategy}");
            assert_eq!(board.obstacle_count(), 6, "{strategy}");
        }
    }

    #[test]
    fn test_central_ring_stays_inside() {
        let mut rng: StdRng = StdRng::seed_from_u64(22);
        let n: usize = 6;
        let mut board: Board = Board::new(n);
        // The two innermost rings hold 4 + 12 cells
        assert_eq!(PlacementStrategy::CentralRing.place(&mut board, 4, &mut rng), 4);
        assert!(board.obstacles().all(|c| c.ring(n) == 2));

        let mut board: Board = Board::new(n);
        PlacementStrategy::CentralRing.place(&mut board, 10, &mut rng);
        assert!(board.obstacles().all(|c| !c.is_outer(n)));
    }

    #[test]
    fn test_checkerboard_uses_even_class() {
        let mut rng: StdRng = StdRng::seed_from_u64(23);
        let n: usize = 7;
        let mut board: Board = Board::new(n);
        assert_eq!(PlacementStrategy::Checkerboard.place(&mut board, 8, &mut rng), 8);
        assert!(board.obstacles().all(|c| c.parity() == 0 && !c.is_outer(n)));
    }

    #[test]
    fn test_protected_border_cells() {
        let mut rng: StdRng = StdRng::seed_from_u64(24);
        let n: usize = 6;
        let mut board: Board = Board::new(n);
        // max(6, 7) border cells stay free
        assert_eq!(PlacementStrategy::UniformRandom.place(&mut board, n * n, &mut rng), 29);
        assert_eq!(board.outer_passable_cells().len(), 7);
    }

    proptest! {
        #[test]
        fn prop_degree_checked_leaves_no_dead_end(n in 4usize..11, count in 0usize..30, seed in any::<u64>()) {
            let mut rng: StdRng = StdRng::seed_from_u64(seed);
            let mut board: Board = Board::new(n);
            let placed: usize = PlacementStrategy::DegreeChecked.place(&mut board, count, &mut rng);
            prop_assert!(placed <= count);
            prop_assert_eq!(board.obstacle_count(), placed);
            for cell in board.passable_cells() {
                let degree: usize = board.passable_degree(cell);
                prop_assert!(degree >= 1);
                if !cell.is_outer(n) {
                    prop_assert!(degree >= 2);
                }
            }
        }
    }
}
