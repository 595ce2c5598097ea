/*
generation.rs

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

//! End-to-end generation scenarios, through the public API.

use rand::SeedableRng;
use rand::rngs::StdRng;

use hitofude::config::GeneratorConfig;
use hitofude::generator::board::Board;
use hitofude::generator::cell::Cell;
use hitofude::generator::constraints::NoBandConstraints;
use hitofude::generator::orchestrator::{GenerateError, Generator, Puzzle, Request};
use hitofude::generator::path::Path;
use hitofude::generator::search::SolveError;
use hitofude::generator::solver::Solver;

#[test]
fn small_board_with_obstacles() {
    let mut rng: StdRng = StdRng::seed_from_u64(2025);
    let mut generator: Generator = Generator::new(GeneratorConfig::default());
    let puzzle: Puzzle = generator
        .generate(&Request::new(6, 4, 2000), &mut rng)
        .unwrap();

    assert_eq!(puzzle.board.obstacle_count(), 4);
    assert_eq!(puzzle.path.len(), 32);
    assert_eq!(puzzle.path.validate(&puzzle.board), Ok(()));

    let start: Cell = puzzle.path.get_first().unwrap();
    let goal: Cell = puzzle.path.get_last().unwrap();
    assert_ne!(start, goal);
    assert!(start.is_outer(6));
    assert!(goal.is_outer(6));
}

#[test]
fn open_board_and_impossible_request() {
    let mut rng: StdRng = StdRng::seed_from_u64(2026);
    let mut generator: Generator = Generator::new(GeneratorConfig::default());
    let puzzle: Puzzle = generator
        .generate(&Request::new(6, 0, 2000), &mut rng)
        .unwrap();
    assert_eq!(puzzle.path.len(), 36);
    assert!(puzzle.path.is_valid(&puzzle.board));

    // One obstacle more than the rows and columns allow
    let too_many: usize = NoBandConstraints::new(10, 0, 0).max_obstacles_no_band + 1;
    assert_eq!(too_many, 81);
    assert!(matches!(
        generator.generate(&Request::new(10, too_many, 2000), &mut rng),
        Err(GenerateError::Infeasible { obstacles, .. }) if obstacles == too_many
    ));
    // Rejected before any search
    assert_eq!(generator.stats.placement_attempts, 0);
    assert_eq!(generator.stats.candidates, 0);
}

#[test]
fn solver_seeds_give_valid_paths() {
    let board: Board = Board::new(6);
    for seed in [7, 8] {
        let mut rng: StdRng = StdRng::seed_from_u64(seed);
        let path: Path = Solver::new(&board).solve(&mut rng).unwrap();
        assert_eq!(path.len(), 36);
        assert!(path.is_valid(&board));
    }
}

#[test]
fn parity_imbalance_is_rejected_immediately() {
    let mut rng: StdRng = StdRng::seed_from_u64(9);
    // Four odd cells removed
    let board: Board = Board::parse(
        "
        . . . . . .
        . . # . . .
        . . . # . .
        . . # . . .
        . . . # . .
        . . . . . .
        ",
    )
    .unwrap();
    let mut solver: Solver = Solver::new(&board);
    assert_eq!(solver.solve(&mut rng), Err(SolveError::NoPath));
    assert_eq!(solver.iteration, 0);
}
