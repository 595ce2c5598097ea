/*
generator.rs

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

//! Generate and solve Hitofude puzzles.
//!
//! A puzzle is a square board of passable cells and obstacles. The player must draw a single
//! line that starts on the border, visits every passable cell exactly once, and ends on the
//! border.
//!
//! * [`board::Board`] and [`cell::Cell`] describe the grid, and [`constraints`] provides the
//!   cheap checks that reject boards without a solution or with unpleasant obstacle layouts.
//! * [`solver::Solver`] finds a solution for a finished board.
//! * [`carver::Carver`] builds a path in an empty board, and the cells it does not visit become
//!   the obstacles.
//! * [`placement::PlacementStrategy`] puts obstacles directly on an empty board.
//! * [`scoring`] rates the candidates.
//! * [`orchestrator::Generator`] combines everything within a time budget.

pub mod board;
pub mod budget;
pub mod carver;
pub mod cell;
pub mod constraints;
pub mod orchestrator;
pub mod path;
pub mod placement;
pub mod scoring;
pub mod search;
pub mod solver;
