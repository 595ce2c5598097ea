/*
lib.rs

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

//! Generator and solver of Hitofude puzzles.
//!
//! A puzzle is an `n x n` grid with a few obstacles. The player draws a single path that visits
//! every passable cell exactly once, from a start cell to a goal cell on the border of the grid.

pub mod config;
pub mod generator;
pub mod saver;
pub mod worker;
