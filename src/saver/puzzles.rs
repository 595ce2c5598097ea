/*
puzzles.rs

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

//! Save and restore generated puzzles.
//!
//! The saved object is a serialization of the [`PuzzleFile`] object in JSON format by using
//! [`serde`]. Each board is stored in its "ASCII art" form, one string per row, so that the
//! file stays readable.

use chrono::{DateTime, Local};
use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use crate::generator::board::{Board, MAX_SIZE, MIN_SIZE};
use crate::generator::orchestrator::Puzzle;

/// Content of a puzzle file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PuzzleFile {
    /// Generation time.
    pub created: SystemTime,

    pub puzzles: Vec<Puzzle>,
}

impl PuzzleFile {
    /// Create a [`PuzzleFile`] object stamped with the current time.
    pub fn new(puzzles: Vec<Puzzle>) -> Self {
        Self {
            created: SystemTime::now(),
            puzzles,
        }
    }

    /// Generation time in the local time zone.
    pub fn created_local(&self) -> String {
        let dt: DateTime<Local> = DateTime::from(self.created);
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Object to save and restore puzzles.
pub struct SaverPuzzles {
    /// Path to the save file.
    save_file: PathBuf,
}

impl SaverPuzzles {
    /// Create a [`SaverPuzzles`] object for the given file.
    pub fn new(save_file: PathBuf) -> Self {
        debug!("Puzzle file: {save_file:?}");
        Self { save_file }
    }

    /// Retrieve the saved puzzles.
    ///
    /// Return None if the file does not exist.
    pub fn get_puzzles(&self) -> Result<Option<PuzzleFile>, Box<dyn Error>> {
        let file: File = match File::open(&self.save_file) {
            Ok(f) => f,
            Err(error) => match error.kind() {
                ErrorKind::NotFound => return Ok(None),
                _ => return Err(Box::new(error)),
            },
        };
        let reader: BufReader<File> = BufReader::new(file);
        let puzzles: PuzzleFile = serde_json::from_reader(reader)?;
        Ok(Some(puzzles))
    }

    /// Save the provided puzzles.
    pub fn save_puzzles(&self, puzzles: &PuzzleFile) -> Result<(), Box<dyn Error>> {
        let file: File = File::create(&self.save_file)?;
        let mut writer: BufWriter<File> = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, puzzles)?;
        writer.flush()?;
        Ok(())
    }
}

/// Read a board in the "ASCII art" format from a text file.
///
/// The board size must be between [`MIN_SIZE`] and [`MAX_SIZE`].
pub fn read_board(path: &std::path::Path) -> Result<Board, Box<dyn Error>> {
    let source: String = fs::read_to_string(path)?;
    let board: Board = Board::parse(&source)?;
    let n: usize = board.size();
    if !(MIN_SIZE..=MAX_SIZE).contains(&n) {
        return Err(
            format!("invalid grid size {n}: must be between {MIN_SIZE} and {MAX_SIZE}").into(),
        );
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::generator::orchestrator::{Generator, Request};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::env;
    use std::process;

    fn temp_file(name: &str) -> PathBuf {
        let mut path: PathBuf = env::temp_dir();
        path.push(format!("hitofude-{}-{name}", process::id()));
        path
    }

    #[test]
    fn test_save_and_restore() {
        let mut rng: StdRng = StdRng::seed_from_u64(51);
        let mut generator: Generator = Generator::new(GeneratorConfig::default());
        let puzzle: Puzzle = generator
            .generate(&Request::new(5, 0, 200), &mut rng)
            .unwrap();

        let path: PathBuf = temp_file("puzzles.json");
        let saver: SaverPuzzles = SaverPuzzles::new(path.clone());
        let saved: PuzzleFile = PuzzleFile::new(vec![puzzle]);
        saver.save_puzzles(&saved).unwrap();

        let restored: PuzzleFile = saver.get_puzzles().unwrap().unwrap();
        assert_eq!(restored.created, saved.created);
        assert_eq!(restored.puzzles.len(), 1);
        assert_eq!(restored.puzzles[0].board, saved.puzzles[0].board);
        assert_eq!(restored.puzzles[0].path, saved.puzzles[0].path);
        assert_eq!(restored.puzzles[0].phase, saved.puzzles[0].phase);
        assert!(restored.puzzles[0].path.is_valid(&restored.puzzles[0].board));
        assert_eq!(restored.created_local().len(), 19);
        let _ = fs::remove_file(&path);

        assert!(
            SaverPuzzles::new(temp_file("missing.json"))
                .get_puzzles()
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_read_board() {
        let path: PathBuf = temp_file("board.txt");
        fs::write(&path, "..#\n...\n...\n").unwrap();
        let board: Board = read_board(&path).unwrap();
        assert_eq!(board.size(), 3);
        assert_eq!(board.obstacle_count(), 1);

        fs::write(&path, "...\n..\n").unwrap();
        assert!(read_board(&path).is_err());

        // Sizes out of the supported range
        fs::write(&path, "..\n..\n").unwrap();
        assert!(read_board(&path).is_err());
        let row: String = ".".repeat(MAX_SIZE + 1);
        fs::write(&path, vec![row; MAX_SIZE + 1].join("\n")).unwrap();
        assert!(read_board(&path).is_err());
        let _ = fs::remove_file(&path);
    }
}
