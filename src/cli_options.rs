/*
cli_options.rs

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

//! Process command-line options.
//!
//! These options are intended for developers tuning the puzzle generator.
//!
//! # Examples
//!
//! Generate three 8x8 puzzles with 10 obstacles and print some statistics:
//!
//! ```text
//! $ hitofude -n 8 -o 10 -c 3 --summary
//! ```
//!
//! Store reproducible puzzles, and verify them later:
//!
//! ```text
//! $ hitofude -n 7 --seed 42 --output puzzles.json
//! $ hitofude --verify puzzles.json
//! ```
//!
//! Solve a board written in the "ASCII art" format (`.` passable, `#` obstacle):
//!
//! ```text
//! $ hitofude --solve board.txt
//! ```

use clap::Parser;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;
use std::path::PathBuf;
use std::time::Instant;

use hitofude::config::{COPYRIGHT_NOTICE, GeneratorConfig};
use hitofude::generator::board::Board;
use hitofude::generator::cell::Cell;
use hitofude::generator::orchestrator::{self, Generator, Phase, Puzzle, Request};
use hitofude::generator::path::Path;
use hitofude::generator::placement::PlacementStrategy;
use hitofude::generator::solver::Solver;
use hitofude::saver::puzzles::{self, PuzzleFile, SaverPuzzles};
use hitofude::worker::{GenerationResult, GenerationWorker};

/// Generate and solve Hitofude puzzles.
#[derive(Parser)]
#[command(about, long_about = None, version, long_version = COPYRIGHT_NOTICE)]
struct Args {
    /// Grid dimension
    #[arg(short = 'n', long, default_value_t = 6)]
    size: usize,

    /// Number of obstacles (random between 10% and 20% of the cells by default)
    #[arg(short, long)]
    obstacles: Option<usize>,

    /// Time budget in milliseconds for each puzzle (2000, or the fallback time limit of the
    /// configuration when the fallback stages are enabled)
    #[arg(short, long)]
    budget: Option<u64>,

    /// Relax level of the no-band constraints (first level of the fallback stages)
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    relax: u8,

    /// Number of puzzles to generate
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// Seed of the random generator, for reproducible puzzles
    #[arg(long)]
    seed: Option<u64>,

    /// Obstacle placement strategy (repeat the option to use several strategies in turn)
    #[arg(value_enum, long)]
    strategy: Vec<PlacementStrategy>,

    /// Do not relax the constraints nor reduce the obstacles when no puzzle is found
    #[arg(long, default_value_t = false)]
    no_fallback: bool,

    /// Generator configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the puzzles in JSON format
    #[arg(short, long, default_value_t = false)]
    json: bool,

    /// Save the puzzles in a JSON file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Solve the board in the given text file
    #[arg(long, conflicts_with = "verify")]
    solve: Option<PathBuf>,

    /// Verify the puzzles saved in the given JSON file
    #[arg(long)]
    verify: Option<PathBuf>,

    /// Print some statistics after generating the puzzles
    #[arg(short, long, default_value_t = false)]
    summary: bool,

    /// Enable debug messages
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

/// Parse and process command-line options.
///
/// Return the exit code of the program.
pub fn parse() -> u8 {
    let args: Args = Args::parse();

    if args.debug {
        unsafe {
            env::set_var("RUST_LOG", "debug");
        }
    }
    env_logger::init();

    let mut config: GeneratorConfig = match &args.config {
        Some(path) => match GeneratorConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Cannot read the configuration file {}: {e}", path.display());
                return 1;
            }
        },
        None => GeneratorConfig::default(),
    };
    if !args.strategy.is_empty() {
        config.strategies = args.strategy.clone();
    }

    let mut rng: StdRng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    if let Some(path) = &args.solve {
        return solve(path, &config, &mut rng);
    }
    if let Some(path) = &args.verify {
        return verify(path);
    }
    generate(&args, config, &mut rng)
}

/// Generate the puzzles.
fn generate(args: &Args, config: GeneratorConfig, rng: &mut StdRng) -> u8 {
    let mut puzzle_list: Vec<Puzzle> = Vec::with_capacity(args.count);
    let mut total: f32 = 0.0;
    let mut max: f32 = 0.0;
    let mut errors: usize = 0;
    let mut phases: [usize; 3] = [0; 3];
    let budget_ms: u64 = match args.budget {
        Some(b) => b,
        None if args.no_fallback => 2000,
        None => config.fallback_time_limit_ms,
    };

    for i in 0..args.count {
        debug!("Puzzle {i}");
        let obstacles: usize = args
            .obstacles
            .unwrap_or_else(|| orchestrator::random_initial_obstacles(args.size, rng));
        let request: Request = Request {
            relax_level: args.relax as usize,
            ..Request::new(args.size, obstacles, budget_ms)
        };

        let start: Instant = Instant::now();
        let worker: GenerationWorker = GenerationWorker::spawn(
            Generator::new(config.clone()),
            request,
            !args.no_fallback,
            StdRng::seed_from_u64(rng.random()),
        );
        let res: GenerationResult = worker.wait();
        let duration: f32 = start.elapsed().as_secs_f32();
        total += duration;
        max = max.max(duration);

        match res {
            Ok(puzzle) => {
                phases[match puzzle.phase {
                    Phase::PathSearch => 0,
                    Phase::Carving => 1,
                    Phase::Serpentine => 2,
                }] += 1;
                if !args.json {
                    print_puzzle(i, &puzzle);
                }
                puzzle_list.push(puzzle);
            }
            Err(e) => {
                errors += 1;
                eprintln!("Puzzle {i}: {e}");
            }
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&puzzle_list) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Cannot serialize the puzzles: {e}");
                return 1;
            }
        }
    }

    if let Some(path) = &args.output {
        let saver: SaverPuzzles = SaverPuzzles::new(path.clone());
        if let Err(e) = saver.save_puzzles(&PuzzleFile::new(puzzle_list)) {
            eprintln!("Cannot save the puzzles in {}: {e}", path.display());
            return 1;
        }
    }

    // Print some stats
    if args.summary && args.count > 0 {
        println!(
            "
        total time = {}s
      average time = {}s
          max time = {}s
       path search = {}
           carving = {}
        serpentine = {}
            errors = {}",
            total,
            total / args.count as f32,
            max,
            phases[0],
            phases[1],
            phases[2],
            errors
        );
    }
    if errors > 0 { 1 } else { 0 }
}

/// Solve the board stored in a text file.
fn solve(path: &std::path::Path, config: &GeneratorConfig, rng: &mut StdRng) -> u8 {
    let board: Board = match puzzles::read_board(path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Cannot read the board in {}: {e}", path.display());
            return 1;
        }
    };
    let mut solver: Solver = Solver::new(&board)
        .with_limits(config.solver_max_iterations, config.solver_max_starts);
    match solver.solve(rng) {
        Ok(solution) => {
            println!("{}", format_solution(&board, &solution));
            println!(
                "iterations = {}  duration = {}s",
                solver.iteration, solver.duration
            );
            0
        }
        Err(e) => {
            eprintln!("{}: {e}", path.display());
            1
        }
    }
}

/// Verify the puzzles stored in a JSON file.
fn verify(path: &std::path::Path) -> u8 {
    let puzzle_file: PuzzleFile = match SaverPuzzles::new(path.to_path_buf()).get_puzzles() {
        Ok(Some(p)) => p,
        Ok(None) => {
            eprintln!("{}: no such file", path.display());
            return 1;
        }
        Err(e) => {
            eprintln!("Cannot read the puzzles in {}: {e}", path.display());
            return 1;
        }
    };

    println!("Generated on {}", puzzle_file.created_local());
    let mut invalid: usize = 0;
    for (i, puzzle) in puzzle_file.puzzles.iter().enumerate() {
        match puzzle.path.validate(&puzzle.board) {
            Ok(()) => println!("Puzzle {i}: valid"),
            Err(e) => {
                invalid += 1;
                println!("Puzzle {i}: {e}");
            }
        }
    }
    if invalid > 0 { 1 } else { 0 }
}

fn print_puzzle(i: usize, puzzle: &Puzzle) {
    let n: usize = puzzle.board.size();
    println!(
        "Puzzle {i}: {n}x{n}, {} obstacles, {} phase, relax level {}",
        puzzle.obstacles, puzzle.phase, puzzle.relax_level
    );
    println!(
        "  score = {:.2}  difficulty = {:.1}",
        puzzle.score.value, puzzle.difficulty
    );
    print!("{}", puzzle.board);
    println!("{}", format_solution(&puzzle.board, &puzzle.path));
}

/// Board with the position of each cell in the solution.
fn format_solution(board: &Board, path: &Path) -> String {
    let n: usize = board.size();
    let width: usize = path.len().to_string().len();
    let mut out: String = String::new();

    for row in 0..n {
        let line: Vec<String> = (0..n)
            .map(|col| {
                match path.cell_index(Cell::new(row, col)) {
                    Some(i) => format!("{:>width$}", i + 1),
                    None => format!("{:>width$}", "#"),
                }
            })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}
