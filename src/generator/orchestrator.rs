/*
orchestrator.rs

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

//! Generate a puzzle within a time budget.
//!
//! The generation goes through three phases:
//!
//! - **Path search**: obstacles are placed first, the cheap checks (no-band constraints,
//!   parity, connectivity) discard the hopeless boards, and the solver looks for a path on the
//!   remaining ones.
//! - **Carving**: when the first phase does not find anything, paths of the right length are
//!   carved in an empty board. The cells left out become the obstacles.
//! - **Serpentine**: as a last resort, a slice of a serpentine traversal gives a valid but
//!   plain puzzle.
//!
//! The first two phases score every valid candidate and keep the best one.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::Duration;

use super::board::{Board, MAX_SIZE, MIN_SIZE};
use super::budget::{Budget, CancelToken};
use super::carver::{self, Carver};
use super::constraints::{self, NoBandConstraints};
use super::path::Path;
use super::placement::PlacementStrategy;
use super::scoring::{self, Score, ScoreWeights};
use super::solver::Solver;
use crate::config::GeneratorConfig;

/// Type of errors returned by the generator.
#[derive(Debug, PartialEq)]
pub enum GenerateError {
    /// The grid dimension is out of the supported range.
    InvalidSize(usize),

    /// No board can satisfy the constraints for this obstacle count.
    Infeasible { obstacles: usize, max: usize },

    /// The generation was cancelled.
    Cancelled,

    /// No puzzle found before the end of the budget.
    Exhausted,
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GenerateError::InvalidSize(n) => write!(
                f,
                "invalid grid size {n}: must be between {MIN_SIZE} and {MAX_SIZE}"
            ),
            GenerateError::Infeasible { obstacles, max } => write!(
                f,
                "{obstacles} obstacles cannot be placed without bands (maximum {max})"
            ),
            GenerateError::Cancelled => write!(f, "generation cancelled"),
            GenerateError::Exhausted => write!(f, "no puzzle found within the time budget"),
        }
    }
}

impl Error for GenerateError {}

/// Generation phase that produced a puzzle.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    PathSearch,
    Carving,
    Serpentine,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Phase::PathSearch => write!(f, "path search"),
            Phase::Carving => write!(f, "carving"),
            Phase::Serpentine => write!(f, "serpentine"),
        }
    }
}

/// Generation request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Request {
    /// Grid dimension.
    pub size: usize,

    /// Number of obstacles.
    pub obstacles: usize,

    /// Time budget in milliseconds.
    pub budget_ms: u64,

    /// Relaxation of the no-band constraints, from 0 to 3.
    pub relax_level: usize,
}

impl Request {
    pub fn new(size: usize, obstacles: usize, budget_ms: u64) -> Self {
        Self {
            size,
            obstacles,
            budget_ms,
            relax_level: 0,
        }
    }
}

/// Generated puzzle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Puzzle {
    pub board: Board,

    /// Solution. Its first and last cells are the start and the goal of the puzzle.
    pub path: Path,

    /// Number of obstacles.
    pub obstacles: usize,

    pub relax_level: usize,
    pub phase: Phase,
    pub score: Score,

    /// Rating from 1.0 to 5.0.
    pub difficulty: f64,
}

/// Attempt counters of the last generation.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub placement_attempts: usize,
    pub carving_attempts: usize,

    /// Strategy ran out of eligible cells.
    pub short_placements: usize,
    pub band_rejected: usize,
    pub parity_skipped: usize,
    pub connectivity_skipped: usize,
    pub search_failures: usize,

    /// Valid candidates that were scored.
    pub candidates: usize,
}

/// Obstacle count of the puzzle when the user does not choose one.
pub fn min_obstacles_for_size(n: usize) -> usize {
    match n {
        6 => 4,
        7 => 6,
        8 => 8,
        9 => 10,
        10 => 12,
        _ => n * 12 / 10,
    }
}

/// Random obstacle count between 10% and 20% of the cells, and not below
/// [`min_obstacles_for_size`].
pub fn random_initial_obstacles<R: Rng + ?Sized>(n: usize, rng: &mut R) -> usize {
    let total: usize = n * n;
    let min_percent: usize = total.div_ceil(10);
    let max_percent: usize = total / 5;
    let max_no_band: usize = NoBandConstraints::new(n, max_percent, 0).max_obstacles_no_band;
    let max: usize = max_percent.min(max_no_band).min(total.saturating_sub(2));

    let lower: usize = min_obstacles_for_size(n).max(min_percent);
    let upper: usize = lower.max(max);
    rng.random_range(lower..=upper)
}

/// [`Generator`] object.
pub struct Generator {
    config: GeneratorConfig,
    cancel: CancelToken,

    /// Counters of the last generation.
    pub stats: GenerationStats,
}

impl Generator {
    /// Create the object.
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
            stats: GenerationStats::default(),
        }
    }

    /// Token that cancels the generations of this generator.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Generate a puzzle.
    ///
    /// # Errors
    ///
    /// The method returns [`GenerateError::InvalidSize`] or [`GenerateError::Infeasible`]
    /// without searching when the request cannot be satisfied, [`GenerateError::Cancelled`]
    /// when the cancellation token is set, and [`GenerateError::Exhausted`] when no phase
    /// produces a puzzle.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        request: &Request,
        rng: &mut R,
    ) -> Result<Puzzle, GenerateError> {
        self.stats = GenerationStats::default();
        check_request(request)?;
        debug!(
            "Generating {n}x{n} with {} obstacles, relax level {}, budget {}ms",
            request.obstacles,
            request.relax_level,
            request.budget_ms,
            n = request.size
        );

        if request.obstacles > 0 {
            let budget: Budget =
                self.budget(request.budget_ms, self.config.placement_yield_interval);
            if let Some(puzzle) = self.search(request, &budget, rng) {
                return Ok(puzzle);
            }
            if self.cancel.is_cancelled() {
                return Err(GenerateError::Cancelled);
            }
            warn!(
                "No puzzle for {} obstacles within {}ms, using a serpentine",
                request.obstacles, request.budget_ms
            );
        }
        self.serpentine(request, rng).ok_or(GenerateError::Exhausted)
    }

    /// Generate a puzzle, relaxing the request when needed.
    ///
    /// The constraints are relaxed first, from the relax level of the request up to level 2.
    /// Then the number of obstacles is reduced two by two down to 8% of the cells. When
    /// everything fails, or when the time budget of the request is spent, the puzzle is cut
    /// from a serpentine.
    ///
    /// # Errors
    ///
    /// The method returns the same errors as [`Generator::generate`].
    pub fn generate_with_fallback<R: Rng + ?Sized>(
        &mut self,
        request: &Request,
        rng: &mut R,
    ) -> Result<Puzzle, GenerateError> {
        self.stats = GenerationStats::default();
        check_request(request)?;
        let size: usize = request.size;
        let obstacles: usize = request.obstacles;
        if obstacles == 0 {
            return self.serpentine(request, rng).ok_or(GenerateError::Exhausted);
        }

        let global: Budget = self.budget(request.budget_ms, self.config.placement_yield_interval);
        let base_ms: u64 = 1000 + (size.saturating_sub(6) as u64) * 500;
        let stage_request = |relax_level: usize, obstacles: usize, budget_ms: u64| Request {
            relax_level,
            ..Request::new(size, obstacles, budget_ms)
        };

        // Requested relax level with increasing budgets, then the next levels
        let mut stages: Vec<Request> = vec![
            stage_request(request.relax_level, obstacles, base_ms.min(2000)),
            stage_request(request.relax_level, obstacles, (base_ms * 3 / 2).min(4000)),
        ];
        for relax_level in request.relax_level + 1..=2 {
            stages.push(stage_request(relax_level, obstacles, base_ms.min(2000)));
        }

        // Fewer obstacles
        let min_guarantee: usize = size * size * 8 / 100;
        let mut reduced: usize = obstacles;
        while reduced > min_guarantee {
            reduced = min_guarantee.max(reduced.saturating_sub(2));
            stages.push(stage_request(
                request.relax_level,
                reduced,
                (base_ms / 2).min(1500),
            ));
        }

        for stage in &stages {
            if !global.checkpoint(1) {
                break;
            }
            if !NoBandConstraints::new(size, stage.obstacles, stage.relax_level).feasible() {
                continue;
            }
            debug!(
                "Fallback stage: {} obstacles, relax level {}, budget {}ms",
                stage.obstacles, stage.relax_level, stage.budget_ms
            );
            let budget: Budget = global.share(
                Duration::from_millis(stage.budget_ms.max(self.config.min_budget_ms)),
                self.config.placement_yield_interval,
            );
            if let Some(puzzle) = self.search(stage, &budget, rng) {
                if stage.obstacles != obstacles {
                    warn!(
                        "Obstacle count reduced from {obstacles} to {}",
                        stage.obstacles
                    );
                }
                return Ok(puzzle);
            }
        }

        if self.cancel.is_cancelled() {
            return Err(GenerateError::Cancelled);
        }
        warn!("All the fallback stages failed, using a serpentine");
        self.serpentine(request, rng).ok_or(GenerateError::Exhausted)
    }

    /// Budget of a generation, never shorter than the configured minimum.
    fn budget(&self, budget_ms: u64, yield_interval: usize) -> Budget {
        Budget::new(
            Duration::from_millis(budget_ms.max(self.config.min_budget_ms)),
            yield_interval,
            self.cancel.clone(),
        )
    }

    /// Run the path search phase, then the carving phase if the first one found nothing.
    fn search<R: Rng + ?Sized>(
        &mut self,
        request: &Request,
        budget: &Budget,
        rng: &mut R,
    ) -> Option<Puzzle> {
        let share: f64 = self.config.phase_a_share.clamp(0.0, 1.0);
        let phase_a: Budget = budget.share(
            budget.remaining().mul_f64(share),
            self.config.placement_yield_interval,
        );
        if let Some(puzzle) = self.place_and_solve(request, &phase_a, rng) {
            return Some(puzzle);
        }
        if budget.is_cancelled() {
            return None;
        }
        let phase_b: Budget = budget.share(budget.remaining(), self.config.carving_yield_interval);
        self.carve(request, &phase_b, rng)
    }

    /// Path search phase: place the obstacles, then look for a path.
    fn place_and_solve<R: Rng + ?Sized>(
        &mut self,
        request: &Request,
        budget: &Budget,
        rng: &mut R,
    ) -> Option<Puzzle> {
        let n: usize = request.size;
        let strategies: Vec<PlacementStrategy> = if self.config.strategies.is_empty() {
            vec![PlacementStrategy::default()]
        } else {
            self.config.strategies.clone()
        };
        let mut best: Option<Puzzle> = None;
        let mut found: usize = 0;

        for attempt in 0..self.config.max_placement_attempts {
            if !budget.checkpoint(attempt) {
                break;
            }
            self.stats.placement_attempts += 1;

            let strategy: PlacementStrategy = strategies[attempt % strategies.len()];
            let mut board: Board = Board::new(n);
            if strategy.place(&mut board, request.obstacles, rng) != request.obstacles {
                self.stats.short_placements += 1;
                continue;
            }
            if !constraints::board_acceptable(&board, request.obstacles, request.relax_level) {
                self.stats.band_rejected += 1;
                continue;
            }
            // Cheap necessary conditions before the expensive search
            if !constraints::parity_check(&board) {
                self.stats.parity_skipped += 1;
                continue;
            }
            if !constraints::connected(&board) {
                self.stats.connectivity_skipped += 1;
                continue;
            }

            let mut solver: Solver = Solver::new(&board).with_limits(
                self.config.solver_max_iterations,
                self.config.solver_max_starts,
            );
            let path: Path = match solver.solve(rng) {
                Ok(p) => p,
                Err(e) => {
                    debug!("    Attempt {attempt} ({strategy}): {e}");
                    self.stats.search_failures += 1;
                    continue;
                }
            };
            if self.keep_best(&mut best, board, path, request, Phase::PathSearch) {
                found += 1;
                if found >= self.config.target_candidates {
                    break;
                }
            }
        }
        debug!("Path search phase: {:?}", self.stats);
        best
    }

    /// Carving phase: carve paths in an empty board.
    fn carve<R: Rng + ?Sized>(
        &mut self,
        request: &Request,
        budget: &Budget,
        rng: &mut R,
    ) -> Option<Puzzle> {
        let n: usize = request.size;
        let mut carver: Carver = Carver::new(n, n * n - request.obstacles).with_limits(
            self.config.carver_max_iterations,
            self.config.carving_jitter,
        );
        let mut best: Option<Puzzle> = None;
        let mut found: usize = 0;

        for attempt in 0..self.config.max_carving_attempts {
            if !budget.checkpoint(attempt) {
                break;
            }
            self.stats.carving_attempts += 1;

            let path: Path = match carver.carve(1, rng) {
                Ok(p) => p,
                Err(_) => {
                    self.stats.search_failures += 1;
                    continue;
                }
            };
            let board: Board = carver::board_from_path(n, &path);
            if !constraints::board_acceptable(&board, request.obstacles, request.relax_level) {
                self.stats.band_rejected += 1;
                continue;
            }
            if self.keep_best(&mut best, board, path, request, Phase::Carving) {
                found += 1;
                if found >= self.config.target_candidates {
                    break;
                }
            }
        }
        debug!("Carving phase: {:?}", self.stats);
        best
    }

    /// Last resort phase: cut the path out of a serpentine traversal.
    fn serpentine<R: Rng + ?Sized>(&mut self, request: &Request, rng: &mut R) -> Option<Puzzle> {
        let n: usize = request.size;
        let path: Path = Path::serpentine(n).outer_segment(n, n * n - request.obstacles, rng)?;
        let board: Board = carver::board_from_path(n, &path);
        Some(self.build_puzzle(board, path, request.relax_level, Phase::Serpentine))
    }

    /// Score the candidate and keep it if it is better than the current best one.
    ///
    /// Return `false` when the candidate is not a valid puzzle.
    fn keep_best(
        &mut self,
        best: &mut Option<Puzzle>,
        board: Board,
        path: Path,
        request: &Request,
        phase: Phase,
    ) -> bool {
        if !path.is_valid(&board) {
            warn!("Discarding an invalid {phase} candidate");
            return false;
        }
        self.stats.candidates += 1;
        let puzzle: Puzzle = self.build_puzzle(board, path, request.relax_level, phase);
        let better: bool = match best {
            Some(b) => puzzle.score.value > b.score.value,
            None => true,
        };
        if better {
            debug!("    New best {phase} candidate: score {:.2}", puzzle.score.value);
            puzzle.board.debug();
            *best = Some(puzzle);
        }
        true
    }

    fn build_puzzle(&self, board: Board, path: Path, relax_level: usize, phase: Phase) -> Puzzle {
        let weights: &ScoreWeights = match phase {
            Phase::Carving => &self.config.carving_weights,
            Phase::PathSearch | Phase::Serpentine => &self.config.weights,
        };
        let score: Score = Score::compute(&board, &path, weights);
        let difficulty: f64 = scoring::difficulty(&board, &path);
        Puzzle {
            obstacles: board.obstacle_count(),
            board,
            path,
            relax_level,
            phase,
            score,
            difficulty,
        }
    }
}

/// Reject the requests that no board can satisfy.
fn check_request(request: &Request) -> Result<(), GenerateError> {
    let n: usize = request.size;
    if !(MIN_SIZE..=MAX_SIZE).contains(&n) {
        return Err(GenerateError::InvalidSize(n));
    }
    let c: NoBandConstraints = NoBandConstraints::new(n, request.obstacles, request.relax_level);
    let max: usize = c.max_obstacles_no_band.min(n * n - 2);
    if request.obstacles > max || !c.feasible() {
        debug!("Infeasible request: {c:?}");
        return Err(GenerateError::Infeasible {
            obstacles: request.obstacles,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Instant;

    #[test]
    fn test_min_obstacles() {
        assert_eq!(min_obstacles_for_size(6), 4);
        assert_eq!(min_obstacles_for_size(10), 12);
        assert_eq!(min_obstacles_for_size(12), 14);
        assert_eq!(min_obstacles_for_size(3), 3);
    }

    #[test]
    fn test_random_initial_obstacles() {
        let mut rng: StdRng = StdRng::seed_from_u64(31);
        for _ in 0..50 {
            // Between ceil(3.6) and 7, and at least 4
            let count: usize = random_initial_obstacles(6, &mut rng);
            assert!((4..=7).contains(&count), "{count}");
        }
        for _ in 0..50 {
            let count: usize = random_initial_obstacles(10, &mut rng);
            assert!((12..=20).contains(&count), "{count}");
        }
    }

    #[test]
    fn test_check_request() {
        assert_eq!(
            check_request(&Request::new(2, 0, 100)),
            Err(GenerateError::InvalidSize(2))
        );
        assert_eq!(
            check_request(&Request::new(21, 0, 100)),
            Err(GenerateError::InvalidSize(21))
        );
        assert_eq!(
            check_request(&Request::new(10, 81, 100)),
            Err(GenerateError::Infeasible {
                obstacles: 81,
                max: 80
            })
        );
        assert!(check_request(&Request::new(6, 4, 100)).is_ok());
    }

    #[test]
    fn test_no_obstacle_uses_serpentine() {
        let mut rng: StdRng = StdRng::seed_from_u64(32);
        let mut generator: Generator = Generator::new(GeneratorConfig::default());
        let puzzle: Puzzle = generator
            .generate(&Request::new(6, 0, 2000), &mut rng)
            .unwrap();
        assert_eq!(puzzle.phase, Phase::Serpentine);
        assert_eq!(puzzle.path.len(), 36);
        assert_eq!(generator.stats.placement_attempts, 0);
        assert!(puzzle.path.is_valid(&puzzle.board));
    }

    #[test]
    fn test_generate_records_phase_and_score() {
        let mut rng: StdRng = StdRng::seed_from_u64(33);
        let mut generator: Generator = Generator::new(GeneratorConfig::default());
        let puzzle: Puzzle = generator
            .generate(&Request::new(7, 6, 3000), &mut rng)
            .unwrap();
        assert_eq!(puzzle.obstacles, 6);
        assert_eq!(puzzle.board.obstacle_count(), 6);
        assert_eq!(puzzle.path.validate(&puzzle.board), Ok(()));
        assert!((1.0..=5.0).contains(&puzzle.difficulty));
        if puzzle.phase != Phase::Serpentine {
            assert!(generator.stats.candidates > 0);
            assert!(constraints::board_acceptable(&puzzle.board, 6, 0));
        }
    }

    #[test]
    fn test_cancelled_generation() {
        let mut rng: StdRng = StdRng::seed_from_u64(34);
        let mut generator: Generator = Generator::new(GeneratorConfig::default());
        generator.cancel_token().cancel();
        assert_eq!(
            generator.generate(&Request::new(8, 8, 5000), &mut rng),
            Err(GenerateError::Cancelled)
        );
        assert_eq!(generator.stats.placement_attempts, 0);

        // Nothing to search for without obstacles
        assert!(generator.generate(&Request::new(8, 0, 5000), &mut rng).is_ok());
    }

    #[test]
    fn test_carving_only() {
        let mut rng: StdRng = StdRng::seed_from_u64(35);
        let config: GeneratorConfig = GeneratorConfig {
            max_placement_attempts: 0,
            ..GeneratorConfig::default()
        };
        let mut generator: Generator = Generator::new(config);
        let puzzle: Puzzle = generator
            .generate(&Request::new(6, 4, 2000), &mut rng)
            .unwrap();
        assert_ne!(puzzle.phase, Phase::PathSearch);
        assert_eq!(puzzle.path.len(), 32);
        assert!(puzzle.path.is_valid(&puzzle.board));
        if puzzle.phase == Phase::Carving {
            let weights: ScoreWeights = ScoreWeights::carving();
            assert_eq!(puzzle.score, Score::compute(&puzzle.board, &puzzle.path, &weights));
        }
    }

    #[test]
    fn test_score_weights_per_phase() {
        let generator: Generator = Generator::new(GeneratorConfig::default());
        let board: Board = Board::parse(
            "
            . # . .
            . . . .
            . . # .
            . . . .
            ",
        )
        .unwrap();
        // Only the obstacle terms count
        let path: Path = Path::new(0);
        let serpentine: Puzzle =
            generator.build_puzzle(board.clone(), path.clone(), 0, Phase::Serpentine);
        let carving: Puzzle =
            generator.build_puzzle(board.clone(), path.clone(), 0, Phase::Carving);
        assert_ne!(serpentine.score.value, carving.score.value);
        assert_eq!(
            serpentine.score,
            Score::compute(&board, &path, &ScoreWeights::default())
        );
        assert_eq!(
            carving.score,
            Score::compute(&board, &path, &ScoreWeights::carving())
        );
    }

    #[test]
    fn test_generate_with_fallback() {
        let mut rng: StdRng = StdRng::seed_from_u64(36);
        let mut generator: Generator = Generator::new(GeneratorConfig::default());
        let puzzle: Puzzle = generator
            .generate_with_fallback(&Request::new(6, 4, 4000), &mut rng)
            .unwrap();
        assert!(puzzle.path.is_valid(&puzzle.board));
        assert!(puzzle.obstacles <= 4);
        assert_eq!(puzzle.board.obstacle_count(), puzzle.obstacles);

        assert_eq!(
            generator.generate_with_fallback(&Request::new(10, 81, 4000), &mut rng),
            Err(GenerateError::Infeasible {
                obstacles: 81,
                max: 80
            })
        );
    }

    #[test]
    fn test_fallback_honors_the_budget() {
        let mut rng: StdRng = StdRng::seed_from_u64(37);
        let config: GeneratorConfig = GeneratorConfig {
            target_candidates: usize::MAX,
            max_placement_attempts: usize::MAX,
            max_carving_attempts: usize::MAX,
            ..GeneratorConfig::default()
        };
        let mut generator: Generator = Generator::new(config);
        let start: Instant = Instant::now();
        let puzzle: Puzzle = generator
            .generate_with_fallback(&Request::new(10, 12, 300), &mut rng)
            .unwrap();
        // The stages would last several seconds without the request budget
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(puzzle.path.is_valid(&puzzle.board));
    }

    #[test]
    fn test_fallback_starts_at_the_requested_relax_level() {
        let mut rng: StdRng = StdRng::seed_from_u64(38);
        let mut generator: Generator = Generator::new(GeneratorConfig::default());
        let request: Request = Request {
            relax_level: 2,
            ..Request::new(6, 4, 2000)
        };
        let puzzle: Puzzle = generator.generate_with_fallback(&request, &mut rng).unwrap();
        assert_eq!(puzzle.relax_level, 2);
        assert!(puzzle.path.is_valid(&puzzle.board));
    }
}
