/*
config.rs

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

//! Generator tunables.
//!
//! The default values are the ones used by the game. Developers can override them with a JSON
//! file passed to the `--config` command-line option. Missing fields keep their default value.
//!
//! ```json
//! {
//!     "phase_a_share": 0.5,
//!     "strategies": ["degree-checked", "central-ring"],
//!     "weights": { "clump": 3.0 }
//! }
//! ```

use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::generator::placement::PlacementStrategy;
use crate::generator::scoring::ScoreWeights;
use crate::generator::{carver, solver};

pub const COPYRIGHT_NOTICE: &str = "Copyright 2025 Hervé Quatremain
License GPL-3.0-or-later: GNU GPL version 3 or later <https://gnu.org/licenses/gpl.html>.
This is free software: you are free to change and redistribute it.
There is NO WARRANTY, to the extent permitted by law.";

/// Tunables of the generation phases.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Share of the time budget given to the obstacle placement phase. The carving phase gets
    /// the rest.
    pub phase_a_share: f64,

    /// Shortest time budget in milliseconds for a generation.
    pub min_budget_ms: u64,

    /// Maximum number of attempts of the obstacle placement phase.
    pub max_placement_attempts: usize,

    /// Maximum number of attempts of the carving phase.
    pub max_carving_attempts: usize,

    /// Attempts between two yields in the obstacle placement phase.
    pub placement_yield_interval: usize,

    /// Attempts between two yields in the carving phase.
    pub carving_yield_interval: usize,

    /// Iteration cap of the solver, for each starting cell.
    pub solver_max_iterations: usize,

    /// Number of starting cells the solver tries.
    pub solver_max_starts: usize,

    /// Iteration cap of the carver, for each starting cell.
    pub carver_max_iterations: usize,

    /// Random noise added to the move ordering of the carver.
    pub carving_jitter: f64,

    /// Placement strategies, used in turn by the obstacle placement phase.
    pub strategies: Vec<PlacementStrategy>,

    /// Number of valid candidates after which a phase stops looking for a better one.
    pub target_candidates: usize,

    /// Default time budget in milliseconds of a generation with the fallback stages.
    pub fallback_time_limit_ms: u64,

    /// Weights of the quality score, for the obstacle placement and serpentine phases.
    pub weights: ScoreWeights,

    /// Weights of the quality score, for the carving phase.
    pub carving_weights: ScoreWeights,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            phase_a_share: 0.6,
            min_budget_ms: 200,
            max_placement_attempts: 3000,
            max_carving_attempts: 5000,
            placement_yield_interval: 15,
            carving_yield_interval: 20,
            solver_max_iterations: solver::MAX_ITERATIONS,
            solver_max_starts: solver::MAX_STARTS,
            carver_max_iterations: carver::MAX_ITERATIONS,
            carving_jitter: carver::DEFAULT_JITTER,
            strategies: vec![PlacementStrategy::default()],
            target_candidates: 24,
            fallback_time_limit_ms: 8000,
            weights: ScoreWeights::default(),
            carving_weights: ScoreWeights::carving(),
        }
    }
}

impl GeneratorConfig {
    /// Load the configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let file: File = File::open(path)?;
        let reader: BufReader<File> = BufReader::new(file);
        let config: GeneratorConfig = serde_json::from_reader(reader)?;
        debug!("Configuration loaded from {path:?}: {config:?}");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_configuration() {
        let config: GeneratorConfig = serde_json::from_str(
            r#"{
                "phase_a_share": 0.5,
                "strategies": ["degree-checked", "central-ring"],
                "weights": { "clump": 3.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.phase_a_share, 0.5);
        assert_eq!(
            config.strategies,
            vec![PlacementStrategy::DegreeChecked, PlacementStrategy::CentralRing]
        );
        assert_eq!(config.weights.clump, 3.0);
        assert_eq!(config.weights.branch, ScoreWeights::default().branch);
        assert_eq!(config.solver_max_starts, 8);
        assert_eq!(config.placement_yield_interval, 15);
        assert_eq!(config.carving_weights, ScoreWeights::carving());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(GeneratorConfig::load(Path::new("/nonexistent/hitofude.json")).is_err());
    }
}
