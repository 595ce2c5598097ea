/*
worker.rs

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

//! Run a generation in a background thread.
//!
//! The generation can take several seconds. The worker runs it in a dedicated thread and sends
//! the result through a channel, so that the caller can keep handling events and cancel the
//! generation at any time.

use async_channel::{Receiver, Sender};
use log::{debug, warn};
use rand::rngs::StdRng;
use std::thread::{self, JoinHandle};

use crate::generator::budget::CancelToken;
use crate::generator::orchestrator::{GenerateError, Generator, Puzzle, Request};

/// Result of a generation.
pub type GenerationResult = Result<Puzzle, GenerateError>;

/// [`GenerationWorker`] object.
pub struct GenerationWorker {
    cancel: CancelToken,
    receiver: Receiver<GenerationResult>,
    handle: Option<JoinHandle<()>>,
}

impl GenerationWorker {
    /// Start the generation in a new thread.
    ///
    /// With `fallback`, the generator relaxes the request when needed
    /// ([`Generator::generate_with_fallback`]).
    pub fn spawn(
        mut generator: Generator,
        request: Request,
        fallback: bool,
        mut rng: StdRng,
    ) -> Self {
        let (sender, receiver) = async_channel::bounded::<GenerationResult>(1);
        let cancel: CancelToken = generator.cancel_token();

        let handle: JoinHandle<()> = thread::spawn(move || {
            let res: GenerationResult = if fallback {
                generator.generate_with_fallback(&request, &mut rng)
            } else {
                generator.generate(&request, &mut rng)
            };
            send_result(&sender, res);
        });

        Self {
            cancel,
            receiver,
            handle: Some(handle),
        }
    }

    /// Ask the generation to stop. The worker still sends a result.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Channel that receives the result, for callers that await it.
    pub fn receiver(&self) -> &Receiver<GenerationResult> {
        &self.receiver
    }

    /// Block until the generation ends and return its result.
    ///
    /// A generation thread that panics returns [`GenerateError::Cancelled`].
    pub fn wait(mut self) -> GenerationResult {
        let res: GenerationResult = self
            .receiver
            .recv_blocking()
            .unwrap_or(Err(GenerateError::Cancelled));
        if let Some(handle) = self.handle.take() {
            join(handle);
        }
        res
    }
}

impl Drop for GenerationWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel.cancel();
        }
    }
}

/// Wait for the thread to finish. Return `false` if the thread panicked.
fn join(handle: JoinHandle<()>) -> bool {
    match handle.join() {
        Ok(()) => true,
        Err(payload) => {
            let msg: &str = if let Some(s) = payload.downcast_ref::<&str>() {
                *s
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.as_str()
            } else {
                "unknown error"
            };
            warn!("Generation thread panicked: {msg}");
            false
        }
    }
}

fn send_result(sender: &Sender<GenerationResult>, res: GenerationResult) {
    if sender.send_blocking(res).is_err() {
        debug!("Generation result dropped: the worker is gone");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use rand::SeedableRng;
    use std::time::{Duration, Instant};

    #[test]
    fn test_worker_result() {
        let generator: Generator = Generator::new(GeneratorConfig::default());
        let worker: GenerationWorker = GenerationWorker::spawn(
            generator,
            Request::new(6, 4, 1000),
            false,
            StdRng::seed_from_u64(41),
        );
        let puzzle: Puzzle = worker.wait().unwrap();
        assert!(puzzle.path.is_valid(&puzzle.board));
        assert_eq!(puzzle.obstacles, 4);
    }

    #[test]
    fn test_worker_cancel() {
        let config: GeneratorConfig = GeneratorConfig {
            target_candidates: usize::MAX,
            max_placement_attempts: usize::MAX,
            max_carving_attempts: usize::MAX,
            ..GeneratorConfig::default()
        };
        let start: Instant = Instant::now();
        let worker: GenerationWorker = GenerationWorker::spawn(
            Generator::new(config),
            Request::new(10, 12, 60_000),
            false,
            StdRng::seed_from_u64(42),
        );
        worker.cancel();
        // Cancelled before the end of the budget, with the best candidate found so far if any
        match worker.wait() {
            Ok(puzzle) => assert!(puzzle.path.is_valid(&puzzle.board)),
            Err(e) => assert_eq!(e, GenerateError::Cancelled),
        }
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn test_worker_invalid_request() {
        let worker: GenerationWorker = GenerationWorker::spawn(
            Generator::new(GeneratorConfig::default()),
            Request::new(30, 4, 1000),
            true,
            StdRng::seed_from_u64(43),
        );
        assert_eq!(
            worker.receiver().recv_blocking().unwrap(),
            Err(GenerateError::InvalidSize(30))
        );
    }

    #[test]
    fn test_join_panicked_thread() {
        assert!(join(thread::spawn(|| {})));
        assert!(!join(thread::spawn(|| panic!("search arena corrupted"))));
        let code: usize = 3;
        assert!(!join(thread::spawn(move || panic!("error {code}"))));
    }
}
