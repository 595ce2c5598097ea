/*
budget.rs

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

//! Wall-clock deadlines and cooperative cancellation for the generation phases.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Advisory cancellation flag, shared between the caller and the generator.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the generator to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Deadline of one generation phase.
#[derive(Debug, Clone)]
pub struct Budget {
    deadline: Instant,

    /// Number of attempts between two yields.
    yield_interval: usize,

    cancel: CancelToken,
}

impl Budget {
    /// Create a budget that expires after `duration`.
    pub fn new(duration: Duration, yield_interval: usize, cancel: CancelToken) -> Self {
        Self {
            deadline: Instant::now() + duration,
            yield_interval: yield_interval.max(1),
            cancel,
        }
    }

    /// Create a sub-budget that expires after `duration`, but never after this budget.
    pub fn share(&self, duration: Duration, yield_interval: usize) -> Self {
        let deadline: Instant = (Instant::now() + duration).min(self.deadline);
        Self {
            deadline,
            yield_interval: yield_interval.max(1),
            cancel: self.cancel.clone(),
        }
    }

    /// Time left before the deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Check point at the start of each attempt.
    ///
    /// Yield the thread every [`Budget::yield_interval`] attempts. Return `false` when the
    /// attempt must not start, because the deadline is reached or the generation is cancelled.
    pub fn checkpoint(&self, attempt: usize) -> bool {
        if attempt > 0 && attempt % self.yield_interval == 0 {
            thread::yield_now();
        }
        !self.is_cancelled() && !self.is_expired()
    }
}
