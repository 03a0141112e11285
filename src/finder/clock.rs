/*
clock.rs

Copyright 2025 Hervé Quatremain

This file is part of Tilechain.

Tilechain is free software: you can redistribute it and/or modify it under the
terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Tilechain is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Tilechain. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Time source and deadline for the chain search.
//!
//! The search engine never reads the wall clock directly. It receives a [`Deadline`] built from a
//! [`Clock`] so that tests can drive time explicitly.

use std::time::{Duration, Instant};

/// Source of elapsed time since the search started.
pub trait Clock {
    /// Time elapsed since the clock started.
    fn elapsed(&self) -> Duration;
}

/// Clock backed by [`std::time::Instant`].
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    /// Create a [`WallClock`] object that starts now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for WallClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Fixed time budget measured against a [`Clock`].
pub struct Deadline<'a> {
    clock: &'a dyn Clock,
    timeout: Duration,
}

impl<'a> Deadline<'a> {
    /// Create a [`Deadline`] object. The budget starts when the clock started.
    pub fn new(clock: &'a dyn Clock, timeout: Duration) -> Self {
        Self { clock, timeout }
    }

    /// Time budget.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Time elapsed since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Whether the elapsed time meets or exceeds the budget.
    pub fn expired(&self) -> bool {
        self.clock.elapsed() >= self.timeout
    }
}

/// Clock that advances by a fixed step every time it is read.
#[cfg(test)]
pub struct StepClock {
    now: std::cell::Cell<Duration>,
    step: Duration,
}

#[cfg(test)]
impl StepClock {
    /// Create a [`StepClock`] object starting at zero.
    pub fn new(step: Duration) -> Self {
        Self {
            now: std::cell::Cell::new(Duration::ZERO),
            step,
        }
    }

    /// Clock that never advances.
    pub fn frozen() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[cfg(test)]
impl Clock for StepClock {
    fn elapsed(&self) -> Duration {
        let now: Duration = self.now.get();
        self.now.set(now + self.step);
        now
    }
}
