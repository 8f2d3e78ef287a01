// Copyright (c) 2025 vivo Mobile Communication Co., Ltd.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bounded retry with exponential backoff, used by polling reads and by
//! writes that make no progress.

use crate::kconfig::{
    SERIAL_POLL_BACKOFF_MAX_US, SERIAL_POLL_BACKOFF_MIN_US, SERIAL_POLL_MAX_ATTEMPTS,
};
use core::time::Duration;
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Attempts before giving up, including the first one.
    pub max_attempts: u32,
    /// Sleep after the first failed attempt.
    pub min_backoff: Duration,
    /// Upper bound of the doubling sleep.
    pub max_backoff: Duration,
}

impl PollConfig {
    pub const fn new(max_attempts: u32, min_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts,
            min_backoff,
            max_backoff,
        }
    }

    /// Few attempts with short sleeps
    pub const fn quick() -> Self {
        Self::new(4, Duration::from_micros(10), Duration::from_micros(100))
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(
            SERIAL_POLL_MAX_ATTEMPTS,
            Duration::from_micros(SERIAL_POLL_BACKOFF_MIN_US),
            Duration::from_micros(SERIAL_POLL_BACKOFF_MAX_US),
        )
    }
}

/// Attempt counter plus the next sleep.
#[derive(Debug)]
pub struct Backoff {
    config: PollConfig,
    attempt: u32,
    delay: Duration,
    waited: Duration,
}

impl Backoff {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            attempt: 0,
            delay: config.min_backoff.min(config.max_backoff),
            waited: Duration::ZERO,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.attempt >= self.config.max_attempts
    }

    /// Start the next attempt. Returns false once the budget is spent.
    pub fn tick(&mut self) -> bool {
        if self.is_expired() {
            return false;
        }
        self.attempt += 1;
        true
    }

    /// Sleep for the current delay, then double it up to the cap.
    pub fn snooze(&mut self) {
        thread::sleep(self.delay);
        self.waited += self.delay;
        self.delay = self.delay.saturating_mul(2).min(self.config.max_backoff);
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn waited(&self) -> Duration {
        self.waited
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollResult<T> {
    Ready(T),
    Exhausted { attempts: u32, waited: Duration },
}

/// Run `attempt` until it yields a value, fails, or the attempt budget runs
/// out. Sleeps between attempts, never after the last one.
pub fn poll_with_backoff<T, E, F>(config: PollConfig, mut attempt: F) -> Result<PollResult<T>, E>
where
    F: FnMut(u32) -> Result<Option<T>, E>,
{
    let mut backoff = Backoff::new(config);

    while backoff.tick() {
        if let Some(value) = attempt(backoff.attempt())? {
            return Ok(PollResult::Ready(value));
        }
        if !backoff.is_expired() {
            backoff.snooze();
        }
    }

    Ok(PollResult::Exhausted {
        attempts: backoff.attempt(),
        waited: backoff.waited(),
    })
}
