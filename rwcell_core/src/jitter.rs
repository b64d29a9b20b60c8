//! Injectable arrival jitter and payload randomness.
//!
//! The simulation sleeps tasks for a random interval before they contend for
//! the shared value, mimicking staggered arrival. Both the sleep durations
//! and the values writers produce come from seeded generators so any run can
//! be reproduced exactly, and tests can switch jitter off entirely.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::Duration;

/// Deterministic random pause provider.
#[derive(Debug)]
pub struct Jitter {
    rng: StdRng,
    bounds: Option<(Duration, Duration)>,
}

impl Jitter {
    /// Jitter drawing uniformly from `min..=max`, seeded for reproducibility.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`; [`crate::config::SimConfig::validate`] rejects
    /// such configurations before they reach this point.
    pub fn from_seed(seed: u64, min: Duration, max: Duration) -> Self {
        assert!(min <= max, "jitter lower bound exceeds upper bound");
        let bounds = if max.is_zero() { None } else { Some((min, max)) };
        Self {
            rng: StdRng::seed_from_u64(seed),
            bounds,
        }
    }

    /// Jitter that never sleeps. Used by tests that need deterministic
    /// scheduling-free runs.
    pub fn none() -> Self {
        Self {
            rng: StdRng::seed_from_u64(0),
            bounds: None,
        }
    }

    /// Draw the next pause without sleeping. `None` when jitter is disabled.
    pub fn next_pause(&mut self) -> Option<Duration> {
        let (min, max) = self.bounds?;
        let millis = self.rng.gen_range(min.as_millis() as u64..=max.as_millis() as u64);
        Some(Duration::from_millis(millis))
    }

    /// Sleep the current thread for the next drawn pause, if any.
    pub fn pause(&mut self) {
        if let Some(duration) = self.next_pause() {
            thread::sleep(duration);
        }
    }
}

/// Seeded generator for the values writers publish.
#[derive(Debug)]
pub struct ValueSource {
    rng: StdRng,
}

impl ValueSource {
    /// Create a value source from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produce the next value to write. Non-negative, like the classic
    /// demo's `rand()` payloads.
    pub fn next_value(&mut self) -> i64 {
        self.rng.gen_range(0..i64::MAX)
    }
}
