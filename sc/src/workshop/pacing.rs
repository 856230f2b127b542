//! Bounded random delays standing in for work and vacations
//!
//! Delays carry no synchronization meaning; the protocol is correct for any
//! value they take, including zero.

use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Per-actor source of bounded random delays
pub struct Pacer {
    rng: StdRng,
    max: Duration,
}

impl Pacer {
    /// Create a pacer drawing delays in `0..=max` from a seeded generator
    pub fn new(seed: u64, max: Duration) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max,
        }
    }

    /// Pacer that never sleeps
    pub fn immediate() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draw the next delay without sleeping
    pub fn next_delay(&mut self) -> Duration {
        let max_ms = self.max.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.random_range(0..=max_ms))
    }

    /// Sleep for the next delay and return it
    pub fn pause(&mut self) -> Duration {
        let delay = self.next_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        delay
    }
}
