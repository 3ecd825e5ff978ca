//! Wall-clock durations for cases, suites and runs

use std::time::{Duration, Instant};

use tracing::debug;

/// Measures time since it was started
#[derive(Debug)]
pub struct Timer<'a> {
    label: &'a str,
    started: Instant,
}

impl<'a> Timer<'a> {
    pub fn start(label: &'a str) -> Self {
        Self {
            label,
            started: Instant::now(),
        }
    }

    /// Whole milliseconds so far, saturating
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Consume the timer, logging the duration at debug level
    pub fn stop(self) -> Duration {
        let elapsed = self.started.elapsed();
        debug!(label = self.label, elapsed_ms = elapsed.as_millis() as u64, "timer stopped");
        elapsed
    }
}
