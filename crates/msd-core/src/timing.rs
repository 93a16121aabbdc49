//! Wall-clock timing for run summaries.

use std::time::Instant;

/// A simple timer that measures elapsed time.
#[derive(Debug)]
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    /// Elapsed time in seconds, timer keeps running.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop the timer and return elapsed time in seconds.
    pub fn stop(self) -> f64 {
        let elapsed_s = self.elapsed_s();
        tracing::debug!(label = self.label, elapsed_s, "timer stopped");
        elapsed_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_is_monotonic() {
        let timer = Timer::start("solve");
        let first = timer.elapsed_s();
        let second = timer.elapsed_s();
        assert!(second >= first);
        assert!(timer.stop() >= 0.0);
    }
}
