//! One-shot delay timer advanced by the host's update tick
//!
//! Used for the synthetic opponent's humanizing pause and for the puzzle
//! trainer's automatic reply. Time only moves when `tick` is called.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DelayTimer {
    duration: Duration,
    elapsed: Duration,
}

impl DelayTimer {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Advance by `delta`; `true` once the delay has fully elapsed
    pub fn tick(&mut self, delta: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(delta);
        self.finished()
    }

    pub fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }
}
