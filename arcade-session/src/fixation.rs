use std::time::Duration;

use arcade_core::Point;
use arcade_timing::{Step, StepSequence};

use crate::config::FixationConfig;

/// The fixation dot sliding right, left and back to centre. Step boundaries
/// are driven from outside (deferred actions); this only knows which step is
/// running and since when.
#[derive(Debug, Clone)]
pub struct FixationRun {
    sequence: StepSequence,
    step_started_at: u64,
}

impl FixationRun {
    pub fn new(config: &FixationConfig, now: u64) -> Self {
        Self {
            sequence: StepSequence::new(0.0, config.steps()),
            step_started_at: now,
        }
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.sequence.current()
    }

    /// Ends the running step at `at`; returns the duration of the next one.
    pub fn complete_step(&mut self, at: u64) -> Option<Duration> {
        self.step_started_at = at;
        self.sequence.advance().map(|s| s.duration)
    }

    pub fn dot_position(&self, center: Point, now: u64) -> Point {
        let elapsed = Duration::from_nanos(now.saturating_sub(self.step_started_at));
        Point::new(center.x + self.sequence.value_at(elapsed), center.y)
    }
}
