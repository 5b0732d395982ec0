use std::time::Duration;

/// A value moving linearly from `start` to `end` over `duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgression {
    pub start: f32,
    pub end: f32,
    pub duration: Duration,
}

impl LinearProgression {
    pub fn new(start: f32, end: f32, duration: Duration) -> Self {
        Self {
            start,
            end,
            duration,
        }
    }

    /// Progress in `[0, 1]` after `elapsed`. A zero duration is complete at once.
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, elapsed: Duration) -> f32 {
        self.start + (self.end - self.start) * self.progress(elapsed)
    }
}
