use std::time::Duration;

use crate::progression::LinearProgression;

/// Move to `target` over `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub target: f32,
    pub duration: Duration,
}

impl Step {
    pub fn new(target: f32, duration: Duration) -> Self {
        Self { target, duration }
    }
}

/// Ordered steps run one after another. Each step starts from where the
/// previous one ended (the first from `origin`). The owner decides when a step
/// is over and calls [`StepSequence::advance`]; the sequence only tracks which
/// step is current and interpolates within it.
#[derive(Debug, Clone)]
pub struct StepSequence {
    steps: Vec<Step>,
    origin: f32,
    index: usize,
}

impl StepSequence {
    pub fn new(origin: f32, steps: Vec<Step>) -> Self {
        Self {
            steps,
            origin,
            index: 0,
        }
    }

    pub fn current(&self) -> Option<&Step> {
        self.steps.get(self.index)
    }

    /// Finishes the current step and returns the next one, if any.
    pub fn advance(&mut self) -> Option<&Step> {
        if !self.is_finished() {
            self.index += 1;
        }
        self.current()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    /// Value `elapsed` into the current step. Once finished, the last target
    /// (or the origin for an empty sequence).
    pub fn value_at(&self, elapsed: Duration) -> f32 {
        let from = self.step_origin();
        match self.current() {
            Some(step) => LinearProgression::new(from, step.target, step.duration).value_at(elapsed),
            None => from,
        }
    }

    fn step_origin(&self) -> f32 {
        match self.index {
            0 => self.origin,
            i => self.steps[i - 1].target,
        }
    }
}
