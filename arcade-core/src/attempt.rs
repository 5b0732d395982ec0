use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// One finished reaction-time attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionAttempt {
    pub target: Point,
    pub appeared_at_ns: u64,
    pub reaction_seconds: f64,
    pub delta_x: f32,
    pub delta_y: f32,
}

/// Running totals over the attempts of one play-through. Averages are derived
/// on demand and are 0 while no attempt has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AttemptTotals {
    pub count: usize,
    pub reaction_sum: f64,
    pub abs_dx_sum: f64,
    pub abs_dy_sum: f64,
}

impl AttemptTotals {
    pub fn add(&mut self, attempt: &ReactionAttempt) {
        self.count += 1;
        self.reaction_sum += attempt.reaction_seconds;
        self.abs_dx_sum += f64::from(attempt.delta_x.abs());
        self.abs_dy_sum += f64::from(attempt.delta_y.abs());
    }

    pub fn average_reaction_seconds(&self) -> f64 {
        self.mean(self.reaction_sum)
    }

    pub fn average_abs_dx(&self) -> f64 {
        self.mean(self.abs_dx_sum)
    }

    pub fn average_abs_dy(&self) -> f64 {
        self.mean(self.abs_dy_sum)
    }

    fn mean(&self, sum: f64) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            sum / self.count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(reaction_seconds: f64, delta_x: f32, delta_y: f32) -> ReactionAttempt {
        ReactionAttempt {
            target: Point::default(),
            appeared_at_ns: 0,
            reaction_seconds,
            delta_x,
            delta_y,
        }
    }

    #[test]
    fn test_empty_totals_average_to_zero() {
        let totals = AttemptTotals::default();
        assert_eq!(totals.average_reaction_seconds(), 0.0);
        assert_eq!(totals.average_abs_dx(), 0.0);
        assert_eq!(totals.average_abs_dy(), 0.0);
    }

    #[test]
    fn test_deltas_are_averaged_by_magnitude() {
        let mut totals = AttemptTotals::default();
        totals.add(&attempt(0.5, -30.0, 10.0));
        totals.add(&attempt(0.25, 10.0, -50.0));
        assert_eq!(totals.count, 2);
        assert!((totals.average_reaction_seconds() - 0.375).abs() < 1e-12);
        assert!((totals.average_abs_dx() - 20.0).abs() < 1e-9);
        assert!((totals.average_abs_dy() - 30.0).abs() < 1e-9);
    }
}
