use serde::{Deserialize, Serialize};

use crate::attempt::AttemptTotals;

/// Final statistics of a play-through, shown on the summary screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub attempts: usize,
    pub average_reaction_seconds: f64,
    pub average_abs_dx: f64,
    pub average_abs_dy: f64,
    pub reflex_hits: u32,
    pub reflex_misses: u32,
    /// `None` when the reflex round was not played.
    pub reflex_hit_percentage: Option<f64>,
}

impl SessionSummary {
    pub fn from_totals(totals: &AttemptTotals) -> Self {
        Self {
            attempts: totals.count,
            average_reaction_seconds: totals.average_reaction_seconds(),
            average_abs_dx: totals.average_abs_dx(),
            average_abs_dy: totals.average_abs_dy(),
            reflex_hits: 0,
            reflex_misses: 0,
            reflex_hit_percentage: None,
        }
    }

    pub fn with_reflex(mut self, hits: u32, misses: u32, hit_percentage: f64) -> Self {
        self.reflex_hits = hits;
        self.reflex_misses = misses;
        self.reflex_hit_percentage = Some(hit_percentage);
        self
    }
}
