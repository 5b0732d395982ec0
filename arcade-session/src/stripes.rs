use arcade_timing::LinearProgression;
use rand::Rng;

use crate::config::StripeConfig;

/// Stripe widths for the optokinetic phase plus the offset they scroll by.
#[derive(Debug, Clone, PartialEq)]
pub struct StripeStimulus {
    pub widths: Vec<f32>,
    pub gap: f32,
    pub span: f32,
    pub offset: LinearProgression,
}

impl StripeStimulus {
    /// Widths for a `viewport_width` screen; the pattern scrolls by
    /// `span_factor` viewport widths over the configured duration.
    pub fn new<R: Rng>(rng: &mut R, config: &StripeConfig, viewport_width: f32) -> Self {
        let span = viewport_width * config.span_factor;
        Self {
            widths: Self::generate(rng, config, span),
            gap: config.gap,
            span,
            offset: LinearProgression::new(0.0, -span, config.duration()),
        }
    }

    /// Samples widths until the running total of `width + gap` reaches
    /// `target_width`. The last stripe may overshoot; nothing is trimmed.
    pub fn generate<R: Rng>(rng: &mut R, config: &StripeConfig, target_width: f32) -> Vec<f32> {
        let mut widths = Vec::new();
        let mut total = 0.0;
        while total < target_width {
            let width = rng.random_range(config.min_width..=config.max_width);
            widths.push(width);
            total += width + config.gap;
        }
        widths
    }

    pub fn covered_width(&self) -> f32 {
        self.widths.iter().map(|w| w + self.gap).sum()
    }
}
