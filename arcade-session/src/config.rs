use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use arcade_core::PlannedPhase;
use arcade_timing::Step;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Every tunable of a play-through. All fields are optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Phases played between Start and Summary, in order.
    pub phase_order: Vec<PlannedPhase>,
    pub reaction: ReactionConfig,
    pub spawn: SpawnConfig,
    pub reflex: ReflexConfig,
    pub stripes: StripeConfig,
    pub fixation: FixationConfig,
    /// Instruction texts for the slides phase, one per slide.
    pub slides: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            phase_order: vec![
                PlannedPhase::ReactionTime,
                PlannedPhase::Fixation,
                PlannedPhase::ReflexDot,
                PlannedPhase::Optokinetic,
            ],
            reaction: ReactionConfig::default(),
            spawn: SpawnConfig::default(),
            reflex: ReflexConfig::default(),
            stripes: StripeConfig::default(),
            fixation: FixationConfig::default(),
            slides: vec![
                "Tap each red dot as soon as it appears.".to_string(),
                "Tap the dot that lights up as it sweeps the row.".to_string(),
                "Keep your eyes on the screen while the stripes scroll.".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionConfig {
    pub max_attempts: usize,
    /// Pause between a recorded attempt and the next target.
    pub respond_delay_ms: u64,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            respond_delay_ms: 250,
        }
    }
}

impl ReactionConfig {
    pub fn respond_delay(&self) -> Duration {
        Duration::from_millis(self.respond_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Inset from every viewport edge that targets never enter.
    pub padding: f32,
    pub target_radius: f32,
    /// Radius of the static dot at the viewport centre.
    pub center_dot_radius: f32,
    /// Overrides `target_radius + center_dot_radius` when set.
    pub min_clearance: Option<f32>,
    pub max_rounds: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            padding: 50.0,
            target_radius: 25.0,
            center_dot_radius: 10.0,
            min_clearance: None,
            max_rounds: 1000,
        }
    }
}

impl SpawnConfig {
    pub fn clearance(&self) -> f32 {
        self.min_clearance
            .unwrap_or(self.target_radius + self.center_dot_radius)
    }
}

/// How the reflex tick interval changes after every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayPolicy {
    Constant,
    Geometric { factor: f64 },
}

impl DelayPolicy {
    pub fn next_delay(&self, current: Duration) -> Duration {
        match self {
            DelayPolicy::Constant => current,
            DelayPolicy::Geometric { factor } => current.mul_f64(*factor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflexConfig {
    /// Number of dots in the row.
    pub length: usize,
    /// Sweeps after which the round stops.
    pub cycle_limit: u32,
    pub tick_ms: u64,
    pub delay_policy: DelayPolicy,
    pub dot_radius: f32,
    /// Centre-to-centre distance between neighbouring dots.
    pub spacing: f32,
}

impl Default for ReflexConfig {
    fn default() -> Self {
        Self {
            length: 5,
            cycle_limit: 3,
            tick_ms: 800,
            delay_policy: DelayPolicy::Geometric { factor: 0.95 },
            dot_radius: 30.0,
            spacing: 90.0,
        }
    }
}

impl ReflexConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeConfig {
    pub min_width: f32,
    pub max_width: f32,
    pub gap: f32,
    /// Target span as a multiple of the viewport width.
    pub span_factor: f32,
    pub duration_ms: u64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            min_width: 20.0,
            max_width: 80.0,
            gap: 20.0,
            span_factor: 2.0,
            duration_ms: 7000,
        }
    }
}

impl StripeConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixationStepConfig {
    /// Horizontal offset from the viewport centre at the end of the step.
    pub offset_x: f32,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixationConfig {
    pub dot_radius: f32,
    pub steps: Vec<FixationStepConfig>,
}

impl Default for FixationConfig {
    fn default() -> Self {
        let step = |offset_x| FixationStepConfig {
            offset_x,
            duration_ms: 1000,
        };
        Self {
            dot_radius: 10.0,
            steps: vec![step(120.0), step(-120.0), step(0.0)],
        }
    }
}

impl FixationConfig {
    pub fn steps(&self) -> Vec<Step> {
        self.steps
            .iter()
            .map(|s| Step::new(s.offset_x, Duration::from_millis(s.duration_ms)))
            .collect()
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.phase_order.is_empty() {
            return invalid("phase_order must name at least one phase");
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.phase_order.iter().find(|p| !seen.insert(**p)) {
            return Err(ConfigError::Invalid(format!(
                "phase_order lists {dup:?} more than once"
            )));
        }
        if self.reaction.max_attempts == 0 {
            return invalid("reaction.max_attempts must be at least 1");
        }
        if self.spawn.padding < 0.0 || self.spawn.clearance() < 0.0 {
            return invalid("spawn padding and clearance must not be negative");
        }
        if self.spawn.max_rounds == 0 {
            return invalid("spawn.max_rounds must be at least 1");
        }
        if self.reflex.length == 0 {
            return invalid("reflex.length must be at least 1");
        }
        if self.reflex.cycle_limit == 0 {
            return invalid("reflex.cycle_limit must be at least 1");
        }
        if let DelayPolicy::Geometric { factor } = self.reflex.delay_policy {
            if !(factor > 0.0 && factor <= 1.0) {
                return invalid("reflex geometric factor must be in (0, 1]");
            }
        }
        let s = &self.stripes;
        if !(s.min_width > 0.0 && s.min_width <= s.max_width) {
            return invalid("stripes need 0 < min_width <= max_width");
        }
        if s.gap < 0.0 || s.span_factor <= 0.0 {
            return invalid("stripes gap must be >= 0 and span_factor > 0");
        }
        if s.duration_ms == 0 {
            return invalid("stripes.duration_ms must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.spawn.clearance(), 35.0);
        assert_eq!(config.fixation.steps().len(), 3);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SessionConfig::from_json_str(
            r#"{
                "phase_order": ["slides", "reaction_time", "optokinetic", "reflex_dot"],
                "reflex": { "delay_policy": "constant", "tick_ms": 700 },
                "spawn": { "min_clearance": 60 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.phase_order[0], PlannedPhase::Slides);
        assert_eq!(config.phase_order[3], PlannedPhase::ReflexDot);
        assert_eq!(config.reflex.delay_policy, DelayPolicy::Constant);
        assert_eq!(config.reflex.tick_ms, 700);
        assert_eq!(config.reflex.length, 5);
        assert_eq!(config.spawn.clearance(), 60.0);
        assert_eq!(config.reaction.max_attempts, 5);
    }

    #[test]
    fn test_geometric_policy_parses() {
        let config =
            SessionConfig::from_json_str(r#"{"reflex": {"delay_policy": {"geometric": {"factor": 0.9}}}}"#)
                .unwrap();
        assert_eq!(
            config.reflex.delay_policy,
            DelayPolicy::Geometric { factor: 0.9 }
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        for bad in [
            r#"{"phase_order": []}"#,
            r#"{"phase_order": ["reflex_dot", "reflex_dot"]}"#,
            r#"{"reaction": {"max_attempts": 0}}"#,
            r#"{"reflex": {"cycle_limit": 0}}"#,
            r#"{"reflex": {"delay_policy": {"geometric": {"factor": 1.5}}}}"#,
            r#"{"stripes": {"min_width": 90, "max_width": 80}}"#,
            r#"{"stripes": {"duration_ms": 0}}"#,
        ] {
            assert!(
                matches!(SessionConfig::from_json_str(bad), Err(ConfigError::Invalid(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_and_io_errors() {
        assert!(matches!(
            SessionConfig::from_json_str("{ nope"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SessionConfig::load(Path::new("/definitely/not/here.json")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_delay_policies() {
        let tick = Duration::from_millis(1000);
        assert_eq!(DelayPolicy::Constant.next_delay(tick), tick);
        assert_eq!(
            DelayPolicy::Geometric { factor: 0.5 }.next_delay(tick),
            Duration::from_millis(500)
        );
    }
}
