use serde::{Deserialize, Serialize};

/// The screen currently shown. Exactly one is active at a time.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Start,
    Fixation,
    Slide(usize),
    ReactionTime,
    ReflexDot,
    Optokinetic,
    Summary,
}

impl SessionState {
    /// Whether pointer taps are routed to a game in this state.
    pub fn allows_taps(&self) -> bool {
        matches!(self, Self::ReactionTime | Self::ReflexDot)
    }

    /// Whether the continue input (space, enter) does anything here.
    pub fn accepts_continue(&self) -> bool {
        matches!(
            self,
            Self::Start | Self::Slide(_) | Self::ReflexDot | Self::Summary
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Fixation => "fixation",
            Self::Slide(_) => "slide",
            Self::ReactionTime => "reaction-time",
            Self::ReflexDot => "reflex-dot",
            Self::Optokinetic => "optokinetic",
            Self::Summary => "summary",
        }
    }
}

/// One entry of the configured phase order between Start and Summary.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannedPhase {
    Slides,
    Fixation,
    ReactionTime,
    ReflexDot,
    Optokinetic,
}

impl PlannedPhase {
    /// The state entered when this phase begins.
    pub fn entry_state(&self) -> SessionState {
        match self {
            PlannedPhase::Slides => SessionState::Slide(0),
            PlannedPhase::Fixation => SessionState::Fixation,
            PlannedPhase::ReactionTime => SessionState::ReactionTime,
            PlannedPhase::ReflexDot => SessionState::ReflexDot,
            PlannedPhase::Optokinetic => SessionState::Optokinetic,
        }
    }
}
