use crate::attempt::ReactionAttempt;
use crate::geometry::Point;
use crate::summary::SessionSummary;

/// What the active phase wants on screen this frame. Produced by the session
/// controller, consumed by the renderer; carries positions and values only.
#[derive(Debug, Clone, PartialEq)]
pub enum Scene<'a> {
    Start,
    Slide {
        index: usize,
        total: usize,
        text: &'a str,
    },
    Fixation {
        dot: Point,
        radius: f32,
    },
    Reaction {
        center_dot: Point,
        center_radius: f32,
        target: Option<Point>,
        target_radius: f32,
        last: Option<&'a ReactionAttempt>,
        completed: usize,
        max_attempts: usize,
    },
    Reflex {
        dots: Vec<Point>,
        radius: f32,
        highlighted: usize,
        hits: u32,
        misses: u32,
        hit_percentage: f64,
        running: bool,
    },
    Optokinetic {
        /// Stripe widths left to right, each followed by `gap`.
        stripes: &'a [f32],
        gap: f32,
        /// Horizontal shift of the whole pattern, 0 down to minus the span.
        offset: f32,
    },
    Summary(&'a SessionSummary),
}

impl Scene<'_> {
    pub fn title(&self) -> &'static str {
        match self {
            Scene::Start => "REFLEX ARCADE",
            Scene::Slide { .. } => "HOW TO PLAY",
            Scene::Fixation { .. } => "Follow the dot",
            Scene::Reaction { .. } => "Tap the red dot",
            Scene::Reflex { .. } => "Tap the lit dot",
            Scene::Optokinetic { .. } => "",
            Scene::Summary(_) => "RESULTS",
        }
    }
}
