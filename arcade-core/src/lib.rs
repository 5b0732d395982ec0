pub mod attempt;
pub mod geometry;
pub mod phase;
pub mod scene;
pub mod summary;

pub use attempt::{AttemptTotals, ReactionAttempt};
pub use geometry::{Point, Size};
pub use phase::{PlannedPhase, SessionState};
pub use scene::Scene;
pub use summary::SessionSummary;
