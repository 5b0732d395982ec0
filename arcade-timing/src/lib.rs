pub mod progression;
pub mod scheduler;
pub mod sequence;
pub mod timer;

pub use progression::LinearProgression;
pub use scheduler::Scheduler;
pub use sequence::{Step, StepSequence};
pub use timer::{FrameStats, HighPrecisionTimer, ManualTimer, Timer};
