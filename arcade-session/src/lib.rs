pub mod config;
pub mod fixation;
pub mod reflex;
pub mod spawner;
pub mod state;
pub mod stripes;

pub use config::{ConfigError, DelayPolicy, SessionConfig};
pub use fixation::FixationRun;
pub use reflex::{ReflexSequencer, RowLayout};
pub use spawner::{Spawn, TargetSpawner};
pub use state::{Deferred, SessionController, SessionEvent};
pub use stripes::StripeStimulus;
