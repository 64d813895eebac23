mod engine;
mod progress;
mod types;

pub use engine::FastingEngine;
pub use progress::Progress;
pub use types::{FastingSession, FastingState, History, SessionOutcome};
