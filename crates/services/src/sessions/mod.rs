mod choices;
mod engine;
mod progress;
mod queue;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use choices::ChoiceOrder;
pub use engine::{AnswerEvent, EngineState, SessionEngine, SessionOutcome};
pub use progress::SessionProgress;
pub use queue::{build_queue, fisher_yates};
pub use workflow::{AnswerFeedback, NextStep, QuizService};
