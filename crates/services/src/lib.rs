#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod progress_store;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use catalog::{CatalogSource, load_catalog};
pub use config::QuizConfig;
pub use error::{AppServicesError, ConfigError, ProgressError, QuizError, SessionError};
pub use events::{EventSink, NoopEvents, QuizEvent, RecordedEvents};
pub use logging::{LogConfig, init_tracing};
pub use progress_store::{Persisted, ProgressStore};
pub use sessions::{
    AnswerFeedback, ChoiceOrder, EngineState, NextStep, QuizService, SessionEngine,
    SessionOutcome, SessionProgress,
};
