mod calendar;
mod ids;
mod progress;
mod question;
mod question_set;
mod session;
mod streak;

pub use ids::QuestionId;

pub use calendar::{DayActivity, MonthActivity};
pub use progress::{
    DailyEntry, LastSession, PROGRESS_SCHEMA_VERSION, ProgressAggregate, ProgressDocument, Totals,
};
pub use question::{Question, QuestionDraft, QuestionError};
pub use question_set::{CatalogDocument, CatalogError, LoadError, QuestionSet};
pub use session::{ResumeProgress, ResumeSnapshot, SessionMode, SnapshotError};
pub use streak::Streak;
