pub mod aging;
pub mod calendar;
pub mod classifier;
pub mod config;
pub mod persistence;
pub mod pipeline;
pub mod report;
pub mod submission;

pub use aging::{
    AgingError, Annotation, AnnotatedBatch, DeadlinePolicy, ReviewAgingEngine,
    elapsed_business_days, is_overdue, needs_reviewer_flag,
};
pub use calendar::{BusinessDayCalendar, CalendarConfig, CalendarError};
pub use classifier::{Category, ModuleSet, SubmissionClassifier, base_module};
pub use config::{ConfigError, ReviewConfig};
pub use persistence::{
    LoadedSubmissions, PersistenceError, load_config_from_json, load_submissions_from_csv,
    save_config_to_json, write_reports,
};
pub use pipeline::{PipelineError, RunMode, RunOutcome, process_submissions};
pub use report::{BatchSummary, ReportAssembler, ReviewReport};
pub use submission::{RecordError, Submission, TaskType};
