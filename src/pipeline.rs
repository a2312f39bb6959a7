use crate::aging::{AgingError, ReviewAgingEngine};
use crate::config::{ConfigError, ReviewConfig};
use crate::report::{ReportAssembler, ReviewReport};
use crate::submission::Submission;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Coursework reports go out on this weekday when running in `Auto` mode.
pub const COURSEWORK_REPORT_DAY: Weekday = Weekday::Thu;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Aging(#[from] AgingError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Coursework on the report day, diploma + homework otherwise.
    #[default]
    Auto,
    Regular,
    Coursework,
    All,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Auto => "auto",
            RunMode::Regular => "regular",
            RunMode::Coursework => "coursework",
            RunMode::All => "all",
        }
    }

    /// Resolve `Auto` against the run date; other modes are returned as is.
    pub fn resolve(self, today: NaiveDate) -> RunMode {
        match self {
            RunMode::Auto if today.weekday() == COURSEWORK_REPORT_DAY => RunMode::Coursework,
            RunMode::Auto => RunMode::Regular,
            other => other,
        }
    }

    pub fn includes_regular(&self) -> bool {
        matches!(self, RunMode::Regular | RunMode::All)
    }

    pub fn includes_coursework(&self) -> bool {
        matches!(self, RunMode::Coursework | RunMode::All)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(RunMode::Auto),
            "regular" => Ok(RunMode::Regular),
            "coursework" => Ok(RunMode::Coursework),
            "all" => Ok(RunMode::All),
            other => Err(format!("unknown run mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub today: NaiveDate,
    pub mode: RunMode,
    pub report: ReviewReport,
}

/// Classify, age and group one batch of submissions against a config snapshot.
pub fn process_submissions(
    config: &ReviewConfig,
    records: &[Submission],
    today: NaiveDate,
    mode: RunMode,
) -> Result<RunOutcome, PipelineError> {
    config.validate()?;
    let calendar = config.build_calendar();
    let classifier = config.build_classifier();
    let policy = config.deadline_policy();

    let engine = ReviewAgingEngine::new(&calendar, &classifier, &policy, today)?;
    let batch = engine.annotate_batch(records)?;
    let report = ReportAssembler::new(&config.coordinators).assemble(&batch);

    let mode = mode.resolve(today);
    info!(%today, %mode, summary = %report.summary.to_cli_summary(), "processed submissions");
    Ok(RunOutcome {
        today,
        mode,
        report,
    })
}
