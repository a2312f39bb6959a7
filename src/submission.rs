use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d"];

const DIPLOMA_TAGS: [&str; 2] = ["diploma", "диплом"];
const HOMEWORK_TAGS: [&str; 2] = ["homework", "дз"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("malformed submission date '{value}'")]
    MalformedSubmissionDate { value: String },
}

/// Task-type tag as exported by the learning platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TaskType {
    /// Diploma-like work; becomes a diploma or a coursework depending on the module.
    Diploma,
    Homework,
    Other(String),
}

impl TaskType {
    pub fn from_tag(tag: &str) -> Self {
        let normalized = tag.trim().to_lowercase();
        if DIPLOMA_TAGS.contains(&normalized.as_str()) {
            TaskType::Diploma
        } else if HOMEWORK_TAGS.contains(&normalized.as_str()) {
            TaskType::Homework
        } else {
            TaskType::Other(tag.trim().to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskType::Diploma => "Diploma",
            TaskType::Homework => "Homework",
            TaskType::Other(tag) => tag,
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TaskType {
    fn from(value: String) -> Self {
        TaskType::from_tag(&value)
    }
}

impl From<TaskType> for String {
    fn from(value: TaskType) -> Self {
        value.as_str().to_string()
    }
}

/// One row of the "unreviewed works" export.
///
/// The core only reads `module`, `task_type`, `submitted_at`, `reviewer` and
/// `coordinator_id`; the remaining fields are carried through to reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub module: String,
    pub task_title: String,
    pub admin_link: String,
    pub expert_link: String,
    pub student_id: String,
    /// Raw submission timestamp; parsed lazily by [`Submission::submission_date`].
    pub submitted_at: String,
    pub reviewer: Option<String>,
    pub possible_reviewers: Option<String>,
    pub task_type: TaskType,
    pub coordinator_id: Option<i64>,
}

impl Submission {
    pub fn new(module: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            module: module.into(),
            task_title: String::new(),
            admin_link: String::new(),
            expert_link: String::new(),
            student_id: String::new(),
            submitted_at: String::new(),
            reviewer: None,
            possible_reviewers: None,
            task_type,
            coordinator_id: None,
        }
    }

    pub fn with_submitted_on(mut self, date: NaiveDate) -> Self {
        self.submitted_at = date.format("%Y-%m-%d").to_string();
        self
    }

    pub fn with_reviewer(mut self, reviewer: impl Into<String>) -> Self {
        self.reviewer = Some(reviewer.into());
        self
    }

    pub fn with_coordinator(mut self, coordinator_id: i64) -> Self {
        self.coordinator_id = Some(coordinator_id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.task_title = title.into();
        self
    }

    /// `Ok(None)` when no date was recorded.
    pub fn submission_date(&self) -> Result<Option<NaiveDate>, RecordError> {
        parse_submission_date(&self.submitted_at)
    }

    pub fn has_reviewer(&self) -> bool {
        self.reviewer
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}

pub fn parse_submission_date(input: &str) -> Result<Option<NaiveDate>, RecordError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(Some(date));
        }
    }

    // Timestamps such as "2026-01-12 10:30:00" or "2026-01-12T10:30:00"
    if let Ok((date, rest)) = NaiveDate::parse_and_remainder(trimmed, "%Y-%m-%d") {
        if rest.starts_with(' ') || rest.starts_with('T') {
            return Ok(Some(date));
        }
    }

    Err(RecordError::MalformedSubmissionDate {
        value: input.to_string(),
    })
}
