use super::{PersistenceError, PersistenceResult};
use crate::config::ReviewConfig;
use crate::pipeline::RunOutcome;
use crate::report::{ReportRow, render_lines, render_no_reviewer_listing};
use crate::submission::{Submission, TaskType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn load_config_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ReviewConfig> {
    let file = File::open(path)?;
    let config: ReviewConfig = serde_json::from_reader(file)?;
    super::validate_config(&config)?;
    Ok(config)
}

pub fn save_config_to_json<P: AsRef<Path>>(config: &ReviewConfig, path: P) -> PersistenceResult<()> {
    super::validate_config(config)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, config)?;
    Ok(())
}

/// Input row as exported by the platform. Every column must be present in the
/// header; cells may be blank.
#[derive(Debug, Deserialize)]
struct SubmissionCsvRecord {
    module: String,
    task_title: String,
    admin_link: String,
    expert_link: String,
    student_id: String,
    submitted_at: String,
    reviewer: String,
    possible_reviewers: String,
    task_type: String,
    coord_id: String,
}

impl SubmissionCsvRecord {
    fn into_submission(self) -> PersistenceResult<Submission> {
        let coordinator_id = parse_i64(&self.coord_id)?;
        let mut submission = Submission::new(self.module, TaskType::from_tag(&self.task_type));
        submission.task_title = self.task_title;
        submission.admin_link = self.admin_link;
        submission.expert_link = self.expert_link;
        submission.student_id = self.student_id;
        submission.submitted_at = self.submitted_at;
        submission.reviewer = parse_string_option(self.reviewer);
        submission.possible_reviewers = parse_string_option(self.possible_reviewers);
        submission.coordinator_id = coordinator_id;
        Ok(submission)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// 1-based line in the source file, header included.
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct LoadedSubmissions {
    pub records: Vec<Submission>,
    pub rejected: Vec<RejectedRow>,
}

/// Load submissions from CSV. Ragged rows, non-UTF-8 cells and unusable
/// values are rejected individually; a header missing a column or an
/// unreadable file fails the load.
pub fn load_submissions_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<LoadedSubmissions> {
    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let headers = reader.headers()?.clone();
    let mut loaded = LoadedSubmissions::default();

    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                let line = err.position().map(|p| p.line()).unwrap_or_default();
                let reason = err.to_string();
                warn!(line, %reason, "rejecting unreadable submission row");
                loaded.rejected.push(RejectedRow { line, reason });
                continue;
            }
        };
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let parsed = row
            .deserialize::<SubmissionCsvRecord>(Some(&headers))
            .map_err(PersistenceError::from)
            .and_then(SubmissionCsvRecord::into_submission);
        match parsed {
            Ok(submission) => loaded.records.push(submission),
            Err(PersistenceError::InvalidData(reason)) => {
                warn!(line, %reason, "rejecting submission row");
                loaded.rejected.push(RejectedRow { line, reason });
            }
            Err(err) => return Err(err),
        }
    }
    Ok(loaded)
}

#[derive(Serialize)]
struct ReportCsvRecord<'a> {
    module: &'a str,
    task_title: &'a str,
    admin_link: &'a str,
    expert_link: &'a str,
    student_id: &'a str,
    submitted_on: String,
    reviewer: &'a str,
    possible_reviewers: &'a str,
    business_days_on_review: i64,
    overdue: bool,
}

impl<'a> From<&'a ReportRow> for ReportCsvRecord<'a> {
    fn from(row: &'a ReportRow) -> Self {
        Self {
            module: &row.module,
            task_title: &row.task_title,
            admin_link: &row.admin_link,
            expert_link: &row.expert_link,
            student_id: &row.student_id,
            submitted_on: format_date(row.submitted_on),
            reviewer: row.reviewer.as_deref().unwrap_or_default(),
            possible_reviewers: row.possible_reviewers.as_deref().unwrap_or_default(),
            business_days_on_review: row.business_days_on_review,
            overdue: row.overdue,
        }
    }
}

const REPORT_HEADER: [&str; 10] = [
    "module",
    "task_title",
    "admin_link",
    "expert_link",
    "student_id",
    "submitted_on",
    "reviewer",
    "possible_reviewers",
    "business_days_on_review",
    "overdue",
];

/// Write report rows as CSV. An empty report still gets its header row.
pub fn write_report_csv<P: AsRef<Path>>(rows: &[ReportRow], path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(REPORT_HEADER)?;
    for row in rows {
        writer.serialize(ReportCsvRecord::from(row))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_text<P: AsRef<Path>>(path: P, body: &str) -> PersistenceResult<()> {
    fs::write(path, body)?;
    Ok(())
}

/// Write every report the outcome's run mode calls for into `dir`, creating it
/// if needed. Returns the written paths in write order.
pub fn write_reports<P: AsRef<Path>>(outcome: &RunOutcome, dir: P) -> PersistenceResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let stamp = outcome.today.format("%Y-%m-%d").to_string();
    let report = &outcome.report;
    let mut written = Vec::new();

    if outcome.mode.includes_regular() {
        let path = dir.join(format!("diploma_works_{stamp}.csv"));
        write_report_csv(&report.diploma_works, &path)?;
        written.push(path);

        let path = dir.join(format!("overdue_homework_{stamp}.csv"));
        write_report_csv(&report.overdue_homework, &path)?;
        written.push(path);
    }

    if outcome.mode.includes_coursework() {
        let path = dir.join(format!("coursework_without_reviewer_{stamp}.txt"));
        write_text(&path, &render_no_reviewer_listing(&report.coursework_without_reviewer))?;
        written.push(path);

        if !report.unknown_coordinators.is_empty() {
            let path = dir.join(format!("unknown_coordinators_{stamp}.txt"));
            write_text(&path, &render_lines(&report.unknown_coordinators, ""))?;
            written.push(path);
        }

        let path = dir.join(format!("overdue_coursework_coordinators_{stamp}.txt"));
        write_text(
            &path,
            &render_lines(
                &report.overdue_coursework_coordinators,
                "No coordinators with overdue works",
            ),
        )?;
        written.push(path);

        let path = dir.join(format!("overdue_coursework_{stamp}.csv"));
        write_report_csv(&report.overdue_coursework, &path)?;
        written.push(path);
    }

    for path in &written {
        info!(path = %path.display(), "report written");
    }
    Ok(written)
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_i64(input: &str) -> PersistenceResult<Option<i64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    // Spreadsheet exports sometimes render integer ids as "101.0".
    let trimmed = input.trim();
    let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    digits
        .parse::<i64>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid coord_id '{input}': {e}")))
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
