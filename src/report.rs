use crate::aging::{AnnotatedBatch, AnnotatedSubmission};
use crate::classifier::Category;
use chrono::{Datelike, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
const MISSING_COORDINATOR: &str = "-";

/// Flat row written to the CSV reports and shown in tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub module: String,
    pub task_title: String,
    pub admin_link: String,
    pub expert_link: String,
    pub student_id: String,
    pub submitted_on: Option<NaiveDate>,
    pub reviewer: Option<String>,
    pub possible_reviewers: Option<String>,
    pub business_days_on_review: i64,
    pub overdue: bool,
}

impl From<&AnnotatedSubmission<'_>> for ReportRow {
    fn from(item: &AnnotatedSubmission<'_>) -> Self {
        let record = item.record;
        Self {
            module: record.module.clone(),
            task_title: record.task_title.clone(),
            admin_link: record.admin_link.clone(),
            expert_link: record.expert_link.clone(),
            student_id: record.student_id.clone(),
            submitted_on: item.annotation.submitted_on,
            reviewer: record.reviewer.clone().filter(|r| !r.trim().is_empty()),
            possible_reviewers: record.possible_reviewers.clone(),
            business_days_on_review: item.annotation.elapsed_business_days,
            overdue: item.annotation.is_overdue,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorGroup {
    pub coordinator: String,
    pub works: Vec<ReportRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub position: usize,
    pub module: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub diploma: usize,
    pub coursework: usize,
    pub homework: usize,
    pub unclassified: usize,
    pub overdue: usize,
    pub needs_reviewer: usize,
    pub skipped: Vec<SkippedRow>,
}

impl BatchSummary {
    pub fn category_count(&self, category: Category) -> usize {
        match category {
            Category::Diploma => self.diploma,
            Category::Coursework => self.coursework,
            Category::Homework => self.homework,
        }
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("records={}", self.total));
        parts.push(format!("diploma={}", self.diploma));
        parts.push(format!("coursework={}", self.coursework));
        parts.push(format!("homework={}", self.homework));
        if self.unclassified > 0 {
            parts.push(format!("unclassified={}", self.unclassified));
        }
        parts.push(format!("overdue={}", self.overdue));
        if self.needs_reviewer > 0 {
            parts.push(format!("no_reviewer={}", self.needs_reviewer));
        }
        if !self.skipped.is_empty() {
            let rows = self
                .skipped
                .iter()
                .map(|row| row.position.to_string())
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("skipped={}", rows));
        }
        parts.join(", ")
    }
}

/// Category result sets built from one annotated batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewReport {
    pub diploma_works: Vec<ReportRow>,
    pub overdue_homework: Vec<ReportRow>,
    pub coursework_works: Vec<ReportRow>,
    pub overdue_coursework: Vec<ReportRow>,
    pub coursework_without_reviewer: Vec<CoordinatorGroup>,
    pub unknown_coordinators: Vec<String>,
    pub overdue_coursework_coordinators: Vec<String>,
    pub summary: BatchSummary,
}

/// Groups annotated records into the per-category reports.
pub struct ReportAssembler<'a> {
    coordinators: &'a BTreeMap<i64, String>,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(coordinators: &'a BTreeMap<i64, String>) -> Self {
        Self { coordinators }
    }

    pub fn assemble(&self, batch: &AnnotatedBatch<'_>) -> ReviewReport {
        let diploma_works = batch
            .in_category(Category::Diploma)
            .map(ReportRow::from)
            .collect();
        let overdue_homework = batch
            .in_category(Category::Homework)
            .filter(|item| item.annotation.is_overdue)
            .map(ReportRow::from)
            .collect();
        let coursework_works = batch
            .in_category(Category::Coursework)
            .map(ReportRow::from)
            .collect();
        let overdue_coursework = batch
            .in_category(Category::Coursework)
            .filter(|item| item.annotation.is_overdue)
            .map(ReportRow::from)
            .collect();

        let (coursework_without_reviewer, unknown_coordinators) = self.group_without_reviewer(batch);
        let overdue_coursework_coordinators = batch
            .in_category(Category::Coursework)
            .filter(|item| item.annotation.is_overdue)
            .map(|item| self.display_name(item.record.coordinator_id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        ReviewReport {
            diploma_works,
            overdue_homework,
            coursework_works,
            overdue_coursework,
            coursework_without_reviewer,
            unknown_coordinators,
            overdue_coursework_coordinators,
            summary: summarize(batch),
        }
    }

    fn display_name(&self, coordinator_id: Option<i64>) -> String {
        match coordinator_id {
            Some(id) => self
                .coordinators
                .get(&id)
                .cloned()
                .unwrap_or_else(|| id.to_string()),
            None => MISSING_COORDINATOR.to_string(),
        }
    }

    fn group_without_reviewer(
        &self,
        batch: &AnnotatedBatch<'_>,
    ) -> (Vec<CoordinatorGroup>, Vec<String>) {
        let mut groups: BTreeMap<String, Vec<ReportRow>> = BTreeMap::new();
        let mut unknown = BTreeSet::new();

        for item in batch
            .in_category(Category::Coursework)
            .filter(|item| item.annotation.needs_reviewer_flag)
        {
            let known = item
                .record
                .coordinator_id
                .and_then(|id| self.coordinators.get(&id));
            match known {
                Some(name) => groups
                    .entry(name.clone())
                    .or_default()
                    .push(ReportRow::from(item)),
                None => {
                    unknown.insert(self.display_name(item.record.coordinator_id));
                }
            }
        }

        if !unknown.is_empty() {
            warn!(count = unknown.len(), "coursework without reviewer has unknown coordinators");
        }

        let groups = groups
            .into_iter()
            .map(|(coordinator, works)| CoordinatorGroup { coordinator, works })
            .collect();
        (groups, unknown.into_iter().collect())
    }
}

fn summarize(batch: &AnnotatedBatch<'_>) -> BatchSummary {
    let mut summary = BatchSummary {
        total: batch.records.len(),
        ..BatchSummary::default()
    };
    for item in &batch.records {
        let annotation = &item.annotation;
        match annotation.category {
            Some(Category::Diploma) => summary.diploma += 1,
            Some(Category::Coursework) => summary.coursework += 1,
            Some(Category::Homework) => summary.homework += 1,
            None if annotation.issue.is_none() => summary.unclassified += 1,
            None => {}
        }
        if annotation.is_overdue {
            summary.overdue += 1;
        }
        if annotation.category.is_some() && annotation.needs_reviewer_flag {
            summary.needs_reviewer += 1;
        }
    }
    summary.skipped = batch
        .skipped
        .iter()
        .map(|skipped| SkippedRow {
            position: skipped.position,
            module: skipped.module.clone(),
            reason: skipped.error.to_string(),
        })
        .collect();
    summary
}

/// Listing of coursework without a reviewer, one block per coordinator.
pub fn render_no_reviewer_listing(groups: &[CoordinatorGroup]) -> String {
    if groups.is_empty() {
        return "No works without a reviewer\n".to_string();
    }
    let mut out = String::new();
    for group in groups {
        out.push_str(&format!("@{}\n", group.coordinator));
        for work in &group.works {
            out.push_str(&format!(
                " {}  {}  {}  {}  {}\n",
                work.module,
                work.task_title,
                work.admin_link,
                work.student_id,
                format_date(work.submitted_on)
            ));
        }
        out.push('\n');
    }
    out
}

/// One entry per line, or `empty_message` when there is nothing to list.
pub fn render_lines(lines: &[String], empty_message: &str) -> String {
    if lines.is_empty() {
        return format!("{empty_message}\n");
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn rows_to_dataframe(rows: &[ReportRow]) -> PolarsResult<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(10);

    let modules: Vec<&str> = rows.iter().map(|r| r.module.as_str()).collect();
    columns.push(Series::new(PlSmallStr::from_static("module"), modules).into_column());

    let titles: Vec<&str> = rows.iter().map(|r| r.task_title.as_str()).collect();
    columns.push(Series::new(PlSmallStr::from_static("task_title"), titles).into_column());

    let admin_links: Vec<&str> = rows.iter().map(|r| r.admin_link.as_str()).collect();
    columns.push(Series::new(PlSmallStr::from_static("admin_link"), admin_links).into_column());

    let expert_links: Vec<&str> = rows.iter().map(|r| r.expert_link.as_str()).collect();
    columns.push(Series::new(PlSmallStr::from_static("expert_link"), expert_links).into_column());

    let students: Vec<&str> = rows.iter().map(|r| r.student_id.as_str()).collect();
    columns.push(Series::new(PlSmallStr::from_static("student_id"), students).into_column());

    let submitted: Vec<Option<i32>> = rows
        .iter()
        .map(|r| r.submitted_on.map(date_to_i32))
        .collect();
    columns.push(
        Series::new(PlSmallStr::from_static("submitted_on"), submitted)
            .cast(&DataType::Date)?
            .into_column(),
    );

    let reviewers: Vec<Option<&str>> = rows.iter().map(|r| r.reviewer.as_deref()).collect();
    columns.push(Series::new(PlSmallStr::from_static("reviewer"), reviewers).into_column());

    let possible: Vec<Option<&str>> = rows
        .iter()
        .map(|r| r.possible_reviewers.as_deref())
        .collect();
    columns.push(
        Series::new(PlSmallStr::from_static("possible_reviewers"), possible).into_column(),
    );

    let days: Vec<i64> = rows.iter().map(|r| r.business_days_on_review).collect();
    columns.push(
        Series::new(PlSmallStr::from_static("business_days_on_review"), days).into_column(),
    );

    let overdue: Vec<bool> = rows.iter().map(|r| r.overdue).collect();
    columns.push(Series::new(PlSmallStr::from_static("overdue"), overdue).into_column());

    DataFrame::new(columns)
}

/// Boxed text table of a report frame.
pub fn render_dataframe(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect::<Vec<_>>();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_table_row(&mut out, &col_names, &widths);
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        push_table_row(&mut out, row, &widths);
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_table_row(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(width.saturating_sub(cell.chars().count())));
        out.push_str(" |");
    }
    out.push('\n');
}

fn cell_text(av: &AnyValue<'_>) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Boolean(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::Date(days) => format_date(date_from_i32(*days)),
        _ => av.to_string(),
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn date_to_i32(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn date_from_i32(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_conversion_matches_unix_epoch() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_i32(epoch), 0);
        let date = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap();
        assert_eq!(date_from_i32(date_to_i32(date)), Some(date));
    }

    #[test]
    fn empty_listing_prints_placeholder() {
        assert_eq!(render_no_reviewer_listing(&[]), "No works without a reviewer\n");
        assert_eq!(render_lines(&[], "Nothing"), "Nothing\n");
    }
}
