use crate::calendar::BusinessDayCalendar;
use crate::classifier::{Category, ModuleSet, SubmissionClassifier, base_module};
use crate::submission::{RecordError, Submission};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgingError {
    #[error("no review deadline configured for category '{0}'")]
    UnconfiguredCategory(Category),
}

/// Business days since submission; `today` and the submission day are not counted.
///
/// A missing submission date is not measurable yet and ages as 0.
pub fn elapsed_business_days(
    submitted_on: Option<NaiveDate>,
    today: NaiveDate,
    calendar: &BusinessDayCalendar,
) -> i64 {
    submitted_on
        .map(|date| calendar.count_working_days(date, today))
        .unwrap_or(0)
}

/// `strict` compares with `>`, otherwise `>=`.
pub fn is_overdue(
    category: Category,
    elapsed_days: i64,
    deadlines: &BTreeMap<Category, i64>,
    strict: bool,
) -> Result<bool, AgingError> {
    let threshold = deadlines
        .get(&category)
        .copied()
        .ok_or(AgingError::UnconfiguredCategory(category))?;
    Ok(if strict {
        elapsed_days > threshold
    } else {
        elapsed_days >= threshold
    })
}

/// True when nobody is assigned and the base module is not a self-assignment one.
pub fn needs_reviewer_flag(record: &Submission, self_assignment_modules: &ModuleSet) -> bool {
    !record.has_reviewer() && !self_assignment_modules.contains(base_module(&record.module))
}

/// Review deadline in business days per category, with per-category strictness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlinePolicy {
    deadlines: BTreeMap<Category, i64>,
    #[serde(default)]
    strict: BTreeMap<Category, bool>,
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        Self::new(BTreeMap::from([
            (Category::Diploma, 7),
            (Category::Coursework, 5),
            (Category::Homework, 2),
        ]))
    }
}

impl DeadlinePolicy {
    pub fn new(deadlines: BTreeMap<Category, i64>) -> Self {
        Self {
            deadlines,
            strict: BTreeMap::new(),
        }
    }

    pub fn with_strict(mut self, category: Category, strict: bool) -> Self {
        self.strict.insert(category, strict);
        self
    }

    pub fn with_strictness(mut self, strict: BTreeMap<Category, bool>) -> Self {
        self.strict = strict;
        self
    }

    pub fn deadline(&self, category: Category) -> Option<i64> {
        self.deadlines.get(&category).copied()
    }

    pub fn is_strict(&self, category: Category) -> bool {
        self.strict.get(&category).copied().unwrap_or(false)
    }

    pub fn deadlines(&self) -> &BTreeMap<Category, i64> {
        &self.deadlines
    }

    /// Every category must carry a threshold before any record is evaluated.
    pub fn validate(&self) -> Result<(), AgingError> {
        match Category::ALL
            .into_iter()
            .find(|category| !self.deadlines.contains_key(category))
        {
            Some(missing) => Err(AgingError::UnconfiguredCategory(missing)),
            None => Ok(()),
        }
    }

    pub fn is_overdue(&self, category: Category, elapsed_days: i64) -> Result<bool, AgingError> {
        is_overdue(
            category,
            elapsed_days,
            &self.deadlines,
            self.is_strict(category),
        )
    }
}

/// Per-record result handed to the report assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub category: Option<Category>,
    pub base_module: String,
    pub submitted_on: Option<NaiveDate>,
    pub elapsed_business_days: i64,
    pub is_overdue: bool,
    pub needs_reviewer_flag: bool,
    /// Soft failure that made the record unmeasurable.
    pub issue: Option<RecordError>,
}

#[derive(Debug, Clone)]
pub struct AnnotatedSubmission<'r> {
    pub record: &'r Submission,
    pub annotation: Annotation,
}

/// Record that could not be measured, with its 1-based position in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub position: usize,
    pub module: String,
    pub error: RecordError,
}

#[derive(Debug, Clone, Default)]
pub struct AnnotatedBatch<'r> {
    pub records: Vec<AnnotatedSubmission<'r>>,
    pub skipped: Vec<SkippedRecord>,
}

impl<'r> AnnotatedBatch<'r> {
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &AnnotatedSubmission<'r>> {
        self.records
            .iter()
            .filter(move |item| item.annotation.category == Some(category))
    }
}

/// Ages submissions against one calendar, classifier and policy for a fixed `today`.
pub struct ReviewAgingEngine<'a> {
    calendar: &'a BusinessDayCalendar,
    classifier: &'a SubmissionClassifier,
    policy: &'a DeadlinePolicy,
    today: NaiveDate,
}

impl<'a> ReviewAgingEngine<'a> {
    pub fn new(
        calendar: &'a BusinessDayCalendar,
        classifier: &'a SubmissionClassifier,
        policy: &'a DeadlinePolicy,
        today: NaiveDate,
    ) -> Result<Self, AgingError> {
        policy.validate()?;
        Ok(Self {
            calendar,
            classifier,
            policy,
            today,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn annotate(&self, record: &Submission) -> Result<Annotation, AgingError> {
        let base = base_module(&record.module).to_string();
        let needs_reviewer = needs_reviewer_flag(record, self.classifier.self_assignment_modules());

        let submitted_on = match record.submission_date() {
            Ok(date) => date,
            Err(issue) => {
                return Ok(Annotation {
                    category: None,
                    base_module: base,
                    submitted_on: None,
                    elapsed_business_days: 0,
                    is_overdue: false,
                    needs_reviewer_flag: needs_reviewer,
                    issue: Some(issue),
                });
            }
        };

        let category = self.classifier.classify(record);
        let elapsed = elapsed_business_days(submitted_on, self.today, self.calendar);
        let overdue = match category {
            Some(category) => self.policy.is_overdue(category, elapsed)?,
            None => false,
        };

        Ok(Annotation {
            category,
            base_module: base,
            submitted_on,
            elapsed_business_days: elapsed,
            is_overdue: overdue,
            needs_reviewer_flag: needs_reviewer,
            issue: None,
        })
    }

    /// Annotate a whole batch. Unmeasurable rows are collected in `skipped`
    /// and the rest of the batch carries on.
    pub fn annotate_batch<'r>(
        &self,
        records: &'r [Submission],
    ) -> Result<AnnotatedBatch<'r>, AgingError> {
        let mut batch = AnnotatedBatch {
            records: Vec::with_capacity(records.len()),
            skipped: Vec::new(),
        };

        for (idx, record) in records.iter().enumerate() {
            let annotation = self.annotate(record)?;
            if let Some(error) = annotation.issue.clone() {
                warn!(position = idx + 1, module = %record.module, %error, "skipping record");
                batch.skipped.push(SkippedRecord {
                    position: idx + 1,
                    module: record.module.clone(),
                    error,
                });
            }
            batch.records.push(AnnotatedSubmission { record, annotation });
        }

        debug!(
            total = records.len(),
            skipped = batch.skipped.len(),
            today = %self.today,
            "annotated batch"
        );
        Ok(batch)
    }
}
