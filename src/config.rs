//! Review configuration: calendar exceptions, module lists, deadlines and the
//! coordinator directory.
//!
//! A `ReviewConfig` is loaded once per run and treated as an immutable snapshot
//! while records are processed. The edit methods exist for the `config`
//! subcommands, which rewrite the file between runs.

use crate::aging::DeadlinePolicy;
use crate::calendar::{BusinessDayCalendar, CalendarConfig};
use crate::classifier::{Category, ModuleSet, SubmissionClassifier};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("deadline for '{category}' must not be negative (got {days})")]
    NegativeDeadline { category: Category, days: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub holidays: Vec<NaiveDate>,
    pub extra_working_days: Vec<NaiveDate>,
    pub diploma_modules: Vec<String>,
    pub self_assignment_modules: Vec<String>,
    pub deadlines: BTreeMap<Category, i64>,
    pub strict_deadlines: BTreeMap<Category, bool>,
    pub coordinators: BTreeMap<i64, String>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            holidays: Vec::new(),
            extra_working_days: Vec::new(),
            diploma_modules: Vec::new(),
            self_assignment_modules: Vec::new(),
            deadlines: DeadlinePolicy::default().deadlines().clone(),
            strict_deadlines: BTreeMap::new(),
            coordinators: BTreeMap::new(),
        }
    }
}

impl ReviewConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (&category, &days) in &self.deadlines {
            if days < 0 {
                return Err(ConfigError::NegativeDeadline { category, days });
            }
        }
        Ok(())
    }

    pub fn calendar_config(&self) -> CalendarConfig {
        CalendarConfig::new(
            self.holidays.iter().copied(),
            self.extra_working_days.iter().copied(),
        )
    }

    pub fn build_calendar(&self) -> BusinessDayCalendar {
        BusinessDayCalendar::from_config(&self.calendar_config())
    }

    pub fn build_classifier(&self) -> SubmissionClassifier {
        SubmissionClassifier::new(
            ModuleSet::new(&self.diploma_modules),
            ModuleSet::new(&self.self_assignment_modules),
        )
    }

    pub fn deadline_policy(&self) -> DeadlinePolicy {
        DeadlinePolicy::new(self.deadlines.clone()).with_strictness(self.strict_deadlines.clone())
    }

    pub fn coordinator_name(&self, id: i64) -> Option<&str> {
        self.coordinators.get(&id).map(String::as_str)
    }

    pub fn add_holiday(&mut self, date: NaiveDate) -> bool {
        insert_sorted(&mut self.holidays, date)
    }

    pub fn remove_holiday(&mut self, date: NaiveDate) -> bool {
        remove_value(&mut self.holidays, &date)
    }

    pub fn add_extra_working_day(&mut self, date: NaiveDate) -> bool {
        insert_sorted(&mut self.extra_working_days, date)
    }

    pub fn remove_extra_working_day(&mut self, date: NaiveDate) -> bool {
        remove_value(&mut self.extra_working_days, &date)
    }

    pub fn add_diploma_module(&mut self, module: &str) -> bool {
        add_module(&mut self.diploma_modules, module)
    }

    pub fn remove_diploma_module(&mut self, module: &str) -> bool {
        remove_module(&mut self.diploma_modules, module)
    }

    pub fn add_self_assignment_module(&mut self, module: &str) -> bool {
        add_module(&mut self.self_assignment_modules, module)
    }

    pub fn remove_self_assignment_module(&mut self, module: &str) -> bool {
        remove_module(&mut self.self_assignment_modules, module)
    }

    /// Returns the previous name when the id was already registered.
    pub fn set_coordinator(&mut self, id: i64, name: impl Into<String>) -> Option<String> {
        self.coordinators.insert(id, name.into())
    }

    pub fn remove_coordinator(&mut self, id: i64) -> Option<String> {
        self.coordinators.remove(&id)
    }
}

// Hand-edited files may list dates in any order.
fn insert_sorted(dates: &mut Vec<NaiveDate>, date: NaiveDate) -> bool {
    if dates.contains(&date) {
        return false;
    }
    dates.push(date);
    dates.sort();
    true
}

fn remove_value<T: PartialEq>(values: &mut Vec<T>, value: &T) -> bool {
    let before = values.len();
    values.retain(|v| v != value);
    values.len() != before
}

fn same_module(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn add_module(modules: &mut Vec<String>, module: &str) -> bool {
    let module = module.trim();
    if module.is_empty() || modules.iter().any(|m| same_module(m, module)) {
        return false;
    }
    modules.push(module.to_string());
    true
}

fn remove_module(modules: &mut Vec<String>, module: &str) -> bool {
    let before = modules.len();
    modules.retain(|m| !same_module(m, module));
    modules.len() != before
}
