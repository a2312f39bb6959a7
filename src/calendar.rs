use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("working-day offset must not be negative (got {0})")]
    NegativeOffset(i64),
    #[error("{n} working days from {from} runs past the supported date range")]
    DateOutOfRange { from: NaiveDate, n: i64 },
}

pub type CalendarResult<T> = Result<T, CalendarError>;

/// Working-day calendar for review aging.
///
/// A date is a working day when it is a weekday that is not a holiday, or when
/// it is listed as an extra working day. Extra working days win over both the
/// weekend and an explicit holiday entry for the same date (staffed holidays).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessDayCalendar {
    holidays: HashSet<NaiveDate>,
    extra_working_days: HashSet<NaiveDate>,
}

/// Sorted, de-duplicated snapshot of the calendar exceptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    holidays: Vec<NaiveDate>,
    #[serde(default)]
    extra_working_days: Vec<NaiveDate>,
}

impl BusinessDayCalendar {
    const WEEKEND: [Weekday; 2] = [Weekday::Sat, Weekday::Sun];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn custom<I, J>(holidays: I, extra_working_days: J) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
        J: IntoIterator<Item = NaiveDate>,
    {
        Self {
            holidays: holidays.into_iter().collect(),
            extra_working_days: extra_working_days.into_iter().collect(),
        }
    }

    pub fn from_config(config: &CalendarConfig) -> Self {
        Self::custom(
            config.holidays.iter().copied(),
            config.extra_working_days.iter().copied(),
        )
    }

    pub fn to_config(&self) -> CalendarConfig {
        CalendarConfig::from(self)
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        self.holidays.extend(dates);
    }

    /// Returns true when the date was present.
    pub fn remove_holiday(&mut self, date: NaiveDate) -> bool {
        self.holidays.remove(&date)
    }

    pub fn add_extra_working_day(&mut self, date: NaiveDate) {
        self.extra_working_days.insert(date);
    }

    pub fn add_extra_working_days(&mut self, dates: &[NaiveDate]) {
        self.extra_working_days.extend(dates);
    }

    /// Returns true when the date was present.
    pub fn remove_extra_working_day(&mut self, date: NaiveDate) -> bool {
        self.extra_working_days.remove(&date)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_extra_working_day(&self, date: NaiveDate) -> bool {
        self.extra_working_days.contains(&date)
    }

    pub fn is_weekend(date: NaiveDate) -> bool {
        Self::WEEKEND.contains(&date.weekday())
    }

    /// Check if reviewers are expected to be working on a date
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        (!Self::is_weekend(date) && !self.is_holiday(date)) || self.is_extra_working_day(date)
    }

    /// Count working days strictly between `start` and `end`.
    ///
    /// Neither endpoint is counted. An empty or reversed range yields 0.
    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        let mut count = 0;
        let mut current = start.succ_opt();

        while let Some(day) = current.filter(|day| *day < end) {
            if self.is_working_day(day) {
                count += 1;
            }
            current = day.succ_opt();
        }
        count
    }

    /// Count working days from `start` through `end`, both included.
    pub fn count_working_days_inclusive(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CalendarResult<i64> {
        if start > end {
            return Err(CalendarError::InvalidDateRange { start, end });
        }
        Ok(self.working_days_in_range(start, end).len() as i64)
    }

    /// Date of the nth working day counting backwards from the day before `end`.
    ///
    /// `n == 0` returns `end` unchanged.
    pub fn find_date_n_working_days_before(&self, end: NaiveDate, n: i64) -> CalendarResult<NaiveDate> {
        self.find_date_n_working_days_before_verbose(end, n)
            .map(|(date, _)| date)
    }

    /// Same walk as [`Self::find_date_n_working_days_before`], also returning
    /// the working days it counted (nearest first).
    pub fn find_date_n_working_days_before_verbose(
        &self,
        end: NaiveDate,
        n: i64,
    ) -> CalendarResult<(NaiveDate, Vec<NaiveDate>)> {
        if n < 0 {
            return Err(CalendarError::NegativeOffset(n));
        }
        if n == 0 {
            return Ok((end, Vec::new()));
        }
        // Never more working days than calendar days left before MIN.
        if n > (end - NaiveDate::MIN).num_days() {
            return Err(CalendarError::DateOutOfRange { from: end, n });
        }

        let mut visited = Vec::new();
        let mut current = end.pred_opt();
        while let Some(day) = current {
            if self.is_working_day(day) {
                visited.push(day);
                if visited.len() as i64 == n {
                    return Ok((day, visited));
                }
            }
            current = day.pred_opt();
        }
        Err(CalendarError::DateOutOfRange { from: end, n })
    }

    /// Date of the nth working day counting forwards from the day after `start`.
    ///
    /// `n == 0` returns `start` unchanged.
    pub fn find_date_n_working_days_after(&self, start: NaiveDate, n: i64) -> CalendarResult<NaiveDate> {
        if n < 0 {
            return Err(CalendarError::NegativeOffset(n));
        }
        if n == 0 {
            return Ok(start);
        }
        if n > (NaiveDate::MAX - start).num_days() {
            return Err(CalendarError::DateOutOfRange { from: start, n });
        }

        let mut found = 0;
        let mut current = start.succ_opt();
        while let Some(day) = current {
            if self.is_working_day(day) {
                found += 1;
                if found == n {
                    return Ok(day);
                }
            }
            current = day.succ_opt();
        }
        Err(CalendarError::DateOutOfRange { from: start, n })
    }

    /// Find the next working day after a given date
    pub fn next_working_day(&self, from: NaiveDate) -> CalendarResult<NaiveDate> {
        self.find_date_n_working_days_after(from, 1)
    }

    /// Find the previous working day before a given date
    pub fn previous_working_day(&self, from: NaiveDate) -> CalendarResult<NaiveDate> {
        self.find_date_n_working_days_before(from, 1)
    }

    /// Get all working days in a date range (inclusive)
    pub fn working_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = Some(start);

        while let Some(day) = current.filter(|day| *day <= end) {
            if self.is_working_day(day) {
                days.push(day);
            }
            current = day.succ_opt();
        }
        days
    }

    /// Number of registered (holidays, extra working days).
    pub fn exception_counts(&self) -> (usize, usize) {
        (self.holidays.len(), self.extra_working_days.len())
    }
}

impl CalendarConfig {
    pub fn new<I, J>(holidays: I, extra_working_days: J) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
        J: IntoIterator<Item = NaiveDate>,
    {
        Self {
            holidays: sorted_unique(holidays),
            extra_working_days: sorted_unique(extra_working_days),
        }
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }

    pub fn extra_working_days(&self) -> &[NaiveDate] {
        &self.extra_working_days
    }
}

impl From<&BusinessDayCalendar> for CalendarConfig {
    fn from(calendar: &BusinessDayCalendar) -> Self {
        Self::new(
            calendar.holidays.iter().copied(),
            calendar.extra_working_days.iter().copied(),
        )
    }
}

fn sorted_unique<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
    dates.sort();
    dates.dedup();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn verbose_walk_lists_counted_days_nearest_first() {
        let cal = BusinessDayCalendar::new();
        // Wed 2026-01-14, two working days back -> Mon 12th, Tue 13th
        let (date, visited) = cal
            .find_date_n_working_days_before_verbose(d(2026, 1, 14), 2)
            .unwrap();
        assert_eq!(date, d(2026, 1, 12));
        assert_eq!(visited, vec![d(2026, 1, 13), d(2026, 1, 12)]);
    }

    #[test]
    fn sorted_unique_dedups() {
        let dates = sorted_unique([d(2026, 1, 2), d(2026, 1, 1), d(2026, 1, 2)]);
        assert_eq!(dates, vec![d(2026, 1, 1), d(2026, 1, 2)]);
    }
}
