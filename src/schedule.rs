// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;

use crate::models::{Cadence, Schedule};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("day of month must be between 1 and 31, got {0}")]
    DayOfMonthOutOfRange(u32),
    #[error("custom cadence must step at least one day")]
    StepBelowOneDay,
    #[error("schedule end {until} precedes its anchor {anchor}")]
    EndsBeforeAnchor { anchor: NaiveDate, until: NaiveDate },
}

/// Rejects malformed schedules up front; callers must refuse template
/// creation or edit on error instead of clamping the bad value.
pub fn validate(schedule: &Schedule) -> Result<(), ScheduleError> {
    match schedule.cadence {
        Cadence::Monthly { day_of_month } if !(1..=31).contains(&day_of_month) => {
            return Err(ScheduleError::DayOfMonthOutOfRange(day_of_month));
        }
        Cadence::Custom { step_days } if step_days < 1 => {
            return Err(ScheduleError::StepBelowOneDay);
        }
        _ => {}
    }
    if let Some(until) = schedule.until {
        if until < schedule.anchor {
            return Err(ScheduleError::EndsBeforeAnchor {
                anchor: schedule.anchor,
                until,
            });
        }
    }
    Ok(())
}

/// The schedule clock: the single next occurrence strictly after `date`.
pub fn next_occurrence(date: NaiveDate, schedule: &Schedule) -> Result<NaiveDate, ScheduleError> {
    match schedule.cadence {
        Cadence::Weekly => Ok(date + Duration::days(7)),
        Cadence::Biweekly => Ok(date + Duration::days(14)),
        Cadence::Monthly { day_of_month } => {
            if !(1..=31).contains(&day_of_month) {
                return Err(ScheduleError::DayOfMonthOutOfRange(day_of_month));
            }
            let (year, month) = if date.month() == 12 {
                (date.year() + 1, 1)
            } else {
                (date.year(), date.month() + 1)
            };
            // Clamp against the destination month, never roll into the next one.
            let day = day_of_month.min(days_in_month(year, month));
            Ok(NaiveDate::from_ymd_opt(year, month, day).unwrap_or(date))
        }
        Cadence::Custom { step_days } => {
            if step_days < 1 {
                return Err(ScheduleError::StepBelowOneDay);
            }
            Ok(date + Duration::days(i64::from(step_days)))
        }
    }
}

/// Every occurrence falling inside the closed interval
/// `[window_start, window_end]`, in order. Stateless and finite.
pub fn occurrences_in(
    schedule: &Schedule,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<Vec<NaiveDate>, ScheduleError> {
    validate(schedule)?;

    let mut occurrences = Vec::new();
    if schedule.anchor > window_end {
        return Ok(occurrences);
    }
    if let Some(until) = schedule.until {
        if until < window_start {
            return Ok(occurrences);
        }
    }

    // Skip forward with the same stepping used for generation: the monthly
    // clamp is path-dependent on the anchor, so a closed-form jump would land
    // on the wrong day.
    let mut date = schedule.anchor;
    while date < window_start {
        date = next_occurrence(date, schedule)?;
    }

    let cutoff = match schedule.until {
        Some(until) => until.min(window_end),
        None => window_end,
    };
    while date <= cutoff {
        occurrences.push(date);
        date = next_occurrence(date, schedule)?;
    }
    Ok(occurrences)
}

/// First occurrence on or after `date`, or None once the schedule has ended.
pub fn next_on_or_after(
    schedule: &Schedule,
    date: NaiveDate,
) -> Result<Option<NaiveDate>, ScheduleError> {
    validate(schedule)?;
    let mut candidate = schedule.anchor;
    while candidate < date {
        candidate = next_occurrence(candidate, schedule)?;
    }
    if let Some(until) = schedule.until {
        if candidate > until {
            return Ok(None);
        }
    }
    Ok(Some(candidate))
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 28).unwrap_or_default());
    (first_of_next - Duration::days(1)).day()
}
