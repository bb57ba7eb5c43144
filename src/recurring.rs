// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The recurring-transaction engine: forecast, materialize, merge.
//!
//! All three stages are pure functions over immutable snapshots. Only the
//! materializer's output crosses a mutation boundary, and that is owned by
//! the store (`store::insert_transactions`), which dedupes on the
//! `(recurring_id, date)` key. Re-running any stage is always safe.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{RecurringTemplate, Transaction, TransactionDraft};
use crate::schedule::{self, ScheduleError};

/// A real occurrence is identified by its template and its calendar date.
pub type OccurrenceKey = (i64, NaiveDate);

/// Forecast rows never touch the store, so their identity is derived from
/// the occurrence key instead of a rowid: regeneration of the same window
/// always yields the same ids. Negative keeps the space disjoint from
/// sqlite's positive rowids.
pub fn forecast_id(recurring_id: i64, date: NaiveDate) -> i64 {
    -(recurring_id * 1_000_000 + i64::from(date.num_days_from_ce()))
}

/// Keys of the real (non-forecast) rows that descend from a template.
/// User-edited rows keep their parent reference and date, so they still
/// count as covered.
pub fn occurrence_keys(transactions: &[Transaction]) -> HashSet<OccurrenceKey> {
    transactions
        .iter()
        .filter(|t| !t.forecasted)
        .filter_map(|t| t.recurring_id.map(|id| (id, t.date)))
        .collect()
}

/// Provisional rows for every occurrence of every active template inside the
/// closed window. Dates on or before `today` are still emitted, flagged
/// not-future; deciding whether a real counterpart already covers them is the
/// merger's job, not the forecaster's.
pub fn forecast(
    templates: &[RecurringTemplate],
    today: NaiveDate,
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Result<Vec<Transaction>, ScheduleError> {
    let mut out = Vec::new();
    for template in templates.iter().filter(|t| t.active) {
        for date in schedule::occurrences_in(&template.schedule, window_start, window_end)? {
            out.push(Transaction {
                id: forecast_id(template.id, date),
                direction: template.direction,
                amount: template.amount,
                category_id: template.category_id,
                description: template.description.clone(),
                account_id: template.account_id,
                date,
                verified: false,
                forecasted: date > today,
                recurring_id: Some(template.id),
            });
        }
    }
    Ok(out)
}

/// Drafts for every due occurrence (`anchor..=today`, never a future date)
/// that has no real row yet. One pass catches up on everything missed since
/// the last run, however long the app was closed.
pub fn materialize(
    templates: &[RecurringTemplate],
    today: NaiveDate,
    existing: &[Transaction],
) -> Result<Vec<TransactionDraft>, ScheduleError> {
    let covered = occurrence_keys(existing);
    let mut drafts = Vec::new();
    for template in templates.iter().filter(|t| t.active) {
        for date in schedule::occurrences_in(&template.schedule, template.schedule.anchor, today)? {
            if covered.contains(&(template.id, date)) {
                continue;
            }
            drafts.push(TransactionDraft {
                direction: template.direction,
                amount: template.amount,
                category_id: template.category_id,
                description: template.description.clone(),
                account_id: template.account_id,
                date,
                recurring_id: template.id,
            });
        }
    }
    Ok(drafts)
}

/// Real rows win: any forecast whose occurrence key is already covered by a
/// real row is dropped. Ordering is left to the caller, which sorts by date
/// at display time.
pub fn merge(real: Vec<Transaction>, forecasts: Vec<Transaction>) -> Vec<Transaction> {
    let covered = occurrence_keys(&real);
    let mut merged = real;
    merged.extend(forecasts.into_iter().filter(|f| match f.recurring_id {
        Some(id) => !covered.contains(&(id, f.date)),
        None => true,
    }));
    merged
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CloseReadiness {
    pub total: usize,
    pub unverified: usize,
}

impl CloseReadiness {
    pub fn can_close(&self) -> bool {
        self.total > 0 && self.unverified == 0
    }
}

/// A month may close once it has at least one entry and every real
/// (non-forecast) entry is verified. Forecasts never block a close.
pub fn close_readiness(transactions: &[Transaction]) -> CloseReadiness {
    let mut readiness = CloseReadiness::default();
    for t in transactions {
        readiness.total += 1;
        if !t.forecasted && !t.verified {
            readiness.unverified += 1;
        }
    }
    readiness
}
