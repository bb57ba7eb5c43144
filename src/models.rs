// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Income => "income",
            Direction::Expense => "expense",
        }
    }
}

/// The four schedule shapes. Monthly keeps its own target day so the clamp in
/// short months never loses the intended day (anchored on the 31st, February
/// pays on the 28th/29th and March returns to the 31st).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Weekly,
    Biweekly,
    Monthly { day_of_month: u32 },
    Custom { step_days: u32 },
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Weekly => "weekly",
            Cadence::Biweekly => "biweekly",
            Cadence::Monthly { .. } => "monthly",
            Cadence::Custom { .. } => "custom",
        }
    }

    pub fn label(&self) -> String {
        match self {
            Cadence::Weekly => "Weekly".into(),
            Cadence::Biweekly => "Every 2 weeks".into(),
            Cadence::Monthly { day_of_month } => format!("Monthly on day {}", day_of_month),
            Cadence::Custom { step_days } => format!("Every {} days", step_days),
        }
    }
}

/// `anchor` is the first possible occurrence; nothing is generated before it,
/// and nothing strictly after `until` when one is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub cadence: Cadence,
    pub anchor: NaiveDate,
    pub until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringTemplate {
    pub id: i64,
    pub direction: Direction,
    pub amount: Decimal,
    pub category_id: Option<i64>,
    pub description: String,
    pub account_id: Option<i64>,
    pub schedule: Schedule,
    pub active: bool,
}

/// A ledger entry. Real rows live in the store with a rowid identity;
/// forecast rows are recomputed per view with a derived identity and are
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub direction: Direction,
    pub amount: Decimal,
    pub category_id: Option<i64>,
    pub description: String,
    pub account_id: Option<i64>,
    pub date: NaiveDate,
    pub verified: bool,
    pub forecasted: bool,
    pub recurring_id: Option<i64>,
}

/// A materialized occurrence waiting for the store to assign its identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub direction: Direction,
    pub amount: Decimal,
    pub category_id: Option<i64>,
    pub description: String,
    pub account_id: Option<i64>,
    pub date: NaiveDate,
    pub recurring_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthSettings {
    pub month: String, // YYYY-MM
    pub opening_balance: Decimal,
    pub closed: bool,
}
