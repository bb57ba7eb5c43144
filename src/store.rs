// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Durable side of the recurring engine. Loads templates and transactions as
//! plain records and persists materialized drafts, deduping on the
//! `(recurring_id, date)` key so replayed passes are no-ops.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::models::{
    Cadence, Direction, MonthSettings, RecurringTemplate, Schedule, Transaction, TransactionDraft,
};

pub fn direction_from_db(s: &str) -> Result<Direction> {
    match s {
        "income" => Ok(Direction::Income),
        "expense" => Ok(Direction::Expense),
        other => Err(anyhow::anyhow!("Unknown direction '{}' in store", other)),
    }
}

fn parse_stored_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid stored date '{}'", s))
}

fn parse_stored_amount(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid stored amount '{}'", s))
}

pub fn load_templates(conn: &Connection) -> Result<Vec<RecurringTemplate>> {
    let mut stmt = conn.prepare(
        "SELECT id, direction, amount, category_id, description, account_id,
                cadence, anchor, until, day_of_month, step_days, active
         FROM recurring_templates ORDER BY id",
    )?;
    let mut rows = stmt.query([])?;
    let mut templates = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let direction: String = r.get(1)?;
        let amount: String = r.get(2)?;
        let category_id: Option<i64> = r.get(3)?;
        let description: String = r.get(4)?;
        let account_id: Option<i64> = r.get(5)?;
        let cadence: String = r.get(6)?;
        let anchor: String = r.get(7)?;
        let until: Option<String> = r.get(8)?;
        let day_of_month: Option<i64> = r.get(9)?;
        let step_days: Option<i64> = r.get(10)?;
        let active: bool = r.get(11)?;

        let cadence = match cadence.as_str() {
            "weekly" => Cadence::Weekly,
            "biweekly" => Cadence::Biweekly,
            "monthly" => Cadence::Monthly {
                day_of_month: day_of_month
                    .with_context(|| format!("Template {} is monthly without a day", id))?
                    as u32,
            },
            "custom" => Cadence::Custom {
                step_days: step_days
                    .with_context(|| format!("Template {} is custom without a step", id))?
                    as u32,
            },
            other => {
                return Err(anyhow::anyhow!(
                    "Unknown cadence '{}' for template {}",
                    other,
                    id
                ));
            }
        };
        templates.push(RecurringTemplate {
            id,
            direction: direction_from_db(&direction)?,
            amount: parse_stored_amount(&amount)?,
            category_id,
            description,
            account_id,
            schedule: Schedule {
                cadence,
                anchor: parse_stored_date(&anchor)?,
                until: until.as_deref().map(parse_stored_date).transpose()?,
            },
            active,
        });
    }
    Ok(templates)
}

pub fn load_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    query_transactions(conn, "ORDER BY date, id", &[])
}

pub fn load_transactions_in(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Transaction>> {
    query_transactions(
        conn,
        "WHERE date >= ?1 AND date <= ?2 ORDER BY date, id",
        &[&start.to_string(), &end.to_string()],
    )
}

fn query_transactions(
    conn: &Connection,
    tail: &str,
    params_vec: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Transaction>> {
    let sql = format!(
        "SELECT id, date, direction, amount, category_id, description, account_id,
                verified, recurring_id
         FROM transactions {}",
        tail
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut transactions = Vec::new();
    while let Some(r) = rows.next()? {
        let date: String = r.get(1)?;
        let direction: String = r.get(2)?;
        let amount: String = r.get(3)?;
        transactions.push(Transaction {
            id: r.get(0)?,
            date: parse_stored_date(&date)?,
            direction: direction_from_db(&direction)?,
            amount: parse_stored_amount(&amount)?,
            category_id: r.get(4)?,
            description: r.get(5)?,
            account_id: r.get(6)?,
            verified: r.get(7)?,
            forecasted: false,
            recurring_id: r.get(8)?,
        });
    }
    Ok(transactions)
}

/// Persists materialized drafts. A draft whose `(recurring_id, date)` key is
/// already present is silently skipped, so a racing or replayed pass cannot
/// create a second row for the same occurrence. Returns how many rows were
/// actually inserted.
pub fn insert_transactions(conn: &Connection, drafts: &[TransactionDraft]) -> Result<usize> {
    let mut inserted = 0usize;
    for draft in drafts {
        inserted += conn.execute(
            "INSERT INTO transactions(date, direction, amount, category_id, description,
                                      account_id, verified, recurring_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)
             ON CONFLICT(recurring_id, date) DO NOTHING",
            params![
                draft.date.to_string(),
                draft.direction.as_str(),
                draft.amount.to_string(),
                draft.category_id,
                draft.description,
                draft.account_id,
                draft.recurring_id
            ],
        )?;
    }
    Ok(inserted)
}

pub fn month_settings(conn: &Connection, month: &str) -> Result<MonthSettings> {
    let row: Option<(String, bool)> = conn
        .query_row(
            "SELECT opening_balance, closed FROM month_settings WHERE month=?1",
            params![month],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    let (opening_balance, closed) = match row {
        Some((balance, closed)) => (parse_stored_amount(&balance)?, closed),
        None => (Decimal::ZERO, false),
    };
    Ok(MonthSettings {
        month: month.to_string(),
        opening_balance,
        closed,
    })
}

pub fn set_opening_balance(conn: &Connection, month: &str, amount: Decimal) -> Result<()> {
    conn.execute(
        "INSERT INTO month_settings(month, opening_balance) VALUES(?1, ?2)
         ON CONFLICT(month) DO UPDATE SET opening_balance=excluded.opening_balance",
        params![month, amount.to_string()],
    )?;
    Ok(())
}

pub fn set_month_closed(conn: &Connection, month: &str, closed: bool) -> Result<()> {
    conn.execute(
        "INSERT INTO month_settings(month, closed) VALUES(?1, ?2)
         ON CONFLICT(month) DO UPDATE SET closed=excluded.closed",
        params![month, closed],
    )?;
    Ok(())
}

pub fn category_names(conn: &Connection) -> Result<HashMap<i64, String>> {
    let mut stmt = conn.prepare("SELECT id, name FROM categories")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;
    let mut names = HashMap::new();
    for row in rows {
        let (id, name) = row?;
        names.insert(id, name);
    }
    Ok(names)
}

pub fn account_names(conn: &Connection) -> Result<HashMap<i64, String>> {
    let mut stmt = conn.prepare("SELECT id, name FROM accounts")?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;
    let mut names = HashMap::new();
    for row in rows {
        let (id, name) = row?;
        names.insert(id, name);
    }
    Ok(names)
}
