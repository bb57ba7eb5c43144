// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Direction;
use crate::recurring::{self, CloseReadiness};
use crate::store;
use crate::utils::{maybe_print_json, month_bounds, parse_date, parse_month, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("view", sub)) => view(conn, sub)?,
        Some(("status", sub)) => status(conn, sub)?,
        Some(("close", sub)) => close(conn, sub)?,
        Some(("reopen", sub)) => reopen(conn, sub)?,
        Some(("set-opening", sub)) => set_opening(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct MonthRow {
    pub id: i64,
    pub date: String,
    pub direction: String,
    pub description: String,
    pub category: String,
    pub account: String,
    pub amount: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct MonthSnapshot {
    pub month: String,
    pub opening_balance: Decimal,
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    pub projected_balance: Decimal,
    pub closed: bool,
    pub readiness: CloseReadiness,
    pub rows: Vec<MonthRow>,
}

/// Runs the full engine pass for one month: materialize due occurrences into
/// the store (deduped), re-read the durable rows, forecast the window, merge,
/// and summarize. Forecast amounts are part of the projections, so income and
/// expenses here are forward-looking for the current month.
pub fn month_snapshot(conn: &Connection, month: &str, today: NaiveDate) -> Result<MonthSnapshot> {
    let (start, end) = month_bounds(month)?;
    let templates = store::load_templates(conn)?;

    let existing = store::load_transactions(conn)?;
    let drafts = recurring::materialize(&templates, today, &existing)?;
    if !drafts.is_empty() {
        store::insert_transactions(conn, &drafts)?;
    }

    // Re-read after persisting so the merged view reflects the durable rows.
    let real = store::load_transactions_in(conn, start, end)?;
    let forecasts = recurring::forecast(&templates, today, start, end)?;
    let mut merged = recurring::merge(real, forecasts);
    merged.sort_by_key(|t| (t.date, t.id));

    let mut income = Decimal::ZERO;
    let mut expenses = Decimal::ZERO;
    for t in &merged {
        match t.direction {
            Direction::Income => income += t.amount,
            Direction::Expense => expenses += t.amount,
        }
    }
    let net = income - expenses;
    let readiness = recurring::close_readiness(&merged);
    let settings = store::month_settings(conn, month)?;

    let categories = store::category_names(conn)?;
    let accounts = store::account_names(conn)?;
    let rows = merged
        .iter()
        .map(|t| MonthRow {
            id: t.id,
            date: t.date.to_string(),
            direction: t.direction.as_str().into(),
            description: t.description.clone(),
            category: t
                .category_id
                .and_then(|id| categories.get(&id).cloned())
                .unwrap_or_default(),
            account: t
                .account_id
                .and_then(|id| accounts.get(&id).cloned())
                .unwrap_or_default(),
            amount: t.amount.to_string(),
            status: if t.forecasted {
                "forecast".into()
            } else if t.verified {
                "verified".into()
            } else {
                "pending".into()
            },
        })
        .collect();

    Ok(MonthSnapshot {
        month: month.to_string(),
        opening_balance: settings.opening_balance,
        income,
        expenses,
        net,
        projected_balance: settings.opening_balance + net,
        closed: settings.closed,
        readiness,
        rows,
    })
}

fn as_of(sub: &clap::ArgMatches) -> Result<NaiveDate> {
    match sub.get_one::<String>("as-of") {
        Some(s) => parse_date(s),
        None => Ok(Local::now().date_naive()),
    }
}

fn view(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let snapshot = month_snapshot(conn, &month, as_of(sub)?)?;

    if maybe_print_json(json_flag, jsonl_flag, &snapshot)? {
        return Ok(());
    }

    let rows: Vec<Vec<String>> = snapshot
        .rows
        .iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.date.clone(),
                r.direction.clone(),
                r.description.clone(),
                r.category.clone(),
                r.account.clone(),
                r.amount.clone(),
                r.status.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Id", "Date", "Dir", "Description", "Category", "Account", "Amount", "Status"],
            rows,
        )
    );
    println!(
        "{}: income {:.2}, expenses {:.2}, net {:.2} | opening {:.2} -> projected {:.2}{}",
        snapshot.month,
        snapshot.income,
        snapshot.expenses,
        snapshot.net,
        snapshot.opening_balance,
        snapshot.projected_balance,
        if snapshot.closed { " [closed]" } else { "" }
    );
    Ok(())
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let snapshot = month_snapshot(conn, &month, as_of(sub)?)?;
    if snapshot.closed {
        println!("{} is closed", snapshot.month);
        return Ok(());
    }
    if snapshot.readiness.can_close() {
        println!(
            "{} is ready to close ({} entries, all verified)",
            snapshot.month, snapshot.readiness.total
        );
    } else if snapshot.readiness.total == 0 {
        println!("{} has no entries yet", snapshot.month);
    } else {
        println!(
            "{}: {} of {} entries need verification",
            snapshot.month, snapshot.readiness.unverified, snapshot.readiness.total
        );
    }
    Ok(())
}

fn close(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let snapshot = month_snapshot(conn, &month, as_of(sub)?)?;
    if snapshot.closed {
        println!("{} is already closed", snapshot.month);
        return Ok(());
    }
    if !snapshot.readiness.can_close() {
        if snapshot.readiness.total == 0 {
            return Err(anyhow::anyhow!(
                "Cannot close {}: no entries in the month",
                snapshot.month
            ));
        }
        return Err(anyhow::anyhow!(
            "Cannot close {}: {} of {} entries still need verification",
            snapshot.month,
            snapshot.readiness.unverified,
            snapshot.readiness.total
        ));
    }
    store::set_month_closed(conn, &month, true)?;
    println!("Closed {}", month);
    Ok(())
}

fn reopen(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    store::set_month_closed(conn, &month, false)?;
    println!("Reopened {}", month);
    Ok(())
}

fn set_opening(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let amount = crate::utils::parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    store::set_opening_balance(conn, &month, amount)?;
    println!("Opening balance for {} set to {}", month, amount);
    Ok(())
}
