// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("cashflow", sub)) => cashflow(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct CashflowRow {
    pub month: String,
    pub income: String,
    pub expenses: String,
    pub savings: String,
}

fn cashflow(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);

    let mut stmt = conn.prepare(
        "SELECT substr(date,1,7) AS month, direction, amount
         FROM transactions
         ORDER BY date DESC",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;

    use std::collections::BTreeMap;
    let mut map: BTreeMap<String, (rust_decimal::Decimal, rust_decimal::Decimal)> = BTreeMap::new();
    for row in rows {
        let (m, direction, amount_s) = row?;
        let amount = amount_s
            .parse::<rust_decimal::Decimal>()
            .with_context(|| format!("Invalid amount '{}' in {}", amount_s, m))?;
        let entry = map
            .entry(m)
            .or_insert((rust_decimal::Decimal::ZERO, rust_decimal::Decimal::ZERO));
        match direction.as_str() {
            "income" => entry.0 += amount,
            _ => entry.1 += amount,
        }
    }

    let mut data = Vec::new();
    for (m, (income, expenses)) in map.iter().rev().take(months) {
        data.push(CashflowRow {
            month: m.clone(),
            income: format!("{:.2}", income),
            expenses: format!("{:.2}", expenses),
            savings: format!("{:.2}", income - expenses),
        });
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.month.clone(),
                    r.income.clone(),
                    r.expenses.clone(),
                    r.savings.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expenses", "Savings"], rows)
        );
    }
    Ok(())
}
