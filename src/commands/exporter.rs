// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT t.date, t.direction, t.amount, c.name as category, a.name as account,
                t.description, t.verified, t.recurring_id
         FROM transactions t
         LEFT JOIN categories c ON t.category_id=c.id
         LEFT JOIN accounts a ON t.account_id=a.id
         ORDER BY t.date, t.id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, Option<String>>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, bool>(6)?,
            r.get::<_, Option<i64>>(7)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date",
                "direction",
                "amount",
                "category",
                "account",
                "description",
                "verified",
                "recurring_id",
            ])?;
            for row in rows {
                let (d, dir, amt, cat, acct, desc, verified, recurring_id) = row?;
                wtr.write_record([
                    d,
                    dir,
                    amt,
                    cat.unwrap_or_default(),
                    acct.unwrap_or_default(),
                    desc,
                    verified.to_string(),
                    recurring_id.map(|id| id.to_string()).unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (d, dir, amt, cat, acct, desc, verified, recurring_id) = row?;
                items.push(json!({
                    "date": d, "direction": dir, "amount": amt, "category": cat,
                    "account": acct, "description": desc, "verified": verified,
                    "recurring_id": recurring_id
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => {
            return Err(anyhow::anyhow!("Unknown format: {} (use csv|json)", other));
        }
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
