// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{
    id_for_account, id_for_category, maybe_print_json, parse_amount, parse_date, parse_direction,
    pretty_table,
};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("verify", sub)) => set_verified(conn, sub, true)?,
        Some(("unverify", sub)) => set_verified(conn, sub, false)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let direction = parse_direction(sub.get_one::<String>("direction").unwrap())?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap();
    let account = sub.get_one::<String>("account");
    let desc = sub.get_one::<String>("desc").map(|s| s.to_string());

    let category_id = id_for_category(conn, category)?;
    let account_id = match account {
        Some(name) => Some(id_for_account(conn, name)?),
        None => None,
    };

    conn.execute(
        "INSERT INTO transactions(date, direction, amount, category_id, description, account_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            date.to_string(),
            direction.as_str(),
            amount.to_string(),
            category_id,
            desc.unwrap_or_default(),
            account_id
        ],
    )?;
    println!(
        "Recorded {} {} on {} ({})",
        direction.as_str(),
        amount,
        date,
        category
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
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
                    if r.verified { "yes".into() } else { "".into() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Dir", "Description", "Category", "Account", "Amount", "Verified"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub direction: String,
    pub description: String,
    pub category: String,
    pub account: String,
    pub amount: String,
    pub verified: bool,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let mut sql = String::from(
        "SELECT t.id, t.date, t.direction, t.description, c.name, a.name, t.amount, t.verified
         FROM transactions t
         LEFT JOIN categories c ON t.category_id=c.id
         LEFT JOIN accounts a ON t.account_id=a.id
         WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(t.date,1,7)=?");
        params_vec.push(month.into());
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        sql.push_str(" AND c.name=?");
        params_vec.push(cat.into());
    }
    if let Some(direction) = sub.get_one::<String>("direction") {
        sql.push_str(" AND t.direction=?");
        params_vec.push(parse_direction(direction)?.as_str().into());
    }
    sql.push_str(" ORDER BY t.date DESC, t.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let date: String = r.get(1)?;
        let direction: String = r.get(2)?;
        let description: String = r.get(3)?;
        let category: Option<String> = r.get(4)?;
        let account: Option<String> = r.get(5)?;
        let amount: String = r.get(6)?;
        let verified: bool = r.get(7)?;
        data.push(TransactionRow {
            id,
            date,
            direction,
            description,
            category: category.unwrap_or_default(),
            account: account.unwrap_or_default(),
            amount,
            verified,
        });
    }
    Ok(data)
}

fn set_verified(conn: &Connection, sub: &clap::ArgMatches, verified: bool) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let changed = conn.execute(
        "UPDATE transactions SET verified=?1 WHERE id=?2",
        params![verified, id],
    )?;
    if changed == 0 {
        return Err(anyhow::anyhow!("Transaction {} not found", id));
    }
    println!(
        "Transaction {} {}",
        id,
        if verified { "verified" } else { "unverified" }
    );
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let recurring_id: Option<i64> = conn
        .query_row(
            "SELECT recurring_id FROM transactions WHERE id=?1",
            params![id],
            |r| r.get(0),
        )
        .optional()?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;

    // Moving the date of a materialized occurrence would vacate its
    // (template, date) key and the next materializer pass would recreate it.
    if sub.get_one::<String>("date").is_some() && recurring_id.is_some() {
        return Err(anyhow::anyhow!(
            "Transaction {} was generated by recurring template {}; its date cannot change",
            id,
            recurring_id.unwrap_or_default()
        ));
    }

    if let Some(amount) = sub.get_one::<String>("amount") {
        let amount = parse_amount(amount)?;
        conn.execute(
            "UPDATE transactions SET amount=?1 WHERE id=?2",
            params![amount.to_string(), id],
        )?;
    }
    if let Some(category) = sub.get_one::<String>("category") {
        let category_id = id_for_category(conn, category)?;
        conn.execute(
            "UPDATE transactions SET category_id=?1 WHERE id=?2",
            params![category_id, id],
        )?;
    }
    if let Some(account) = sub.get_one::<String>("account") {
        let account_id = id_for_account(conn, account)?;
        conn.execute(
            "UPDATE transactions SET account_id=?1 WHERE id=?2",
            params![account_id, id],
        )?;
    }
    if let Some(desc) = sub.get_one::<String>("desc") {
        conn.execute(
            "UPDATE transactions SET description=?1 WHERE id=?2",
            params![desc, id],
        )?;
    }
    if let Some(date) = sub.get_one::<String>("date") {
        let date = parse_date(date)?;
        conn.execute(
            "UPDATE transactions SET date=?1 WHERE id=?2",
            params![date.to_string(), id],
        )?;
    }
    println!("Updated transaction {}", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let changed = conn.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if changed == 0 {
        return Err(anyhow::anyhow!("Transaction {} not found", id));
    }
    println!("Deleted transaction {}", id);
    Ok(())
}
