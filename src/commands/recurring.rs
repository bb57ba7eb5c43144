// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::models::{Cadence, Schedule};
use crate::schedule;
use crate::store;
use crate::utils::{
    id_for_account, id_for_category, maybe_print_json, parse_amount, parse_date, parse_direction,
    pretty_table,
};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("pause", sub)) => set_active(conn, sub, false)?,
        Some(("resume", sub)) => set_active(conn, sub, true)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let direction = parse_direction(sub.get_one::<String>("direction").unwrap())?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap();
    let desc = sub.get_one::<String>("desc").unwrap();
    let account = sub.get_one::<String>("account");
    let anchor = parse_date(sub.get_one::<String>("anchor").unwrap())?;
    let until = sub
        .get_one::<String>("until")
        .map(|s| parse_date(s))
        .transpose()?;

    let cadence = match sub.get_one::<String>("cadence").unwrap().as_str() {
        "weekly" => Cadence::Weekly,
        "biweekly" => Cadence::Biweekly,
        "monthly" => Cadence::Monthly {
            day_of_month: sub
                .get_one::<u32>("day-of-month")
                .copied()
                .unwrap_or(anchor.day()),
        },
        "custom" => Cadence::Custom {
            step_days: sub
                .get_one::<u32>("every-days")
                .copied()
                .context("--every-days is required for the custom cadence")?,
        },
        other => {
            return Err(anyhow::anyhow!(
                "Invalid cadence '{}', expected weekly|biweekly|monthly|custom",
                other
            ));
        }
    };

    let schedule = Schedule {
        cadence,
        anchor,
        until,
    };
    schedule::validate(&schedule).context("Rejected schedule")?;

    let category_id = id_for_category(conn, category)?;
    let account_id = match account {
        Some(name) => Some(id_for_account(conn, name)?),
        None => None,
    };
    let (day_of_month, step_days) = match cadence {
        Cadence::Monthly { day_of_month } => (Some(day_of_month), None),
        Cadence::Custom { step_days } => (None, Some(step_days)),
        _ => (None, None),
    };

    conn.execute(
        "INSERT INTO recurring_templates(direction, amount, category_id, description, account_id,
                                         cadence, anchor, until, day_of_month, step_days)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            direction.as_str(),
            amount.to_string(),
            category_id,
            desc,
            account_id,
            cadence.as_str(),
            anchor.to_string(),
            until.map(|d| d.to_string()),
            day_of_month,
            step_days
        ],
    )?;
    println!(
        "Added recurring {} '{}' {} from {}",
        direction.as_str(),
        desc,
        cadence.label().to_lowercase(),
        anchor
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TemplateRow {
    pub id: i64,
    pub description: String,
    pub direction: String,
    pub amount: String,
    pub cadence: String,
    pub anchor: String,
    pub until: String,
    pub category: String,
    pub active: bool,
    pub next_due: String,
}

pub fn query_rows(conn: &Connection) -> Result<Vec<TemplateRow>> {
    let today = Local::now().date_naive();
    let categories = store::category_names(conn)?;
    let templates = store::load_templates(conn)?;
    let mut data = Vec::new();
    for t in templates {
        let next_due = if t.active {
            schedule::next_on_or_after(&t.schedule, today)?
                .map(|d| d.to_string())
                .unwrap_or_else(|| "ended".into())
        } else {
            "paused".into()
        };
        data.push(TemplateRow {
            id: t.id,
            description: t.description,
            direction: t.direction.as_str().into(),
            amount: t.amount.to_string(),
            cadence: t.schedule.cadence.label(),
            anchor: t.schedule.anchor.to_string(),
            until: t.schedule.until.map(|d| d.to_string()).unwrap_or_default(),
            category: t
                .category_id
                .and_then(|id| categories.get(&id).cloned())
                .unwrap_or_default(),
            active: t.active,
            next_due,
        });
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|t| {
                vec![
                    t.id.to_string(),
                    t.description.clone(),
                    t.direction.clone(),
                    t.amount.clone(),
                    t.cadence.clone(),
                    t.anchor.clone(),
                    t.until.clone(),
                    t.category.clone(),
                    t.next_due.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Description", "Dir", "Amount", "Cadence", "Anchor", "Until", "Category", "Next due"],
                rows,
            )
        );
    }
    Ok(())
}

fn set_active(conn: &Connection, sub: &clap::ArgMatches, active: bool) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let changed = conn.execute(
        "UPDATE recurring_templates SET active=?1 WHERE id=?2",
        params![active, id],
    )?;
    if changed == 0 {
        return Err(anyhow::anyhow!("Recurring template {} not found", id));
    }
    println!(
        "Recurring template {} {}",
        id,
        if active { "resumed" } else { "paused" }
    );
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let changed = conn.execute(
        "DELETE FROM recurring_templates WHERE id=?1",
        params![id],
    )?;
    if changed == 0 {
        return Err(anyhow::anyhow!("Recurring template {} not found", id));
    }
    println!(
        "Deleted recurring template {}; materialized transactions were kept",
        id
    );
    Ok(())
}
