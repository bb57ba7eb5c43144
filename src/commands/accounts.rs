// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::{params, Connection};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let kind = sub.get_one::<String>("type").unwrap();
            conn.execute(
                "INSERT INTO accounts(name, kind) VALUES (?1, ?2)",
                params![name, kind],
            )?;
            println!("Added account '{}' ({})", name, kind);
        }
        Some(("list", _)) => {
            let mut stmt =
                conn.prepare("SELECT name, kind, created_at FROM accounts ORDER BY name")?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (n, k, cr) = row?;
                data.push(vec![n, k, cr]);
            }
            println!("{}", pretty_table(&["Name", "Type", "Created"], data));
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            conn.execute("DELETE FROM accounts WHERE name=?1", params![name])?;
            println!("Removed account '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
