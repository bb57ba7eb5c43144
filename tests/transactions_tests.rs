// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use ledgerloop::commands::transactions;
use ledgerloop::{cli, db};
use rusqlite::{params, Connection};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute("INSERT INTO categories(name) VALUES('Cat1')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO accounts(name, kind) VALUES('A1','checking')",
        [],
    )
    .unwrap();
    for i in 1..=3 {
        conn.execute(
            "INSERT INTO transactions(date, direction, amount, category_id, description, account_id)
             VALUES (?1,'expense','10',1,'P',1)",
            params![format!("2025-01-0{}", i)],
        )
        .unwrap();
    }
    conn
}

fn run_tx(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(args);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(conn, tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_limit_respected() {
    let conn = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["ledgerloop", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&conn, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, "2025-01-03");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn verify_and_unverify_round_trip() {
    let conn = setup();
    run_tx(&conn, &["ledgerloop", "tx", "verify", "--id", "1"]).unwrap();
    let verified: bool = conn
        .query_row("SELECT verified FROM transactions WHERE id=1", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert!(verified);

    run_tx(&conn, &["ledgerloop", "tx", "unverify", "--id", "1"]).unwrap();
    let verified: bool = conn
        .query_row("SELECT verified FROM transactions WHERE id=1", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert!(!verified);

    let missing = run_tx(&conn, &["ledgerloop", "tx", "verify", "--id", "99"]);
    assert!(missing.is_err());
}

#[test]
fn edit_refuses_date_changes_on_recurring_rows() {
    let conn = setup();
    conn.execute(
        "INSERT INTO recurring_templates(direction, amount, category_id, description,
                                         cadence, anchor, day_of_month)
         VALUES ('expense','850',1,'Rent','monthly','2025-01-01',1)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(date, direction, amount, category_id, description, recurring_id)
         VALUES ('2025-01-01','expense','850',1,'Rent',1)",
        [],
    )
    .unwrap();
    let id: i64 = conn
        .query_row(
            "SELECT id FROM transactions WHERE recurring_id=1",
            [],
            |r| r.get(0),
        )
        .unwrap();
    let id_arg = id.to_string();

    let err = run_tx(
        &conn,
        &[
            "ledgerloop",
            "tx",
            "edit",
            "--id",
            &id_arg,
            "--date",
            "2025-01-05",
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("cannot change"));

    // Every other field stays editable.
    run_tx(
        &conn,
        &[
            "ledgerloop",
            "tx",
            "edit",
            "--id",
            &id_arg,
            "--amount",
            "900",
            "--desc",
            "Rent (raised)",
        ],
    )
    .unwrap();
    let (amount, desc): (String, String) = conn
        .query_row(
            "SELECT amount, description FROM transactions WHERE id=?1",
            params![id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(amount, "900");
    assert_eq!(desc, "Rent (raised)");
}

#[test]
fn edit_moves_dates_on_manual_rows() {
    let conn = setup();
    run_tx(
        &conn,
        &[
            "ledgerloop",
            "tx",
            "edit",
            "--id",
            "1",
            "--date",
            "2025-01-09",
        ],
    )
    .unwrap();
    let date: String = conn
        .query_row("SELECT date FROM transactions WHERE id=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(date, "2025-01-09");
}

#[test]
fn rm_deletes_and_reports_missing() {
    let conn = setup();
    run_tx(&conn, &["ledgerloop", "tx", "rm", "--id", "2"]).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 2);

    let missing = run_tx(&conn, &["ledgerloop", "tx", "rm", "--id", "2"]);
    assert!(missing.is_err());
}
