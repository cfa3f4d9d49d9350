// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetbook::services::{categories, transactions, users};
use budgetbook::{cli, commands};
use rusqlite::Connection;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    budgetbook::db::init_schema(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO users(username, password_hash, account_balance) VALUES ('alice', 'x', '0')",
        [],
    )
    .unwrap();
    conn
}

#[test]
fn csv_export_writes_user_scoped_rows() {
    let conn = setup();
    let user = users::find_by_username(&conn, "alice").unwrap().unwrap();
    let food = categories::create(&conn, "food", None).unwrap();
    transactions::create(
        &conn,
        &user,
        "12.50".parse().unwrap(),
        "expense",
        "2024-01-05".parse().unwrap(),
        Some(food.id),
        Some("grocery run"),
    )
    .unwrap();
    transactions::create(
        &conn,
        &user,
        "100".parse().unwrap(),
        "income",
        "2024-01-01".parse().unwrap(),
        None,
        None,
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");
    let matches = cli::build_cli().get_matches_from([
        "budgetbook",
        "export",
        "transactions",
        "--user",
        "alice",
        "--format",
        "csv",
        "--out",
        out.to_str().unwrap(),
    ]);
    let Some(("export", export_m)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    commands::exporter::handle(&conn, export_m).unwrap();

    let contents = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "date,type,amount,category,description");
    // Export is ordered by date ascending.
    assert_eq!(lines[1], "2024-01-01,income,100,,");
    assert_eq!(lines[2], "2024-01-05,expense,12.50,food,grocery run");
    assert_eq!(lines.len(), 3);
}

#[test]
fn export_for_unknown_user_writes_no_file() {
    let conn = setup();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.csv");
    let matches = cli::build_cli().get_matches_from([
        "budgetbook",
        "export",
        "transactions",
        "--user",
        "nobody",
        "--format",
        "csv",
        "--out",
        out.to_str().unwrap(),
    ]);
    let Some(("export", export_m)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    commands::exporter::handle(&conn, export_m).unwrap();

    assert!(!out.exists());
}

#[test]
fn json_export_round_trips() {
    let conn = setup();
    let user = users::find_by_username(&conn, "alice").unwrap().unwrap();
    transactions::create(
        &conn,
        &user,
        "5".parse().unwrap(),
        "expense",
        "2024-02-01".parse().unwrap(),
        None,
        Some("coffee"),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.json");
    let matches = cli::build_cli().get_matches_from([
        "budgetbook",
        "export",
        "transactions",
        "--user",
        "alice",
        "--format",
        "json",
        "--out",
        out.to_str().unwrap(),
    ]);
    let Some(("export", export_m)) = matches.subcommand() else {
        panic!("no export subcommand");
    };
    commands::exporter::handle(&conn, export_m).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "expense");
    assert_eq!(items[0]["description"], "coffee");
}
