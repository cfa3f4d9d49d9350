// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::services::users;
use anyhow::{Result, bail};
use rusqlite::{Connection, params};
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let username = sub.get_one::<String>("user").unwrap();
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    if users::find_by_username(conn, username)?.is_none() {
        println!("Unknown user '{}'", username);
        return Ok(());
    }

    let mut stmt = conn.prepare(
        "SELECT t.date, t.type, t.amount, c.name as category, t.description
         FROM transactions t
         JOIN users u ON t.user_id=u.id
         LEFT JOIN categories c ON t.category_id=c.id
         WHERE u.username=?1
         ORDER BY t.date, t.id",
    )?;
    let rows = stmt.query_map(params![username], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, Option<String>>(4)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "type", "amount", "category", "description"])?;
            for row in rows {
                let (date, kind, amount, category, description) = row?;
                wtr.write_record([
                    date,
                    kind,
                    amount,
                    category.unwrap_or_default(),
                    description.unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (date, kind, amount, category, description) = row?;
                items.push(json!({
                    "date": date,
                    "type": kind,
                    "amount": amount,
                    "category": category,
                    "description": description,
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => bail!("Unknown export format '{}', expected csv or json", other),
    }
    println!("Exported transactions for '{}' to {}", username, out);
    Ok(())
}
