// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::report;
use crate::models::{Transaction, TransactionFilter, TransactionKind, TransactionUpdate, User};
use crate::services::{transactions, users};
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use std::str::FromStr;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("recent", sub)) => recent(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = match lookup_user(conn, sub)? {
        Some(u) => u,
        None => return Ok(()),
    };
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let type_token = sub.get_one::<String>("type").unwrap();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let category_id = sub.get_one::<i64>("category").copied();
    let description = sub.get_one::<String>("description").map(String::as_str);

    match transactions::create(conn, &user, amount, type_token, date, category_id, description) {
        Ok(t) => {
            let balance = users::get_balance(conn, user.id)?;
            println!(
                "Recorded {} of {} on {} (id {}). Balance: {}",
                t.kind, t.amount, t.date, t.id, balance
            );
        }
        Err(e) => report(&e),
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (user, existing) = match lookup_transaction(conn, sub)? {
        Some(pair) => pair,
        None => return Ok(()),
    };
    let kind = match sub.get_one::<String>("type") {
        Some(token) => match TransactionKind::from_str(token) {
            Ok(k) => Some(k),
            Err(msg) => {
                println!("{}", msg);
                return Ok(());
            }
        },
        None => None,
    };
    let amount = match sub.get_one::<String>("amount") {
        Some(raw) => Some(parse_decimal(raw)?),
        None => None,
    };
    let date = match sub.get_one::<String>("date") {
        Some(raw) => Some(parse_date(raw)?),
        None => None,
    };
    let update = TransactionUpdate {
        amount,
        kind,
        date,
        category_id: sub.get_one::<i64>("category").copied(),
        description: sub.get_one::<String>("description").cloned(),
    };
    match transactions::modify(conn, &existing, update) {
        Ok(t) => {
            let balance = users::get_balance(conn, user.id)?;
            println!("Updated transaction {}. Balance: {}", t.id, balance);
        }
        Err(e) => report(&e),
    }
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let (user, existing) = match lookup_transaction(conn, sub)? {
        Some(pair) => pair,
        None => return Ok(()),
    };
    match transactions::delete(conn, &existing) {
        Ok(()) => {
            let balance = users::get_balance(conn, user.id)?;
            println!("Deleted transaction {}. Balance: {}", existing.id, balance);
        }
        Err(e) => report(&e),
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = match lookup_user(conn, sub)? {
        Some(u) => u,
        None => return Ok(()),
    };
    let kind = match sub.get_one::<String>("type") {
        Some(token) => match TransactionKind::from_str(token) {
            Ok(k) => Some(k),
            Err(msg) => {
                println!("{}", msg);
                return Ok(());
            }
        },
        None => None,
    };
    let min_amount = match sub.get_one::<String>("min") {
        Some(raw) => Some(parse_decimal(raw)?),
        None => None,
    };
    let max_amount = match sub.get_one::<String>("max") {
        Some(raw) => Some(parse_decimal(raw)?),
        None => None,
    };
    let keywords: Vec<String> = sub
        .get_many::<String>("keyword")
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default();
    let filter = TransactionFilter {
        id: sub.get_one::<i64>("id").copied(),
        kind,
        category_id: sub.get_one::<i64>("category").copied(),
        min_amount,
        max_amount,
        description_keywords: keywords,
    };
    let data = transactions::get_by_filter(conn, user.id, &filter)?;

    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Type", "Amount", "Category", "Description"],
                transaction_rows(&data),
            )
        );
    }
    Ok(())
}

fn recent(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = match lookup_user(conn, sub)? {
        Some(u) => u,
        None => return Ok(()),
    };
    let limit = *sub.get_one::<usize>("limit").unwrap();
    let data = transactions::get_recent(conn, user.id, limit)?;
    println!(
        "{}",
        pretty_table(
            &["Id", "Date", "Type", "Amount", "Category", "Description"],
            transaction_rows(&data),
        )
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    if let Some((_, t)) = lookup_transaction(conn, sub)? {
        println!("{}", transactions::describe(&t));
    }
    Ok(())
}

fn lookup_user(conn: &Connection, sub: &clap::ArgMatches) -> Result<Option<User>> {
    let username = sub.get_one::<String>("user").unwrap();
    let user = users::find_by_username(conn, username)?;
    if user.is_none() {
        println!("Unknown user '{}'", username);
    }
    Ok(user)
}

fn lookup_transaction(
    conn: &Connection,
    sub: &clap::ArgMatches,
) -> Result<Option<(User, Transaction)>> {
    let user = match lookup_user(conn, sub)? {
        Some(u) => u,
        None => return Ok(None),
    };
    let id = *sub.get_one::<i64>("id").unwrap();
    match transactions::find_by_id(conn, user.id, id)? {
        Some(t) => Ok(Some((user, t))),
        None => {
            println!("No transaction with id {} for '{}'", id, user.username);
            Ok(None)
        }
    }
}

fn transaction_rows(data: &[Transaction]) -> Vec<Vec<String>> {
    data.iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.date.to_string(),
                t.kind.to_string(),
                t.amount.to_string(),
                t.category_id.map(|id| id.to_string()).unwrap_or_default(),
                t.description.clone().unwrap_or_default(),
            ]
        })
        .collect()
}
