// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::report;
use crate::models::Category;
use crate::services::categories;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let description = sub.get_one::<String>("description").map(String::as_str);
            match categories::create(conn, name, description) {
                Ok(cat) => println!("Added category '{}' (id {})", cat.name, cat.id),
                Err(e) => report(&e),
            }
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let name = sub.get_one::<String>("name").map(String::as_str);
            let description = sub.get_one::<String>("description").map(String::as_str);
            match categories::find_by_id(conn, id)? {
                Some(cat) => match categories::modify(conn, &cat, name, description) {
                    Ok(updated) => println!("Updated category '{}'", updated.name),
                    Err(e) => report(&e),
                },
                None => println!("No category with id {}", id),
            }
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            match categories::find_by_id(conn, id)? {
                Some(cat) => match categories::delete(conn, &cat) {
                    Ok(()) => println!("Removed category '{}'", cat.name),
                    Err(e) => report(&e),
                },
                None => println!("No category with id {}", id),
            }
        }
        Some(("list", sub)) => {
            let data = categories::list_all(conn)?;
            print_categories(sub, &data)?;
        }
        Some(("find", sub)) => {
            let text = sub.get_one::<String>("text").unwrap();
            let data = categories::find_by_name_substring(conn, text)?;
            let rows = category_rows(&data);
            println!("{}", pretty_table(&["Id", "Name", "Description"], rows));
        }
        _ => {}
    }
    Ok(())
}

fn print_categories(sub: &clap::ArgMatches, data: &[Category]) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(&["Id", "Name", "Description"], category_rows(data))
        );
    }
    Ok(())
}

fn category_rows(data: &[Category]) -> Vec<Vec<String>> {
    data.iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.description.clone().unwrap_or_default(),
            ]
        })
        .collect()
}
