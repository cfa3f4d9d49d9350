// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::report;
use crate::services::users;
use crate::utils::fmt_money;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("register", sub)) => {
            let username = sub.get_one::<String>("username").unwrap();
            let password = sub.get_one::<String>("password").unwrap();
            match users::register(conn, username, password) {
                Ok(user) => println!("Registered '{}' (id {})", user.username, user.id),
                Err(e) => report(&e),
            }
        }
        Some(("login", sub)) => {
            let username = sub.get_one::<String>("username").unwrap();
            let password = sub.get_one::<String>("password").unwrap();
            match users::authenticate(conn, username, password) {
                Ok(Some(user)) => println!(
                    "Logged in as '{}'. Balance: {}",
                    user.username,
                    fmt_money(&user.account_balance)
                ),
                Ok(None) => println!("Login failed."),
                Err(e) => report(&e),
            }
        }
        Some(("passwd", sub)) => {
            let username = sub.get_one::<String>("username").unwrap();
            let password = sub.get_one::<String>("password").unwrap();
            match users::change_password(conn, username, password) {
                Ok(()) => println!("Password changed for '{}'", username),
                Err(e) => report(&e),
            }
        }
        Some(("rm", sub)) => {
            let username = sub.get_one::<String>("username").unwrap();
            let password = sub.get_one::<String>("password").unwrap();
            match users::delete(conn, username, password) {
                Ok(true) => println!("Deleted user '{}'", username),
                Ok(false) => println!("Deletion refused: unknown user or wrong password."),
                Err(e) => report(&e),
            }
        }
        Some(("balance", sub)) => {
            let username = sub.get_one::<String>("username").unwrap();
            match users::find_by_username(conn, username) {
                Ok(Some(user)) => match users::get_balance(conn, user.id) {
                    Ok(balance) => println!("{}: {}", user.username, fmt_money(&balance)),
                    Err(e) => report(&e),
                },
                Ok(None) => println!("Unknown user '{}'", username),
                Err(e) => report(&e),
            }
        }
        _ => {}
    }
    Ok(())
}
