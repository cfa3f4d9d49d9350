// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::report;
use crate::models::ConversionRate;
use crate::provider::FrankfurterProvider;
use crate::services::rates;
use crate::utils::{parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let (base, target, date) = pair_args(sub)?;
            let provider = FrankfurterProvider::new()?;
            match rates::get_rate(conn, &provider, &base, &target, date) {
                Ok(Some(rate)) => println!("{}", rates::get_details(&rate)),
                Ok(None) => println!("No rate available for {}/{} on {}", base, target, date),
                Err(e) => report(&e),
            }
        }
        Some(("log", sub)) => {
            let (base, target, date) = pair_args(sub)?;
            let rate = parse_decimal(sub.get_one::<String>("rate").unwrap())?;
            match rates::log_rate(conn, &base, &target, date, rate) {
                Ok(logged) => println!("Logged {}", rates::get_details(&logged)),
                Err(e) => report(&e),
            }
        }
        Some(("set", sub)) => {
            let (base, target, date) = pair_args(sub)?;
            let new_rate = parse_decimal(sub.get_one::<String>("rate").unwrap())?;
            match lookup(conn, &base, &target, date)? {
                Some(existing) => match rates::change_rate(conn, &existing, new_rate) {
                    Ok(()) => println!("Rate {}/{} on {} set to {}", base, target, date, new_rate),
                    Err(e) => report(&e),
                },
                None => println!("No cached rate for {}/{} on {}", base, target, date),
            }
        }
        Some(("rm", sub)) => {
            let (base, target, date) = pair_args(sub)?;
            match lookup(conn, &base, &target, date)? {
                Some(existing) => match rates::delete_rate(conn, &existing) {
                    Ok(()) => println!("Deleted rate {}/{} on {}", base, target, date),
                    Err(e) => report(&e),
                },
                None => println!("No cached rate for {}/{} on {}", base, target, date),
            }
        }
        Some(("list", sub)) => {
            let limit = *sub.get_one::<usize>("limit").unwrap();
            let data = rates::list_rates(conn, limit)?;
            let rows: Vec<Vec<String>> = data
                .iter()
                .map(|r| {
                    vec![
                        r.date.to_string(),
                        r.base.clone(),
                        r.target.clone(),
                        r.rate.to_string(),
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["Date", "Base", "Target", "Rate"], rows));
        }
        _ => {}
    }
    Ok(())
}

fn pair_args(sub: &clap::ArgMatches) -> Result<(String, String, NaiveDate)> {
    let base = sub.get_one::<String>("base").unwrap().to_uppercase();
    let target = sub.get_one::<String>("target").unwrap().to_uppercase();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    Ok((base, target, date))
}

fn lookup(
    conn: &Connection,
    base: &str,
    target: &str,
    date: NaiveDate,
) -> Result<Option<ConversionRate>> {
    Ok(rates::find_rate(conn, base, target, date)?)
}
