// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("budgetbook")
        .about("Personal budget tracker: balance-synced transactions, categories, cached FX rates")
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(user_cmd())
        .subcommand(category_cmd())
        .subcommand(tx_cmd())
        .subcommand(rate_cmd())
        .subcommand(export_cmd())
}

fn user_cmd() -> Command {
    Command::new("user")
        .about("Manage user accounts")
        .subcommand(
            Command::new("register")
                .about("Register a new user")
                .arg(required("username"))
                .arg(required("password")),
        )
        .subcommand(
            Command::new("login")
                .about("Check credentials")
                .arg(required("username"))
                .arg(required("password")),
        )
        .subcommand(
            Command::new("passwd")
                .about("Change a user's password")
                .arg(required("username"))
                .arg(required("password").help("The new password")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a user and their transactions (requires the password)")
                .arg(required("username"))
                .arg(required("password")),
        )
        .subcommand(
            Command::new("balance")
                .about("Show a user's current balance")
                .arg(required("username")),
        )
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage transaction categories")
        .subcommand(
            Command::new("add")
                .about("Add a category (name is stored lowercase)")
                .arg(required("name"))
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(
            Command::new("edit")
                .about("Edit a category; omitted fields are kept")
                .arg(required_id())
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(Command::new("rm").about("Remove a category").arg(required_id()))
        .subcommand(
            Command::new("list")
                .about("List all categories")
                .arg(json_flag())
                .arg(jsonl_flag()),
        )
        .subcommand(
            Command::new("find")
                .about("Find categories by name substring")
                .arg(required("text")),
        )
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and query transactions")
        .subcommand(
            Command::new("add")
                .about("Record a transaction and update the balance")
                .arg(required_user())
                .arg(required("amount"))
                .arg(required("type").help("income or expense (case-insensitive)"))
                .arg(required("date").help("YYYY-MM-DD"))
                .arg(Arg::new("category").long("category").value_parser(value_parser!(i64)))
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(
            Command::new("edit")
                .about("Modify a transaction; omitted fields are kept")
                .arg(required_user())
                .arg(required_id())
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("category").long("category").value_parser(value_parser!(i64)))
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a transaction and reverse its balance effect")
                .arg(required_user())
                .arg(required_id()),
        )
        .subcommand(
            Command::new("list")
                .about("List transactions matching the given filters")
                .arg(required_user())
                .arg(Arg::new("id").long("id").value_parser(value_parser!(i64)))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("category").long("category").value_parser(value_parser!(i64)))
                .arg(Arg::new("min").long("min"))
                .arg(Arg::new("max").long("max"))
                .arg(
                    Arg::new("keyword")
                        .long("keyword")
                        .action(ArgAction::Append)
                        .help("Description keyword; repeat for OR matching"),
                )
                .arg(json_flag())
                .arg(jsonl_flag()),
        )
        .subcommand(
            Command::new("recent")
                .about("Show the most recent transactions")
                .arg(required_user())
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .default_value("5"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Describe a single transaction")
                .arg(required_user())
                .arg(required_id()),
        )
}

fn rate_cmd() -> Command {
    Command::new("rate")
        .about("Look up and manage cached conversion rates")
        .subcommand(
            Command::new("get")
                .about("Get a rate from the cache, fetching on a miss")
                .arg(required("base"))
                .arg(required("target"))
                .arg(required("date").help("YYYY-MM-DD")),
        )
        .subcommand(
            Command::new("log")
                .about("Record a rate explicitly")
                .arg(required("base"))
                .arg(required("target"))
                .arg(required("date"))
                .arg(required("rate")),
        )
        .subcommand(
            Command::new("set")
                .about("Overwrite an existing rate")
                .arg(required("base"))
                .arg(required("target"))
                .arg(required("date"))
                .arg(required("rate")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a cached rate")
                .arg(required("base"))
                .arg(required("target"))
                .arg(required("date")),
        )
        .subcommand(
            Command::new("list").about("List cached rates").arg(
                Arg::new("limit")
                    .long("limit")
                    .value_parser(value_parser!(usize))
                    .default_value("50"),
            ),
        )
}

fn export_cmd() -> Command {
    Command::new("export").about("Export data").subcommand(
        Command::new("transactions")
            .about("Export a user's transactions")
            .arg(required_user())
            .arg(
                Arg::new("format")
                    .long("format")
                    .default_value("csv")
                    .help("csv or json"),
            )
            .arg(required("out").help("Output file path")),
    )
}

fn required(name: &'static str) -> Arg {
    Arg::new(name).long(name).required(true)
}

fn required_user() -> Arg {
    Arg::new("user").long("user").required(true).help("Username")
}

fn required_id() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print as pretty JSON")
}

fn jsonl_flag() -> Arg {
    Arg::new("jsonl")
        .long("jsonl")
        .action(ArgAction::SetTrue)
        .help("Print as JSON lines")
}
