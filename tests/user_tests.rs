// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetbook::Error;
use budgetbook::services::users;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    budgetbook::db::init_schema(&mut conn).unwrap();
    conn
}

#[test]
fn register_rejects_short_username() {
    let conn = setup();
    let result = users::register(&conn, "ab", "Abc12345!");
    match result {
        Err(Error::Validation(errors)) => {
            assert!(errors.contains_key("length"));
        }
        other => panic!("expected validation error, got {:?}", other.map(|u| u.username)),
    }
    // Nothing persisted on validation failure.
    assert!(users::find_by_username(&conn, "ab").unwrap().is_none());
}

#[test]
fn register_rejects_weak_password_with_field_map() {
    let conn = setup();
    // All lowercase, no digit, no symbol, long enough.
    let result = users::register(&conn, "alice", "alllowercase");
    match result {
        Err(Error::Validation(errors)) => {
            assert!(errors.contains_key("capital"));
            assert!(errors.contains_key("number"));
            assert!(errors.contains_key("symbol"));
            assert!(!errors.contains_key("length"));
            assert!(!errors.contains_key("lowercase"));
        }
        _ => panic!("expected validation error"),
    }
}

#[test]
fn register_then_authenticate() {
    let conn = setup();
    let user = users::register(&conn, "alice", "Abc12345!").unwrap();
    assert_eq!(user.account_balance, Decimal::ZERO);

    let logged_in = users::authenticate(&conn, "alice", "Abc12345!").unwrap();
    assert_eq!(logged_in.unwrap().id, user.id);

    // Wrong password and unknown user both come back as None.
    assert!(users::authenticate(&conn, "alice", "Wrong123!").unwrap().is_none());
    assert!(users::authenticate(&conn, "nobody", "Abc12345!").unwrap().is_none());
}

#[test]
fn duplicate_username_is_integrity_error() {
    let conn = setup();
    users::register(&conn, "alice", "Abc12345!").unwrap();
    let result = users::register(&conn, "alice", "Xyz98765?");
    assert!(matches!(result, Err(Error::Integrity)));
}

#[test]
fn change_password_revalidates_and_rehashes() {
    let conn = setup();
    users::register(&conn, "alice", "Abc12345!").unwrap();

    let weak = users::change_password(&conn, "alice", "short");
    assert!(matches!(weak, Err(Error::Validation(_))));

    users::change_password(&conn, "alice", "Def67890?").unwrap();
    assert!(users::authenticate(&conn, "alice", "Def67890?").unwrap().is_some());
    assert!(users::authenticate(&conn, "alice", "Abc12345!").unwrap().is_none());
}

#[test]
fn change_password_for_unknown_user_is_not_found() {
    let conn = setup();
    let result = users::change_password(&conn, "nobody", "Def67890?");
    assert!(matches!(result, Err(Error::NotFound)));
}

#[test]
fn delete_requires_password_reconfirmation() {
    let conn = setup();
    users::register(&conn, "alice", "Abc12345!").unwrap();

    assert!(!users::delete(&conn, "alice", "Wrong123!").unwrap());
    assert!(users::find_by_username(&conn, "alice").unwrap().is_some());
    assert!(!users::delete(&conn, "nobody", "Abc12345!").unwrap());

    assert!(users::delete(&conn, "alice", "Abc12345!").unwrap());
    assert!(users::find_by_username(&conn, "alice").unwrap().is_none());
}

#[test]
fn delete_cascades_to_owned_transactions() {
    let conn = setup();
    let user = users::register(&conn, "alice", "Abc12345!").unwrap();
    conn.execute(
        "INSERT INTO transactions(user_id, amount, type, date) VALUES (?1, '10', 'income', '2024-01-01')",
        [user.id],
    )
    .unwrap();

    assert!(users::delete(&conn, "alice", "Abc12345!").unwrap());
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}
