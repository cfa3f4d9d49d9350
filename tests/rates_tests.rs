// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use budgetbook::Error;
use budgetbook::provider::RateProvider;
use budgetbook::services::rates;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::cell::RefCell;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    budgetbook::db::init_schema(&mut conn).unwrap();
    conn
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Provider double that records how often it was consulted.
struct StubProvider {
    rate: Option<Decimal>,
    fail: bool,
    calls: RefCell<usize>,
}

impl StubProvider {
    fn returning(rate: Decimal) -> Self {
        Self {
            rate: Some(rate),
            fail: false,
            calls: RefCell::new(0),
        }
    }

    fn empty() -> Self {
        Self {
            rate: None,
            fail: false,
            calls: RefCell::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            rate: None,
            fail: true,
            calls: RefCell::new(0),
        }
    }

    fn call_count(&self) -> usize {
        *self.calls.borrow()
    }
}

impl RateProvider for StubProvider {
    fn fetch(&self, _base: &str, _target: &str, _date: NaiveDate) -> anyhow::Result<Option<Decimal>> {
        *self.calls.borrow_mut() += 1;
        if self.fail {
            anyhow::bail!("connection refused");
        }
        Ok(self.rate)
    }
}

#[test]
fn logged_rate_is_served_without_provider_call() {
    let conn = setup();
    let provider = StubProvider::returning(dec("9.99"));
    let d = date("2024-01-15");

    rates::log_rate(&conn, "USD", "EUR", d, dec("1.1")).unwrap();
    let hit = rates::get_rate(&conn, &provider, "USD", "EUR", d).unwrap().unwrap();

    assert_eq!(hit.rate, dec("1.1"));
    assert_eq!(provider.call_count(), 0);
}

#[test]
fn cache_miss_fetches_once_and_writes_back() {
    let conn = setup();
    let provider = StubProvider::returning(dec("0.9"));
    let d = date("2024-01-15");

    let first = rates::get_rate(&conn, &provider, "USD", "EUR", d).unwrap().unwrap();
    assert_eq!(first.rate, dec("0.9"));
    assert_eq!(provider.call_count(), 1);

    // Second lookup is a cache hit; the provider is not consulted again.
    let second = rates::get_rate(&conn, &provider, "USD", "EUR", d).unwrap().unwrap();
    assert_eq!(second.rate, dec("0.9"));
    assert_eq!(provider.call_count(), 1);
}

#[test]
fn distinct_dates_are_distinct_cache_entries() {
    let conn = setup();
    let provider = StubProvider::returning(dec("0.9"));

    rates::get_rate(&conn, &provider, "USD", "EUR", date("2024-01-15")).unwrap();
    rates::get_rate(&conn, &provider, "USD", "EUR", date("2024-01-16")).unwrap();
    assert_eq!(provider.call_count(), 2);
}

#[test]
fn provider_failure_is_a_miss_with_nothing_stored() {
    let conn = setup();
    let provider = StubProvider::failing();
    let d = date("2024-01-15");

    let result = rates::get_rate(&conn, &provider, "USD", "EUR", d).unwrap();
    assert!(result.is_none());
    assert!(rates::find_rate(&conn, "USD", "EUR", d).unwrap().is_none());
}

#[test]
fn provider_missing_data_is_a_miss() {
    let conn = setup();
    let provider = StubProvider::empty();
    let result = rates::get_rate(&conn, &provider, "USD", "EUR", date("2024-01-15")).unwrap();
    assert!(result.is_none());
    assert_eq!(provider.call_count(), 1);
}

#[test]
fn unsupported_currencies_are_rejected_with_field_map() {
    let conn = setup();
    let d = date("2024-01-15");

    match rates::log_rate(&conn, "XXX", "USD", d, dec("1.0")) {
        Err(Error::Validation(errors)) => {
            assert!(errors.contains_key("base_currency"));
            assert!(!errors.contains_key("target_currency"));
        }
        _ => panic!("expected validation error"),
    }

    match rates::log_rate(&conn, "USD", "ZZZ", d, dec("1.0")) {
        Err(Error::Validation(errors)) => {
            assert!(errors.contains_key("target_currency"));
        }
        _ => panic!("expected validation error"),
    }
}

#[test]
fn nonpositive_rate_is_rejected() {
    let conn = setup();
    match rates::log_rate(&conn, "USD", "EUR", date("2024-01-15"), dec("0")) {
        Err(Error::Validation(errors)) => assert!(errors.contains_key("rate")),
        _ => panic!("expected validation error"),
    }
}

#[test]
fn duplicate_triple_is_integrity_error() {
    let conn = setup();
    let d = date("2024-01-15");
    rates::log_rate(&conn, "USD", "EUR", d, dec("1.1")).unwrap();
    let dup = rates::log_rate(&conn, "USD", "EUR", d, dec("1.2"));
    assert!(matches!(dup, Err(Error::Integrity)));

    // Same pair on another date is a fresh entry.
    rates::log_rate(&conn, "USD", "EUR", date("2024-01-16"), dec("1.2")).unwrap();
}

#[test]
fn change_rate_revalidates_and_overwrites() {
    let conn = setup();
    let d = date("2024-01-15");
    let logged = rates::log_rate(&conn, "USD", "EUR", d, dec("1.1")).unwrap();

    let invalid = rates::change_rate(&conn, &logged, dec("-1"));
    assert!(matches!(invalid, Err(Error::Validation(_))));

    rates::change_rate(&conn, &logged, dec("1.25")).unwrap();
    let reloaded = rates::find_rate(&conn, "USD", "EUR", d).unwrap().unwrap();
    assert_eq!(reloaded.rate, dec("1.25"));
}

#[test]
fn delete_rate_removes_the_entry() {
    let conn = setup();
    let d = date("2024-01-15");
    let logged = rates::log_rate(&conn, "USD", "EUR", d, dec("1.1")).unwrap();

    rates::delete_rate(&conn, &logged).unwrap();
    assert!(rates::find_rate(&conn, "USD", "EUR", d).unwrap().is_none());
    assert!(matches!(rates::delete_rate(&conn, &logged), Err(Error::NotFound)));
}

#[test]
fn get_details_reports_all_fields() {
    let conn = setup();
    let logged = rates::log_rate(&conn, "USD", "EUR", date("2024-01-15"), dec("1.1")).unwrap();
    let details = rates::get_details(&logged);
    assert!(details.contains("Base Currency: USD"));
    assert!(details.contains("Target Currency: EUR"));
    assert!(details.contains("Date: 2024-01-15"));
    assert!(details.contains("Rate: 1.1"));
}
