// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction CRUD plus the balance-synchronization side effects that keep
//! `users.account_balance` equal to the signed sum of the owner's recorded
//! transactions. Balance adjustment runs only after the row mutation has
//! committed, so a failed insert can never move the balance.

use crate::error::{Error, ValidationErrors};
use crate::models::{
    BalanceChange, Transaction, TransactionFilter, TransactionKind, TransactionUpdate, User,
};
use crate::services::{decimal_column, users};
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{Connection, ToSql, params, params_from_iter};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Record a new transaction and adjust the owner's balance: Increment for
/// income, Decrement for expense.
pub fn create(
    conn: &Connection,
    user: &User,
    amount: Decimal,
    type_token: &str,
    date: NaiveDate,
    category_id: Option<i64>,
    description: Option<&str>,
) -> Result<Transaction, Error> {
    let mut errors = ValidationErrors::new();
    if amount < Decimal::ZERO {
        errors.insert("amount", "Amount cannot be negative.".into());
    }
    let kind = match TransactionKind::from_str(type_token) {
        Ok(kind) => kind,
        Err(msg) => {
            errors.insert("type", msg);
            return Err(Error::Validation(errors));
        }
    };
    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    conn.execute(
        "INSERT INTO transactions(user_id, amount, type, date, category_id, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id,
            amount.to_string(),
            kind.as_str(),
            date,
            category_id,
            description
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!("created transaction {} ({} {})", id, kind, amount);

    // The insert has committed; only now does the balance move.
    let change = match kind {
        TransactionKind::Income => BalanceChange::Increment,
        TransactionKind::Expense => BalanceChange::Decrement,
    };
    users::apply_balance_delta(conn, user.id, amount, change)?;

    Ok(Transaction {
        id,
        user_id: user.id,
        amount,
        kind,
        date,
        category_id,
        description: description.map(str::to_string),
    })
}

/// Delete a transaction and reverse its effect on the balance: a deleted
/// income decrements, a deleted expense increments.
pub fn delete(conn: &Connection, transaction: &Transaction) -> Result<(), Error> {
    let deleted = conn.execute(
        "DELETE FROM transactions WHERE id=?1",
        params![transaction.id],
    )?;
    if deleted == 0 {
        return Err(Error::NotFound);
    }
    info!("deleted transaction {}", transaction.id);

    let change = match transaction.kind {
        TransactionKind::Income => BalanceChange::Decrement,
        TransactionKind::Expense => BalanceChange::Increment,
    };
    users::apply_balance_delta(conn, transaction.user_id, transaction.amount, change)?;
    Ok(())
}

/// Partial update. The balance re-sync is two-sided: the original signed
/// amount is reversed and the new one applied, as a single net delta
/// `new_signed - old_signed`.
pub fn modify(
    conn: &Connection,
    transaction: &Transaction,
    update: TransactionUpdate,
) -> Result<Transaction, Error> {
    let merged = Transaction {
        id: transaction.id,
        user_id: transaction.user_id,
        amount: update.amount.unwrap_or(transaction.amount),
        kind: update.kind.unwrap_or(transaction.kind),
        date: update.date.unwrap_or(transaction.date),
        category_id: update.category_id.or(transaction.category_id),
        description: update.description.or_else(|| transaction.description.clone()),
    };
    if merged.amount < Decimal::ZERO {
        let mut errors = ValidationErrors::new();
        errors.insert("amount", "Amount cannot be negative.".into());
        return Err(Error::Validation(errors));
    }

    let updated = conn.execute(
        "UPDATE transactions SET amount=?1, type=?2, date=?3, category_id=?4, description=?5
         WHERE id=?6",
        params![
            merged.amount.to_string(),
            merged.kind.as_str(),
            merged.date,
            merged.category_id,
            merged.description,
            merged.id
        ],
    )?;
    if updated == 0 {
        return Err(Error::NotFound);
    }
    info!("updated transaction {}", merged.id);

    let delta = merged.signed_amount() - transaction.signed_amount();
    if !delta.is_zero() {
        let change = if delta > Decimal::ZERO {
            BalanceChange::Increment
        } else {
            BalanceChange::Decrement
        };
        users::apply_balance_delta(conn, merged.user_id, delta.abs(), change)?;
    }
    Ok(merged)
}

/// Query a user's transactions with the given optional predicates. Provided
/// predicates AND together; a default filter is a no-op and matches
/// everything. The result is never "null", just possibly empty.
pub fn get_by_filter(
    conn: &Connection,
    user_id: i64,
    filter: &TransactionFilter,
) -> Result<Vec<Transaction>, Error> {
    let mut sql = String::from(
        "SELECT id, user_id, amount, type, date, category_id, description
         FROM transactions WHERE user_id=?",
    );
    let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(user_id)];

    if let Some(id) = filter.id {
        sql.push_str(" AND id=?");
        args.push(Box::new(id));
    }
    if let Some(kind) = filter.kind {
        sql.push_str(" AND type=?");
        args.push(Box::new(kind.as_str()));
    }
    if let Some(category_id) = filter.category_id {
        sql.push_str(" AND category_id=?");
        args.push(Box::new(category_id));
    }
    sql.push_str(" ORDER BY date DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params_from_iter(args.iter().map(|a| a.as_ref())),
        row_to_transaction,
    )?;

    // Amount bounds and keyword matching run on the decoded rows: amounts are
    // stored as TEXT, and SQL text comparison would misorder decimals.
    let mut out = Vec::new();
    for row in rows {
        let t = row?;
        if let Some(min) = filter.min_amount {
            if t.amount < min {
                continue;
            }
        }
        if let Some(max) = filter.max_amount {
            if t.amount > max {
                continue;
            }
        }
        if !filter.description_keywords.is_empty() && !matches_any_keyword(&t, filter) {
            continue;
        }
        out.push(t);
    }
    debug!("filter matched {} transaction(s) for user {}", out.len(), user_id);
    Ok(out)
}

pub fn get_all(conn: &Connection, user_id: i64) -> Result<Vec<Transaction>, Error> {
    get_by_filter(conn, user_id, &TransactionFilter::default())
}

/// The user's most recent transactions, date descending (id descending as
/// the tiebreak for same-day rows).
pub fn get_recent(conn: &Connection, user_id: i64, limit: usize) -> Result<Vec<Transaction>, Error> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, amount, type, date, category_id, description
         FROM transactions WHERE user_id=?1 ORDER BY date DESC, id DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![user_id, limit as i64], row_to_transaction)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn find_by_id(
    conn: &Connection,
    user_id: i64,
    id: i64,
) -> Result<Option<Transaction>, Error> {
    let filter = TransactionFilter {
        id: Some(id),
        ..Default::default()
    };
    Ok(get_by_filter(conn, user_id, &filter)?.into_iter().next())
}

/// Human-readable field dump for display and debugging.
pub fn describe(transaction: &Transaction) -> String {
    format!(
        "Transaction id: {}, User: {}, Amount: {}, Type: {}, Date: {}, Category: {}, Description: {}",
        transaction.id,
        transaction.user_id,
        transaction.amount,
        transaction.kind,
        transaction.date,
        transaction
            .category_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string()),
        transaction.description.as_deref().unwrap_or("-"),
    )
}

// OR across keywords: one case-insensitive substring hit is enough.
fn matches_any_keyword(t: &Transaction, filter: &TransactionFilter) -> bool {
    let description = match &t.description {
        Some(d) => d.to_lowercase(),
        None => return false,
    };
    filter
        .description_keywords
        .iter()
        .any(|k| description.contains(&k.to_lowercase()))
}

fn row_to_transaction(r: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let kind_raw: String = r.get(3)?;
    let kind = TransactionKind::from_str(&kind_raw).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown transaction type '{kind_raw}'").into(),
        )
    })?;
    Ok(Transaction {
        id: r.get(0)?,
        user_id: r.get(1)?,
        amount: decimal_column(2, r.get::<_, String>(2)?)?,
        kind,
        date: r.get(4)?,
        category_id: r.get(5)?,
        description: r.get(6)?,
    })
}
