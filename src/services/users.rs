// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! User accounts: registration, authentication, and the cached running
//! balance. `apply_balance_delta` is the only sanctioned balance mutator;
//! every transaction-side effect routes through it.

use crate::error::{Error, ValidationErrors};
use crate::models::{BalanceChange, User};
use crate::services::decimal_column;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

static HAS_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]").unwrap());
static HAS_LOWER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]").unwrap());
static HAS_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]").unwrap());
static HAS_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).unwrap());

/// Register a new user with a zero-initialized balance. The username
/// uniqueness check rides on the UNIQUE constraint, surfaced as
/// [`Error::Integrity`].
pub fn register(conn: &Connection, username: &str, password: &str) -> Result<User, Error> {
    if let Some(errors) = validate_username(username) {
        return Err(Error::Validation(errors));
    }
    if let Some(errors) = validate_password(password) {
        return Err(Error::Validation(errors));
    }

    let hash =
        bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| Error::Hash(e.to_string()))?;
    conn.execute(
        "INSERT INTO users(username, password_hash, account_balance) VALUES (?1, ?2, '0')",
        params![username, hash],
    )?;
    info!("registered user '{}'", username);
    Ok(User {
        id: conn.last_insert_rowid(),
        username: username.to_string(),
        password_hash: hash,
        account_balance: Decimal::ZERO,
    })
}

/// Check credentials. Absent user and wrong password both come back as
/// `Ok(None)`; the distinction is only logged, so the response shape does
/// not leak which usernames exist.
pub fn authenticate(
    conn: &Connection,
    username: &str,
    password: &str,
) -> Result<Option<User>, Error> {
    let user = match find_by_username(conn, username)? {
        Some(u) => u,
        None => {
            debug!("login failed for '{}': no such user", username);
            return Ok(None);
        }
    };
    let matches =
        bcrypt::verify(password, &user.password_hash).map_err(|e| Error::Hash(e.to_string()))?;
    if matches {
        info!("logged in as '{}'", username);
        Ok(Some(user))
    } else {
        debug!("login failed for '{}': password mismatch", username);
        Ok(None)
    }
}

pub fn change_password(conn: &Connection, username: &str, new_password: &str) -> Result<(), Error> {
    if let Some(errors) = validate_password(new_password) {
        return Err(Error::Validation(errors));
    }
    let user = find_by_username(conn, username)?.ok_or(Error::NotFound)?;
    let hash =
        bcrypt::hash(new_password, bcrypt::DEFAULT_COST).map_err(|e| Error::Hash(e.to_string()))?;
    conn.execute(
        "UPDATE users SET password_hash=?1 WHERE id=?2",
        params![hash, user.id],
    )?;
    info!("changed password for '{}'", username);
    Ok(())
}

/// Delete an account after password re-confirmation. Owned transactions go
/// with it via the FK cascade. `Ok(false)` on mismatch or absent user.
pub fn delete(conn: &Connection, username: &str, password: &str) -> Result<bool, Error> {
    let user = match find_by_username(conn, username)? {
        Some(u) => u,
        None => {
            debug!("deletion failed: user '{}' does not exist", username);
            return Ok(false);
        }
    };
    let matches =
        bcrypt::verify(password, &user.password_hash).map_err(|e| Error::Hash(e.to_string()))?;
    if !matches {
        debug!("deletion failed for '{}': password mismatch", username);
        return Ok(false);
    }
    conn.execute("DELETE FROM users WHERE id=?1", params![user.id])?;
    info!("deleted user '{}'", username);
    Ok(true)
}

pub fn find_by_username(conn: &Connection, username: &str) -> Result<Option<User>, Error> {
    let user = conn
        .query_row(
            "SELECT id, username, password_hash, account_balance FROM users WHERE username=?1",
            params![username],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

pub fn get_balance(conn: &Connection, user_id: i64) -> Result<Decimal, Error> {
    let balance = conn
        .query_row(
            "SELECT account_balance FROM users WHERE id=?1",
            params![user_id],
            |r| decimal_column(0, r.get::<_, String>(0)?),
        )
        .optional()?;
    balance.ok_or(Error::NotFound)
}

/// Apply a signed adjustment to the cached balance and return the new value.
/// On persistence failure the stored balance is unchanged and the error goes
/// back to the caller; there is no retry.
pub fn apply_balance_delta(
    conn: &Connection,
    user_id: i64,
    amount: Decimal,
    change: BalanceChange,
) -> Result<Decimal, Error> {
    let current = get_balance(conn, user_id)?;
    let new_balance = match change {
        BalanceChange::Increment => current + amount,
        BalanceChange::Decrement => current - amount,
    };
    debug!(
        "balance for user {}: {} -> {} ({:?} {})",
        user_id, current, new_balance, change, amount
    );
    let updated = conn
        .execute(
            "UPDATE users SET account_balance=?1 WHERE id=?2",
            params![new_balance.to_string(), user_id],
        )
        .inspect_err(|e| warn!("balance update failed for user {}: {}", user_id, e))?;
    if updated == 0 {
        return Err(Error::NotFound);
    }
    Ok(new_balance)
}

fn row_to_user(r: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get(0)?,
        username: r.get(1)?,
        password_hash: r.get(2)?,
        account_balance: decimal_column(3, r.get::<_, String>(3)?)?,
    })
}

// Username requirement: at least 4 characters.
fn validate_username(username: &str) -> Option<ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if username.chars().count() < 4 {
        errors.insert("length", "Username must be at least 4 characters long".into());
    }
    (!errors.is_empty()).then_some(errors)
}

// Password requirements: at least 8 characters, with at least one uppercase
// letter, one lowercase letter, one digit, and one symbol.
fn validate_password(password: &str) -> Option<ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if password.chars().count() < 8 {
        errors.insert("length", "Password must be at least 8 characters long".into());
    }
    if !HAS_UPPER.is_match(password) {
        errors.insert(
            "capital",
            "Password must contain at least 1 capital letter".into(),
        );
    }
    if !HAS_LOWER.is_match(password) {
        errors.insert(
            "lowercase",
            "Password must contain at least 1 lowercase letter".into(),
        );
    }
    if !HAS_DIGIT.is_match(password) {
        errors.insert("number", "Password must contain at least 1 number".into());
    }
    if !HAS_SYMBOL.is_match(password) {
        errors.insert("symbol", "Password must contain at least 1 symbol".into());
    }
    (!errors.is_empty()).then_some(errors)
}
