// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Conversion rates as a read-through cache: the `conversion_rates` table is
//! checked first, the external provider only on a miss, and fetched values
//! are written back so a (pair, date) triple is fetched at most once. No TTL;
//! a logged rate is treated as immutable truth unless explicitly changed.

use crate::currencies::is_supported;
use crate::error::{Error, ValidationErrors};
use crate::models::ConversionRate;
use crate::provider::RateProvider;
use crate::services::decimal_column;
use chrono::NaiveDate;
use log::{debug, info, warn};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

/// Look up the rate for `(base, target, date)`, consulting the provider only
/// on a cache miss. Provider failure or missing data comes back as
/// `Ok(None)`; only persistence faults are `Err`.
pub fn get_rate(
    conn: &Connection,
    provider: &dyn RateProvider,
    base: &str,
    target: &str,
    date: NaiveDate,
) -> Result<Option<ConversionRate>, Error> {
    if let Some(rate) = find_rate(conn, base, target, date)? {
        debug!("rate {}/{} on {} served from cache", base, target, date);
        return Ok(Some(rate));
    }

    debug!("rate {}/{} on {} not cached, fetching", base, target, date);
    let fetched = match provider.fetch(base, target, date) {
        Ok(Some(rate)) => rate,
        Ok(None) => {
            warn!("provider has no rate for {}/{} on {}", base, target, date);
            return Ok(None);
        }
        Err(e) => {
            warn!("rate fetch for {}/{} on {} failed: {}", base, target, date, e);
            return Ok(None);
        }
    };

    match log_rate(conn, base, target, date, fetched) {
        Ok(rate) => Ok(Some(rate)),
        Err(Error::Validation(errors)) => {
            warn!("fetched rate failed validation: {:?}", errors);
            Ok(None)
        }
        Err(Error::Integrity) => {
            warn!("rate {}/{} on {} already logged", base, target, date);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Persist a rate for `(base, target, date)`. Both codes must belong to the
/// supported-currency set and the rate must be positive.
pub fn log_rate(
    conn: &Connection,
    base: &str,
    target: &str,
    date: NaiveDate,
    rate: Decimal,
) -> Result<ConversionRate, Error> {
    if let Some(errors) = validate_rate(base, target, rate) {
        return Err(Error::Validation(errors));
    }
    conn.execute(
        "INSERT INTO conversion_rates(base, target, date, rate) VALUES (?1, ?2, ?3, ?4)",
        params![base, target, date, rate.to_string()],
    )?;
    info!("logged rate {}/{} on {} = {}", base, target, date, rate);
    Ok(ConversionRate {
        id: conn.last_insert_rowid(),
        base: base.to_string(),
        target: target.to_string(),
        date,
        rate,
    })
}

/// Overwrite the stored rate. The replacement is validated the same way a
/// new rate would be: it must be positive.
pub fn change_rate(
    conn: &Connection,
    conv_rate: &ConversionRate,
    new_rate: Decimal,
) -> Result<(), Error> {
    if new_rate <= Decimal::ZERO {
        let mut errors = ValidationErrors::new();
        errors.insert("rate", "Rate must be greater than 0".into());
        return Err(Error::Validation(errors));
    }
    let updated = conn.execute(
        "UPDATE conversion_rates SET rate=?1 WHERE id=?2",
        params![new_rate.to_string(), conv_rate.id],
    )?;
    if updated == 0 {
        return Err(Error::NotFound);
    }
    info!(
        "changed rate {}/{} on {} from {} to {}",
        conv_rate.base, conv_rate.target, conv_rate.date, conv_rate.rate, new_rate
    );
    Ok(())
}

pub fn delete_rate(conn: &Connection, conv_rate: &ConversionRate) -> Result<(), Error> {
    let deleted = conn.execute(
        "DELETE FROM conversion_rates WHERE id=?1",
        params![conv_rate.id],
    )?;
    if deleted == 0 {
        return Err(Error::NotFound);
    }
    info!(
        "deleted rate {}/{} on {}",
        conv_rate.base, conv_rate.target, conv_rate.date
    );
    Ok(())
}

pub fn find_rate(
    conn: &Connection,
    base: &str,
    target: &str,
    date: NaiveDate,
) -> Result<Option<ConversionRate>, Error> {
    let rate = conn
        .query_row(
            "SELECT id, base, target, date, rate FROM conversion_rates
             WHERE base=?1 AND target=?2 AND date=?3",
            params![base, target, date],
            row_to_rate,
        )
        .optional()?;
    Ok(rate)
}

pub fn list_rates(conn: &Connection, limit: usize) -> Result<Vec<ConversionRate>, Error> {
    let mut stmt = conn.prepare(
        "SELECT id, base, target, date, rate FROM conversion_rates
         ORDER BY date DESC, base, target LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], row_to_rate)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub fn get_details(conv_rate: &ConversionRate) -> String {
    format!(
        "Base Currency: {} Target Currency: {} Date: {} Rate: {}",
        conv_rate.base, conv_rate.target, conv_rate.date, conv_rate.rate
    )
}

fn row_to_rate(r: &rusqlite::Row<'_>) -> rusqlite::Result<ConversionRate> {
    Ok(ConversionRate {
        id: r.get(0)?,
        base: r.get(1)?,
        target: r.get(2)?,
        date: r.get(3)?,
        rate: decimal_column(4, r.get::<_, String>(4)?)?,
    })
}

fn validate_rate(base: &str, target: &str, rate: Decimal) -> Option<ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if !is_supported(base) {
        errors.insert(
            "base_currency",
            format!("Base currency {} is not supported", base),
        );
    }
    if !is_supported(target) {
        errors.insert(
            "target_currency",
            format!("Target currency {} is not supported", target),
        );
    }
    if rate <= Decimal::ZERO {
        errors.insert("rate", "Rate must be greater than 0".into());
    }
    (!errors.is_empty()).then_some(errors)
}
