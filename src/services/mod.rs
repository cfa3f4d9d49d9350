// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod rates;
pub mod transactions;
pub mod users;

use rust_decimal::Decimal;

/// Decode a TEXT decimal column inside a rusqlite row closure.
pub(crate) fn decimal_column(idx: usize, raw: String) -> rusqlite::Result<Decimal> {
    raw.parse::<Decimal>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
