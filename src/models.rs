// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub account_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Whether a transaction adds to or takes from the owner's balance.
///
/// Parsed case-insensitively at the boundary ("income", "Income", "inCOME"
/// all resolve) and never carried as a string internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("Unknown type: {}", other.to_uppercase())),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a cached-balance adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceChange {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub date: NaiveDate,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}

impl Transaction {
    /// Amount with the sign the kind implies: positive income, negative
    /// expense. Used for balance arithmetic; the stored amount is unsigned.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRate {
    pub id: i64,
    pub base: String,
    pub target: String,
    pub date: NaiveDate,
    pub rate: Decimal,
}

/// Optional predicates for transaction queries. Absent fields are not
/// applied; provided fields combine with logical AND. Keywords OR together.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub id: Option<i64>,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<i64>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub description_keywords: Vec<String>,
}

/// Partial update for a transaction; `None` preserves the current value.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub amount: Option<Decimal>,
    pub kind: Option<TransactionKind>,
    pub date: Option<NaiveDate>,
    pub category_id: Option<i64>,
    pub description: Option<String>,
}
