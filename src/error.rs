// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use thiserror::Error as ThisError;

/// Field name to human-readable message, surfaced to the caller verbatim
/// when input fails validation. No persistence is attempted in that case.
pub type ValidationErrors = BTreeMap<&'static str, String>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("validation failed: {}", format_validation(.0))]
    Validation(ValidationErrors),

    /// A uniqueness or foreign-key constraint rejected the mutation. The
    /// statement-level transaction already rolled back; no partial state
    /// survives.
    #[error("integrity constraint violated")]
    Integrity,

    #[error("record not found")]
    NotFound,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Db(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        if is_constraint_violation(&e) {
            Error::Integrity
        } else {
            Error::Db(e)
        }
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn format_validation(errors: &ValidationErrors) -> String {
    errors
        .iter()
        .map(|(field, msg)| format!("{}: {}", field, msg))
        .collect::<Vec<_>>()
        .join("; ")
}
