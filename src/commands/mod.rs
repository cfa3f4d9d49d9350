// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod exporter;
pub mod rates;
pub mod transactions;
pub mod users;

use crate::error::Error;

/// Render a service-layer failure for the terminal. Errors are recovered
/// here; they never propagate out of a command handler.
pub(crate) fn report(e: &Error) {
    match e {
        Error::Validation(errors) => {
            println!("Validation errors:");
            for (field, msg) in errors {
                println!("  {}: {}", field, msg);
            }
        }
        Error::Integrity => println!("Conflict: a record with those unique fields already exists."),
        Error::NotFound => println!("Not found."),
        other => println!("Operation failed: {}", other),
    }
}
