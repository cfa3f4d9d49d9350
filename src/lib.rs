// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod cli;
pub mod commands;
pub mod currencies;
pub mod db;
pub mod error;
pub mod models;
pub mod provider;
pub mod services;
pub mod utils;

pub use error::{Error, ValidationErrors};
