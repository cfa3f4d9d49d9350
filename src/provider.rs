// Copyright (c) 2025 Budgetbook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::http_client;
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// External historical-FX source. Blocking; a missing quote for the requested
/// pair/date is `Ok(None)`, transport failures are `Err`.
pub trait RateProvider {
    fn fetch(&self, base: &str, target: &str, date: NaiveDate) -> Result<Option<Decimal>>;
}

/// Frankfurter (ECB) historical endpoint.
pub struct FrankfurterProvider {
    client: reqwest::blocking::Client,
}

impl FrankfurterProvider {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: http_client()?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DayRates {
    rates: HashMap<String, f64>,
    #[serde(rename = "base")]
    _base: String,
}

impl RateProvider for FrankfurterProvider {
    fn fetch(&self, base: &str, target: &str, date: NaiveDate) -> Result<Option<Decimal>> {
        let url = format!("https://api.frankfurter.dev/{date}?from={base}&to={target}");
        let resp = self.client.get(url).send()?;
        if !resp.status().is_success() {
            // The API answers 404 for unknown dates/currencies; treat as no data.
            return Ok(None);
        }
        let day: DayRates = resp.json()?;
        let rate = match day.rates.get(target) {
            Some(v) => v.to_string().parse::<Decimal>().ok(),
            None => None,
        };
        Ok(rate)
    }
}
