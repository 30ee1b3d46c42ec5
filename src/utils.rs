// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;

use crate::models::money;

const UA: &str = concat!(
    "zakahclip/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/zakahclip)"
);

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// `--date` if given, otherwise today (UTC).
pub fn date_or_today(raw: Option<&String>) -> Result<NaiveDate> {
    match raw {
        Some(s) => parse_date(s.trim()),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Strict parse for configuration values, where a typo must not become zero.
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, money::round(*d))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_keeps_trailing_zeros() {
        assert_eq!(fmt_money(&dec!(250), "USD"), "USD 250.00");
        assert_eq!(fmt_money(&dec!(14.875), "GBP"), "GBP 14.88");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("2025-02-30").is_err());
        assert_eq!(
            parse_date("2025-08-01").unwrap(),
            NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()
        );
    }
}
