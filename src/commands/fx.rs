// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Currency;
use crate::prices::fetch_fx_rates;
use crate::utils::{date_or_today, http_client, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{bail, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use tracing::warn;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("fetch", _)) => fetch(conn, chrono::Utc::now().date_naive())?,
        Some(("list", sub)) => list_rates(conn, sub.get_flag("json"))?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let quote: Currency = sub.get_one::<String>("quote").unwrap().parse()?;
    if quote == Currency::Usd {
        bail!("USD is the reference currency; its rate is always 1");
    }
    let rate = parse_decimal(sub.get_one::<String>("rate").unwrap())?;
    if rate <= rust_decimal::Decimal::ZERO {
        bail!("Rate must be positive, got {}", rate);
    }
    let date = date_or_today(sub.get_one::<String>("date"))?;
    crate::db::upsert_fx_rate(conn, date, Currency::Usd, quote, rate)?;
    println!("1 USD = {} {} on {}", rate, quote, date);
    Ok(())
}

/// Stores rates under the feed's date, or `date` when it reports none;
/// currencies the ECB does not publish (PKR) must be set manually.
pub fn fetch(conn: &Connection, date: NaiveDate) -> Result<()> {
    let client = http_client()?;
    let fx = fetch_fx_rates(&client, Currency::Usd, &Currency::ALL)?;
    for quote in crate::db::store_fx_quotes(conn, date, &fx)? {
        warn!(%quote, "no rate published; set it with `fx set`");
    }
    println!("FX rates fetched via Frankfurter (ECB).");
    Ok(())
}

#[derive(Debug, Serialize)]
struct RateRow {
    date: String,
    base: String,
    quote: String,
    rate: String,
}

fn list_rates(conn: &Connection, json: bool) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT date, base, quote, rate FROM fx_rates ORDER BY date DESC, base, quote LIMIT 50",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(RateRow {
            date: r.get(0)?,
            base: r.get(1)?,
            quote: r.get(2)?,
            rate: r.get(3)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json, &data)? {
        let table_rows = data
            .into_iter()
            .map(|r| vec![r.date, r.base, r.quote, r.rate])
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Base", "Quote", "Rate"], table_rows)
        );
    }
    Ok(())
}
