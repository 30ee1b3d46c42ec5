// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Metal;
use crate::prices::{api_key_from_env, fetch_metal_prices};
use crate::utils::{date_or_today, http_client, maybe_print_json, parse_decimal, pretty_table};
use anyhow::{bail, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(conn, sub)?,
        Some(("fetch", _)) => fetch(conn, chrono::Utc::now().date_naive())?,
        Some(("list", sub)) => list(conn, sub.get_flag("json"))?,
        _ => {}
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let metal: Metal = sub.get_one::<String>("metal").unwrap().parse()?;
    let price = parse_decimal(sub.get_one::<String>("price").unwrap())?;
    if price <= rust_decimal::Decimal::ZERO {
        bail!("Price per gram must be positive, got {}", price);
    }
    let date = date_or_today(sub.get_one::<String>("date"))?;
    crate::db::upsert_metal_price(conn, date, metal, price, "manual")?;
    println!("{} on {} = USD {}/g", metal, date, price);
    Ok(())
}

pub fn fetch(conn: &Connection, date: NaiveDate) -> Result<()> {
    let key = api_key_from_env()?;
    let client = http_client()?;
    let prices = fetch_metal_prices(&client, &key)?;
    crate::db::store_metal_prices(conn, date, &prices, "apised")?;
    println!("Metal prices fetched via APISED.");
    Ok(())
}

#[derive(Debug, Serialize)]
struct PriceRow {
    date: String,
    metal: String,
    price: String,
    source: String,
}

fn list(conn: &Connection, json: bool) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT date, metal, price, source FROM metal_prices ORDER BY date DESC, metal LIMIT 50",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(PriceRow {
            date: r.get(0)?,
            metal: r.get(1)?,
            price: r.get(2)?,
            source: r.get(3)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    if !maybe_print_json(json, &data)? {
        let table_rows = data
            .into_iter()
            .map(|p| vec![p.date, p.metal, p.price, p.source])
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Metal", "USD/g", "Source"], table_rows)
        );
    }
    Ok(())
}
