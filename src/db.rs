// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::{Currency, Metal, NisabConfig, PriceTable, ZakahConfig};
use crate::prices::FxQuotes;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Zakahclip", "zakahclip"));

pub const DB_ENV: &str = "ZAKAHCLIP_DB";

pub fn db_path() -> Result<PathBuf> {
    if let Ok(p) = std::env::var(DB_ENV) {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p));
        }
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("zakahclip.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    open_at(&db_path()?)
}

pub fn open_at(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "price store ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    -- price per gram in USD
    CREATE TABLE IF NOT EXISTS metal_prices(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        metal TEXT NOT NULL CHECK(metal IN ('gold','silver')),
        price TEXT NOT NULL,
        source TEXT NOT NULL,
        UNIQUE(date, metal)
    );
    CREATE INDEX IF NOT EXISTS idx_metal_prices_date ON metal_prices(date);

    -- FX rates: store base->quote rate (1 base = rate quote) per day
    CREATE TABLE IF NOT EXISTS fx_rates(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        base TEXT NOT NULL,
        quote TEXT NOT NULL,
        rate TEXT NOT NULL,
        UNIQUE(date, base, quote)
    );
    "#,
    )?;
    Ok(())
}

pub fn upsert_metal_price(
    conn: &Connection,
    date: NaiveDate,
    metal: Metal,
    price: Decimal,
    source: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO metal_prices(date, metal, price, source) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(date, metal) DO UPDATE SET price=excluded.price, source=excluded.source",
        params![date.to_string(), metal.as_str(), price.to_string(), source],
    )?;
    Ok(())
}

pub fn upsert_fx_rate(
    conn: &Connection,
    date: NaiveDate,
    base: Currency,
    quote: Currency,
    rate: Decimal,
) -> Result<()> {
    conn.execute(
        "INSERT INTO fx_rates(date, base, quote, rate) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(date, base, quote) DO UPDATE SET rate=excluded.rate",
        params![date.to_string(), base.code(), quote.code(), rate.to_string()],
    )?;
    Ok(())
}

pub fn store_metal_prices(
    conn: &Connection,
    date: NaiveDate,
    prices: &BTreeMap<Metal, Decimal>,
    source: &str,
) -> Result<usize> {
    for (metal, price) in prices {
        upsert_metal_price(conn, date, *metal, *price, source)?;
    }
    Ok(prices.len())
}

/// Store fetched quotes under the date the feed reports, else `fallback`.
/// Returns the supported currencies the feed had no rate for.
pub fn store_fx_quotes(
    conn: &Connection,
    fallback: NaiveDate,
    fx: &FxQuotes,
) -> Result<Vec<Currency>> {
    let date = fx.date.unwrap_or(fallback);
    let mut missing = Vec::new();
    for quote in Currency::ALL.into_iter().filter(|c| *c != fx.base) {
        match fx.rates.get(&quote) {
            Some(rate) => upsert_fx_rate(conn, date, fx.base, quote, *rate)?,
            None => missing.push(quote),
        }
    }
    debug!(%date, stored = Currency::ALL.len() - 1 - missing.len(), "fx quotes stored");
    Ok(missing)
}

fn latest_metal_price(conn: &Connection, date: NaiveDate, metal: Metal) -> Result<Option<Decimal>> {
    let mut stmt = conn.prepare(
        "SELECT price FROM metal_prices WHERE metal=?1 AND date<=?2 ORDER BY date DESC LIMIT 1",
    )?;
    let r: Option<String> = stmt
        .query_row(params![metal.as_str(), date.to_string()], |r| r.get(0))
        .optional()?;
    r.map(|s| {
        s.parse::<Decimal>()
            .with_context(|| format!("Invalid {} price '{}'", metal, s))
    })
    .transpose()
}

fn latest_fx_rate(
    conn: &Connection,
    date: NaiveDate,
    base: Currency,
    quote: Currency,
) -> Result<Option<Decimal>> {
    let mut stmt = conn.prepare(
        "SELECT rate FROM fx_rates WHERE base=?1 AND quote=?2 AND date<=?3 ORDER BY date DESC LIMIT 1",
    )?;
    let r: Option<String> = stmt
        .query_row(params![base.code(), quote.code(), date.to_string()], |r| r.get(0))
        .optional()?;
    r.map(|s| {
        s.parse::<Decimal>()
            .with_context(|| format!("Invalid rate '{}' for {}/{}", s, base, quote))
    })
    .transpose()
}

/// Build a USD price table from the closest on-or-before rows. Missing rows
/// are left out; the calculator reports them as invalid price data.
pub fn load_price_table(conn: &Connection, date: NaiveDate) -> Result<PriceTable> {
    let mut table = PriceTable::new(Currency::Usd);
    for metal in Metal::ALL {
        if let Some(p) = latest_metal_price(conn, date, metal)? {
            table.metals.insert(metal, p);
        }
    }
    for quote in Currency::ALL {
        if quote == table.reference {
            continue;
        }
        if let Some(r) = latest_fx_rate(conn, date, table.reference, quote)? {
            table.rates.insert(quote, r);
        }
    }
    debug!(%date, metals = table.metals.len(), rates = table.rates.len(), "price table loaded");
    Ok(table)
}

fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

fn decimal_setting(conn: &Connection, key: &str, default: Decimal) -> Result<Decimal> {
    match get_setting(conn, key)? {
        Some(s) => s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid setting {}='{}'", key, s)),
        None => Ok(default),
    }
}

/// Stored configuration, with defaults for anything never set.
pub fn load_config(conn: &Connection) -> Result<ZakahConfig> {
    let defaults = ZakahConfig::default();
    let policy = match get_setting(conn, "nisab_policy")? {
        Some(s) => s.parse()?,
        None => defaults.nisab.policy,
    };
    Ok(ZakahConfig {
        nisab: NisabConfig {
            policy,
            gold_grams: decimal_setting(conn, "nisab_gold_grams", defaults.nisab.gold_grams)?,
            silver_grams: decimal_setting(
                conn,
                "nisab_silver_grams",
                defaults.nisab.silver_grams,
            )?,
        },
        rate: decimal_setting(conn, "zakah_rate", defaults.rate)?,
    })
}

pub fn save_config(conn: &Connection, config: &ZakahConfig) -> Result<()> {
    set_setting(conn, "nisab_policy", config.nisab.policy.as_str())?;
    set_setting(conn, "nisab_gold_grams", &config.nisab.gold_grams.to_string())?;
    set_setting(conn, "nisab_silver_grams", &config.nisab.silver_grams.to_string())?;
    set_setting(conn, "zakah_rate", &config.rate.to_string())?;
    Ok(())
}
