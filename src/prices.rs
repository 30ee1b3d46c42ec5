// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Live metal prices (APISED) and FX rates (Frankfurter / ECB).

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::models::{Currency, Metal, PriceTable};

pub const APISED_URL: &str = "https://gold.g.apised.com/v1/latest";
pub const FRANKFURTER_URL: &str = "https://api.frankfurter.dev/latest";
pub const API_KEY_ENV: &str = "APISED_SECRET_KEY";

#[derive(Debug, Deserialize)]
struct MetalResponse {
    #[serde(default)]
    status: Option<String>,
    data: MetalData,
}

#[derive(Debug, Deserialize)]
struct MetalData {
    #[serde(default)]
    base_currency: Option<String>,
    #[serde(default)]
    metal_prices: HashMap<String, MetalQuote>,
    #[serde(default)]
    rates: HashMap<String, serde_json::Number>,
}

#[derive(Debug, Deserialize)]
struct MetalQuote {
    price: serde_json::Number,
}

#[derive(Debug, Deserialize)]
struct FxResponse {
    base: String,
    #[serde(default)]
    date: Option<String>,
    rates: HashMap<String, serde_json::Number>,
}

/// FX quotes for one day: one unit of `base` buys `rate` of each quote.
#[derive(Debug, Clone, PartialEq)]
pub struct FxQuotes {
    pub base: Currency,
    pub date: Option<NaiveDate>,
    pub rates: BTreeMap<Currency, Decimal>,
}

fn decimal_from_number(n: &serde_json::Number) -> Result<Decimal> {
    let raw = n.to_string();
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .with_context(|| format!("Invalid number '{}' in price feed", raw))
}

pub fn api_key_from_env() -> Result<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| anyhow!("{} is not set; live metal prices need an APISED key", API_KEY_ENV))
}

/// Parse an APISED `latest` body into USD prices per gram.
pub fn parse_metal_response(body: &str) -> Result<BTreeMap<Metal, Decimal>> {
    let resp: MetalResponse =
        serde_json::from_str(body).context("Unexpected metal price response")?;
    if let Some(status) = resp.status.as_deref() {
        if status != "success" {
            warn!(status, "metal price feed reported non-success status");
        }
    }
    if let Some(base) = resp.data.base_currency.as_deref() {
        if !base.eq_ignore_ascii_case(Currency::Usd.code()) {
            return Err(anyhow!("Metal prices quoted in {}, expected USD", base));
        }
    }
    let mut out = BTreeMap::new();
    for metal in Metal::ALL {
        let n = resp
            .data
            .metal_prices
            .get(metal.symbol())
            .map(|q| &q.price)
            .or_else(|| resp.data.rates.get(metal.symbol()))
            .with_context(|| format!("No {} ({}) price in response", metal, metal.symbol()))?;
        out.insert(metal, decimal_from_number(n)?);
    }
    Ok(out)
}

/// Parse a Frankfurter body, keeping only supported currencies.
pub fn parse_fx_response(body: &str) -> Result<FxQuotes> {
    let resp: FxResponse = serde_json::from_str(body).context("Unexpected FX response")?;
    let base: Currency = resp.base.parse()?;
    let date = resp
        .date
        .as_deref()
        .map(crate::utils::parse_date)
        .transpose()?;
    let mut rates = BTreeMap::new();
    for (code, n) in &resp.rates {
        match code.parse::<Currency>() {
            Ok(c) => {
                rates.insert(c, decimal_from_number(n)?);
            }
            Err(_) => debug!(code = %code, "skipping unsupported FX quote"),
        }
    }
    Ok(FxQuotes { base, date, rates })
}

pub fn fetch_metal_prices(client: &Client, api_key: &str) -> Result<BTreeMap<Metal, Decimal>> {
    let resp = client
        .get(APISED_URL)
        .query(&[
            ("metals", "XAU,XAG"),
            ("base_currency", "USD"),
            ("weight_unit", "gram"),
            ("currencies", "USD"),
        ])
        .header("x-api-key", api_key)
        .send()
        .context("Failed to fetch metal prices")?
        .error_for_status()?;
    let body = resp.text()?;
    let prices = parse_metal_response(&body)?;
    info!(?prices, "metal prices fetched");
    Ok(prices)
}

pub fn fetch_fx_rates(client: &Client, base: Currency, quotes: &[Currency]) -> Result<FxQuotes> {
    let to: Vec<&str> = quotes
        .iter()
        .filter(|c| **c != base)
        .map(|c| c.code())
        .collect();
    if to.is_empty() {
        return Ok(FxQuotes {
            base,
            date: None,
            rates: BTreeMap::new(),
        });
    }
    let to_param = to.join(",");
    let resp = client
        .get(FRANKFURTER_URL)
        .query(&[("from", base.code()), ("to", to_param.as_str())])
        .send()
        .context("Failed to fetch exchange rates")?
        .error_for_status()?;
    let body = resp.text()?;
    let fx = parse_fx_response(&body)?;
    info!(base = %fx.base, quotes = fx.rates.len(), "FX rates fetched via Frankfurter (ECB)");
    Ok(fx)
}

/// Price table built entirely from live sources, without touching the store.
pub fn live_price_table(client: &Client, api_key: &str) -> Result<PriceTable> {
    let metals = fetch_metal_prices(client, api_key)?;
    let fx = fetch_fx_rates(client, Currency::Usd, &Currency::ALL)?;
    let mut table = PriceTable::new(Currency::Usd);
    table.metals = metals;
    table.rates = fx.rates;
    Ok(table)
}
