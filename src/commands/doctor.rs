// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calculator::ZakahCalculator;
use crate::models::{Currency, Metal, PriceTable};
use crate::utils::{date_or_today, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

/// Every problem that would make a calculation on `prices` fail.
pub fn find_issues(config_ok: Result<(), String>, prices: &PriceTable) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    // 1) Configuration
    if let Err(e) = config_ok {
        rows.push(vec!["bad_config".into(), e]);
    }

    // 2) Metal prices
    for metal in Metal::ALL {
        if let Err(e) = prices.price_per_gram(metal) {
            rows.push(vec!["missing_price".into(), e.to_string()]);
        }
    }

    // 3) FX coverage
    for ccy in Currency::ALL {
        if let Err(e) = prices.conversion_rate(ccy) {
            rows.push(vec!["missing_fx".into(), e.to_string()]);
        }
    }
    rows
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = date_or_today(sub.get_one::<String>("date"))?;
    let config_ok = crate::db::load_config(conn)
        .and_then(|c| ZakahCalculator::new(c).map_err(Into::into))
        .map(|_| ())
        .map_err(|e| e.to_string());
    let prices = crate::db::load_price_table(conn, date)?;
    let rows = find_issues(config_ok, &prices);

    if rows.is_empty() {
        println!("✅ doctor: no issues found for {}", date);
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
