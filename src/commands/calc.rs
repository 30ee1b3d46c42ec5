// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calculator::ZakahCalculator;
use crate::models::{parse_amount_lenient, AssetInput, CalculationResult};
use crate::prices::{api_key_from_env, live_price_table};
use crate::utils::{date_or_today, fmt_money, http_client, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use tracing::{debug, info};

fn amount_arg(sub: &clap::ArgMatches, name: &str) -> rust_decimal::Decimal {
    sub.get_one::<String>(name)
        .map(|s| parse_amount_lenient(s))
        .unwrap_or_default()
}

/// Unparseable amounts become zero rather than aborting the calculation.
pub fn input_from_args(sub: &clap::ArgMatches) -> AssetInput {
    let currency = sub
        .get_one::<String>("currency")
        .map(|s| s.trim().to_uppercase())
        .unwrap_or_else(|| "USD".to_string());
    AssetInput::new(currency)
        .gold_grams(amount_arg(sub, "gold"))
        .silver_grams(amount_arg(sub, "silver"))
        .cash(amount_arg(sub, "cash"))
        .business_assets(amount_arg(sub, "business"))
        .liabilities(amount_arg(sub, "liabilities"))
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let date = date_or_today(sub.get_one::<String>("date"))?;
    let input = input_from_args(sub);
    debug!(?input, %date, "calculating");

    let calc = ZakahCalculator::new(crate::db::load_config(conn)?)?;
    let mut prices = crate::db::load_price_table(conn, date)?;
    // Live quotes are used for this calculation only; the store keeps the
    // dated history written by `prices fetch` / `fx fetch`.
    if sub.get_flag("live") {
        let live = live_price_table(&http_client()?, &api_key_from_env()?)?;
        prices.overlay(&live);
    }
    let res = calc.calculate(&input, &prices)?;
    info!(currency = %res.currency, due = res.is_due(), "calculation complete");

    if !maybe_print_json(sub.get_flag("json"), &res)? {
        println!("{}", render(&res));
    }
    Ok(())
}

pub fn render(res: &CalculationResult) -> comfy_table::Table {
    let ccy = res.currency.code();
    let rows = vec![
        vec!["Net assets".to_string(), fmt_money(&res.total_assets, ccy)],
        vec![
            format!("Nisab ({})", res.nisab_policy),
            fmt_money(&res.nisab_threshold, ccy),
        ],
        vec!["Zakah payable".to_string(), fmt_money(&res.zakah_payable, ccy)],
        vec!["Status".to_string(), res.message.clone()],
    ];
    pretty_table(&["Item", "Value"], rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn garbage_amounts_become_zero() {
        let m = crate::cli::build_cli()
            .try_get_matches_from([
                "zakahclip", "calc", "--gold", "ten", "--cash", "1500.75", "--currency", "pkr",
            ])
            .unwrap();
        let (_, sub) = m.subcommand().unwrap();
        let input = input_from_args(sub);
        assert_eq!(input.gold_grams, Decimal::ZERO);
        assert_eq!(input.cash, dec!(1500.75));
        assert_eq!(input.currency, "PKR");
    }
}
