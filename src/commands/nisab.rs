// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calculator::ZakahCalculator;
use crate::db::{load_config, save_config};
use crate::models::ZakahConfig;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, sub.get_flag("json"))?,
        Some(("set", sub)) => set(conn, sub)?,
        _ => show(conn, false)?,
    }
    Ok(())
}

fn show(conn: &Connection, json: bool) -> Result<()> {
    let config = load_config(conn)?;
    if !maybe_print_json(json, &config)? {
        println!("{}", render(&config));
    }
    Ok(())
}

fn render(config: &ZakahConfig) -> comfy_table::Table {
    let rows = vec![
        vec!["Policy".to_string(), config.nisab.policy.to_string()],
        vec!["Gold mass (g)".to_string(), config.nisab.gold_grams.to_string()],
        vec!["Silver mass (g)".to_string(), config.nisab.silver_grams.to_string()],
        vec!["Rate".to_string(), config.rate.to_string()],
    ];
    pretty_table(&["Setting", "Value"], rows)
}

/// Applies only the options given; the merged result must be a valid
/// calculator configuration before anything is stored.
pub fn apply(mut config: ZakahConfig, sub: &clap::ArgMatches) -> Result<ZakahConfig> {
    if let Some(p) = sub.get_one::<String>("policy") {
        config.nisab.policy = p.parse()?;
    }
    if let Some(g) = sub.get_one::<String>("gold-grams") {
        config.nisab.gold_grams = parse_decimal(g)?;
    }
    if let Some(s) = sub.get_one::<String>("silver-grams") {
        config.nisab.silver_grams = parse_decimal(s)?;
    }
    if let Some(r) = sub.get_one::<String>("rate") {
        config.rate = parse_decimal(r)?;
    }
    ZakahCalculator::new(config.clone())?;
    Ok(config)
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let config = apply(load_config(conn)?, sub)?;
    save_config(conn, &config)?;
    info!(policy = %config.nisab.policy, rate = %config.rate, "nisab settings saved");
    println!("{}", render(&config));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NisabPolicy;
    use rust_decimal_macros::dec;

    fn set_matches(args: &[&str]) -> clap::ArgMatches {
        let mut argv = vec!["zakahclip", "nisab", "set"];
        argv.extend_from_slice(args);
        let m = crate::cli::build_cli().try_get_matches_from(argv).unwrap();
        let (_, nisab) = m.subcommand().unwrap();
        let (_, set) = nisab.subcommand().unwrap();
        set.clone()
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let sub = set_matches(&["--policy", "lower-of-two"]);
        let config = apply(ZakahConfig::default(), &sub).unwrap();
        assert_eq!(config.nisab.policy, NisabPolicy::LowerOfTwo);
        assert_eq!(config.nisab.silver_grams, dec!(595));
        assert_eq!(config.rate, dec!(0.025));
    }

    #[test]
    fn invalid_rate_is_rejected() {
        let sub = set_matches(&["--rate", "1.5"]);
        assert!(apply(ZakahConfig::default(), &sub).is_err());
    }
}
