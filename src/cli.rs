// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{command, Arg, ArgAction, Command};

fn amount(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("AMOUNT")
        .default_value("0")
        .allow_hyphen_values(true)
        .help(help)
}

fn date_arg() -> Arg {
    Arg::new("date")
        .long("date")
        .value_name("YYYY-MM-DD")
        .help("Price date (defaults to today)")
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

pub fn build_cli() -> Command {
    command!()
        .about("Zakah calculator with Nisab policies, metal prices and FX")
        .subcommand(Command::new("init").about("Create the local price store"))
        .subcommand(
            Command::new("calc")
                .about("Calculate Zakah on net assets")
                .arg(amount("gold", "Gold held, in grams"))
                .arg(amount("silver", "Silver held, in grams"))
                .arg(amount("cash", "Cash, in USD"))
                .arg(amount("business", "Business assets, in USD"))
                .arg(amount("liabilities", "Liabilities due, in USD"))
                .arg(
                    Arg::new("currency")
                        .long("currency")
                        .short('c')
                        .default_value("USD")
                        .help("Output currency: USD, INR, PKR, EUR or GBP"),
                )
                .arg(date_arg())
                .arg(
                    Arg::new("live")
                        .long("live")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("date")
                        .help("Use live metal prices and FX rates (not stored)"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("prices")
                .about("Metal prices per gram (USD)")
                .subcommand(
                    Command::new("set")
                        .about("Record a price manually")
                        .arg(Arg::new("metal").long("metal").required(true))
                        .arg(Arg::new("price").long("price").required(true))
                        .arg(date_arg()),
                )
                .subcommand(
                    Command::new("fetch")
                        .about("Fetch gold and silver prices (needs APISED_SECRET_KEY)"),
                )
                .subcommand(Command::new("list").about("Show recent prices").arg(json_flag())),
        )
        .subcommand(
            Command::new("fx")
                .about("Exchange rates from USD")
                .subcommand(
                    Command::new("set")
                        .about("Record a USD->quote rate manually")
                        .arg(Arg::new("quote").long("quote").required(true))
                        .arg(Arg::new("rate").long("rate").required(true))
                        .arg(date_arg()),
                )
                .subcommand(Command::new("fetch").about("Fetch rates via Frankfurter (ECB)"))
                .subcommand(Command::new("list").about("Show recent rates").arg(json_flag())),
        )
        .subcommand(
            Command::new("nisab")
                .about("Nisab policy and Zakah rate")
                .subcommand(Command::new("show").arg(json_flag()))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("policy")
                                .long("policy")
                                .help("silver, gold or lower-of-two"),
                        )
                        .arg(Arg::new("gold-grams").long("gold-grams"))
                        .arg(Arg::new("silver-grams").long("silver-grams"))
                        .arg(
                            Arg::new("rate")
                                .long("rate")
                                .help("Zakah rate as a fraction, e.g. 0.025"),
                        ),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check price and rate coverage")
                .arg(date_arg()),
        )
}
