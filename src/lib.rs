// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod calculator;
pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod models;
pub mod prices;
pub mod utils;

pub use calculator::ZakahCalculator;
pub use error::ZakahError;
pub use models::{AssetInput, CalculationResult, Currency, Metal, NisabPolicy, PriceTable};
