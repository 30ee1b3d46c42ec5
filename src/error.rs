// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures the calculator reports to its caller. Malformed amounts are never
/// an error here: they are clamped to zero before computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZakahError {
    /// Requested currency is outside USD, INR, PKR, EUR, GBP.
    #[error("unsupported currency '{0}' (expected one of USD, INR, PKR, EUR, GBP)")]
    UnsupportedCurrency(String),

    /// A price per gram or conversion rate is missing or not positive.
    #[error("invalid price data: {0}")]
    InvalidPriceData(String),

    #[error("invalid zakah configuration: {0}")]
    InvalidConfig(String),
}

pub type ZakahResult<T> = std::result::Result<T, ZakahError>;
