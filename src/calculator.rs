// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{ZakahError, ZakahResult};
use crate::models::{
    AssetInput, CalculationResult, Currency, Metal, NisabConfig, NisabPolicy, PriceTable,
    ZakahConfig,
};
use rust_decimal::Decimal;

pub const MSG_DUE: &str = "Zakah is due";
pub const MSG_BELOW_NISAB: &str = "Below Nisab, no Zakah due";

/// Stateless Zakah calculator. Holds only validated configuration, so one
/// instance can be shared freely across threads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZakahCalculator {
    config: ZakahConfig,
}

impl ZakahCalculator {
    pub fn new(config: ZakahConfig) -> ZakahResult<Self> {
        let NisabConfig {
            gold_grams,
            silver_grams,
            ..
        } = &config.nisab;
        if *gold_grams <= Decimal::ZERO || *silver_grams <= Decimal::ZERO {
            return Err(ZakahError::InvalidConfig(format!(
                "nisab masses must be positive (gold {}g, silver {}g)",
                gold_grams, silver_grams
            )));
        }
        if config.rate <= Decimal::ZERO || config.rate > Decimal::ONE {
            return Err(ZakahError::InvalidConfig(format!(
                "rate must be in (0, 1], got {}",
                config.rate
            )));
        }
        Ok(Self { config })
    }

    /// Nisab in the price table's reference currency.
    pub fn nisab_threshold(&self, prices: &PriceTable) -> ZakahResult<Decimal> {
        let nisab = &self.config.nisab;
        let by_gold = || -> ZakahResult<Decimal> {
            Ok(nisab.gold_grams.saturating_mul(prices.price_per_gram(Metal::Gold)?))
        };
        let by_silver = || -> ZakahResult<Decimal> {
            Ok(nisab.silver_grams.saturating_mul(prices.price_per_gram(Metal::Silver)?))
        };
        match nisab.policy {
            NisabPolicy::Gold => by_gold(),
            NisabPolicy::Silver => by_silver(),
            NisabPolicy::LowerOfTwo => Ok(by_gold()?.min(by_silver()?)),
        }
    }

    pub fn calculate(
        &self,
        input: &AssetInput,
        prices: &PriceTable,
    ) -> ZakahResult<CalculationResult> {
        let currency: Currency = input.currency.parse()?;
        let gold_price = prices.price_per_gram(Metal::Gold)?;
        let silver_price = prices.price_per_gram(Metal::Silver)?;
        let fx = prices.conversion_rate(currency)?;

        // Amounts beyond Decimal's range saturate at Decimal::MAX instead of
        // overflowing.
        let input = input.clamped();
        let gold_value = input.gold_grams.saturating_mul(gold_price);
        let silver_value = input.silver_grams.saturating_mul(silver_price);
        let gross = gold_value
            .saturating_add(silver_value)
            .saturating_add(input.cash)
            .saturating_add(input.business_assets);
        let net = gross.saturating_sub(input.liabilities).max(Decimal::ZERO);

        let total_assets = net.saturating_mul(fx);
        let nisab_threshold = self.nisab_threshold(prices)?.saturating_mul(fx);

        // Compare unrounded amounts; rounding first can flip a borderline case.
        let zakah_payable = if total_assets >= nisab_threshold {
            total_assets.saturating_mul(self.config.rate)
        } else {
            Decimal::ZERO
        };
        let message = if zakah_payable > Decimal::ZERO {
            MSG_DUE
        } else {
            MSG_BELOW_NISAB
        };

        Ok(CalculationResult {
            total_assets,
            nisab_threshold,
            zakah_payable,
            currency,
            local_currency: currency,
            nisab_policy: self.config.nisab.policy,
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn prices() -> PriceTable {
        PriceTable::new(Currency::Usd)
            .with_metal(Metal::Gold, dec!(75))
            .with_metal(Metal::Silver, dec!(1))
            .with_rate(Currency::Inr, dec!(83))
    }

    fn with_policy(policy: NisabPolicy) -> ZakahCalculator {
        let mut config = ZakahConfig::default();
        config.nisab.policy = policy;
        ZakahCalculator::new(config).unwrap()
    }

    #[test]
    fn nisab_follows_policy() {
        let p = prices();
        assert_eq!(with_policy(NisabPolicy::Silver).nisab_threshold(&p).unwrap(), dec!(595));
        assert_eq!(with_policy(NisabPolicy::Gold).nisab_threshold(&p).unwrap(), dec!(6375));
        assert_eq!(
            with_policy(NisabPolicy::LowerOfTwo).nisab_threshold(&p).unwrap(),
            dec!(595)
        );
    }

    #[test]
    fn lower_of_two_picks_gold_when_cheaper() {
        let p = PriceTable::new(Currency::Usd)
            .with_metal(Metal::Gold, dec!(2))
            .with_metal(Metal::Silver, dec!(1));
        assert_eq!(
            with_policy(NisabPolicy::LowerOfTwo).nisab_threshold(&p).unwrap(),
            dec!(170)
        );
    }

    #[test]
    fn converts_net_and_nisab_into_target_currency() {
        let calc = ZakahCalculator::default();
        let input = AssetInput::new("INR").cash(dec!(1000));
        let res = calc.calculate(&input, &prices()).unwrap();
        assert_eq!(res.total_assets, dec!(83000));
        assert_eq!(res.nisab_threshold, dec!(49385));
        assert_eq!(res.zakah_payable, dec!(2075));
        assert_eq!(res.currency, Currency::Inr);
        assert_eq!(res.local_currency, Currency::Inr);
    }

    #[test]
    fn liabilities_floor_net_at_zero() {
        let calc = ZakahCalculator::default();
        let input = AssetInput::new("USD").cash(dec!(100)).liabilities(dec!(500));
        let res = calc.calculate(&input, &prices()).unwrap();
        assert_eq!(res.total_assets, Decimal::ZERO);
        assert_eq!(res.zakah_payable, Decimal::ZERO);
        assert_eq!(res.message, MSG_BELOW_NISAB);
    }

    #[test]
    fn currency_is_checked_before_prices() {
        let calc = ZakahCalculator::default();
        let input = AssetInput::new("XYZ").cash(dec!(1));
        let err = calc.calculate(&input, &PriceTable::default()).unwrap_err();
        assert_eq!(err, ZakahError::UnsupportedCurrency("XYZ".into()));
    }

    #[test]
    fn rejects_bad_config() {
        let mut config = ZakahConfig::default();
        config.rate = dec!(0);
        assert!(matches!(
            ZakahCalculator::new(config),
            Err(ZakahError::InvalidConfig(_))
        ));

        let mut config = ZakahConfig::default();
        config.nisab.silver_grams = dec!(-1);
        assert!(ZakahCalculator::new(config).is_err());
    }

    #[test]
    fn custom_rate_applies() {
        let mut config = ZakahConfig::default();
        config.rate = dec!(0.1);
        let calc = ZakahCalculator::new(config).unwrap();
        let res = calc
            .calculate(&AssetInput::new("USD").cash(dec!(1000)), &prices())
            .unwrap();
        assert_eq!(res.zakah_payable, dec!(100));
    }
}
