// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{ZakahError, ZakahResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Currencies a calculation may be requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "PKR")]
    Pkr,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Inr,
        Currency::Pkr,
        Currency::Eur,
        Currency::Gbp,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Inr => "INR",
            Currency::Pkr => "PKR",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ZakahError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or_else(|| ZakahError::UnsupportedCurrency(s.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
}

impl Metal {
    pub const ALL: [Metal; 2] = [Metal::Gold, Metal::Silver];

    /// ISO 4217 commodity code, as used by metal price feeds.
    pub fn symbol(&self) -> &'static str {
        match self {
            Metal::Gold => "XAU",
            Metal::Silver => "XAG",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metal::Gold => "gold",
            Metal::Silver => "silver",
        }
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metal {
    type Err = ZakahError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gold" | "xau" => Ok(Metal::Gold),
            "silver" | "xag" => Ok(Metal::Silver),
            other => Err(ZakahError::InvalidPriceData(format!(
                "unknown metal '{}', expected gold or silver",
                other
            ))),
        }
    }
}

/// Parse a user supplied amount, falling back to zero for anything that is
/// not a finite decimal ("", "abc", "NaN", "inf", out of range).
pub fn parse_amount_lenient(s: &str) -> Decimal {
    let s = s.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .unwrap_or(Decimal::ZERO)
}

fn amount_from_value(v: &serde_json::Value) -> Decimal {
    match v {
        serde_json::Value::Number(n) => parse_amount_lenient(&n.to_string()),
        serde_json::Value::String(s) => parse_amount_lenient(s),
        _ => Decimal::ZERO,
    }
}

fn lenient_amount<'de, D>(de: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(de)?;
    Ok(v.as_ref().map(amount_from_value).unwrap_or(Decimal::ZERO))
}

fn default_currency_code() -> String {
    Currency::Usd.code().to_string()
}

/// Holdings for one calculation. Metal quantities are in grams; monetary
/// amounts are in the price table's reference currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetInput {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub gold_grams: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub silver_grams: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub cash: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub business_assets: Decimal,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub liabilities: Decimal,
    /// Raw code as received; validated by the calculator.
    #[serde(default = "default_currency_code")]
    pub currency: String,
}

impl Default for AssetInput {
    fn default() -> Self {
        Self {
            gold_grams: Decimal::ZERO,
            silver_grams: Decimal::ZERO,
            cash: Decimal::ZERO,
            business_assets: Decimal::ZERO,
            liabilities: Decimal::ZERO,
            currency: default_currency_code(),
        }
    }
}

impl AssetInput {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            ..Self::default()
        }
    }

    pub fn gold_grams(mut self, grams: Decimal) -> Self {
        self.gold_grams = grams;
        self
    }

    pub fn silver_grams(mut self, grams: Decimal) -> Self {
        self.silver_grams = grams;
        self
    }

    pub fn cash(mut self, amount: Decimal) -> Self {
        self.cash = amount;
        self
    }

    pub fn business_assets(mut self, amount: Decimal) -> Self {
        self.business_assets = amount;
        self
    }

    pub fn liabilities(mut self, amount: Decimal) -> Self {
        self.liabilities = amount;
        self
    }

    /// Copy with every negative quantity replaced by zero.
    pub fn clamped(&self) -> Self {
        let floor = |d: Decimal| d.max(Decimal::ZERO);
        Self {
            gold_grams: floor(self.gold_grams),
            silver_grams: floor(self.silver_grams),
            cash: floor(self.cash),
            business_assets: floor(self.business_assets),
            liabilities: floor(self.liabilities),
            currency: self.currency.clone(),
        }
    }
}

/// Metal prices and conversion rates for a single calculation.
///
/// `rates` maps a quote currency to how many quote units one unit of the
/// reference currency buys. The reference currency itself converts at 1 when
/// it has no entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    pub reference: Currency,
    pub metals: BTreeMap<Metal, Decimal>,
    pub rates: BTreeMap<Currency, Decimal>,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new(Currency::Usd)
    }
}

impl PriceTable {
    pub fn new(reference: Currency) -> Self {
        Self {
            reference,
            metals: BTreeMap::new(),
            rates: BTreeMap::new(),
        }
    }

    pub fn with_metal(mut self, metal: Metal, price_per_gram: Decimal) -> Self {
        self.metals.insert(metal, price_per_gram);
        self
    }

    pub fn with_rate(mut self, quote: Currency, rate: Decimal) -> Self {
        self.rates.insert(quote, rate);
        self
    }

    /// Replace entries with those in `newer`, keeping anything it lacks.
    pub fn overlay(&mut self, newer: &PriceTable) {
        self.metals.extend(newer.metals.iter().map(|(m, p)| (*m, *p)));
        self.rates.extend(newer.rates.iter().map(|(c, r)| (*c, *r)));
    }

    pub fn price_per_gram(&self, metal: Metal) -> ZakahResult<Decimal> {
        match self.metals.get(&metal) {
            Some(p) if p.is_sign_positive() && !p.is_zero() => Ok(*p),
            Some(p) => Err(ZakahError::InvalidPriceData(format!(
                "{} price per gram must be positive, got {}",
                metal, p
            ))),
            None => Err(ZakahError::InvalidPriceData(format!(
                "missing {} price per gram",
                metal
            ))),
        }
    }

    pub fn conversion_rate(&self, quote: Currency) -> ZakahResult<Decimal> {
        match self.rates.get(&quote) {
            Some(r) if r.is_sign_positive() && !r.is_zero() => Ok(*r),
            Some(r) => Err(ZakahError::InvalidPriceData(format!(
                "{}/{} conversion rate must be positive, got {}",
                self.reference, quote, r
            ))),
            None if quote == self.reference => Ok(Decimal::ONE),
            None => Err(ZakahError::InvalidPriceData(format!(
                "missing {}/{} conversion rate",
                self.reference, quote
            ))),
        }
    }
}

/// Which metal mass defines the Nisab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NisabPolicy {
    #[default]
    Silver,
    Gold,
    /// Whichever of the gold and silver thresholds is lower.
    LowerOfTwo,
}

impl NisabPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NisabPolicy::Silver => "silver",
            NisabPolicy::Gold => "gold",
            NisabPolicy::LowerOfTwo => "lower-of-two",
        }
    }
}

impl fmt::Display for NisabPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NisabPolicy {
    type Err = ZakahError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "silver" => Ok(NisabPolicy::Silver),
            "gold" => Ok(NisabPolicy::Gold),
            "lower" | "lower-of-two" | "lower_of_two" => Ok(NisabPolicy::LowerOfTwo),
            other => Err(ZakahError::InvalidConfig(format!(
                "unknown nisab policy '{}', expected silver, gold or lower-of-two",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NisabConfig {
    pub policy: NisabPolicy,
    pub gold_grams: Decimal,
    pub silver_grams: Decimal,
}

impl Default for NisabConfig {
    fn default() -> Self {
        Self {
            policy: NisabPolicy::default(),
            gold_grams: dec!(85),
            silver_grams: dec!(595),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZakahConfig {
    pub nisab: NisabConfig,
    pub rate: Decimal,
}

impl Default for ZakahConfig {
    fn default() -> Self {
        Self {
            nisab: NisabConfig::default(),
            rate: dec!(0.025),
        }
    }
}

/// Outcome of one calculation, all amounts in `currency`.
///
/// Amounts keep full precision in memory and are rounded to 2 places only
/// when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    #[serde(with = "money")]
    pub total_assets: Decimal,
    #[serde(with = "money")]
    pub nisab_threshold: Decimal,
    #[serde(with = "money")]
    pub zakah_payable: Decimal,
    pub currency: Currency,
    pub local_currency: Currency,
    #[serde(default)]
    pub nisab_policy: NisabPolicy,
    pub message: String,
}

impl CalculationResult {
    pub fn is_due(&self) -> bool {
        self.zakah_payable > Decimal::ZERO
    }

    /// Copy with amounts rounded the way they go over the wire.
    pub fn rounded(&self) -> Self {
        Self {
            total_assets: money::round(self.total_assets),
            nisab_threshold: money::round(self.nisab_threshold),
            zakah_payable: money::round(self.zakah_payable),
            ..self.clone()
        }
    }
}

/// Wire format for monetary amounts: an exact JSON number with 2 decimal
/// places, never routed through f64.
pub mod money {
    use rust_decimal::{Decimal, RoundingStrategy};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn round(d: Decimal) -> Decimal {
        d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn serialize<S>(d: &Decimal, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut r = round(*d);
        r.rescale(2);
        rust_decimal::serde::arbitrary_precision::serialize(&r, s)
    }

    pub fn deserialize<'de, D>(de: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = serde_json::Value::deserialize(de)?;
        let raw = match &v {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) => s.trim().to_string(),
            other => return Err(D::Error::custom(format!("expected amount, got {}", other))),
        };
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map(round)
            .map_err(|e| D::Error::custom(format!("invalid amount '{}': {}", raw, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_codes_are_case_insensitive() {
        assert_eq!(" inr ".parse::<Currency>().unwrap(), Currency::Inr);
        assert_eq!("Gbp".parse::<Currency>().unwrap(), Currency::Gbp);
        assert_eq!(
            "XYZ".parse::<Currency>(),
            Err(ZakahError::UnsupportedCurrency("XYZ".into()))
        );
        assert!("".parse::<Currency>().is_err());
    }

    #[test]
    fn lenient_amounts_fall_back_to_zero() {
        assert_eq!(parse_amount_lenient("12.50"), dec!(12.50));
        assert_eq!(parse_amount_lenient(" 1e3 "), dec!(1000));
        assert_eq!(parse_amount_lenient("abc"), Decimal::ZERO);
        assert_eq!(parse_amount_lenient("NaN"), Decimal::ZERO);
        assert_eq!(parse_amount_lenient("inf"), Decimal::ZERO);
        assert_eq!(parse_amount_lenient(""), Decimal::ZERO);
    }

    #[test]
    fn asset_input_from_partial_json() {
        let input: AssetInput = serde_json::from_str(
            r#"{"gold_grams": "10", "cash": 250.5, "business_assets": null, "liabilities": "oops"}"#,
        )
        .unwrap();
        assert_eq!(input.gold_grams, dec!(10));
        assert_eq!(input.silver_grams, Decimal::ZERO);
        assert_eq!(input.cash, dec!(250.5));
        assert_eq!(input.business_assets, Decimal::ZERO);
        assert_eq!(input.liabilities, Decimal::ZERO);
        assert_eq!(input.currency, "USD");
    }

    #[test]
    fn clamped_zeroes_negatives_only() {
        let input = AssetInput::new("EUR")
            .gold_grams(dec!(-3))
            .cash(dec!(40))
            .liabilities(dec!(-100))
            .clamped();
        assert_eq!(input.gold_grams, Decimal::ZERO);
        assert_eq!(input.cash, dec!(40));
        assert_eq!(input.liabilities, Decimal::ZERO);
        assert_eq!(input.currency, "EUR");
    }

    #[test]
    fn reference_currency_converts_at_par() {
        let prices = PriceTable::new(Currency::Usd).with_rate(Currency::Inr, dec!(83));
        assert_eq!(prices.conversion_rate(Currency::Usd).unwrap(), Decimal::ONE);
        assert_eq!(prices.conversion_rate(Currency::Inr).unwrap(), dec!(83));
        assert!(matches!(
            prices.conversion_rate(Currency::Pkr),
            Err(ZakahError::InvalidPriceData(_))
        ));
    }

    #[test]
    fn overlay_prefers_newer_quotes() {
        let mut stored = PriceTable::new(Currency::Usd)
            .with_metal(Metal::Gold, dec!(70))
            .with_metal(Metal::Silver, dec!(0.9))
            .with_rate(Currency::Pkr, dec!(280));
        let live = PriceTable::new(Currency::Usd)
            .with_metal(Metal::Gold, dec!(75))
            .with_rate(Currency::Inr, dec!(83));
        stored.overlay(&live);
        assert_eq!(stored.metals[&Metal::Gold], dec!(75));
        assert_eq!(stored.metals[&Metal::Silver], dec!(0.9));
        assert_eq!(stored.rates[&Currency::Pkr], dec!(280));
        assert_eq!(stored.rates[&Currency::Inr], dec!(83));
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(money::round(dec!(2.345)), dec!(2.35));
        assert_eq!(money::round(dec!(2.344)), dec!(2.34));
        assert_eq!(money::round(dec!(0.125)), dec!(0.13));
    }

    #[test]
    fn policy_names_parse() {
        assert_eq!("lower".parse::<NisabPolicy>().unwrap(), NisabPolicy::LowerOfTwo);
        assert_eq!("GOLD".parse::<NisabPolicy>().unwrap(), NisabPolicy::Gold);
        assert!(matches!(
            "copper".parse::<NisabPolicy>(),
            Err(ZakahError::InvalidConfig(_))
        ));
        assert!(matches!(
            "platinum".parse::<Metal>(),
            Err(ZakahError::InvalidPriceData(_))
        ));
        assert_eq!("xag".parse::<Metal>().unwrap(), Metal::Silver);
    }
}
