// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use zakahclip::{AssetInput, CalculationResult, Currency, Metal, PriceTable, ZakahCalculator};

fn prices() -> PriceTable {
    PriceTable::new(Currency::Usd)
        .with_metal(Metal::Gold, dec!(75.3317))
        .with_metal(Metal::Silver, dec!(0.9871))
        .with_rate(Currency::Inr, dec!(83.1234))
        .with_rate(Currency::Pkr, dec!(280))
}

#[test]
fn request_body_is_lenient() {
    let body = r#"{
        "gold_grams": "12.5",
        "silver_grams": "not a number",
        "cash": 15000,
        "liabilities": -100,
        "currency": "INR"
    }"#;
    let input: AssetInput = serde_json::from_str(body).unwrap();
    assert_eq!(input.gold_grams, dec!(12.5));
    assert_eq!(input.silver_grams, Decimal::ZERO);
    assert_eq!(input.business_assets, Decimal::ZERO);

    let res = ZakahCalculator::default().calculate(&input, &prices()).unwrap();
    let without_liabilities = AssetInput {
        liabilities: Decimal::ZERO,
        ..input
    };
    let expected = ZakahCalculator::default()
        .calculate(&without_liabilities, &prices())
        .unwrap();
    assert_eq!(res, expected);
}

#[test]
fn response_shape() {
    let input = AssetInput::new("USD").cash(dec!(10000));
    let res = ZakahCalculator::default().calculate(&input, &prices()).unwrap();
    let v = serde_json::to_value(&res).unwrap();
    assert!(v["total_assets"].is_number());
    assert_eq!(v["total_assets"].to_string(), "10000.00");
    assert_eq!(v["nisab_threshold"].to_string(), "587.32");
    assert_eq!(v["zakah_payable"].to_string(), "250.00");
    assert_eq!(v["currency"], "USD");
    assert_eq!(v["local_currency"], "USD");
    assert_eq!(v["nisab_policy"], "silver");
    assert_eq!(v["message"], "Zakah is due");
}

#[test]
fn result_survives_the_wire() {
    let input = AssetInput::new("INR")
        .gold_grams(dec!(13.37))
        .silver_grams(dec!(211))
        .cash(dec!(1234.567))
        .liabilities(dec!(99.99));
    let res = ZakahCalculator::default().calculate(&input, &prices()).unwrap();
    let body = serde_json::to_string(&res).unwrap();
    let back: CalculationResult = serde_json::from_str(&body).unwrap();
    assert_eq!(back, res.rounded());
    assert!(back.total_assets.scale() <= 2);

    // Beyond f64's exact integer range, amounts must still come back intact.
    let large = AssetInput::new("PKR").cash(dec!(10000000000000000.01));
    let res = ZakahCalculator::default().calculate(&large, &prices()).unwrap();
    let body = serde_json::to_string(&res).unwrap();
    assert!(body.contains(r#""total_assets":2800000000000000002.80"#));
    let back: CalculationResult = serde_json::from_str(&body).unwrap();
    assert_eq!(back, res.rounded());
    assert_eq!(back.total_assets, dec!(2800000000000000002.80));
    assert_eq!(back.zakah_payable, dec!(70000000000000000.07));
}

#[test]
fn response_amounts_accept_strings() {
    let body = r#"{"total_assets":"100.005","nisab_threshold":595,"zakah_payable":0,
        "currency":"USD","local_currency":"USD","message":"Below Nisab, no Zakah due"}"#;
    let res: CalculationResult = serde_json::from_str(body).unwrap();
    assert_eq!(res.total_assets, dec!(100.01));
    assert!(!res.is_due());
}
