//! Integration tests for markup and margin pricing

use rust_decimal::Decimal;
use testresult::TestResult;

use pod_calc::{
    pricing::{
        PricingError,
        v1::{PricingRequestV1, PricingRuleV1, PricingV1Outcome},
        v2::{PricingRequest, PricingRuleV2},
    },
    products::ProductType,
    rule::Rule,
    rulebook::RuleBook,
};

fn ends_in_ninety_nine(price: Decimal) -> bool {
    price.fract() == Decimal::new(99, 2)
}

#[test]
fn every_product_gets_a_charm_price_above_cost() -> TestResult {
    let rule_book = RuleBook::default();
    let markup = rule_book.pricing_v1();
    let margin = rule_book.pricing_v2();

    for product_type in ProductType::ALL {
        let PricingV1Outcome::Priced(v1) =
            markup.evaluate(&PricingRequestV1::new(product_type.as_str()))?
        else {
            return Err(format!("{product_type} was rejected").into());
        };

        assert!(ends_in_ninety_nine(v1.recommended_price));
        assert!(ends_in_ninety_nine(v1.minimum_price));
        assert!(v1.recommended_price >= v1.base_cost);

        let v2 = margin.evaluate(&PricingRequest::new(product_type.as_str()))?;

        assert!(ends_in_ninety_nine(v2.recommended_price));
        assert!(v2.recommended_price >= v2.base_cost);
        assert!(v2.price_range.min <= v2.recommended_price);
        assert!(v2.recommended_price <= v2.price_range.max);
    }

    Ok(())
}

#[test]
fn mug_markup_price() -> TestResult {
    let outcome = PricingRuleV1::default().evaluate(&PricingRequestV1::new("mug"))?;
    let json = serde_json::to_value(&outcome)?;

    assert_eq!(json["recommended_price"], 20.99);
    assert_eq!(json["minimum_price"], 29.99);
    assert_eq!(json["cost_breakdown"]["platform_fees_estimate"], 4.72);

    Ok(())
}

#[test]
fn unknown_product_policies_differ_between_strategies() -> TestResult {
    let outcome = PricingRuleV1::default().evaluate(&PricingRequestV1::new("blanket"))?;
    assert!(outcome.is_rejected());

    let result = PricingRuleV2::default().evaluate(&PricingRequest::new("blanket"));
    assert!(matches!(result, Err(PricingError::UnknownProduct { .. })));

    Ok(())
}

#[test]
fn margin_outside_band_warns_but_prices() -> TestResult {
    let request = PricingRequest::new("mug").with_margin(Decimal::new(6, 1));
    let result = PricingRuleV2::default().evaluate(&request)?;

    assert_eq!(result.recommended_price, Decimal::new(2599, 2));
    assert_eq!(result.warnings.len(), 1);

    Ok(())
}

#[test]
fn expensive_price_against_cheap_competitors_warns() -> TestResult {
    let request = PricingRequest::new("hoodie")
        .with_competitor_prices(vec![Decimal::new(2000, 2), Decimal::new(2200, 2)]);
    let result = PricingRuleV2::default().evaluate(&request)?;

    let analysis = result.competitor_analysis.ok_or("expected competitor analysis")?;
    assert_eq!(analysis.count, 2);
    assert_eq!(analysis.average, Decimal::new(2100, 2));
    assert!(result.warnings.iter().any(|warning| warning.contains("above")));

    Ok(())
}

#[test]
fn rule_book_fees_flow_into_prices() -> TestResult {
    let rule_book = RuleBook::from_yaml_str("fees:\n  total_percent: 0.0\n")?;
    let result = rule_book
        .pricing_v2()
        .evaluate(&PricingRequest::new("mug").with_margin(Decimal::new(5, 1)))?;

    // 8 / 0.5 = 16.00
    assert_eq!(result.recommended_price, Decimal::new(1699, 2));
    assert_eq!(result.breakdown.platform_fees, Decimal::ZERO);

    Ok(())
}

#[test]
fn extreme_competitor_prices_never_panic() -> TestResult {
    let rule = PricingRuleV2::default();

    let cheap =
        rule.evaluate(&PricingRequest::new("mug").with_competitor_prices([Decimal::new(1, 2)]))?;
    let analysis = cheap
        .competitor_analysis
        .ok_or("expected competitor analysis")?;

    // (15.99 - 0.01) / 0.01 = 1598
    assert_eq!(analysis.deviation_percent, Decimal::new(159_800, 0));
    assert!(cheap.warnings.iter().any(|warning| warning.contains("above")));

    assert_eq!(
        rule.evaluate(&PricingRequest::new("mug").with_competitor_prices([Decimal::new(1, 28)])),
        Err(PricingError::Overflow)
    );

    Ok(())
}
