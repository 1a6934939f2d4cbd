//! Pricing engine entry points.

use landed_common::{Product, RateQuote, Settings};
use tracing::debug;

use crate::error::{PricingError, PricingResult};
use crate::pipeline::{PricingContext, Step};

/// Deterministic landed cost and price computation.
///
/// Holds no state: the same product, settings, quote and override flag
/// always yield the same breakdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Recompute every derived field of `product`.
    ///
    /// With `price_overridden` the caller's `sale_price` is kept and only
    /// cost, fees and profit are recomputed against it.
    pub fn compute(
        &self,
        mut product: Product,
        settings: &Settings,
        quote: &RateQuote,
        price_overridden: bool,
    ) -> PricingResult<Product> {
        settings.validate().map_err(PricingError::InvalidSettings)?;
        // Stamped by the caller that records the result.
        product.priced_at = None;

        let mut ctx = PricingContext::new(product, settings, quote, price_overridden);
        for step in Step::ORDER {
            step.apply(&mut ctx);
            debug!(step = step.name(), "Pricing step applied");
        }

        let product = ctx.product;
        debug!(
            product_id = %product.id,
            total_cost = %product.total_cost,
            sale_price = %product.sale_price,
            rates_live = product.rates_live,
            "Product priced"
        );
        Ok(product)
    }
}

/// Price a product against an optional settings record.
///
/// Fails with [`PricingError::MissingSettings`] when no record is supplied.
pub fn compute_pricing(
    product: Product,
    settings: Option<&Settings>,
    quote: &RateQuote,
    price_overridden: bool,
) -> PricingResult<Product> {
    let settings = settings.ok_or(PricingError::MissingSettings)?;
    PricingEngine::new().compute(product, settings, quote, price_overridden)
}

#[cfg(test)]
mod tests {
    use super::*;
    use landed_common::ValidationError;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn sample_product() -> Product {
        Product::new("Sample", dec!(1000), dec!(2.5), 10).with_id(1)
    }

    fn live_quote() -> RateQuote {
        RateQuote::live(dec!(0.1388), dec!(1025.50))
    }

    #[test]
    fn test_reference_breakdown() {
        let settings = Settings::default();
        let product = PricingEngine::new()
            .compute(sample_product(), &settings, &live_quote(), false)
            .unwrap();

        assert_eq!(product.unit_fob_usd, dec!(138.80));
        assert_eq!(product.total_fob_usd, dec!(1388.00));
        assert_eq!(product.customs_duty, dec!(416.40));
        assert_eq!(product.statistics_duty, dec!(34.70));
        assert_eq!(product.taxable_base, dec!(1839.10));
        assert_eq!(product.import_vat, dec!(386.21));
        assert_eq!(product.total_cost, dec!(2942.40));
        assert_eq!(product.unit_cost_local, dec!(301743.12));

        // Fresh product: provisional price is zero, so only the first flat fee.
        assert_eq!(product.marketplace_fees, dec!(1115));
        assert_eq!(product.sale_price, dec!(465935.57));
        assert_eq!(product.suggested_price, product.sale_price);
        assert_eq!(product.net_profit, dec!(163077.45));
        assert_eq!(product.profit_pct, dec!(35.00));
        assert!(product.rates_live);
    }

    #[test]
    fn test_repricing_uses_previous_suggested_price_for_fees() {
        let settings = Settings::default();
        let engine = PricingEngine::new();
        let first = engine
            .compute(sample_product(), &settings, &live_quote(), false)
            .unwrap();
        let second = engine
            .compute(first.clone(), &settings, &live_quote(), false)
            .unwrap();

        // 465935.57 is above every flat fee bracket: commission only.
        assert_eq!(second.marketplace_fees, dec!(74549.69));
        assert!(second.sale_price > first.sale_price);
    }

    #[test]
    fn test_fallback_quote_uses_settings_rates() {
        let settings = Settings {
            foreign_usd_rate: dec!(0.14),
            ..Default::default()
        };
        let quote = RateQuote::live(dec!(0.5), dec!(1)).into_stale();

        let product = PricingEngine::new()
            .compute(sample_product(), &settings, &quote, false)
            .unwrap();

        assert_eq!(product.unit_fob_usd, dec!(140.00));
        assert!(!product.rates_live);
    }

    #[test]
    fn test_manual_price_is_kept() {
        let settings = Settings::default();
        let product = sample_product().with_sale_price(dec!(400000));

        let priced = PricingEngine::new()
            .compute(product, &settings, &live_quote(), true)
            .unwrap();

        assert_eq!(priced.sale_price, dec!(400000));
        assert_eq!(priced.suggested_price, dec!(400000));
        assert_eq!(priced.net_profit, dec!(400000) - dec!(301743.12) - dec!(1115));
        assert_eq!(priced.profit_pct, dec!(24.29));
        assert_eq!(priced.total_cost, dec!(2942.40));
    }

    #[test]
    fn test_manual_zero_price_has_zero_profit_pct() {
        let settings = Settings::default();
        let priced = PricingEngine::new()
            .compute(sample_product(), &settings, &live_quote(), true)
            .unwrap();

        assert_eq!(priced.sale_price, Decimal::ZERO);
        assert_eq!(priced.profit_pct, Decimal::ZERO);
        assert!(priced.net_profit < Decimal::ZERO);
    }

    #[test]
    fn test_zero_quantity_does_not_panic() {
        let settings = Settings::default();
        let mut product = sample_product();
        product.quantity = 0;

        let priced = PricingEngine::new()
            .compute(product, &settings, &live_quote(), false)
            .unwrap();

        assert_eq!(priced.unit_cost_usd, Decimal::ZERO);
        assert_eq!(priced.total_fob_usd, Decimal::ZERO);
    }

    #[test]
    fn test_previous_pricing_time_is_cleared() {
        let settings = Settings::default();
        let mut product = sample_product();
        product.priced_at = Some(landed_common::now());

        let priced = PricingEngine::new()
            .compute(product, &settings, &live_quote(), false)
            .unwrap();
        assert!(priced.priced_at.is_none());
    }

    #[test]
    fn test_settings_vat_applies_to_inheriting_product() {
        let settings = Settings {
            vat_pct: dec!(0.105),
            ..Default::default()
        };
        let priced = PricingEngine::new()
            .compute(sample_product(), &settings, &live_quote(), false)
            .unwrap();

        assert!(priced.vat_pct.is_none());
        assert_eq!(priced.import_vat, dec!(193.11));
        assert_eq!(priced.total_cost, dec!(2749.30));
    }

    #[test]
    fn test_missing_settings() {
        let result = compute_pricing(sample_product(), None, &live_quote(), false);
        assert_eq!(result, Err(PricingError::MissingSettings));
    }

    #[test]
    fn test_full_margin_is_rejected() {
        let settings = Settings {
            target_margin_pct: Decimal::ONE,
            ..Default::default()
        };
        let result = compute_pricing(sample_product(), Some(&settings), &live_quote(), false);
        assert_eq!(
            result,
            Err(PricingError::InvalidSettings(ValidationError::MarginTooHigh))
        );
    }

    fn fraction() -> impl Strategy<Value = Decimal> {
        (0u32..=1000).prop_map(|n| Decimal::new(n as i64, 3))
    }

    fn amount(max_cents: i64) -> impl Strategy<Value = Decimal> {
        (1i64..=max_cents).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #[test]
        fn prop_deterministic(
            value in amount(10_000_000),
            weight in amount(100_000),
            quantity in 1u32..10_000,
            duty in fraction(),
            previous in amount(100_000_000),
        ) {
            let settings = Settings::default();
            let mut product = Product::new("Prop", value, weight, quantity)
                .with_duties(duty, dec!(0.025), dec!(0.21));
            product.suggested_price = previous;
            let quote = live_quote();

            let a = PricingEngine::new().compute(product.clone(), &settings, &quote, false).unwrap();
            let b = PricingEngine::new().compute(product, &settings, &quote, false).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_total_cost_is_sum_of_components(
            value in amount(10_000_000),
            weight in amount(100_000),
            quantity in 1u32..10_000,
            duty in fraction(),
            statistics in fraction(),
            vat in fraction(),
        ) {
            let settings = Settings::default();
            let product = Product::new("Prop", value, weight, quantity)
                .with_duties(duty, statistics, vat);

            let priced = PricingEngine::new()
                .compute(product, &settings, &live_quote(), false)
                .unwrap();

            prop_assert_eq!(
                priced.total_cost,
                priced.customs_value
                    + priced.customs_duty
                    + priced.statistics_duty
                    + priced.import_vat
                    + priced.storage
                    + priced.freight
                    + priced.freight_surcharge
                    + priced.insurance
                    + priced.terminal_handling
            );
            prop_assert_eq!(priced.taxable_base, priced.customs_value + priced.customs_duty + priced.statistics_duty);
        }
    }
}
