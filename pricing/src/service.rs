//! Pricing service: stores + rate provider + engine.

use std::sync::Arc;

use landed_common::{now, Product, ProductId, Settings};
use landed_fx::QuoteProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::engine::PricingEngine;
use crate::error::{PricingError, PricingResult};
use crate::store::{ProductStore, SettingsStore};

/// Description given to products priced through [`PricingService::quick_quote`].
pub const QUICK_DESCRIPTION: &str = "Quick calculation";

/// Summary returned by a quick calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickQuote {
    pub total_cost_usd: Decimal,
    pub unit_cost_local: Decimal,
    pub suggested_price: Decimal,
    pub profit_pct: Decimal,
    pub rates_live: bool,
}

impl From<&Product> for QuickQuote {
    fn from(product: &Product) -> Self {
        Self {
            total_cost_usd: product.total_cost,
            unit_cost_local: product.unit_cost_local,
            suggested_price: product.suggested_price,
            profit_pct: product.profit_pct,
            rates_live: product.rates_live,
        }
    }
}

/// Prices products against the current settings and exchange rates.
pub struct PricingService {
    settings: Arc<dyn SettingsStore>,
    products: Arc<dyn ProductStore>,
    rates: Arc<dyn QuoteProvider>,
    engine: PricingEngine,
}

impl PricingService {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        products: Arc<dyn ProductStore>,
        rates: Arc<dyn QuoteProvider>,
    ) -> Self {
        Self {
            settings,
            products,
            rates,
            engine: PricingEngine::new(),
        }
    }

    /// The current settings record.
    pub fn settings(&self) -> PricingResult<Settings> {
        self.settings.current().ok_or(PricingError::MissingSettings)
    }

    /// Recompute every derived field of `product`.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn price_product(
        &self,
        product: Product,
        price_overridden: bool,
    ) -> PricingResult<Product> {
        let settings = match self.settings() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Pricing requested with no settings record");
                return Err(e);
            }
        };
        product.validate().map_err(PricingError::InvalidProduct)?;

        let quote = self.rates.acquire().await;
        if quote.is_fallback {
            warn!(quoted_at = %quote.quoted_at, "Pricing with fallback exchange rates");
        }

        let mut priced = self
            .engine
            .compute(product, &settings, &quote, price_overridden)?;
        priced.priced_at = Some(now());

        info!(
            product_id = %priced.id,
            total_cost = %priced.total_cost,
            sale_price = %priced.sale_price,
            profit_pct = %priced.profit_pct,
            rates_live = priced.rates_live,
            "Product priced"
        );
        Ok(priced)
    }

    /// Look a product up, price it and store the result.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn price_product_by_id(
        &self,
        id: ProductId,
        price_overridden: bool,
    ) -> PricingResult<Product> {
        let product = self
            .products
            .find(id)
            .ok_or(PricingError::ProductNotFound(id))?;

        let priced = self.price_product(product, price_overridden).await?;
        Ok(self.products.save(priced))
    }

    /// Price a throw-away product with default duties and automatic pricing.
    #[instrument(skip(self))]
    pub async fn quick_quote(
        &self,
        origin_unit_value: Decimal,
        unit_weight: Decimal,
        quantity: u32,
    ) -> PricingResult<QuickQuote> {
        let product = Product::new(QUICK_DESCRIPTION, origin_unit_value, unit_weight, quantity);
        let priced = self.price_product(product, false).await?;
        Ok(QuickQuote::from(&priced))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryProductStore, InMemorySettingsStore};
    use landed_common::{RateQuote, ValidationError};
    use landed_fx::{MockRateSource, RateProvider, SnapshotStore, StaticQuote};
    use rust_decimal_macros::dec;

    fn service_with(
        settings: InMemorySettingsStore,
        quote: RateQuote,
    ) -> (PricingService, Arc<InMemoryProductStore>) {
        let products = Arc::new(InMemoryProductStore::new());
        let service = PricingService::new(
            Arc::new(settings),
            products.clone(),
            Arc::new(StaticQuote(quote)),
        );
        (service, products)
    }

    fn live_quote() -> RateQuote {
        RateQuote::live(dec!(0.1388), dec!(1025.50))
    }

    fn sample_product() -> Product {
        Product::new("Sample", dec!(1000), dec!(2.5), 10)
    }

    #[tokio::test]
    async fn test_price_product_stamps_time() {
        let (service, _) = service_with(InMemorySettingsStore::seeded(), live_quote());

        let priced = service.price_product(sample_product(), false).await.unwrap();

        assert!(priced.priced_at.is_some());
        assert_eq!(priced.import_vat, dec!(386.21));
        assert!(priced.rates_live);
    }

    #[tokio::test]
    async fn test_missing_settings_is_surfaced() {
        let (service, _) = service_with(InMemorySettingsStore::empty(), live_quote());

        let err = service.price_product(sample_product(), false).await.unwrap_err();
        assert_eq!(err, PricingError::MissingSettings);
        assert_eq!(err.error_code(), "MISSING_SETTINGS");
    }

    #[tokio::test]
    async fn test_invalid_product_is_rejected() {
        let (service, _) = service_with(InMemorySettingsStore::seeded(), live_quote());
        let mut product = sample_product();
        product.quantity = 0;

        let err = service.price_product(product, false).await.unwrap_err();
        assert_eq!(err, PricingError::InvalidProduct(ValidationError::ZeroQuantity));
    }

    #[tokio::test]
    async fn test_price_by_id_saves_result() {
        let (service, products) = service_with(InMemorySettingsStore::seeded(), live_quote());
        let stored = products.save(sample_product());

        let priced = service.price_product_by_id(stored.id, false).await.unwrap();
        assert_eq!(priced.id, stored.id);

        let reloaded = products.find(stored.id).unwrap();
        assert_eq!(reloaded.sale_price, priced.sale_price);
        assert_eq!(reloaded.suggested_price, dec!(465935.57));
    }

    #[tokio::test]
    async fn test_price_by_unknown_id() {
        let (service, _) = service_with(InMemorySettingsStore::seeded(), live_quote());

        let err = service
            .price_product_by_id(ProductId::new(42), false)
            .await
            .unwrap_err();
        assert_eq!(err, PricingError::ProductNotFound(ProductId::new(42)));
        assert_eq!(err.error_code(), "ENTITY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_manual_override_by_id() {
        let (service, products) = service_with(InMemorySettingsStore::seeded(), live_quote());
        let stored = products.save(sample_product().with_sale_price(dec!(350000)));

        let priced = service.price_product_by_id(stored.id, true).await.unwrap();
        assert_eq!(priced.sale_price, dec!(350000));
        assert_eq!(priced.net_profit, dec!(350000) - dec!(301743.12) - dec!(1115));
    }

    #[tokio::test]
    async fn test_quick_quote() {
        let (service, _) = service_with(InMemorySettingsStore::seeded(), live_quote());

        let quick = service.quick_quote(dec!(1000), dec!(2.5), 10).await.unwrap();
        assert_eq!(quick.total_cost_usd, dec!(2942.40));
        assert_eq!(quick.unit_cost_local, dec!(301743.12));
        assert_eq!(quick.suggested_price, dec!(465935.57));
        assert_eq!(quick.profit_pct, dec!(35.00));
        assert!(quick.rates_live);
    }

    #[tokio::test]
    async fn test_settings_duties_reach_pricing() {
        let settings = Settings {
            vat_pct: dec!(0.105),
            ..Default::default()
        };
        let (service, _) = service_with(InMemorySettingsStore::with_settings(settings), live_quote());

        let priced = service.price_product(sample_product(), false).await.unwrap();
        assert_eq!(priced.import_vat, dec!(193.11));

        let quick = service.quick_quote(dec!(1000), dec!(2.5), 10).await.unwrap();
        assert_eq!(quick.total_cost_usd, dec!(2749.30));
    }

    #[tokio::test]
    async fn test_unreachable_sources_price_with_settings_rates() {
        let dir = tempfile::tempdir().unwrap();
        let provider = RateProvider::new(
            Arc::new(MockRateSource::failing("cny")),
            Arc::new(MockRateSource::failing("ars")),
            SnapshotStore::new(dir.path().join("rates.json")),
        );
        let settings = Settings {
            foreign_usd_rate: dec!(0.14),
            usd_local_rate: dec!(1100),
            ..Default::default()
        };
        let service = PricingService::new(
            Arc::new(InMemorySettingsStore::with_settings(settings)),
            Arc::new(InMemoryProductStore::new()),
            Arc::new(provider),
        );

        let priced = service.price_product(sample_product(), false).await.unwrap();
        assert!(!priced.rates_live);
        assert_eq!(priced.unit_fob_usd, dec!(140.00));
    }
}
