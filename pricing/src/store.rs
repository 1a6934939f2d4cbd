//! Lookup interfaces for settings and products.
//!
//! Storage belongs to the surrounding application. The pricing service only
//! needs find-the-one-settings-record and find-product-by-id; the in-memory
//! implementations here back the CLI and tests.

use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use landed_common::{Product, ProductId, Settings};
use parking_lot::RwLock;
use tracing::info;

use crate::error::{PricingError, PricingResult};

/// The settings singleton.
pub trait SettingsStore: Send + Sync {
    /// The one settings record, if it exists.
    fn current(&self) -> Option<Settings>;

    /// Validate, stamp and replace the record in place.
    fn update(&self, settings: Settings, actor: &str) -> PricingResult<Settings>;
}

/// Products keyed by integer identity.
pub trait ProductStore: Send + Sync {
    fn find(&self, id: ProductId) -> Option<Product>;

    /// Insert or replace. A zero id is assigned the next free id.
    fn save(&self, product: Product) -> Product;
}

/// Settings held in process memory.
pub struct InMemorySettingsStore {
    record: RwLock<Option<Settings>>,
}

impl InMemorySettingsStore {
    /// Store seeded with the documented defaults.
    pub fn seeded() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            record: RwLock::new(Some(settings)),
        }
    }

    /// Store with no record, as before first-run seeding.
    pub fn empty() -> Self {
        Self {
            record: RwLock::new(None),
        }
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn current(&self) -> Option<Settings> {
        self.record.read().clone()
    }

    fn update(&self, mut settings: Settings, actor: &str) -> PricingResult<Settings> {
        settings.validate().map_err(PricingError::InvalidSettings)?;
        settings.touch(actor);

        *self.record.write() = Some(settings.clone());
        info!(updated_by = %actor, "Settings updated");
        Ok(settings)
    }
}

/// Products held in process memory.
pub struct InMemoryProductStore {
    products: DashMap<ProductId, Product>,
    next_id: AtomicU32,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self {
            products: DashMap::new(),
            next_id: AtomicU32::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductStore for InMemoryProductStore {
    fn find(&self, id: ProductId) -> Option<Product> {
        self.products.get(&id).map(|p| p.clone())
    }

    fn save(&self, mut product: Product) -> Product {
        if product.id.get() == 0 {
            product.id = ProductId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        } else {
            self.next_id.fetch_max(product.id.get() + 1, Ordering::SeqCst);
        }
        self.products.insert(product.id, product.clone());
        product
    }
}
