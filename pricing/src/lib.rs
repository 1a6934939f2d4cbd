//! Landed Pricing Engine
//!
//! Computes the landed cost of an imported line item and the resale price
//! that hits the target margin after marketplace fees.
//!
//! The computation is a fixed, ordered pipeline of named steps (see
//! [`pipeline::Step`]) over the product record. Each step reads only what
//! earlier steps wrote.

pub mod engine;
pub mod error;
pub mod fees;
pub mod pipeline;
pub mod service;
pub mod store;

pub use engine::{compute_pricing, PricingEngine};
pub use error::{PricingError, PricingResult};
pub use fees::{FeeTier, MarketplaceFees};
pub use pipeline::{PricingContext, RatesInUse, Step};
pub use service::{PricingService, QuickQuote};
pub use store::{InMemoryProductStore, InMemorySettingsStore, ProductStore, SettingsStore};
