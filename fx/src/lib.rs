//! Landed FX
//!
//! Acquires the exchange rate pair used to price imports.
//!
//! # Features
//!
//! - Two independent live sources (foreign→USD and USD→local)
//! - Last-known-good snapshot persisted atomically to disk
//! - Built-in default quote when nothing else is available
//!
//! Acquisition never fails: each failure falls through to the next tier and
//! the returned quote says whether it is live.
//!
//! # Example
//!
//! ```rust,ignore
//! use landed_fx::{RateProvider, RateProviderConfig};
//!
//! let provider = RateProvider::from_config(&RateProviderConfig::default())?;
//! let quote = provider.acquire().await;
//! if quote.is_fallback {
//!     println!("using stale rates");
//! }
//! ```

pub mod error;
pub mod provider;
pub mod snapshot;
pub mod source;

pub use error::{FxError, FxResult};
pub use provider::{Acquisition, QuoteProvider, RateProvider, RateProviderConfig, StaticQuote};
pub use snapshot::SnapshotStore;
pub use source::{JsonRateSource, RateSource};

#[cfg(any(test, feature = "test-utils"))]
pub use source::MockRateSource;
