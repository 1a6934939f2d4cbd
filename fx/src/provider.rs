//! Three-tier rate acquisition: live, persisted snapshot, built-in default.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use landed_common::time::{constants, DurationExt};
use landed_common::RateQuote;
use tracing::{info, instrument, warn};

use crate::error::{FxError, FxResult};
use crate::snapshot::{SnapshotStore, DEFAULT_SNAPSHOT_PATH};
use crate::source::{JsonRateSource, RateSource};

/// Default foreign→USD endpoint.
pub const DEFAULT_FOREIGN_RATE_URL: &str = "https://open.er-api.com/v6/latest/CNY";

/// Default USD→local endpoint.
pub const DEFAULT_LOCAL_RATE_URL: &str = "https://dolarapi.com/v1/dolares/oficial";

const USER_AGENT: &str = concat!("landed/", env!("CARGO_PKG_VERSION"));

/// Configuration for the rate provider.
#[derive(Debug, Clone)]
pub struct RateProviderConfig {
    /// Foreign→USD endpoint.
    pub foreign_rate_url: String,
    /// USD→local endpoint.
    pub local_rate_url: String,
    /// Bound on the whole live tier.
    pub timeout: Duration,
    /// Where the last live quote is persisted.
    pub snapshot_path: PathBuf,
}

impl Default for RateProviderConfig {
    fn default() -> Self {
        Self {
            foreign_rate_url: DEFAULT_FOREIGN_RATE_URL.to_string(),
            local_rate_url: DEFAULT_LOCAL_RATE_URL.to_string(),
            timeout: constants::rate_fetch_timeout().as_std(),
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        }
    }
}

/// Which tier produced a quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acquisition {
    /// Both live sources answered.
    Live(RateQuote),
    /// Live fetch failed; last persisted quote, marked fallback.
    Stale(RateQuote),
    /// Nothing usable; built-in constants, marked fallback.
    Default(RateQuote),
}

impl Acquisition {
    /// Collapse to the quote handed to callers.
    pub fn into_quote(self) -> RateQuote {
        match self {
            Acquisition::Live(q) | Acquisition::Stale(q) | Acquisition::Default(q) => q,
        }
    }

    pub fn quote(&self) -> &RateQuote {
        match self {
            Acquisition::Live(q) | Acquisition::Stale(q) | Acquisition::Default(q) => q,
        }
    }

    pub fn tier(&self) -> &'static str {
        match self {
            Acquisition::Live(_) => "live",
            Acquisition::Stale(_) => "snapshot",
            Acquisition::Default(_) => "default",
        }
    }
}

/// Anything that can hand out the current rate pair.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Acquire a quote. Never fails.
    async fn acquire(&self) -> RateQuote;
}

/// Always answers with the same quote.
#[derive(Debug, Clone)]
pub struct StaticQuote(pub RateQuote);

impl StaticQuote {
    /// The built-in fallback quote, for offline use.
    pub fn offline() -> Self {
        Self(RateQuote::builtin_default())
    }
}

#[async_trait]
impl QuoteProvider for StaticQuote {
    async fn acquire(&self) -> RateQuote {
        self.0.clone()
    }
}

/// Acquires rates from two live sources, falling back to the persisted
/// snapshot and then to built-in defaults.
pub struct RateProvider {
    foreign_usd: Arc<dyn RateSource>,
    usd_local: Arc<dyn RateSource>,
    snapshots: SnapshotStore,
    timeout: Duration,
}

impl RateProvider {
    /// Create a provider from explicit sources.
    pub fn new(
        foreign_usd: Arc<dyn RateSource>,
        usd_local: Arc<dyn RateSource>,
        snapshots: SnapshotStore,
    ) -> Self {
        Self {
            foreign_usd,
            usd_local,
            snapshots,
            timeout: constants::rate_fetch_timeout().as_std(),
        }
    }

    /// Set the bound on the live tier.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create a provider talking to the configured HTTP endpoints.
    pub fn from_config(config: &RateProviderConfig) -> FxResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FxError::Transport {
                source_name: "http-client".to_string(),
                message: e.to_string(),
            })?;

        let foreign = JsonRateSource::foreign_usd(config.foreign_rate_url.clone(), http.clone());
        let local = JsonRateSource::usd_local(config.local_rate_url.clone(), http);

        Ok(Self::new(
            Arc::new(foreign),
            Arc::new(local),
            SnapshotStore::new(config.snapshot_path.clone()),
        )
        .with_timeout(config.timeout))
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Run the fallback chain and report which tier answered.
    #[instrument(skip(self))]
    pub async fn acquire_detailed(&self) -> Acquisition {
        match self.fetch_live().await {
            Ok(quote) => {
                if let Err(e) = self.persist(&quote).await {
                    warn!(error = %e, code = e.error_code(), "Failed to persist live quote");
                }
                info!(
                    foreign_usd = %quote.foreign_usd,
                    usd_local = %quote.usd_local,
                    "Using live exchange rates"
                );
                Acquisition::Live(quote)
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "Live rate fetch failed");
                self.fallback().await
            }
        }
    }

    /// Write the snapshot on the blocking pool.
    async fn persist(&self, quote: &RateQuote) -> FxResult<()> {
        let store = self.snapshots.clone();
        let quote = quote.clone();
        tokio::task::spawn_blocking(move || store.save(&quote))
            .await
            .map_err(|e| FxError::PersistenceWrite(e.to_string()))?
    }

    async fn load_snapshot(&self) -> FxResult<Option<RateQuote>> {
        let store = self.snapshots.clone();
        tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| FxError::PersistenceRead(e.to_string()))?
    }

    async fn fetch_live(&self) -> FxResult<RateQuote> {
        let fetch = async {
            let foreign_usd = self.foreign_usd.fetch_rate().await?;
            let usd_local = self.usd_local.fetch_rate().await?;
            Ok::<_, FxError>(RateQuote::live(foreign_usd, usd_local))
        };

        tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| FxError::Timeout(self.timeout.as_secs()))?
    }

    async fn fallback(&self) -> Acquisition {
        match self.load_snapshot().await {
            Ok(Some(quote)) => {
                info!(
                    quoted_at = %quote.quoted_at,
                    foreign_usd = %quote.foreign_usd,
                    usd_local = %quote.usd_local,
                    "Using persisted exchange rates"
                );
                Acquisition::Stale(quote.into_stale())
            }
            Ok(None) => {
                warn!("No rate snapshot, using built-in exchange rates");
                Acquisition::Default(RateQuote::builtin_default())
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "Using built-in exchange rates");
                Acquisition::Default(RateQuote::builtin_default())
            }
        }
    }
}

#[async_trait]
impl QuoteProvider for RateProvider {
    async fn acquire(&self) -> RateQuote {
        self.acquire_detailed().await.into_quote()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockRateSource;
    use landed_common::{DEFAULT_FOREIGN_USD, DEFAULT_USD_LOCAL};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::fs;

    struct SlowSource;

    #[async_trait]
    impl RateSource for SlowSource {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch_rate(&self) -> FxResult<Decimal> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(dec!(1))
        }
    }

    fn provider(
        foreign: Arc<dyn RateSource>,
        local: Arc<dyn RateSource>,
        dir: &tempfile::TempDir,
    ) -> RateProvider {
        RateProvider::new(foreign, local, SnapshotStore::new(dir.path().join("rates.json")))
    }

    #[tokio::test]
    async fn test_live_quote_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(
            Arc::new(MockRateSource::ok("cny", dec!(0.1401))),
            Arc::new(MockRateSource::ok("ars", dec!(1050.25))),
            &dir,
        );

        let acquisition = provider.acquire_detailed().await;
        assert_eq!(acquisition.tier(), "live");

        let quote = acquisition.into_quote();
        assert!(!quote.is_fallback);
        assert_eq!(quote.foreign_usd, dec!(0.1401));
        assert_eq!(quote.usd_local, dec!(1050.25));

        let saved = provider.snapshots().load().unwrap().unwrap();
        assert_eq!(saved.foreign_usd, dec!(0.1401));
        assert_eq!(saved.usd_local, dec!(1050.25));
    }

    #[tokio::test]
    async fn test_one_failed_source_abandons_live_tier() {
        let dir = tempfile::tempdir().unwrap();
        let local = Arc::new(MockRateSource::ok("ars", dec!(1050.25)));
        let provider = provider(
            Arc::new(MockRateSource::failing("cny")),
            local.clone(),
            &dir,
        );

        let acquisition = provider.acquire_detailed().await;
        assert_eq!(acquisition.tier(), "default");
        assert!(acquisition.quote().is_fallback);
        // First source failed, second never asked.
        assert_eq!(local.calls(), 0);
        assert!(provider.snapshots().load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_snapshot_used_when_live_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("rates.json"));
        store.save(&RateQuote::live(dec!(0.1377), dec!(998.50))).unwrap();

        let provider = provider(
            Arc::new(MockRateSource::ok("cny", dec!(0.1401))),
            Arc::new(MockRateSource::failing("ars")),
            &dir,
        );

        let acquisition = provider.acquire_detailed().await;
        assert!(matches!(acquisition, Acquisition::Stale(_)));

        let quote = acquisition.into_quote();
        assert!(quote.is_fallback);
        assert_eq!(quote.foreign_usd, dec!(0.1377));
        assert_eq!(quote.usd_local, dec!(998.50));
    }

    #[tokio::test]
    async fn test_all_tiers_down_yields_builtin_default() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(
            Arc::new(MockRateSource::failing("cny")),
            Arc::new(MockRateSource::failing("ars")),
            &dir,
        );

        let quote = provider.acquire().await;
        assert!(quote.is_fallback);
        assert_eq!(quote.foreign_usd, DEFAULT_FOREIGN_USD);
        assert_eq!(quote.usd_local, DEFAULT_USD_LOCAL);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_yields_builtin_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("rates.json"), "garbage").unwrap();

        let provider = provider(
            Arc::new(MockRateSource::failing("cny")),
            Arc::new(MockRateSource::failing("ars")),
            &dir,
        );

        let acquisition = provider.acquire_detailed().await;
        assert!(matches!(acquisition, Acquisition::Default(_)));
    }

    #[tokio::test]
    async fn test_persist_failure_still_returns_live_quote() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let provider = RateProvider::new(
            Arc::new(MockRateSource::ok("cny", dec!(0.1401))),
            Arc::new(MockRateSource::ok("ars", dec!(1050.25))),
            SnapshotStore::new(blocker.join("rates.json")),
        );

        let quote = provider.acquire().await;
        assert!(!quote.is_fallback);
        assert_eq!(quote.usd_local, dec!(1050.25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let provider = provider(
            Arc::new(SlowSource),
            Arc::new(MockRateSource::ok("ars", dec!(1050.25))),
            &dir,
        )
        .with_timeout(Duration::from_secs(15));

        let acquisition = provider.acquire_detailed().await;
        assert_eq!(acquisition.tier(), "default");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_acquisitions_share_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(provider(
            Arc::new(MockRateSource::ok("cny", dec!(0.1401))),
            Arc::new(MockRateSource::ok("ars", dec!(1050.25))),
            &dir,
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let provider = provider.clone();
                tokio::spawn(async move { provider.acquire_detailed().await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().tier(), "live");
        }

        let saved = provider.snapshots().load().unwrap().unwrap();
        assert_eq!(saved.usd_local, dec!(1050.25));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_snapshot_fallback_on_multi_thread_runtime() {
        let dir = tempfile::tempdir().unwrap();
        SnapshotStore::new(dir.path().join("rates.json"))
            .save(&RateQuote::live(dec!(0.1377), dec!(998.50)))
            .unwrap();
        let provider = provider(
            Arc::new(MockRateSource::failing("cny")),
            Arc::new(MockRateSource::failing("ars")),
            &dir,
        );

        let acquisition = provider.acquire_detailed().await;
        assert!(matches!(acquisition, Acquisition::Stale(_)));
        assert_eq!(acquisition.quote().usd_local, dec!(998.50));
    }

    #[test]
    fn test_static_quote() {
        let provider = StaticQuote::offline();
        let quote = tokio_test::block_on(provider.acquire());
        assert!(quote.is_fallback);
    }

    #[test]
    fn test_default_config() {
        let config = RateProviderConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(RateProvider::from_config(&config).is_ok());
    }
}
