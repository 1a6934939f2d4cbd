//! CLI configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use landed_common::time::{constants, DurationExt};
use landed_common::Settings;
use landed_fx::provider::{DEFAULT_FOREIGN_RATE_URL, DEFAULT_LOCAL_RATE_URL};
use landed_fx::snapshot::DEFAULT_SNAPSHOT_PATH;
use landed_fx::RateProviderConfig;

/// Main configuration.
#[derive(Debug, Clone)]
pub struct LandedConfig {
    /// Where the last live quote is persisted.
    pub snapshot_path: PathBuf,
    /// Bound on live rate fetches.
    pub fx_timeout: Duration,
    /// Foreign→USD endpoint.
    pub foreign_rate_url: String,
    /// USD→local endpoint.
    pub local_rate_url: String,
    /// Emit logs as JSON.
    pub log_json: bool,
    /// Log filter used when RUST_LOG is unset.
    pub log_level: String,
}

impl Default for LandedConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            fx_timeout: constants::rate_fetch_timeout().as_std(),
            foreign_rate_url: DEFAULT_FOREIGN_RATE_URL.to_string(),
            local_rate_url: DEFAULT_LOCAL_RATE_URL.to_string(),
            log_json: false,
            log_level: "info".to_string(),
        }
    }
}

impl LandedConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("LANDED_SNAPSHOT_PATH") {
            config.snapshot_path = PathBuf::from(path);
        }

        if let Some(secs) = lookup("LANDED_FX_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.fx_timeout = Duration::from_secs(secs);
            }
        }

        if let Some(url) = lookup("LANDED_FOREIGN_RATE_URL") {
            config.foreign_rate_url = url;
        }

        if let Some(url) = lookup("LANDED_LOCAL_RATE_URL") {
            config.local_rate_url = url;
        }

        if let Some(flag) = lookup("LANDED_LOG_JSON") {
            config.log_json = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        if let Some(level) = lookup("RUST_LOG") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.fx_timeout.is_zero() {
            return Err("FX timeout cannot be zero".to_string());
        }

        if self.foreign_rate_url.is_empty() || self.local_rate_url.is_empty() {
            return Err("Rate source URLs cannot be empty".to_string());
        }

        if self.snapshot_path.as_os_str().is_empty() {
            return Err("Snapshot path cannot be empty".to_string());
        }

        Ok(())
    }

    pub fn rate_provider(&self) -> RateProviderConfig {
        RateProviderConfig {
            foreign_rate_url: self.foreign_rate_url.clone(),
            local_rate_url: self.local_rate_url.clone(),
            timeout: self.fx_timeout,
            snapshot_path: self.snapshot_path.clone(),
        }
    }
}

/// Read a settings record from a JSON file. Missing fields keep their
/// documented defaults.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&content)
        .with_context(|| format!("parsing settings from {}", path.display()))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = LandedConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rate_provider().timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("LANDED_SNAPSHOT_PATH", "/tmp/rates.json"),
            ("LANDED_FX_TIMEOUT_SECS", "5"),
            ("LANDED_LOG_JSON", "true"),
        ]
        .into_iter()
        .collect();

        let config = LandedConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/rates.json"));
        assert_eq!(config.fx_timeout, Duration::from_secs(5));
        assert!(config.log_json);
        assert_eq!(config.foreign_rate_url, DEFAULT_FOREIGN_RATE_URL);
    }

    #[test]
    fn test_invalid_config() {
        let config = LandedConfig {
            fx_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"target_margin_pct": "0.4", "freight_per_kg": 12}"#).unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.target_margin_pct, dec!(0.4));
        assert_eq!(settings.freight_per_kg, dec!(12));
        assert_eq!(settings.vat_pct, dec!(0.21));
    }

    #[test]
    fn test_load_settings_missing_file() {
        assert!(load_settings(Path::new("/nonexistent/settings.json")).is_err());
    }
}
