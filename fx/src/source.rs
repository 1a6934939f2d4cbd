//! Live rate sources.

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::error::{FxError, FxResult};

/// A network endpoint that yields exactly one exchange rate.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Fetch the current rate.
    async fn fetch_rate(&self) -> FxResult<Decimal>;
}

/// A JSON HTTP endpoint with the rate at a fixed JSON pointer.
pub struct JsonRateSource {
    name: String,
    url: String,
    pointer: String,
    http: reqwest::Client,
}

impl JsonRateSource {
    /// Create a source reading `pointer` from the body of `url`.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        pointer: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            pointer: pointer.into(),
            http,
        }
    }

    /// Foreign→USD from an open exchange-rate feed (`rates.USD`).
    pub fn foreign_usd(url: impl Into<String>, http: reqwest::Client) -> Self {
        Self::new("foreign-usd", url, "/rates/USD", http)
    }

    /// USD→local official sell rate (`venta`).
    pub fn usd_local(url: impl Into<String>, http: reqwest::Client) -> Self {
        Self::new("usd-local", url, "/venta", http)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Pull the rate out of a decoded response body.
    pub fn extract(&self, body: &Value) -> FxResult<Decimal> {
        let raw = body.pointer(&self.pointer).ok_or_else(|| FxError::MalformedPayload {
            source_name: self.name.clone(),
            message: format!("missing field {}", self.pointer),
        })?;

        let rate = decimal_from_json(raw).ok_or_else(|| FxError::MalformedPayload {
            source_name: self.name.clone(),
            message: format!("field {} is not a number: {}", self.pointer, raw),
        })?;

        if rate <= Decimal::ZERO {
            return Err(FxError::MalformedPayload {
                source_name: self.name.clone(),
                message: format!("non-positive rate {}", rate),
            });
        }

        Ok(rate)
    }

    fn transport(&self, err: reqwest::Error) -> FxError {
        FxError::Transport {
            source_name: self.name.clone(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl RateSource for JsonRateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rate(&self) -> FxResult<Decimal> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FxError::Status {
                source_name: self.name.clone(),
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await.map_err(|e| FxError::MalformedPayload {
            source_name: self.name.clone(),
            message: e.to_string(),
        })?;

        let rate = self.extract(&body)?;
        debug!(source = %self.name, rate = %rate, "Fetched live rate");
        Ok(rate)
    }
}

/// Read a JSON number (or numeric string) as a decimal without going
/// through binary floating point arithmetic.
pub(crate) fn decimal_from_json(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Mock rate source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateSource {
    name: String,
    rate: Option<Decimal>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateSource {
    /// A source that always answers with `rate`.
    pub fn ok(name: impl Into<String>, rate: Decimal) -> Self {
        Self {
            name: name.into(),
            rate: Some(rate),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A source that is always unreachable.
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rate: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of fetches so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateSource for MockRateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rate(&self) -> FxResult<Decimal> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.rate.ok_or_else(|| FxError::Transport {
            source_name: self.name.clone(),
            message: "connection refused".to_string(),
        })
    }
}
