//! Exchange rate quotes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::time::{now, Timestamp};

/// Built-in foreign→USD rate used when no live or persisted quote exists.
pub const DEFAULT_FOREIGN_USD: Decimal = dec!(0.1388);

/// Built-in USD→local rate used when no live or persisted quote exists.
pub const DEFAULT_USD_LOCAL: Decimal = dec!(1025.50);

/// A timestamped exchange rate pair.
///
/// Quotes are never mutated after construction. `is_fallback` is true
/// whenever the pair did not come from a live fetch in the current
/// acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuote {
    /// When the quote was produced.
    pub quoted_at: Timestamp,
    /// Foreign currency → USD.
    pub foreign_usd: Decimal,
    /// USD → local currency (sell side).
    pub usd_local: Decimal,
    /// Whether this quote is stale or built-in rather than freshly fetched.
    pub is_fallback: bool,
}

impl RateQuote {
    /// A freshly fetched quote.
    pub fn live(foreign_usd: Decimal, usd_local: Decimal) -> Self {
        Self {
            quoted_at: now(),
            foreign_usd,
            usd_local,
            is_fallback: false,
        }
    }

    /// The built-in last-resort quote.
    pub fn builtin_default() -> Self {
        Self {
            quoted_at: now(),
            foreign_usd: DEFAULT_FOREIGN_USD,
            usd_local: DEFAULT_USD_LOCAL,
            is_fallback: true,
        }
    }

    /// Copy of this quote marked as stale.
    pub fn into_stale(self) -> Self {
        Self {
            is_fallback: true,
            ..self
        }
    }

    /// Indirect foreign → local rate.
    pub fn cross_rate(&self) -> Decimal {
        self.foreign_usd * self.usd_local
    }

    /// Foreign→USD formatted with 6 decimals.
    pub fn foreign_usd_display(&self) -> String {
        format!("{:.6}", self.foreign_usd)
    }

    /// USD→local formatted with 2 decimals.
    pub fn usd_local_display(&self) -> String {
        format!("{:.2}", self.usd_local)
    }
}
