//! Time utilities and constants.

use chrono::{DateTime, Duration, Utc};

/// Timing constants.
pub mod constants {
    use super::Duration;

    /// Bound on each live rate request (15 seconds).
    pub fn rate_fetch_timeout() -> Duration {
        Duration::seconds(15)
    }
}

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Current UTC time.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Human-readable age of a timestamp ("42s", "5m", "3h", "2d").
pub fn age_string(since: Timestamp) -> String {
    let secs = (now() - since).num_seconds().max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}

/// Conversion from chrono to std durations.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}
