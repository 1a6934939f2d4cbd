//! FX error types.
//!
//! None of these escape [`crate::RateProvider::acquire`]; they are logged and
//! drive the fall through to the next tier.

use thiserror::Error;

/// Errors that can occur while acquiring rates.
#[derive(Debug, Error)]
pub enum FxError {
    /// Network failure talking to a live source.
    #[error("Transport failure from {source_name}: {message}")]
    Transport { source_name: String, message: String },

    /// Live source answered with a non-success status.
    #[error("{source_name} returned HTTP {status}")]
    Status { source_name: String, status: u16 },

    /// Live source answered without a usable rate.
    #[error("Malformed payload from {source_name}: {message}")]
    MalformedPayload { source_name: String, message: String },

    /// Live tier exceeded its time bound.
    #[error("Live rate fetch timed out after {0}s")]
    Timeout(u64),

    /// Snapshot exists but could not be read or parsed.
    #[error("Could not read rate snapshot: {0}")]
    PersistenceRead(String),

    /// Snapshot could not be written.
    #[error("Could not write rate snapshot: {0}")]
    PersistenceWrite(String),
}

impl FxError {
    /// Whether the error came from the live tier.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FxError::Transport { .. }
                | FxError::Status { .. }
                | FxError::MalformedPayload { .. }
                | FxError::Timeout(_)
        )
    }

    /// Error code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::Transport { .. } => "TRANSPORT_FAILURE",
            FxError::Status { .. } => "TRANSPORT_STATUS",
            FxError::MalformedPayload { .. } => "MALFORMED_PAYLOAD",
            FxError::Timeout(_) => "TRANSPORT_TIMEOUT",
            FxError::PersistenceRead(_) => "PERSISTENCE_READ_FAILURE",
            FxError::PersistenceWrite(_) => "PERSISTENCE_WRITE_FAILURE",
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
