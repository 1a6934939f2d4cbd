//! Pricing error types.

use landed_common::{ProductId, ValidationError};
use thiserror::Error;

/// Errors surfaced to pricing callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// No settings record exists.
    #[error("No settings found")]
    MissingSettings,

    /// Lookup by id did not resolve.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Settings violate a field invariant.
    #[error("Invalid settings: {0}")]
    InvalidSettings(ValidationError),

    /// Product inputs violate a field invariant.
    #[error("Invalid product: {0}")]
    InvalidProduct(ValidationError),
}

impl PricingError {
    /// Get error code for callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            PricingError::MissingSettings => "MISSING_SETTINGS",
            PricingError::ProductNotFound(_) => "ENTITY_NOT_FOUND",
            PricingError::InvalidSettings(_) => "INVALID_SETTINGS",
            PricingError::InvalidProduct(_) => "INVALID_PRODUCT",
        }
    }
}

/// Result type for pricing operations.
pub type PricingResult<T> = Result<T, PricingError>;
