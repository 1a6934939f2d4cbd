//! Validation errors for settings and product records.

use rust_decimal::Decimal;
use thiserror::Error;

/// A record failed one of its field invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A fraction field left the closed unit interval.
    #[error("{field} must be between 0% and 100%, got {value}")]
    FractionOutOfRange { field: &'static str, value: Decimal },

    /// A currency or weight amount that must not be negative.
    #[error("{field} cannot be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    /// An amount that must be strictly positive.
    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: Decimal },

    /// Quantity below one unit.
    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    /// Free text field longer than allowed.
    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// A required text field was left empty.
    #[error("{0} is required")]
    Required(&'static str),

    /// Target margin of 100% leaves no room for cost in the price.
    #[error("Target margin must be below 100%")]
    MarginTooHigh,
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::FractionOutOfRange { field, .. }
            | ValidationError::Negative { field, .. }
            | ValidationError::NotPositive { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::Required(field) => field,
            ValidationError::ZeroQuantity => "quantity",
            ValidationError::MarginTooHigh => "target_margin",
        }
    }
}

/// Result type alias for validation checks.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

pub(crate) fn check_fraction(field: &'static str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ValidationError::FractionOutOfRange { field, value });
    }
    Ok(())
}

pub(crate) fn check_non_negative(field: &'static str, value: Decimal) -> ValidationResult<()> {
    if value < Decimal::ZERO {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

pub(crate) fn check_positive(field: &'static str, value: Decimal) -> ValidationResult<()> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(())
}
