//! Product line items and their derived cost breakdown.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{check_fraction, check_positive, ValidationError, ValidationResult};
use crate::settings::Settings;
use crate::time::Timestamp;

/// Maximum description length.
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Maximum common nomenclature code length.
pub const MAX_NOMENCLATURE_LEN: usize = 50;

/// Duty fractions in force for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyRates {
    pub customs: Decimal,
    pub statistics: Decimal,
    pub vat: Decimal,
}

/// Integer identity of a stored product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(u32);

impl ProductId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A line item to be priced.
///
/// Callers populate the input fields. Every other field is overwritten by
/// each pricing computation. `sale_price` is an input only when the caller
/// overrides the price manually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: ProductId,
    pub description: String,
    /// Harmonized nomenclature code, informational.
    pub nomenclature: String,

    /// Unit value in the origin currency.
    pub origin_unit_value: Decimal,
    /// Unit weight in kg.
    pub unit_weight: Decimal,
    pub quantity: u32,

    /// Per-item customs duty fraction. `None` inherits the settings default.
    pub customs_duty_pct: Option<Decimal>,
    /// Per-item statistics duty fraction. `None` inherits the settings default.
    pub statistics_duty_pct: Option<Decimal>,
    /// Per-item import VAT fraction. `None` inherits the settings default.
    pub vat_pct: Option<Decimal>,

    pub unit_fob_usd: Decimal,
    pub total_fob_usd: Decimal,

    pub customs_value: Decimal,
    pub customs_duty: Decimal,
    pub statistics_duty: Decimal,
    pub taxable_base: Decimal,
    pub import_vat: Decimal,

    pub storage: Decimal,
    pub freight: Decimal,
    pub freight_surcharge: Decimal,
    pub insurance: Decimal,
    pub terminal_handling: Decimal,

    /// Landed cost of the whole line, USD.
    pub total_cost: Decimal,
    pub unit_cost_usd: Decimal,
    pub unit_cost_local: Decimal,

    /// Variable commission plus flat fee, local currency.
    pub marketplace_fees: Decimal,
    /// Price the item is sold at, local currency.
    pub sale_price: Decimal,
    /// Suggested price including fees and margin, local currency.
    pub suggested_price: Decimal,
    pub net_profit: Decimal,
    /// Net profit as a percentage of the sale price.
    pub profit_pct: Decimal,

    /// When the breakdown was last computed.
    pub priced_at: Option<Timestamp>,
    /// Whether the last computation used live exchange rates.
    pub rates_live: bool,
}

impl Default for Product {
    fn default() -> Self {
        Self {
            id: ProductId::default(),
            description: String::new(),
            nomenclature: String::new(),
            origin_unit_value: Decimal::ZERO,
            unit_weight: Decimal::ZERO,
            quantity: 0,
            customs_duty_pct: None,
            statistics_duty_pct: None,
            vat_pct: None,
            unit_fob_usd: Decimal::ZERO,
            total_fob_usd: Decimal::ZERO,
            customs_value: Decimal::ZERO,
            customs_duty: Decimal::ZERO,
            statistics_duty: Decimal::ZERO,
            taxable_base: Decimal::ZERO,
            import_vat: Decimal::ZERO,
            storage: Decimal::ZERO,
            freight: Decimal::ZERO,
            freight_surcharge: Decimal::ZERO,
            insurance: Decimal::ZERO,
            terminal_handling: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            unit_cost_usd: Decimal::ZERO,
            unit_cost_local: Decimal::ZERO,
            marketplace_fees: Decimal::ZERO,
            sale_price: Decimal::ZERO,
            suggested_price: Decimal::ZERO,
            net_profit: Decimal::ZERO,
            profit_pct: Decimal::ZERO,
            priced_at: None,
            rates_live: false,
        }
    }
}

impl Product {
    /// Create a product with only its input fields populated.
    pub fn new(
        description: impl Into<String>,
        origin_unit_value: Decimal,
        unit_weight: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            description: description.into(),
            origin_unit_value,
            unit_weight,
            quantity,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = ProductId::new(id);
        self
    }

    /// Override the per-item duty fractions.
    pub fn with_duties(mut self, customs: Decimal, statistics: Decimal, vat: Decimal) -> Self {
        self.customs_duty_pct = Some(customs);
        self.statistics_duty_pct = Some(statistics);
        self.vat_pct = Some(vat);
        self
    }

    /// Pin the settings defaults onto every duty field left unset.
    pub fn with_settings_duties(mut self, settings: &Settings) -> Self {
        let rates = self.duty_rates(settings);
        self.customs_duty_pct = Some(rates.customs);
        self.statistics_duty_pct = Some(rates.statistics);
        self.vat_pct = Some(rates.vat);
        self
    }

    /// Per-item overrides, falling back to the settings defaults.
    pub fn duty_rates(&self, settings: &Settings) -> DutyRates {
        DutyRates {
            customs: self.customs_duty_pct.unwrap_or(settings.customs_duty_pct),
            statistics: self.statistics_duty_pct.unwrap_or(settings.statistics_duty_pct),
            vat: self.vat_pct.unwrap_or(settings.vat_pct),
        }
    }

    /// Set a caller-chosen sale price.
    pub fn with_sale_price(mut self, price: Decimal) -> Self {
        self.sale_price = price;
        self
    }

    /// Check the input field invariants.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::Required("description"));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::TooLong {
                field: "description",
                max: MAX_DESCRIPTION_LEN,
            });
        }
        if self.nomenclature.chars().count() > MAX_NOMENCLATURE_LEN {
            return Err(ValidationError::TooLong {
                field: "nomenclature",
                max: MAX_NOMENCLATURE_LEN,
            });
        }

        check_positive("origin_unit_value", self.origin_unit_value)?;
        check_positive("unit_weight", self.unit_weight)?;
        if self.quantity == 0 {
            return Err(ValidationError::ZeroQuantity);
        }

        if let Some(pct) = self.customs_duty_pct {
            check_fraction("customs_duty_pct", pct)?;
        }
        if let Some(pct) = self.statistics_duty_pct {
            check_fraction("statistics_duty_pct", pct)?;
        }
        if let Some(pct) = self.vat_pct {
            check_fraction("vat_pct", pct)?;
        }

        Ok(())
    }

    /// Sum of the nine landed cost components, USD.
    pub fn cost_components_sum(&self) -> Decimal {
        self.customs_value
            + self.customs_duty
            + self.statistics_duty
            + self.import_vat
            + self.storage
            + self.freight
            + self.freight_surcharge
            + self.insurance
            + self.terminal_handling
    }
}
