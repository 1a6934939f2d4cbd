//! The pricing settings singleton.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{check_fraction, check_non_negative, check_positive, ValidationError, ValidationResult};
use crate::monetary::format_percentage;
use crate::time::{now, Timestamp};

/// Fixed identity of the one settings record.
pub const SETTINGS_ID: u32 = 1;

/// Actor stamped on the seeded record.
pub const SYSTEM_ACTOR: &str = "system";

/// Tariff, fee and margin parameters used to price every product.
///
/// Percentages are stored as fractions (0.30 = 30%). Flat fees are in local
/// currency, per-kg costs in USD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub id: u32,

    /// USD → local currency rate used when the quote is a fallback.
    pub usd_local_rate: Decimal,
    /// Foreign currency → USD rate used when the quote is a fallback.
    pub foreign_usd_rate: Decimal,

    pub customs_duty_pct: Decimal,
    pub statistics_duty_pct: Decimal,
    pub vat_pct: Decimal,
    /// Target profit margin on the sale price.
    pub target_margin_pct: Decimal,

    pub insurance_pct: Decimal,
    pub terminal_handling_pct: Decimal,
    /// Storage cost, USD per kg.
    pub storage_per_kg: Decimal,
    /// Freight cost, USD per kg.
    pub freight_per_kg: Decimal,
    /// Fuel/security surcharge applied to freight.
    pub freight_surcharge_pct: Decimal,

    /// Variable marketplace commission on the sale price.
    pub marketplace_commission_pct: Decimal,
    /// Flat fee for prices below 15000.
    pub marketplace_fee_tier1: Decimal,
    /// Flat fee for prices from 15000 up to 25000.
    pub marketplace_fee_tier2: Decimal,
    /// Flat fee for prices above 25000 up to 33000.
    pub marketplace_fee_tier3: Decimal,

    pub updated_at: Timestamp,
    pub updated_by: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: SETTINGS_ID,
            usd_local_rate: dec!(1025.50),
            foreign_usd_rate: dec!(0.1388),
            customs_duty_pct: dec!(0.30),
            statistics_duty_pct: dec!(0.025),
            vat_pct: dec!(0.21),
            target_margin_pct: dec!(0.35),
            insurance_pct: dec!(0.0121),
            terminal_handling_pct: dec!(0.10),
            storage_per_kg: dec!(1.21),
            freight_per_kg: dec!(17.00),
            freight_surcharge_pct: dec!(0.25),
            marketplace_commission_pct: dec!(0.16),
            marketplace_fee_tier1: dec!(1115),
            marketplace_fee_tier2: dec!(2300),
            marketplace_fee_tier3: dec!(2810),
            updated_at: now(),
            updated_by: SYSTEM_ACTOR.to_string(),
        }
    }
}

impl Settings {
    /// Check every field invariant.
    pub fn validate(&self) -> ValidationResult<()> {
        check_positive("usd_local_rate", self.usd_local_rate)?;
        check_positive("foreign_usd_rate", self.foreign_usd_rate)?;

        for (field, value) in [
            ("customs_duty_pct", self.customs_duty_pct),
            ("statistics_duty_pct", self.statistics_duty_pct),
            ("vat_pct", self.vat_pct),
            ("target_margin_pct", self.target_margin_pct),
            ("insurance_pct", self.insurance_pct),
            ("terminal_handling_pct", self.terminal_handling_pct),
            ("freight_surcharge_pct", self.freight_surcharge_pct),
            ("marketplace_commission_pct", self.marketplace_commission_pct),
        ] {
            check_fraction(field, value)?;
        }

        for (field, value) in [
            ("storage_per_kg", self.storage_per_kg),
            ("freight_per_kg", self.freight_per_kg),
            ("marketplace_fee_tier1", self.marketplace_fee_tier1),
            ("marketplace_fee_tier2", self.marketplace_fee_tier2),
            ("marketplace_fee_tier3", self.marketplace_fee_tier3),
        ] {
            check_non_negative(field, value)?;
        }

        if self.target_margin_pct == Decimal::ONE {
            return Err(ValidationError::MarginTooHigh);
        }

        Ok(())
    }

    /// Stamp audit metadata after an update.
    pub fn touch(&mut self, actor: impl Into<String>) {
        self.id = SETTINGS_ID;
        self.updated_at = now();
        self.updated_by = actor.into();
    }

    pub fn customs_duty_display(&self) -> String {
        format_percentage(self.customs_duty_pct)
    }

    pub fn vat_display(&self) -> String {
        format_percentage(self.vat_pct)
    }

    pub fn target_margin_display(&self) -> String {
        format_percentage(self.target_margin_pct)
    }
}
