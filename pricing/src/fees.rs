//! Marketplace fee tiers.

use landed_common::{round_currency, Settings};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Prices strictly below this pay the first flat fee.
pub const TIER1_BELOW: Decimal = dec!(15000);

/// Prices up to and including this pay the second flat fee.
pub const TIER2_UP_TO: Decimal = dec!(25000);

/// Prices up to and including this pay the third flat fee.
pub const TIER3_UP_TO: Decimal = dec!(33000);

/// Flat fee bracket selected by price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeTier {
    /// price < 15000
    Tier1,
    /// 15000 ≤ price ≤ 25000
    Tier2,
    /// 25000 < price ≤ 33000
    Tier3,
    /// price > 33000, commission only
    CommissionOnly,
}

impl FeeTier {
    pub fn for_price(price: Decimal) -> Self {
        if price < TIER1_BELOW {
            FeeTier::Tier1
        } else if price <= TIER2_UP_TO {
            FeeTier::Tier2
        } else if price <= TIER3_UP_TO {
            FeeTier::Tier3
        } else {
            FeeTier::CommissionOnly
        }
    }

    pub fn flat_fee(&self, settings: &Settings) -> Decimal {
        match self {
            FeeTier::Tier1 => settings.marketplace_fee_tier1,
            FeeTier::Tier2 => settings.marketplace_fee_tier2,
            FeeTier::Tier3 => settings.marketplace_fee_tier3,
            FeeTier::CommissionOnly => Decimal::ZERO,
        }
    }
}

/// Fees charged by the marketplace on one unit sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketplaceFees {
    pub tier: FeeTier,
    /// Variable commission, rounded.
    pub commission: Decimal,
    pub flat_fee: Decimal,
}

impl MarketplaceFees {
    /// Fees for selling one unit at `price`.
    pub fn at_price(price: Decimal, settings: &Settings) -> Self {
        let tier = FeeTier::for_price(price);
        Self {
            tier,
            commission: round_currency(price * settings.marketplace_commission_pct),
            flat_fee: tier.flat_fee(settings),
        }
    }

    pub fn total(&self) -> Decimal {
        self.commission + self.flat_fee
    }
}
