//! The ordered pricing pipeline.
//!
//! Every derived field on [`Product`] is written by exactly one [`Step`].
//! Line-level amounts are rounded to currency precision where they are
//! produced and later steps consume the rounded value, so the printed
//! breakdown always adds up. Per-unit figures are display values only:
//! nothing is multiplied up from a rounded unit amount.

use landed_common::{round_currency, DutyRates, Product, RateQuote, Settings};
use rust_decimal::Decimal;

use crate::fees::MarketplaceFees;

/// The exchange rates a computation actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatesInUse {
    pub foreign_usd: Decimal,
    pub usd_local: Decimal,
    /// False when the quote was a fallback and settings rates were used.
    pub live: bool,
}

impl RatesInUse {
    /// Quote rates when live, otherwise the rates stored in settings.
    pub fn select(quote: &RateQuote, settings: &Settings) -> Self {
        if quote.is_fallback {
            Self {
                foreign_usd: settings.foreign_usd_rate,
                usd_local: settings.usd_local_rate,
                live: false,
            }
        } else {
            Self {
                foreign_usd: quote.foreign_usd,
                usd_local: quote.usd_local,
                live: true,
            }
        }
    }
}

/// Accumulator threaded through the steps.
#[derive(Debug, Clone)]
pub struct PricingContext<'a> {
    pub settings: &'a Settings,
    pub rates: RatesInUse,
    /// Product overrides resolved against the settings defaults.
    pub duties: DutyRates,
    pub price_overridden: bool,
    pub product: Product,
}

impl<'a> PricingContext<'a> {
    pub fn new(
        product: Product,
        settings: &'a Settings,
        quote: &RateQuote,
        price_overridden: bool,
    ) -> Self {
        Self {
            settings,
            rates: RatesInUse::select(quote, settings),
            duties: product.duty_rates(settings),
            price_overridden,
            product,
        }
    }

    /// Run every step in order.
    pub fn run(mut self) -> Product {
        for step in Step::ORDER {
            step.apply(&mut self);
        }
        self.product
    }

    fn quantity(&self) -> Decimal {
        Decimal::from(self.product.quantity)
    }
}

/// One named stage of the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Unit and total FOB value in USD.
    FobValue,
    /// Storage, freight, surcharge, insurance, terminal handling.
    LogisticsCosts,
    /// Customs value, duties, taxable base, import VAT.
    CustomsDuties,
    /// Landed total and per-unit cost in USD.
    TotalCost,
    /// Per-unit cost in local currency.
    LocalUnitCost,
    /// Marketplace fees against the provisional suggested price.
    MarketplaceFees,
    /// Sale and suggested price.
    SalePrice,
    /// Net profit and profit percentage.
    Profit,
}

impl Step {
    /// Dependency order. Later steps read fields written by earlier ones.
    pub const ORDER: [Step; 8] = [
        Step::FobValue,
        Step::LogisticsCosts,
        Step::CustomsDuties,
        Step::TotalCost,
        Step::LocalUnitCost,
        Step::MarketplaceFees,
        Step::SalePrice,
        Step::Profit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Step::FobValue => "fob_value",
            Step::LogisticsCosts => "logistics_costs",
            Step::CustomsDuties => "customs_duties",
            Step::TotalCost => "total_cost",
            Step::LocalUnitCost => "local_unit_cost",
            Step::MarketplaceFees => "marketplace_fees",
            Step::SalePrice => "sale_price",
            Step::Profit => "profit",
        }
    }

    pub fn apply(self, ctx: &mut PricingContext<'_>) {
        match self {
            Step::FobValue => fob_value(ctx),
            Step::LogisticsCosts => logistics_costs(ctx),
            Step::CustomsDuties => customs_duties(ctx),
            Step::TotalCost => total_cost(ctx),
            Step::LocalUnitCost => local_unit_cost(ctx),
            Step::MarketplaceFees => marketplace_fees(ctx),
            Step::SalePrice => sale_price(ctx),
            Step::Profit => profit(ctx),
        }
    }
}

fn fob_value(ctx: &mut PricingContext<'_>) {
    let quantity = ctx.quantity();
    let p = &mut ctx.product;
    let unit_fob = p.origin_unit_value * ctx.rates.foreign_usd;
    p.unit_fob_usd = round_currency(unit_fob);
    p.total_fob_usd = round_currency(unit_fob * quantity);
}

fn logistics_costs(ctx: &mut PricingContext<'_>) {
    let quantity = ctx.quantity();
    let s = ctx.settings;
    let p = &mut ctx.product;

    let shipped_kg = p.unit_weight * quantity;
    p.storage = round_currency(shipped_kg * s.storage_per_kg);
    p.freight = round_currency(shipped_kg * s.freight_per_kg);
    p.freight_surcharge = round_currency(p.freight * s.freight_surcharge_pct);
    p.insurance = round_currency(p.total_fob_usd * s.insurance_pct);
    p.terminal_handling = round_currency(p.total_fob_usd * s.terminal_handling_pct);
}

fn customs_duties(ctx: &mut PricingContext<'_>) {
    let duties = ctx.duties;
    let p = &mut ctx.product;

    // Simplified: duties are assessed on the FOB total.
    p.customs_value = p.total_fob_usd;
    p.customs_duty = round_currency(p.customs_value * duties.customs);
    p.statistics_duty = round_currency(p.customs_value * duties.statistics);
    p.taxable_base = p.customs_value + p.customs_duty + p.statistics_duty;
    p.import_vat = round_currency(p.taxable_base * duties.vat);
}

fn total_cost(ctx: &mut PricingContext<'_>) {
    let quantity = ctx.quantity();
    let p = &mut ctx.product;

    p.total_cost = p.cost_components_sum();
    p.unit_cost_usd = if quantity > Decimal::ZERO {
        round_currency(p.total_cost / quantity)
    } else {
        Decimal::ZERO
    };
}

fn local_unit_cost(ctx: &mut PricingContext<'_>) {
    let quantity = ctx.quantity();
    let p = &mut ctx.product;

    p.unit_cost_local = if quantity > Decimal::ZERO {
        round_currency(p.total_cost / quantity * ctx.rates.usd_local)
    } else {
        Decimal::ZERO
    };
}

fn marketplace_fees(ctx: &mut PricingContext<'_>) {
    // Tier and commission come from the suggested price as it stands before
    // this computation settles a new one.
    let provisional = ctx.product.suggested_price;
    ctx.product.marketplace_fees = MarketplaceFees::at_price(provisional, ctx.settings).total();
}

fn sale_price(ctx: &mut PricingContext<'_>) {
    let p = &mut ctx.product;

    if !ctx.price_overridden {
        let keep = Decimal::ONE - ctx.settings.target_margin_pct;
        p.sale_price = round_currency((p.unit_cost_local + p.marketplace_fees) / keep);
    }
    p.suggested_price = p.sale_price;
}

fn profit(ctx: &mut PricingContext<'_>) {
    let p = &mut ctx.product;

    p.net_profit = p.sale_price - p.unit_cost_local - p.marketplace_fees;
    p.profit_pct = if p.sale_price > Decimal::ZERO {
        round_currency(p.net_profit / p.sale_price * Decimal::ONE_HUNDRED)
    } else {
        Decimal::ZERO
    };
    p.rates_live = ctx.rates.live;
}
