//! Plain-text rendering of quotes and breakdowns.

use std::fmt::Write;

use landed_common::{age_string, format_percentage, Currency, Money, Product, Settings};
use landed_fx::Acquisition;
use landed_pricing::QuickQuote;
use rust_decimal::Decimal;

fn usd(value: Decimal) -> Money {
    Money::new(value, Currency::Usd)
}

fn local(value: Decimal) -> Money {
    Money::new(value, Currency::Ars)
}

/// Summary of an acquired quote.
pub fn render_rates(acquisition: &Acquisition) -> String {
    let quote = acquisition.quote();
    let mut out = String::new();

    let _ = writeln!(out, "Source:      {}", acquisition.tier());
    let _ = writeln!(out, "CNY -> USD:  {}", quote.foreign_usd_display());
    let _ = writeln!(out, "USD -> ARS:  {}", quote.usd_local_display());
    let _ = writeln!(out, "CNY -> ARS:  {:.2}", quote.cross_rate());
    let _ = writeln!(
        out,
        "Quoted:      {} ({} ago)",
        quote.quoted_at.format("%Y-%m-%d %H:%M:%S UTC"),
        age_string(quote.quoted_at)
    );
    if quote.is_fallback {
        let _ = writeln!(out, "Warning:     live rates unavailable, using fallback");
    }
    out
}

/// Full cost breakdown of a priced product.
pub fn render_breakdown(product: &Product, settings: &Settings) -> String {
    let duties = product.duty_rates(settings);
    let mut out = String::new();

    let _ = writeln!(out, "{} x{}", product.description, product.quantity);
    let _ = writeln!(out, "  Unit FOB            {}", usd(product.unit_fob_usd));
    let _ = writeln!(out, "  Total FOB           {}", usd(product.total_fob_usd));
    let _ = writeln!(out, "Logistics");
    let _ = writeln!(out, "  Storage             {}", usd(product.storage));
    let _ = writeln!(out, "  Freight             {}", usd(product.freight));
    let _ = writeln!(out, "  Freight surcharge   {}", usd(product.freight_surcharge));
    let _ = writeln!(out, "  Insurance           {}", usd(product.insurance));
    let _ = writeln!(out, "  Terminal handling   {}", usd(product.terminal_handling));
    let _ = writeln!(out, "Customs");
    let _ = writeln!(out, "  Customs value       {}", usd(product.customs_value));
    let _ = writeln!(
        out,
        "  Duty ({})       {}",
        format_percentage(duties.customs),
        usd(product.customs_duty)
    );
    let _ = writeln!(
        out,
        "  Statistics ({})  {}",
        format_percentage(duties.statistics),
        usd(product.statistics_duty)
    );
    let _ = writeln!(out, "  Taxable base        {}", usd(product.taxable_base));
    let _ = writeln!(
        out,
        "  VAT ({})        {}",
        format_percentage(duties.vat),
        usd(product.import_vat)
    );
    let _ = writeln!(out, "Totals");
    let _ = writeln!(out, "  Total cost          {}", usd(product.total_cost));
    let _ = writeln!(out, "  Unit cost           {}", usd(product.unit_cost_usd));
    let _ = writeln!(out, "  Unit cost (local)   {}", local(product.unit_cost_local));
    let _ = writeln!(out, "  Marketplace fees    {}", local(product.marketplace_fees));
    let _ = writeln!(out, "  Sale price          {}", local(product.sale_price));
    let _ = writeln!(out, "  Net profit          {}", local(product.net_profit));
    let _ = writeln!(
        out,
        "  Profit              {}% (target {})",
        product.profit_pct,
        settings.target_margin_display()
    );
    if !product.rates_live {
        let _ = writeln!(out, "Priced with fallback exchange rates");
    }
    out
}

pub fn render_quick(quick: &QuickQuote) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Total cost         {}", usd(quick.total_cost_usd));
    let _ = writeln!(out, "Unit cost (local)  {}", local(quick.unit_cost_local));
    let _ = writeln!(out, "Suggested price    {}", local(quick.suggested_price));
    let _ = writeln!(out, "Profit             {}%", quick.profit_pct);
    if !quick.rates_live {
        let _ = writeln!(out, "Priced with fallback exchange rates");
    }
    out
}
