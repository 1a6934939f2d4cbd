//! Landed CLI
//!
//! Fetches exchange rates and prices imported products from the command line.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use landed_common::{Product, Settings};
use landed_fx::{QuoteProvider, RateProvider, StaticQuote};
use landed_pricing::{InMemoryProductStore, InMemorySettingsStore, PricingService};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

mod config;
mod report;

use config::{load_settings, LandedConfig};

/// Landed import cost CLI
#[derive(Parser, Debug)]
#[command(name = "landed")]
#[command(about = "Landed cost and resale price calculator for imported goods")]
struct Cli {
    /// Skip the live sources and price with the built-in rates
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Acquire and print the current exchange rates
    Rates,

    /// Price a product and print the full breakdown
    Price(PriceArgs),

    /// Print the short summary for a product with default duties
    Quick(ItemArgs),
}

#[derive(Args, Debug)]
struct ItemArgs {
    /// Unit value in the origin currency
    #[arg(long)]
    value: Decimal,

    /// Unit weight in kg
    #[arg(long)]
    weight: Decimal,

    /// Number of units
    #[arg(long)]
    quantity: u32,
}

#[derive(Args, Debug)]
struct PriceArgs {
    #[command(flatten)]
    item: ItemArgs,

    #[arg(long, default_value = "Imported item")]
    description: String,

    /// Customs duty fraction
    #[arg(long)]
    duty: Option<Decimal>,

    /// Statistics duty fraction
    #[arg(long)]
    statistics: Option<Decimal>,

    /// Import VAT fraction
    #[arg(long)]
    vat: Option<Decimal>,

    /// Sell at this price instead of the suggested one
    #[arg(long)]
    price: Option<Decimal>,

    /// JSON settings file; defaults are used when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Print the priced product as JSON
    #[arg(long)]
    json: bool,
}

impl PriceArgs {
    fn product(&self) -> Product {
        let mut product = Product::new(
            self.description.clone(),
            self.item.value,
            self.item.weight,
            self.item.quantity,
        );
        if let Some(duty) = self.duty {
            product.customs_duty_pct = Some(duty);
        }
        if let Some(statistics) = self.statistics {
            product.statistics_duty_pct = Some(statistics);
        }
        if let Some(vat) = self.vat {
            product.vat_pct = Some(vat);
        }
        if let Some(price) = self.price {
            product = product.with_sale_price(price);
        }
        product
    }
}

fn init_tracing(config: &LandedConfig) {
    let filter = tracing_subscriber::EnvFilter::new(&config.log_level);
    let fmt = if config.log_json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry().with(filter).with(fmt).init();
}

fn quote_provider(config: &LandedConfig, offline: bool) -> anyhow::Result<Arc<dyn QuoteProvider>> {
    if offline {
        return Ok(Arc::new(StaticQuote::offline()));
    }
    let provider = RateProvider::from_config(&config.rate_provider())?;
    Ok(Arc::new(provider))
}

fn pricing_service(rates: Arc<dyn QuoteProvider>, settings: Settings) -> PricingService {
    PricingService::new(
        Arc::new(InMemorySettingsStore::with_settings(settings)),
        Arc::new(InMemoryProductStore::new()),
        rates,
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = LandedConfig::from_env();
    init_tracing(&config);

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let cli = Cli::parse();

    match cli.command {
        Command::Rates => {
            let acquisition = if cli.offline {
                landed_fx::Acquisition::Default(StaticQuote::offline().acquire().await)
            } else {
                RateProvider::from_config(&config.rate_provider())?
                    .acquire_detailed()
                    .await
            };
            info!(tier = acquisition.tier(), "Rates acquired");
            print!("{}", report::render_rates(&acquisition));
        }

        Command::Price(args) => {
            let settings = match &args.settings {
                Some(path) => load_settings(path)?,
                None => Settings::default(),
            };
            let service = pricing_service(quote_provider(&config, cli.offline)?, settings.clone());

            let priced = service
                .price_product(
                    args.product().with_settings_duties(&settings),
                    args.price.is_some(),
                )
                .await
                .context("pricing failed")?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&priced)?);
            } else {
                print!("{}", report::render_breakdown(&priced, &settings));
            }
        }

        Command::Quick(item) => {
            let service = pricing_service(quote_provider(&config, cli.offline)?, Settings::default());

            let quick = service
                .quick_quote(item.value, item.weight, item.quantity)
                .await
                .context("quick calculation failed")?;
            print!("{}", report::render_quick(&quick));
        }
    }

    Ok(())
}
