//! Storefront CLI
//!
//! Evaluates collections and discounts against a fixture set.

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use storefront::{
    collections::CollectionError,
    config::{ConfigError, EngineConfig},
    discounts::{DiscountError, calculator::DiscountOutcome},
    fixtures::{Fixture, FixtureError},
    ids::OrderId,
    receipt::{OrderReceipt, ReceiptError},
    tags::collection::TagCollection,
};
use tabled::{builder::Builder, settings::Style};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront rules CLI", long_about = None)]
struct Cli {
    /// Fixture directory
    #[arg(long, env = "STOREFRONT_FIXTURES", default_value = "./fixtures")]
    fixtures: PathBuf,

    /// Fixture set name
    #[arg(long, default_value = "default")]
    set: String,

    /// Engine configuration file
    #[arg(long, env = "STOREFRONT_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    logging: LoggingArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Log output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

#[derive(Debug, Args)]
struct LoggingArgs {
    /// Log level or filter (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List a collection's products in its sort order
    Collection {
        /// Collection handle
        handle: String,
    },

    /// Show how each discount on an order was evaluated
    Discounts {
        /// Order id
        order: u32,
    },

    /// Print an order receipt
    Receipt {
        /// Order id
        order: u32,
    },

    /// List the catalog
    Catalog,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid log filter {value:?}: {message}")]
    LogFilter { value: String, message: String },

    #[error("failed to install log subscriber: {0}")]
    Subscriber(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error(transparent)]
    Discount(#[from] DiscountError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            _ = writeln!(io::stderr(), "error: {error}");

            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    init_logging(&cli.logging)?;

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let mut fixture = Fixture::with_base_path(&cli.fixtures);
    fixture.load_set(&cli.set)?;

    info!(set = %cli.set, fixtures = %cli.fixtures.display(), "fixture set loaded");

    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Collection { handle } => show_collection(&mut out, &fixture, &config, &handle),
        Commands::Discounts { order } => show_discounts(&mut out, &fixture, &config, order),
        Commands::Receipt { order } => {
            let order = fixture.order(OrderId::new(order))?;
            let receipt = OrderReceipt::new(order, fixture.catalog()?, &config.calculator())?;

            receipt.write_to(&mut out)?;

            Ok(())
        }
        Commands::Catalog => show_catalog(&mut out, &fixture),
    }
}

fn init_logging(args: &LoggingArgs) -> Result<(), CliError> {
    let filter = EnvFilter::try_new(&args.log_level).map_err(|error| CliError::LogFilter {
        value: args.log_level.clone(),
        message: error.to_string(),
    })?;

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match args.log_format {
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(io::stderr),
            )
            .try_init(),
    };

    installed.map_err(|error| CliError::Subscriber(error.to_string()))
}

fn show_collection(
    out: &mut impl Write,
    fixture: &Fixture,
    config: &EngineConfig,
    handle: &str,
) -> Result<(), CliError> {
    let collection = fixture.collection(handle)?;
    let products = collection.sorted_products(&config.matcher(), fixture.catalog()?)?;

    writeln!(
        out,
        "{} ({}, match {})",
        collection.title, collection.handle, collection.rule.mode
    )?;

    for condition in collection.rule.describe() {
        writeln!(out, "  {condition}")?;
    }

    let mut builder = Builder::default();
    builder.push_record(["ID", "Title", "Tags", "Price"]);

    for product in &products {
        builder.push_record([
            product.id.to_string(),
            product.title.clone(),
            product.tags.iter().collect::<Vec<_>>().join(", "),
            product.price.to_string(),
        ]);
    }

    writeln!(out, "{}", render(builder))?;
    writeln!(out, "{} product(s)", products.len())?;

    Ok(())
}

fn show_discounts(
    out: &mut impl Write,
    fixture: &Fixture,
    config: &EngineConfig,
    order: u32,
) -> Result<(), CliError> {
    let order = fixture.order(OrderId::new(order))?;
    let breakdown = config.calculator().compute(order, fixture.catalog()?)?;

    let mut builder = Builder::default();
    builder.push_record(["Discount", "Description", "Outcome"]);

    for line in &breakdown.lines {
        let description = fixture
            .discount(line.discount)
            .map(ToString::to_string)
            .unwrap_or_default();

        let outcome = match line.outcome {
            DiscountOutcome::Applied(amount) => format!("-{amount}"),
            DiscountOutcome::Skipped(reason) => format!("skipped: {reason}"),
        };

        builder.push_record([line.handle.clone(), description, outcome]);
    }

    writeln!(out, "Order #{} ({})", order.id, order.status())?;
    writeln!(out, "{}", render(builder))?;
    writeln!(out, "Total discount: {}", breakdown.total)?;

    if breakdown.shipping_waived {
        writeln!(out, "Shipping waived")?;
    }

    Ok(())
}

fn show_catalog(out: &mut impl Write, fixture: &Fixture) -> Result<(), CliError> {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Title", "Type", "Vendor", "Tags", "Price", "Stock"]);

    for product in fixture.catalog()?.iter() {
        let stock = if product.tracks_stock() {
            product.quantity.to_string()
        } else {
            "untracked".to_string()
        };

        builder.push_record([
            product.id.to_string(),
            product.title.clone(),
            product.product_type.handle.clone(),
            product.vendor.clone(),
            product.tags.iter().collect::<Vec<_>>().join(", "),
            product.price.to_string(),
            stock,
        ]);
    }

    writeln!(out, "{}", render(builder))?;

    Ok(())
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table.with(Style::modern_rounded());

    table.to_string()
}
