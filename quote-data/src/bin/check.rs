use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quote_data::QuoteConfig;
use tracing_subscriber::EnvFilter;

/// Load a wizard configuration directory and report what it contains.
///
/// The directory must hold:
/// - rates.toml: pricing rate tables
/// - steps.toml: step order and declarative step definitions
/// - supplies.csv: moving supplies catalog (id,category,name,description,price)
#[derive(Parser, Debug)]
#[command(name = "quote-config-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration directory
    #[arg(short, long)]
    config: PathBuf,

    /// Print every step id in order
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    println!("Checking configuration in: {}", args.config.display());

    let config = QuoteConfig::load(&args.config)
        .with_context(|| format!("Invalid configuration in: {}", args.config.display()))?;

    let catalog = config.catalog();
    let rates = config.rates();
    println!(
        "{} steps ({} declarative), review at {}",
        catalog.step_count(),
        catalog.definitions().count(),
        config
            .review_index()
            .map_or_else(|| "none".to_string(), |i| i.to_string())
    );
    println!(
        "{} move sizes, {} challenges, {} additional services, tax rate {}",
        rates.move_size.len(),
        rates.challenges.len(),
        rates.additional_services.len(),
        rates.tax.rate
    );
    println!(
        "{} supply items in {} categories",
        config.supplies().len(),
        config.supplies().categories().len()
    );

    if args.verbose {
        for index in 0..catalog.step_count() {
            if let Some(id) = catalog.step_id(index) {
                println!("  {index:>2}  {id}");
            }
        }
    }

    println!("Configuration OK.");

    Ok(())
}
