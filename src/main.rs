// src/main.rs

//! pricewatch CLI
//!
//! Entry point for the watcher: evaluates eligible spreadsheet rows against
//! scraped marketplace offers, forever or one at a time.

use clap::{Parser, Subcommand};

use pricewatch::config::Config;
use pricewatch::error::Result;
use pricewatch::pipeline::Evaluator;
use pricewatch::scrape::HtmlPageSource;
use pricewatch::sheet::{RestGridClient, RowStore};

/// pricewatch - marketplace offer watcher
#[derive(Parser, Debug)]
#[command(
    name = "pricewatch",
    version,
    about = "Watches marketplace offers and reconciles price rankings into a spreadsheet"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "pricewatch.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate every eligible row, forever
    Run,

    /// Evaluate a single row and exit
    Once {
        /// 1-based row index
        index: u32,
    },

    /// List the row indexes eligible for evaluation
    Rows,

    /// Validate the configuration and exit
    Check,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = Config::load_or_default(&cli.config);

    if let Command::Check = cli.command {
        config.validate()?;
        log::info!("Configuration OK: sheet {}", config.sheet.spreadsheet_key);
        return Ok(());
    }

    config.validate()?;

    let client = RestGridClient::new(&config.sheet, config.run.timeout_secs)?;
    let store = RowStore::new(client);
    let source = HtmlPageSource::new(&config.run)?;
    let evaluator = Evaluator::new(&store, &source, &config);

    match cli.command {
        Command::Run => evaluator.run_forever().await,
        Command::Once { index } => evaluator.process_row(index).await,
        Command::Rows => {
            let indexes = evaluator.eligible_indexes().await?;
            log::info!("Run indexes: {:?}", indexes);
        }
        Command::Check => unreachable!(),
    }

    Ok(())
}
