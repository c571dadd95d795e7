use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use tokio::time::{interval, MissedTickBehavior};

use pump_scanner::cli::Cli;
use pump_scanner::config::Config;
use pump_scanner::data_loader::load_symbols_from_csv;
use pump_scanner::logging;
use pump_scanner::scanner::Scanner;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref(), cli.debug)?;

    info!("Starting pump scanner...");

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("Configuration loading failed for {:?}", cli.config))?
        .with_env_overrides();
    if let Some(symbols) = cli.symbols {
        config.scan.symbols_path = symbols;
    }
    config.validate()?;
    info!("Configuration loaded successfully.");

    let symbols_path = config.scan.symbols_path.clone();
    let mut entries = load_symbols_from_csv(&symbols_path)
        .with_context(|| format!("Failed to load symbol list {:?}", symbols_path))?;

    let scanner = Scanner::from_config(&config)?;
    info!("Scanner initialized with {} symbols.", entries.len());

    if cli.once {
        let summary = scanner.run_cycle(&entries).await;
        info!("Single scan finished: {:?}", summary);
        return Ok(());
    }

    let mut ticker = interval(config.scan.scan_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!("Starting scan loop every {} seconds...", config.scan.scan_interval_secs);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested, stopping scan loop.");
                return Ok(());
            }
        }

        // Edits to the symbol list are picked up on the next cycle.
        match load_symbols_from_csv(&symbols_path) {
            Ok(reloaded) => entries = reloaded,
            Err(e) => error!("Failed to reload symbol list, keeping previous {} symbols: {}", entries.len(), e),
        }

        let summary = scanner.run_cycle(&entries).await;
        info!(
            "Scan cycle finished: {}/{} scored, {} alerts, {} stable reports",
            summary.scored, summary.total, summary.alerts, summary.stable_reports
        );
    }
}
