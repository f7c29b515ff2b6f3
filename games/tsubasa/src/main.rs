use anyhow::Result;
use clap::Parser;
use core_logic::metrics::MetricsCollector;
use core_logic::{setup_logger, CredentialManager, ProxyManager, RosterRunner};
use dotenv::dotenv;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{error, info};
use tsubasa_rivals::{TsubasaConfig, TsubasaWorker};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "games/tsubasa/config/config.toml")]
    config: String,
    /// Ask for feature toggles and budgets even when the config file exists
    #[arg(short, long)]
    interactive: bool,
    /// Credential file, overrides `runner.credentials_file`
    #[arg(short, long)]
    data: Option<String>,
    /// Run a single pass over the roster and exit
    #[arg(long)]
    once: bool,
    #[arg(short, long)]
    export_metrics: Option<String>,
    /// Seconds between metrics exports
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    metrics_interval: u64,
}

#[tokio::main]
async fn main() {
    // Keep guard alive for file logging
    let log_guard = setup_logger();
    dotenv().ok();

    if let Err(e) = run().await {
        error!("Fatal error | {:#}", e);
        drop(log_guard);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let mut config = if TsubasaConfig::exists(&args.config) {
        info!("Loading config from: {}", args.config);
        TsubasaConfig::load(&args.config)?
    } else {
        info!("No config file at {}. Using defaults.", args.config);
        TsubasaConfig::default()
    };

    if args.interactive || !TsubasaConfig::exists(&args.config) {
        config = config.prompt_settings()?;
        info!("Configuration completed.");
    }

    if let Some(data) = args.data {
        config.runner.credentials_file = data;
    }
    config.validate()?;

    let credentials = CredentialManager::from_file(&config.runner.credentials_file)?;
    let proxies = ProxyManager::load_proxies(&config.runner.proxies_file)?;

    let roster = RosterRunner::new(config.runner.clone());
    let worker = TsubasaWorker::new(Arc::new(config), proxies);

    let metrics_task = if let Some(ref metrics_path) = args.export_metrics {
        let path = metrics_path.clone();
        let interval_secs = args.metrics_interval;
        Some(tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(interval_secs));
            loop {
                interval.tick().await;
                let metrics = MetricsCollector::global();
                if let Err(e) = metrics.export_to_file(&path).await {
                    tracing::error!("Metrics export failed: {}", e);
                }
            }
        }))
    } else {
        None
    };

    let max_passes = if args.once { Some(1) } else { None };
    roster
        .run(&worker, credentials.credentials(), max_passes)
        .await?;

    if let Some(task) = metrics_task {
        task.abort();
    }

    if let Some(metrics_path) = args.export_metrics {
        let metrics = MetricsCollector::global();
        match metrics.export_to_file(&metrics_path).await {
            Ok(_) => info!("Final metrics exported to {}", metrics_path),
            Err(e) => error!("Failed to export final metrics: {}", e),
        }
    }

    Ok(())
}
