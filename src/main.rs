//! fare-engine
//!
//! Reads newline-delimited JSON quote requests on stdin, prices each trip on
//! the fare worker, applies GST and writes one JSON quote per line.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

use taxi_fare_engine::pricing::{FareCalculator, TariffRepository};
use taxi_fare_engine::quoting::price_line;
use taxi_fare_engine::{Config, FareDispatcher, SharedFareDispatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        gst_rate = config.gst_rate.percent(),
        supplier_gstin = config.supplier_gstin.as_deref().unwrap_or("-"),
        "Starting fare engine"
    );

    let tariffs = TariffRepository::standard();
    info!(categories = tariffs.categories().len(), "Tariff table loaded");

    let calculator = Arc::new(FareCalculator::new(tariffs));
    let dispatcher: SharedFareDispatcher =
        Arc::new(FareDispatcher::start(calculator, config.dispatch));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let (output, worker_lost) = match price_line(&dispatcher, &config, &line).await {
            Ok(json) => (json, false),
            Err(e) => {
                warn!(error = %e, transient = e.is_transient(), "Quote failed");
                (serde_json::json!({ "error": e.to_string() }), e.is_transient())
            }
        };

        stdout
            .write_all(format!("{}\n", output).as_bytes())
            .await
            .context("Failed to write stdout")?;

        if worker_lost {
            // Nothing after this line can be priced.
            stdout.flush().await?;
            error!("Fare worker unavailable, stopping");
            anyhow::bail!("fare worker unavailable");
        }
    }
    stdout.flush().await?;

    info!(pending = dispatcher.pending_count(), "Input exhausted, shutting down");
    Ok(())
}
