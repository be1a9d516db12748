use anyhow::Result;
use owner_collector::Refresher;
use owner_collector::config::Config;
use owner_collector::repository::Database;
use owner_collector::rpc::HttpTransport;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting owner change collector");

    let config = Config::from_env()?;
    info!("Configuration loaded");
    info!("Contract address: {:?}", config.contract_address);
    info!("Owner change topic: {:?}", config.owner_change_topic);

    let db = Database::new(&config.database_url)?;
    info!("Database initialized");

    let transport = HttpTransport::new(&config.json_rpc_url, config.request_timeout)?;
    info!("RPC endpoint: {}", transport.url());

    let mut refresher = Refresher::new(config, transport);

    let report = match refresher.refresh(&db).await {
        Ok(report) => report,
        Err(e) => {
            error!("Refresh error: {}", e);
            return Err(e.into());
        }
    };

    for failure in &report.failures {
        warn!("Skipped {}", failure);
    }
    info!(
        "Refresh complete at block {}: {} owner records, {} chunks, {} skipped",
        report.latest_block,
        report.records_written,
        report.chunks_scanned,
        report.failures.len()
    );

    Ok(())
}
