use anyhow::Result;
use owner_collector::config::Config;
use owner_collector::repository::Database;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let config = Config::from_env()?;

    info!("Running migrations on database: {}", config.database_url);

    let _db = Database::new(&config.database_url)?;

    info!("Migrations completed successfully");

    Ok(())
}
