mod config;
mod date;
mod models;
mod parsers;
mod pipeline;
mod scrapers;
mod server;

use config::AppConfig;
use parsers::naturalization::PATTERN_VERSION;
use scrapers::ChromeLauncher;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;

    info!("📰 DOU Naturalization Fetcher");
    info!(
        "Listing: {} (settle {:?}, person pattern v{})",
        config.listing_url_template, config.settle_delay, PATTERN_VERSION
    );

    let launcher = Arc::new(ChromeLauncher::new(config.browser.clone()));
    server::serve(&config, launcher).await
}
