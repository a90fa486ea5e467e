//! One `/fetch` request from listing to extracted records.

use crate::models::{FetchReport, PortariaRef, ResultEntry, SearchDate};
use crate::scrapers::gazette::{
    fetch_certified_records, fetch_listing, listing_url, resolve_certified,
};
use crate::scrapers::{RenderSession, SessionLauncher};
use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

pub const CERTIFIED_NOT_FOUND: &str = "Certified version not found";

/// What the pipeline needs from [`crate::config::AppConfig`]
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub listing_url_template: String,
    pub settle_delay: Duration,
}

/// Scrape one day of the gazette.
///
/// A single browser session serves the whole run and is closed whether or
/// not the run succeeds. Any hard failure drops every result gathered so far.
pub async fn run(
    launcher: &dyn SessionLauncher,
    settings: &PipelineSettings,
    date: SearchDate,
) -> Result<FetchReport> {
    let mut session = launcher.launch().await?;

    let outcome = collect(session.as_mut(), settings, &date).await;

    if let Err(e) = session.close().await {
        warn!("Failed to close browser session: {:#}", e);
    }

    let results = outcome?;
    Ok(FetchReport { date, results })
}

async fn collect(
    session: &mut dyn RenderSession,
    settings: &PipelineSettings,
    date: &SearchDate,
) -> Result<Vec<ResultEntry>> {
    let url = listing_url(&settings.listing_url_template, date);
    let listings = fetch_listing(session, &url, settings.settle_delay).await?;

    let mut results = Vec::with_capacity(listings.len());

    for listing in listings {
        let certified_url = resolve_certified(session, &listing).await?;

        let (naturalizados, warning) = match &certified_url {
            Some(certified) => {
                let records = fetch_certified_records(session, certified).await?;
                info!("{}: {} naturalization records", listing.title, records.len());
                (records, None)
            }
            None => {
                warn!("{}: certified version not found", listing.title);
                (Vec::new(), Some(CERTIFIED_NOT_FOUND.to_string()))
            }
        };

        results.push(ResultEntry {
            portaria: PortariaRef {
                title: listing.title,
                detail_url: listing.detail_url,
                certified_url,
            },
            naturalizados,
            warning,
        });
    }

    Ok(results)
}
