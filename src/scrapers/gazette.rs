//! Diário Oficial da União listing and detail pages.
//!
//! The pages build their link lists client-side, so everything here reads
//! the markup a [`RenderSession`] produced rather than the raw HTTP body.

use crate::models::{NaturalizationRecord, PortariaListing, SearchDate};
use crate::parsers::parse_naturalizacao;
use crate::scrapers::traits::RenderSession;
use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_LISTING_URL: &str = "https://www.in.gov.br/leiturajornal?secao=dou1&data={date}";

/// Placeholder substituted with the query date in the listing template
pub const DATE_PLACEHOLDER: &str = "{date}";

static PORTARIA_HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)portaria-n-").expect("valid portaria regex"));
static CERTIFIED_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)vers[aã]o certificada").expect("valid certified regex"));
static CERTIFIED_LOOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)certificada").expect("valid certified regex"));
static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid anchor selector"));

/// Listing address for a given day
pub fn listing_url(template: &str, date: &SearchDate) -> String {
    template.replace(DATE_PLACEHOLDER, date.as_str())
}

/// Load the day's listing and collect its portaria links.
///
/// `settle` is slept after navigation because the link list is injected by
/// script after the load event.
pub async fn fetch_listing(
    session: &mut dyn RenderSession,
    url: &str,
    settle: Duration,
) -> Result<Vec<PortariaListing>> {
    info!("Opening gazette listing {}", url);
    session
        .navigate(url)
        .await
        .with_context(|| format!("Failed to load listing page {}", url))?;

    tokio::time::sleep(settle).await;

    let page = session.rendered().await?;
    let listings = parse_listing(&page.html, &page.url);
    info!("Found {} portaria links", listings.len());
    Ok(listings)
}

/// Load a portaria's detail page and find the link to its certified text
pub async fn resolve_certified(
    session: &mut dyn RenderSession,
    listing: &PortariaListing,
) -> Result<Option<String>> {
    session
        .navigate(&listing.detail_url)
        .await
        .with_context(|| format!("Failed to load detail page {}", listing.detail_url))?;

    let page = session.rendered().await?;
    Ok(find_certified_link(&page.html, &page.url))
}

/// Load the certified text and pull naturalization records out of it
pub async fn fetch_certified_records(
    session: &mut dyn RenderSession,
    certified_url: &str,
) -> Result<Vec<NaturalizationRecord>> {
    session
        .navigate(certified_url)
        .await
        .with_context(|| format!("Failed to load certified text {}", certified_url))?;

    let page = session.rendered().await?;
    Ok(parse_naturalizacao(&page.html))
}

/// Portaria anchors in document order, one per resolved address
pub fn parse_listing(html: &str, page_url: &str) -> Vec<PortariaListing> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();
    let mut seen = HashSet::new();
    let mut listings = Vec::new();

    for anchor in document.select(&ANCHOR) {
        let raw = anchor.value().attr("href").unwrap_or("");
        if !PORTARIA_HREF.is_match(raw) {
            continue;
        }

        let detail_url = resolve_href(base.as_ref(), raw);
        if !seen.insert(detail_url.clone()) {
            debug!("Skipping duplicate portaria link {}", detail_url);
            continue;
        }

        listings.push(PortariaListing {
            title: anchor_text(&anchor).trim().to_string(),
            detail_url,
        });
    }

    listings
}

/// Address of the "Versão certificada" link.
///
/// Falls back to the first anchor mentioning "certificada" at all. That
/// fallback may pick up unrelated page chrome; the first hit is taken as-is.
pub fn find_certified_link(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).ok();

    first_link_matching(&document, base.as_ref(), &CERTIFIED_TEXT)
        .or_else(|| first_link_matching(&document, base.as_ref(), &CERTIFIED_LOOSE))
}

/// Target of the first anchor whose text matches; an anchor without a
/// usable target counts as no match.
fn first_link_matching(document: &Html, base: Option<&Url>, pattern: &Regex) -> Option<String> {
    let anchor = document
        .select(&ANCHOR)
        .find(|a| pattern.is_match(&anchor_text(a)))?;

    let href = resolve_href(base, anchor.value().attr("href")?);
    (!href.is_empty()).then_some(href)
}

fn anchor_text(anchor: &ElementRef<'_>) -> String {
    anchor.text().collect()
}

/// Absolute form of `href`, the way the browser exposes `a.href`
fn resolve_href(base: Option<&Url>, href: &str) -> String {
    match base.and_then(|b| b.join(href.trim()).ok()) {
        Some(url) => url.to_string(),
        None => href.to_string(),
    }
}
