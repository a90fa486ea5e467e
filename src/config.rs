//! Start-up configuration.
//!
//! Environment variables are read once in `main` and turned into an
//! [`AppConfig`] that is handed to the server; request handling never reads
//! the environment.

use crate::scrapers::gazette::{DATE_PLACEHOLDER, DEFAULT_LISTING_URL};
use crate::scrapers::BrowserOptions;
use anyhow::{bail, Context, Result};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Listing address with a `{date}` placeholder
    pub listing_url_template: String,
    /// Extra wait after the listing page loads
    pub settle_delay: Duration,
    pub browser: BrowserOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            listing_url_template: DEFAULT_LISTING_URL.to_string(),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            browser: BrowserOptions::default(),
        }
    }
}

/// Raw values as found in the environment
#[derive(Debug, Default, Clone)]
pub struct EnvValues {
    pub port: Option<String>,
    pub listing_url: Option<String>,
    pub settle_delay_ms: Option<String>,
    pub navigation_timeout_secs: Option<String>,
    pub headless: Option<String>,
}

impl EnvValues {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            port: var("PORT"),
            listing_url: var("DOU_LISTING_URL"),
            settle_delay_ms: var("SETTLE_DELAY_MS"),
            navigation_timeout_secs: var("NAVIGATION_TIMEOUT_SECS"),
            headless: var("CHROME_HEADLESS"),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_values(EnvValues::from_env())
    }

    pub fn from_values(values: EnvValues) -> Result<Self> {
        let defaults = Self::default();

        let port = match values.port {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
            None => defaults.port,
        };

        let listing_url_template = values
            .listing_url
            .unwrap_or(defaults.listing_url_template);
        if !listing_url_template.contains(DATE_PLACEHOLDER) {
            bail!(
                "DOU_LISTING_URL must contain {}, got {:?}",
                DATE_PLACEHOLDER,
                listing_url_template
            );
        }

        let settle_delay = match values.settle_delay_ms {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("SETTLE_DELAY_MS must be milliseconds, got {:?}", raw))?,
            ),
            None => defaults.settle_delay,
        };

        let navigation_timeout = values
            .navigation_timeout_secs
            .map(|raw| {
                raw.trim().parse::<u64>().map(Duration::from_secs).with_context(|| {
                    format!("NAVIGATION_TIMEOUT_SECS must be seconds, got {:?}", raw)
                })
            })
            .transpose()?;

        let headless = match values.headless.as_deref().map(str::trim) {
            None => defaults.browser.headless,
            Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => true,
            Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
            Some(v) => bail!("CHROME_HEADLESS must be true or false, got {:?}", v),
        };

        Ok(Self {
            port,
            listing_url_template,
            settle_delay,
            browser: BrowserOptions {
                headless,
                navigation_timeout,
            },
        })
    }
}
