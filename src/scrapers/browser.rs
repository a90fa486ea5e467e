use crate::scrapers::traits::{RenderSession, SessionLauncher};
use crate::scrapers::types::{BrowserOptions, RenderedPage};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Keep Chrome alive across the settle delay and slow gazette pages
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(300);

/// Launches one headless Chrome per request
pub struct ChromeLauncher {
    options: BrowserOptions,
}

impl ChromeLauncher {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn RenderSession>> {
        let options = self.options.clone();
        let session = tokio::task::spawn_blocking(move || ChromeSession::open(&options))
            .await
            .context("Browser launch task panicked")??;
        Ok(Box::new(session))
    }
}

/// A Chrome process with a single tab
pub struct ChromeSession {
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
}

impl ChromeSession {
    fn open(options: &BrowserOptions) -> Result<Self> {
        info!("Launching headless Chrome...");

        let launch_options = LaunchOptions::default_builder()
            .headless(options.headless)
            .sandbox(false)
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(launch_options).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;

        if let Some(timeout) = options.navigation_timeout {
            tab.set_default_timeout(timeout);
        }

        Ok(Self {
            browser: Some(browser),
            tab: Some(tab),
        })
    }

    fn tab(&self) -> Result<Arc<Tab>> {
        self.tab
            .clone()
            .ok_or_else(|| anyhow!("Browser session already closed"))
    }
}

#[async_trait]
impl RenderSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let tab = self.tab()?;
        let target = url.to_string();

        debug!("Navigating to {}", target);
        tokio::task::spawn_blocking(move || -> Result<()> {
            tab.navigate_to(&target)
                .with_context(|| format!("Failed to navigate to {}", target))?;
            tab.wait_until_navigated()
                .with_context(|| format!("Navigation to {} did not settle", target))?;
            Ok(())
        })
        .await
        .context("Navigation task panicked")?
    }

    async fn rendered(&mut self) -> Result<RenderedPage> {
        let tab = self.tab()?;

        tokio::task::spawn_blocking(move || -> Result<RenderedPage> {
            let html_result = tab
                .evaluate("document.documentElement.outerHTML", false)
                .context("Failed to read page HTML")?;

            let html = match html_result.value {
                Some(value) => value.as_str().unwrap_or("").to_string(),
                None => {
                    warn!("Could not get HTML from page");
                    String::new()
                }
            };
            let url = tab.get_url();

            debug!("Captured {} bytes of HTML from {}", html.len(), url);
            Ok(RenderedPage { url, html })
        })
        .await
        .context("Page capture task panicked")?
    }

    async fn close(&mut self) -> Result<()> {
        let tab = self.tab.take();
        let Some(browser) = self.browser.take() else {
            return Ok(());
        };

        tokio::task::spawn_blocking(move || -> Result<()> {
            if let Some(tab) = tab {
                tab.close(false).context("Failed to close browser tab")?;
            }
            // Dropping the handle terminates the Chrome process
            drop(browser);
            Ok(())
        })
        .await
        .context("Browser close task panicked")?
    }
}
