//! In-memory stand-in for the browser, serving fixture HTML by URL.

use crate::scrapers::traits::{RenderSession, SessionLauncher};
use crate::scrapers::types::RenderedPage;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Shared {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    fail_launch: bool,
    launched: AtomicUsize,
    closed: AtomicUsize,
    visited: Mutex<Vec<String>>,
}

#[derive(Clone, Default)]
pub struct FakeLauncher {
    shared: Arc<Shared>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    fn edit(mut self, f: impl FnOnce(&mut Shared)) -> Self {
        let shared = Arc::get_mut(&mut self.shared).expect("configure before sharing");
        f(shared);
        self
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.edit(|s| {
            s.pages.insert(url.to_string(), html.to_string());
        })
    }

    /// Navigating to `url` fails like a timed-out load
    pub fn failing(self, url: &str) -> Self {
        self.edit(|s| {
            s.failing.insert(url.to_string());
        })
    }

    pub fn failing_launch(self) -> Self {
        self.edit(|s| s.fail_launch = true)
    }

    pub fn launched(&self) -> usize {
        self.shared.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.shared.closed.load(Ordering::SeqCst)
    }

    pub fn visited(&self) -> Vec<String> {
        self.shared.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn RenderSession>> {
        if self.shared.fail_launch {
            bail!("Failed to launch Chrome browser");
        }
        self.shared.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            shared: self.shared.clone(),
            current: None,
            open: true,
        }))
    }
}

struct FakeSession {
    shared: Arc<Shared>,
    current: Option<String>,
    open: bool,
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        if !self.open {
            bail!("Browser session already closed");
        }
        self.shared.visited.lock().unwrap().push(url.to_string());

        if self.shared.failing.contains(url) {
            bail!("Navigation timed out: {}", url);
        }
        if !self.shared.pages.contains_key(url) {
            bail!("net::ERR_NAME_NOT_RESOLVED at {}", url);
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn rendered(&mut self) -> Result<RenderedPage> {
        let url = self
            .current
            .clone()
            .ok_or_else(|| anyhow!("No page loaded"))?;
        let html = self.shared.pages.get(&url).cloned().unwrap_or_default();
        Ok(RenderedPage { url, html })
    }

    async fn close(&mut self) -> Result<()> {
        if std::mem::replace(&mut self.open, false) {
            self.shared.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
