use crate::scrapers::types::RenderedPage;
use anyhow::Result;
use async_trait::async_trait;

/// A live browser page used for one request.
///
/// Every call suspends until the engine answers.
#[async_trait]
pub trait RenderSession: Send {
    /// Load `url` and wait for the navigation to settle
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Snapshot of the current document after client-side rendering
    async fn rendered(&mut self) -> Result<RenderedPage>;

    /// Release the browser. Calling it more than once is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Opens a fresh, exclusively owned [`RenderSession`]
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn RenderSession>>;
}
