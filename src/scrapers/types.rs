use std::time::Duration;

/// Rendered markup together with the address it was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    /// Final document address, used to resolve relative links
    pub url: String,
    /// `document.documentElement.outerHTML`
    pub html: String,
}

/// Settings for launching the headless browser
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    /// Engine default applies when `None`
    pub navigation_timeout: Option<Duration>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            navigation_timeout: None,
        }
    }
}
