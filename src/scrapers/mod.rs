pub mod browser;
#[cfg(test)]
pub mod fake;
pub mod gazette;
pub mod traits;
pub mod types;

pub use browser::ChromeLauncher;
pub use traits::{RenderSession, SessionLauncher};
pub use types::BrowserOptions;
