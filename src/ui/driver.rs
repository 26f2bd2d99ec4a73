use crate::telemetry::error_chain_fmt;
use crate::ui::Locator;
use std::time::Duration;

#[derive(thiserror::Error)]
pub enum UiError {
    #[error("{locator} did not become visible within {timeout:?}")]
    NotVisible { locator: String, timeout: Duration },
    #[error("No element matches {0}")]
    NotFound(String),
    #[error("The network did not become idle within {0:?}")]
    NetworkNotIdle(Duration),
    #[error("Failed to launch the browser: {0}")]
    Launch(String),
    #[error("The browser reported an error")]
    Browser(#[from] chromiumoxide::error::CdpError),
    #[error("A page script returned an unexpected value")]
    Script(#[from] serde_json::Error),
}

impl std::fmt::Debug for UiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// The browser operations the UI flows need.
#[async_trait::async_trait]
pub trait PageDriver: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), UiError>;

    async fn click(&self, locator: &Locator) -> Result<(), UiError>;

    /// Replace the value of an input.
    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), UiError>;

    async fn wait_for_network_idle(&self) -> Result<(), UiError>;

    async fn is_visible(&self, locator: &Locator) -> Result<bool, UiError>;
}
