use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::error::WebDriverError;
use url::Url;

use crate::domain::SessionCookie;

#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("webdriver command failed: {0}")]
    Driver(#[from] WebDriverError),
    #[error("navigation did not finish within {0:?}")]
    NavigationTimeout(Duration),
    #[error("browser session error: {0}")]
    Session(String),
}

/// Starts isolated browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

/// One browser window with its own cookie jar.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Must be callable before the first navigation.
    async fn install_cookie(&self, cookie: &SessionCookie) -> Result<(), BrowserError>;

    async fn navigate(&self, url: &Url, timeout: Duration) -> Result<(), BrowserError>;

    async fn current_url(&self) -> Result<String, BrowserError>;

    /// Inner HTML of the first element matching the CSS selector, `None` if
    /// nothing matches.
    async fn inner_html(&self, selector: &str) -> Result<Option<String>, BrowserError>;

    async fn page_html(&self) -> Result<String, BrowserError>;

    async fn close(&self) -> Result<(), BrowserError>;
}
