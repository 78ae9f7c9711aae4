use std::{sync::Arc, time::Duration};

use url::Url;

use crate::{
    configuration::FetcherSettings,
    domain::{HtmlFragment, SessionCookie, SessionToken},
};

use super::{BrowserError, BrowserLauncher, BrowserSession, Reporter};

/// Feed containers, most specific first.
pub const FEED_SELECTORS: [&str; 3] = [
    "ul.display-flex.flex-wrap.list-style-none.justify-center",
    ".scaffold-finite-scroll__content",
    ".application-outlet main",
];

const AUTH_WALL_SEGMENTS: [&str; 4] = ["login", "uas", "checkpoint", "authwall"];

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("redirected to {landed_on}; the session cookie is expired or invalid")]
    AuthFailure { landed_on: String },
    #[error("the page did not load within {after:?}")]
    Timeout { after: Duration },
    #[error(transparent)]
    Browser(BrowserError),
}

impl From<BrowserError> for FetchError {
    fn from(value: BrowserError) -> Self {
        match value {
            BrowserError::NavigationTimeout(after) => FetchError::Timeout { after },
            other => FetchError::Browser(other),
        }
    }
}

pub struct SessionFetcher {
    launcher: Arc<dyn BrowserLauncher>,
    settings: FetcherSettings,
}

impl SessionFetcher {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, settings: FetcherSettings) -> Self {
        SessionFetcher { launcher, settings }
    }

    /// Loads `target` with the session cookie installed and returns the feed
    /// markup. The browser session is closed on every path.
    pub async fn fetch(
        &self,
        token: &SessionToken,
        target: &Url,
        reporter: &dyn Reporter,
    ) -> Result<HtmlFragment, FetchError> {
        let session = self.launcher.launch().await?;
        let result = self.harvest(session.as_ref(), token, target, reporter).await;

        if let Err(e) = session.close().await {
            log::warn!("Failed to close browser session: {}", e);
        }

        result
    }

    async fn harvest(
        &self,
        session: &dyn BrowserSession,
        token: &SessionToken,
        target: &Url,
        reporter: &dyn Reporter,
    ) -> Result<HtmlFragment, FetchError> {
        let cookie = SessionCookie::new(&self.settings, token.clone());
        session.install_cookie(&cookie).await?;

        reporter.status("Loading LinkedIn in the browser...");
        session
            .navigate(target, self.settings.navigation_timeout())
            .await?;
        tokio::time::sleep(self.settings.settle_delay()).await;

        let landed_on = session.current_url().await?;
        if is_auth_wall(&landed_on) {
            reporter.error("LinkedIn redirected to login - cookie is expired or invalid!");
            return Err(FetchError::AuthFailure { landed_on });
        }

        for selector in FEED_SELECTORS {
            match session.inner_html(selector).await {
                Ok(Some(markup)) => {
                    if markup.trim().is_empty() {
                        log::warn!("Feed container {} matched but is empty", selector);
                        break;
                    }
                    reporter.success(&format!("Found feed container with selector: {}", selector));
                    return Ok(HtmlFragment::from_selector(selector, markup));
                }
                Ok(None) => log::debug!("Selector {} matched nothing", selector),
                Err(e) => log::debug!("Selector {} failed: {}", selector, e),
            }
        }

        reporter.warning("No specific container found, using full page HTML.");
        let markup = session.page_html().await?;

        Ok(HtmlFragment::full_page(markup))
    }
}

/// True when the browser landed on a login, checkpoint or auth-wall page,
/// judged by the first path segment so profile handles such as
/// `/in/loginova/` do not count.
pub fn is_auth_wall(landed_on: &str) -> bool {
    let Ok(url) = Url::parse(landed_on) else {
        return false;
    };
    let first_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .unwrap_or_default()
        .to_lowercase();

    AUTH_WALL_SEGMENTS.contains(&first_segment.as_str())
}
