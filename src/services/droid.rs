use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thirtyfour::{
    error::WebDriverError, extensions::cdp::ChromeDevTools, By, ChromiumLikeCapabilities,
    DesiredCapabilities, WebDriver,
};
use url::Url;

use crate::{configuration::BrowserSettings, domain::SessionCookie};

use super::{BrowserError, BrowserLauncher, BrowserSession};

const NAVIGATION_GRACE: Duration = Duration::from_secs(10);

/// How long to wait on the driver's reply to a navigation bounded by
/// `page_load` on the driver side.
fn backstop_for(page_load: Duration) -> Duration {
    page_load + NAVIGATION_GRACE
}

/// Launches Chrome sessions through a WebDriver server (chromedriver or a
/// selenium grid).
pub struct Droid {
    settings: BrowserSettings,
}

impl Droid {
    pub fn new(settings: BrowserSettings) -> Self {
        Droid { settings }
    }
}

#[async_trait]
impl BrowserLauncher for Droid {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let mut caps = DesiredCapabilities::chrome();
        if self.settings.headless {
            caps.set_headless()?;
        }
        caps.add_arg(&format!(
            "--window-size={},{}",
            self.settings.window_width, self.settings.window_height
        ))?;
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;

        // http://localhost:9515 for a bare chromedriver
        // http://chrome:4444/wd/hub for the compose grid
        let driver = WebDriver::new(self.settings.webdriver_url.as_str(), caps).await?;
        log::info!("Opened browser session on {}", self.settings.webdriver_url);

        Ok(Box::new(DroidSession { driver }))
    }
}

pub struct DroidSession {
    driver: WebDriver,
}

#[async_trait]
impl BrowserSession for DroidSession {
    async fn install_cookie(&self, cookie: &SessionCookie) -> Result<(), BrowserError> {
        // WebDriver's own add-cookie needs a loaded page on the cookie's
        // domain; DevTools sets it on a blank tab.
        let dev_tools = ChromeDevTools::new(self.driver.handle.clone());
        dev_tools
            .execute_cdp_with_params(
                "Network.setCookie",
                json!({
                    "name": cookie.name,
                    "value": cookie.value.expose(),
                    "domain": cookie.domain,
                    "path": cookie.path,
                    "secure": true,
                    "httpOnly": true,
                }),
            )
            .await?;

        Ok(())
    }

    async fn navigate(&self, url: &Url, timeout: Duration) -> Result<(), BrowserError> {
        // chromedriver aborts the load itself; the local timer only guards
        // against a driver that stops answering.
        self.driver.set_page_load_timeout(timeout).await?;

        match tokio::time::timeout(backstop_for(timeout), self.driver.goto(url.as_str())).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(WebDriverError::Timeout(_))) | Err(_) => {
                Err(BrowserError::NavigationTimeout(timeout))
            }
            Ok(Err(e)) => Err(e.into()),
        }
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn inner_html(&self, selector: &str) -> Result<Option<String>, BrowserError> {
        let elements = self.driver.find_all(By::Css(selector)).await?;
        match elements.into_iter().next() {
            Some(element) => Ok(Some(element.inner_html().await?)),
            None => Ok(None),
        }
    }

    async fn page_html(&self) -> Result<String, BrowserError> {
        Ok(self.driver.source().await?)
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.driver.clone().quit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::backstop_for;

    #[test]
    fn driver_timeout_fires_before_local_backstop() {
        let page_load = Duration::from_secs(60);

        assert!(backstop_for(page_load) > page_load);
        assert_eq!(backstop_for(page_load), Duration::from_secs(70));
    }
}
