//! Scripted stand-ins for the browser and the extraction backend.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use url::Url;

use crate::{configuration::FetcherSettings, domain::SessionCookie};

use super::{
    BackendError, BrowserError, BrowserLauncher, BrowserSession, ExtractionBackend,
    ExtractionRequest, ExtractionResult,
};

pub fn quick_fetcher_settings() -> FetcherSettings {
    FetcherSettings {
        navigation_timeout_secs: 1,
        settle_delay_secs: 0,
        ..FetcherSettings::default()
    }
}

#[derive(Clone, Default)]
pub struct ScriptedPage {
    landed_on: String,
    elements: HashMap<String, Result<String, String>>,
    page_html: String,
    navigation_times_out: bool,
}

impl ScriptedPage {
    pub fn landing_on(url: &str) -> Self {
        ScriptedPage {
            landed_on: url.to_string(),
            page_html: "<html><body></body></html>".to_string(),
            ..Default::default()
        }
    }

    pub fn with_element(mut self, selector: &str, markup: &str) -> Self {
        self.elements
            .insert(selector.to_string(), Ok(markup.to_string()));
        self
    }

    pub fn with_failing_element(mut self, selector: &str) -> Self {
        self.elements
            .insert(selector.to_string(), Err("stale element reference".to_string()));
        self
    }

    pub fn with_page_html(mut self, markup: &str) -> Self {
        self.page_html = markup.to_string();
        self
    }

    pub fn with_navigation_timeout(mut self) -> Self {
        self.navigation_times_out = true;
        self
    }
}

#[derive(Clone)]
pub struct ScriptedLauncher {
    page: ScriptedPage,
    fail_launch: bool,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLauncher {
    pub fn new(page: ScriptedPage) -> Self {
        ScriptedLauncher {
            page,
            fail_launch: false,
            calls: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn unavailable() -> Self {
        ScriptedLauncher {
            fail_launch: true,
            ..ScriptedLauncher::new(ScriptedPage::default())
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

#[async_trait]
impl BrowserLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        if self.fail_launch {
            return Err(BrowserError::Session(
                "could not connect to webdriver".to_string(),
            ));
        }

        Ok(Box::new(ScriptedSession {
            page: self.page.clone(),
            calls: self.calls.clone(),
        }))
    }
}

struct ScriptedSession {
    page: ScriptedPage,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSession {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn install_cookie(&self, cookie: &SessionCookie) -> Result<(), BrowserError> {
        self.record(format!(
            "cookie {} {} {}",
            cookie.name, cookie.domain, cookie.path
        ));
        Ok(())
    }

    async fn navigate(&self, url: &Url, timeout: Duration) -> Result<(), BrowserError> {
        self.record(format!("navigate {}", url));
        if self.page.navigation_times_out {
            return Err(BrowserError::NavigationTimeout(timeout));
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        self.record("current_url".to_string());
        Ok(self.page.landed_on.clone())
    }

    async fn inner_html(&self, selector: &str) -> Result<Option<String>, BrowserError> {
        self.record(format!("probe {}", selector));
        match self.page.elements.get(selector) {
            Some(Ok(markup)) => Ok(Some(markup.clone())),
            Some(Err(reason)) => Err(BrowserError::Session(reason.clone())),
            None => Ok(None),
        }
    }

    async fn page_html(&self) -> Result<String, BrowserError> {
        self.record("page_html".to_string());
        Ok(self.page.page_html.clone())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.record("close".to_string());
        Ok(())
    }
}

/// What the scripted backend saw on one call.
#[derive(Debug, Clone)]
pub struct BackendCall {
    pub document_path: PathBuf,
    pub document_existed: bool,
    pub document: String,
    pub instruction: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Clone)]
pub struct ScriptedBackend {
    response: Option<Vec<ExtractionResult>>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl ScriptedBackend {
    /// Replies with the given backend output, e.g.
    /// `[{"success": true, "extracted_content": "[]"}]`.
    pub fn replying(results_json: &str) -> Self {
        ScriptedBackend {
            response: Some(serde_json::from_str(results_json).unwrap()),
            calls: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Fails the call itself rather than reporting an unsuccessful result.
    pub fn broken() -> Self {
        ScriptedBackend {
            response: None,
            calls: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtractionBackend for ScriptedBackend {
    async fn run(&self, request: ExtractionRequest) -> Result<Vec<ExtractionResult>, BackendError> {
        let document_path = request.document_url.to_file_path().unwrap();
        let document = std::fs::read_to_string(&document_path).unwrap_or_default();
        self.calls.lock().unwrap().push(BackendCall {
            document_existed: document_path.exists(),
            document_path,
            document,
            instruction: request.instruction.clone(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        });

        match &self.response {
            Some(results) => Ok(results.clone()),
            None => Err(BackendError::Client("connection refused".to_string())),
        }
    }
}
