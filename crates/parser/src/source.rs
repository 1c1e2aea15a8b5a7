use async_trait::async_trait;
use careerscout_core::ScrapeError;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

/// Where the static driver gets its HTML from.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, ScrapeError>;
}

#[derive(Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        let response = self.client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ScrapeError::navigation_error(format!("GET {} failed: {}", url, e)))?
            .error_for_status()
            .map_err(|e| ScrapeError::navigation_error(e.to_string()))?;

        response
            .text()
            .await
            .map_err(|e| ScrapeError::navigation_error(format!("Reading {} failed: {}", url, e)))
    }
}

/// Fixed set of pages keyed by absolute URL. Records every fetch.
#[derive(Clone, Default)]
pub struct FixtureSource {
    pages: Arc<HashMap<String, String>>,
    visits: Arc<Mutex<Vec<String>>>,
}

impl FixtureSource {
    pub fn new<I, K, V>(pages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pages: Arc::new(pages.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
            visits: Arc::default(),
        }
    }

    /// URLs fetched so far, in order.
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PageSource for FixtureSource {
    async fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(url.to_string());
        }
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| ScrapeError::navigation_error(format!("GET {} returned 404", url)))
    }
}
