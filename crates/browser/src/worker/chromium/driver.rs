use async_trait::async_trait;
use careerscout_core::{ElementHandle, PageDriver, ScrapeError, SiteProfile};
use chromiumoxide::browser::Browser;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use std::path::PathBuf;
use tokio::task::JoinHandle;

use super::wait::WaitStrategy;
use crate::shared::{js, script_exception_to_scrape_error, to_scrape_error};

pub struct ChromiumElement(Element);

impl ChromiumElement {
    /// Runs `function` with the element as `this`. A throw inside the script
    /// comes back as exception details rather than a protocol error.
    async fn call(&self, function: &str, action: &str) -> Result<Option<serde_json::Value>, ScrapeError> {
        let ret = self.0.call_js_fn(function, false).await
            .map_err(|e| to_scrape_error(e, action))?;
        if let Some(details) = ret.exception_details {
            let thrown = details
                .exception
                .and_then(|ex| ex.description)
                .unwrap_or(details.text);
            return Err(script_exception_to_scrape_error(&thrown, action));
        }
        Ok(ret.result.value)
    }
}

#[async_trait]
impl ElementHandle for ChromiumElement {
    async fn find(&self, selector: &str) -> Result<Option<Self>, ScrapeError> {
        let found = self.0.find_elements(selector).await
            .map_err(|e| to_scrape_error(e, "Find"))?;
        Ok(found.into_iter().next().map(ChromiumElement))
    }

    async fn text(&self) -> Result<String, ScrapeError> {
        let text = self.0.inner_text().await
            .map_err(|e| to_scrape_error(e, "ReadText"))?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn link(&self) -> Result<Option<String>, ScrapeError> {
        let value = self.call(js::element::READ_HREF, "ReadLink").await?;
        Ok(value.and_then(|v| v.as_str().map(str::to_string)))
    }
}

/// One headless Chromium with a single tab.
pub struct ChromiumDriver {
    pub(super) browser: Browser,
    pub(super) page: Page,
    pub(super) handler: JoinHandle<()>,
    pub(super) profile_dir: PathBuf,
    pub(super) wait_strategy: WaitStrategy,
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    type Element = ChromiumElement;

    async fn open(&self, url: &str) -> Result<(), ScrapeError> {
        tracing::debug!(url, "opening page");
        self.page.goto(url).await
            .map_err(|e| ScrapeError::navigation_error(format!("Open {} failed: {}", url, e)))?;
        self.wait_strategy.wait_for_stable(&self.page).await
    }

    async fn submit_search(&self, profile: &SiteProfile, query: &str) -> Result<(), ScrapeError> {
        let selector = profile.search_input.as_str();
        self.wait_strategy.wait_for_element(&self.page, selector).await?;

        let input = self.page.find_element(selector).await
            .map_err(|e| to_scrape_error(e, "FindSearchInput"))?;
        input.click().await
            .map_err(|e| to_scrape_error(e, "FocusSearchInput"))?
            .type_str(query).await
            .map_err(|e| to_scrape_error(e, "TypeQuery"))?
            .press_key("Enter").await
            .map_err(|e| to_scrape_error(e, "SubmitQuery"))?;

        self.wait_strategy.wait_for_navigation(&self.page).await
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ChromiumElement>, ScrapeError> {
        let found = self.page.find_elements(selector).await
            .map_err(|e| to_scrape_error(e, "FindAll"))?;
        Ok(found.into_iter().map(ChromiumElement).collect())
    }

    async fn scroll_into_view(&self, element: &ChromiumElement) -> Result<(), ScrapeError> {
        element.call(js::element::SCROLL_INTO_VIEW, "Scroll").await?;
        Ok(())
    }

    async fn click(&self, element: &ChromiumElement) -> Result<(), ScrapeError> {
        // Script click, same as the site's own pagination handlers expect
        element.call(js::element::CLICK, "Click").await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<Option<String>, ScrapeError> {
        self.page.url().await.map_err(|e| to_scrape_error(e, "Url"))
    }

    async fn close(self) -> Result<(), ScrapeError> {
        let ChromiumDriver { mut browser, page, handler, profile_dir, .. } = self;
        drop(page);

        let closed = browser.close().await
            .map_err(|e| ScrapeError::browser_error(format!("Browser close failed: {}", e)));
        if let Err(e) = browser.wait().await {
            tracing::warn!(error = %e, "browser process did not exit cleanly");
        }
        handler.abort();

        if let Err(e) = tokio::fs::remove_dir_all(&profile_dir).await {
            tracing::debug!(dir = %profile_dir.display(), error = %e, "profile dir not removed");
        }

        closed.map(|_| ())
    }
}
