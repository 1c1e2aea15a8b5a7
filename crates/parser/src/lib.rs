//! JavaScript-less page driver: pages are fetched whole and queried with
//! `scraper`. Works for sites that render results server-side.

use async_trait::async_trait;
use careerscout_core::{BrowserLauncher, ElementHandle, PageDriver, ScrapeError, SiteProfile};
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, Mutex};
use url::Url;

mod source;

pub use source::{FixtureSource, HttpSource, PageSource};

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector)
        .map_err(|e| ScrapeError::parsing_error(format!("Invalid selector '{}': {}", selector, e)))
}

fn to_element(el: ElementRef<'_>, base: &Url) -> StaticElement {
    StaticElement {
        base: base.clone(),
        html: el.html(),
        href: el.value().attr("href").map(str::to_string),
    }
}

/// Detached copy of a matched element.
#[derive(Debug, Clone)]
pub struct StaticElement {
    base: Url,
    html: String,
    href: Option<String>,
}

impl StaticElement {
    /// First matching descendant; the element itself never matches.
    fn select_first(&self, selector: &str) -> Result<Option<StaticElement>, ScrapeError> {
        let sel = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&self.html);
        // The fragment wraps the copy in an <html> root.
        let Some(own) = fragment.root_element().children().find_map(ElementRef::wrap) else {
            return Ok(None);
        };
        Ok(own
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| sel.matches(el))
            .map(|el| to_element(el, &self.base)))
    }

    fn resolved_href(&self) -> Option<Url> {
        self.href.as_deref().and_then(|href| self.base.join(href).ok())
    }
}

#[async_trait]
impl ElementHandle for StaticElement {
    async fn find(&self, selector: &str) -> Result<Option<Self>, ScrapeError> {
        self.select_first(selector)
    }

    async fn text(&self) -> Result<String, ScrapeError> {
        let fragment = Html::parse_fragment(&self.html);
        let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    async fn link(&self) -> Result<Option<String>, ScrapeError> {
        Ok(self.resolved_href().map(String::from))
    }
}

#[derive(Clone)]
struct LoadedPage {
    url: Url,
    html: Arc<str>,
}

pub struct StaticDriver<S> {
    source: S,
    page: Mutex<Option<LoadedPage>>,
}

impl<S: PageSource> StaticDriver<S> {
    pub fn new(source: S) -> Self {
        Self { source, page: Mutex::new(None) }
    }

    fn loaded(&self) -> Result<LoadedPage, ScrapeError> {
        self.page
            .lock()
            .ok()
            .and_then(|p| p.clone())
            .ok_or_else(|| ScrapeError::navigation_error("No page loaded"))
    }

    async fn load(&self, url: Url) -> Result<(), ScrapeError> {
        tracing::debug!(url = %url, "fetching page");
        let html = self.source.fetch(&url).await?;
        let mut page = self.page
            .lock()
            .map_err(|_| ScrapeError::browser_error("Page state poisoned"))?;
        *page = Some(LoadedPage { url, html: html.into() });
        Ok(())
    }
}

#[async_trait]
impl<S: PageSource> PageDriver for StaticDriver<S> {
    type Element = StaticElement;

    async fn open(&self, url: &str) -> Result<(), ScrapeError> {
        let url = Url::parse(url)
            .map_err(|e| ScrapeError::navigation_error(format!("Bad URL '{}': {}", url, e)))?;
        self.load(url).await
    }

    async fn submit_search(&self, profile: &SiteProfile, query: &str) -> Result<(), ScrapeError> {
        let template = profile.search_url.as_deref().ok_or_else(|| {
            ScrapeError::navigation_error("Site profile has no search URL for static fetching")
        })?;
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.open(&template.replace("{query}", &encoded)).await
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<StaticElement>, ScrapeError> {
        let page = self.loaded()?;
        let sel = parse_selector(selector)?;
        let document = Html::parse_document(&page.html);
        Ok(document.select(&sel).map(|el| to_element(el, &page.url)).collect())
    }

    async fn scroll_into_view(&self, _element: &StaticElement) -> Result<(), ScrapeError> {
        Ok(())
    }

    async fn click(&self, element: &StaticElement) -> Result<(), ScrapeError> {
        let target = element
            .resolved_href()
            .ok_or_else(|| ScrapeError::click_intercepted("Control has no link target"))?;
        self.load(target).await
    }

    async fn current_url(&self) -> Result<Option<String>, ScrapeError> {
        Ok(self.loaded().ok().map(|p| p.url.to_string()))
    }

    async fn close(self) -> Result<(), ScrapeError> {
        Ok(())
    }
}

/// Hands out a fresh [`StaticDriver`] per session over a shared source.
#[derive(Clone)]
pub struct StaticLauncher<S> {
    source: S,
}

impl<S> StaticLauncher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: PageSource + Clone + 'static> BrowserLauncher for StaticLauncher<S> {
    type Driver = StaticDriver<S>;

    async fn launch(&self) -> Result<StaticDriver<S>, ScrapeError> {
        Ok(StaticDriver::new(self.source.clone()))
    }
}
