use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod error;
mod profile;
mod record;

pub use error::{ErrorCategory, ScrapeError};
pub use profile::{FieldRead, FieldSpec, HABR_CAREER_URL, Pacing, ScrapeConfig, SiteProfile};
pub use record::{
    COMPANY_NOT_SPECIFIED, Field, LOCATION_NOT_SPECIFIED, ListingRecord, RecordBuilder,
    SALARY_NOT_SPECIFIED, SKILLS_NOT_SPECIFIED,
};

/// A live element reference inside the current page.
///
/// Lookups return `Ok(None)` when nothing matches; `Err` is reserved for
/// driver failures (detached nodes, dead browser).
#[async_trait]
pub trait ElementHandle: Send + Sync + Sized {
    /// First descendant matching `selector`.
    async fn find(&self, selector: &str) -> Result<Option<Self>, ScrapeError>;

    /// Rendered text, trimmed.
    async fn text(&self) -> Result<String, ScrapeError>;

    /// Absolute URL the element links to, if it is a link.
    async fn link(&self) -> Result<Option<String>, ScrapeError>;
}

/// One browser tab (or its static stand-in) driven step by step.
#[async_trait]
pub trait PageDriver: Send + Sync {
    type Element: ElementHandle;

    async fn open(&self, url: &str) -> Result<(), ScrapeError>;

    /// Types `query` into the search control and submits it.
    async fn submit_search(&self, profile: &SiteProfile, query: &str) -> Result<(), ScrapeError>;

    /// All matches in document order.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, ScrapeError>;

    async fn find_first(&self, selector: &str) -> Result<Option<Self::Element>, ScrapeError> {
        Ok(self.find_all(selector).await?.into_iter().next())
    }

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<(), ScrapeError>;

    async fn click(&self, element: &Self::Element) -> Result<(), ScrapeError>;

    async fn current_url(&self) -> Result<Option<String>, ScrapeError>;

    /// Releases the underlying browser. Called exactly once per session.
    async fn close(self) -> Result<(), ScrapeError>
    where
        Self: Sized;
}

/// Acquires a fresh driver for one scrape session.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Driver: PageDriver;

    async fn launch(&self) -> Result<Self::Driver, ScrapeError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeJob {
    pub id: Uuid,
    pub query: String,
}

impl ScrapeJob {
    pub fn new(query: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), query: query.into() }
    }
}

/// Summary of a finished scrape session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionReport {
    pub job_id: Uuid,
    pub query: String,
    pub pages: u32,
    pub records_sunk: u32,
    pub cards_skipped: u32,
}

#[async_trait]
pub trait ScrapeWorker: Send + Sync {
    async fn execute(&self, job: &ScrapeJob) -> Result<SessionReport, ScrapeError>;
}
