use anyhow::Result;
use async_trait::async_trait;
use careerscout_core::ListingRecord;
use serde::{Deserialize, Serialize};

mod memory;
mod postgres;

pub use memory::{MemoryConnector, MemorySink, MemoryStore};
pub use postgres::{PgConnector, PgSink, PgVacancyStore, migrate};

/// Accepts listings one at a time. Each insert is committed before it returns.
#[async_trait]
pub trait RecordSink: Send {
    async fn insert(&mut self, record: &ListingRecord) -> Result<i64>;

    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Opens a dedicated sink for one scrape session.
#[async_trait]
pub trait SinkConnector: Send + Sync {
    type Sink: RecordSink;

    async fn connect(&self) -> Result<Self::Sink>;
}

/// A listing as stored, with its identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredVacancy {
    pub id: i64,
    pub company: String,
    #[sqlx(rename = "vacancy")]
    pub title: String,
    pub location: String,
    pub salary: String,
    pub skills: String,
    pub link: String,
}

impl StoredVacancy {
    pub fn from_record(id: i64, record: &ListingRecord) -> Self {
        Self {
            id,
            company: record.company.clone(),
            title: record.title.clone(),
            location: record.location.clone(),
            salary: record.salary.clone(),
            skills: record.skills.clone(),
            link: record.link.clone(),
        }
    }
}

/// Work schedule as advertised in the listing's meta line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Schedule {
    PartTime,
    FullTime,
}

impl Schedule {
    pub const PART_TIME_MARKER: &'static str = "Неполный рабочий день";
    pub const FULL_TIME_MARKER: &'static str = "Полный рабочий день";

    /// Case-insensitive match against a location line. "Полный" is a
    /// substring of "Неполный", so full-time excludes part-time lines.
    pub fn matches(self, location: &str) -> bool {
        let location = location.to_lowercase();
        let part = location.contains(&Self::PART_TIME_MARKER.to_lowercase());
        match self {
            Schedule::PartTime => part,
            Schedule::FullTime => {
                !part && location.contains(&Self::FULL_TIME_MARKER.to_lowercase())
            }
        }
    }
}

/// Read side used by the front end.
#[async_trait]
pub trait VacancyQuery: Send + Sync {
    async fn count(&self) -> Result<i64>;

    /// Highest assigned id, 0 for an empty store.
    async fn latest_id(&self) -> Result<i64>;

    /// Rows inserted after `id`, oldest first.
    async fn since(&self, id: i64, limit: i64) -> Result<Vec<StoredVacancy>>;

    async fn random(&self, limit: i64) -> Result<Vec<StoredVacancy>>;

    async fn by_company(&self, pattern: &str, limit: i64) -> Result<Vec<StoredVacancy>>;

    async fn by_title(&self, pattern: &str, limit: i64) -> Result<Vec<StoredVacancy>>;

    async fn count_by_schedule(&self, schedule: Schedule) -> Result<i64>;
}
