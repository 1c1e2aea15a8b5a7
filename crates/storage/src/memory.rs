use anyhow::{Result, bail};
use async_trait::async_trait;
use careerscout_core::ListingRecord;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::{RecordSink, Schedule, SinkConnector, StoredVacancy, VacancyQuery};

#[derive(Debug, Default)]
struct Inner {
    rows: Mutex<Vec<StoredVacancy>>,
    fail_after: Mutex<Option<usize>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// In-process store for dry runs and tests.
///
/// Clones share the same rows. `fail_after(n)` makes every sink break once
/// the store holds `n` rows, emulating a dropped connection.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_after(&self, rows: usize) {
        *self.inner.fail_after.lock().await = Some(rows);
    }

    pub async fn rows(&self) -> Vec<StoredVacancy> {
        self.inner.rows.lock().await.clone()
    }

    pub fn connector(&self) -> MemoryConnector {
        MemoryConnector { store: self.clone() }
    }

    /// Sinks opened so far.
    pub fn opened(&self) -> usize {
        self.inner.opened.load(Ordering::SeqCst)
    }

    /// Sinks closed so far.
    pub fn closed(&self) -> usize {
        self.inner.closed.load(Ordering::SeqCst)
    }

    async fn filtered<F>(&self, limit: i64, keep: F) -> Vec<StoredVacancy>
    where
        F: Fn(&StoredVacancy) -> bool,
    {
        let mut rows: Vec<_> = self.inner.rows.lock().await.iter().filter(|r| keep(*r)).cloned().collect();
        rows.shuffle(&mut rand::thread_rng());
        rows.truncate(limit.max(0) as usize);
        rows
    }
}

#[derive(Debug, Clone)]
pub struct MemoryConnector {
    store: MemoryStore,
}

#[async_trait]
impl SinkConnector for MemoryConnector {
    type Sink = MemorySink;

    async fn connect(&self) -> Result<MemorySink> {
        self.store.inner.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MemorySink { store: self.store.clone(), broken: false })
    }
}

pub struct MemorySink {
    store: MemoryStore,
    broken: bool,
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn insert(&mut self, record: &ListingRecord) -> Result<i64> {
        if self.broken {
            bail!("connection is closed");
        }
        let mut rows = self.store.inner.rows.lock().await;
        if let Some(limit) = *self.store.inner.fail_after.lock().await {
            if rows.len() >= limit {
                self.broken = true;
                bail!("connection reset by peer");
            }
        }
        let id = rows.last().map_or(1, |r| r.id + 1);
        rows.push(StoredVacancy::from_record(id, record));
        Ok(id)
    }

    async fn close(self) -> Result<()> {
        self.store.inner.closed.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            bail!("connection already broken");
        }
        Ok(())
    }
}

#[async_trait]
impl VacancyQuery for MemoryStore {
    async fn count(&self) -> Result<i64> {
        Ok(self.inner.rows.lock().await.len() as i64)
    }

    async fn latest_id(&self) -> Result<i64> {
        Ok(self.inner.rows.lock().await.last().map_or(0, |r| r.id))
    }

    async fn since(&self, id: i64, limit: i64) -> Result<Vec<StoredVacancy>> {
        Ok(self.inner.rows.lock().await
            .iter()
            .filter(|r| r.id > id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn random(&self, limit: i64) -> Result<Vec<StoredVacancy>> {
        Ok(self.filtered(limit, |_| true).await)
    }

    async fn by_company(&self, pattern: &str, limit: i64) -> Result<Vec<StoredVacancy>> {
        let pattern = pattern.to_lowercase();
        Ok(self.filtered(limit, |r| r.company.to_lowercase().contains(&pattern)).await)
    }

    async fn by_title(&self, pattern: &str, limit: i64) -> Result<Vec<StoredVacancy>> {
        let pattern = pattern.to_lowercase();
        Ok(self.filtered(limit, |r| r.title.to_lowercase().contains(&pattern)).await)
    }

    async fn count_by_schedule(&self, schedule: Schedule) -> Result<i64> {
        Ok(self.inner.rows.lock().await.iter().filter(|r| schedule.matches(&r.location)).count() as i64)
    }
}
