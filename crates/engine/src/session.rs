use async_trait::async_trait;
use careerscout_core::{
    BrowserLauncher, ErrorCategory, PageDriver, ScrapeConfig, ScrapeError, ScrapeJob, ScrapeWorker,
    SessionReport,
};
use careerscout_storage::{RecordSink, SinkConnector};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::Instrument;

use crate::harvester::CardHarvester;
use crate::pagination::{PageTurn, advance};

/// One search, start to finish: a browser and a sink acquired for this run
/// only, released on every exit path.
pub struct ScrapeSession<'a, L, C> {
    launcher: &'a L,
    connector: &'a C,
    config: &'a ScrapeConfig,
}

impl<'a, L, C> ScrapeSession<'a, L, C>
where
    L: BrowserLauncher,
    C: SinkConnector,
{
    pub fn new(launcher: &'a L, connector: &'a C, config: &'a ScrapeConfig) -> Self {
        Self { launcher, connector, config }
    }

    pub async fn run(&self, job: &ScrapeJob) -> Result<SessionReport, ScrapeError> {
        let span = tracing::info_span!("scrape_session", job_id = %job.id, query = %job.query);
        self.run_scoped(job).instrument(span).await
    }

    async fn run_scoped(&self, job: &ScrapeJob) -> Result<SessionReport, ScrapeError> {
        let driver = self.launcher.launch().await?;

        let mut sink = match self.connector.connect().await {
            Ok(sink) => sink,
            Err(e) => {
                release_driver(driver).await;
                return Err(ScrapeError::resource_acquisition(format!(
                    "Could not open storage connection: {:#}",
                    e
                )));
            }
        };

        let mut report = SessionReport {
            job_id: job.id,
            query: job.query.clone(),
            ..Default::default()
        };
        let outcome = self.drive(&driver, &mut sink, job, &mut report).await;

        release_driver(driver).await;
        if let Err(e) = sink.close().await {
            tracing::warn!(error = %format!("{:#}", e), "failed to close storage connection");
        }

        match outcome {
            Ok(()) => {
                tracing::info!(
                    pages = report.pages,
                    records = report.records_sunk,
                    skipped = report.cards_skipped,
                    "scrape finished"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    pages = report.pages,
                    records = report.records_sunk,
                    "scrape aborted"
                );
                Err(e)
            }
        }
    }

    async fn drive<D, S>(
        &self,
        driver: &D,
        sink: &mut S,
        job: &ScrapeJob,
        report: &mut SessionReport,
    ) -> Result<(), ScrapeError>
    where
        D: PageDriver,
        S: RecordSink,
    {
        let profile = &self.config.profile;
        let pacing = &self.config.pacing;

        driver.open(&profile.entry_url).await?;
        driver.submit_search(profile, &job.query).await?;
        sleep(pacing.search_settle).await;

        loop {
            report.pages += 1;
            let mut harvester = CardHarvester::scan(driver, profile).await?;
            let url = driver.current_url().await.ok().flatten().unwrap_or_default();
            tracing::debug!(page = report.pages, url = %url, cards = harvester.remaining(), "harvesting page");

            while let Some((index, result)) = harvester.next_record().await {
                match result {
                    Ok(record) => {
                        let id = sink.insert(&record).await.map_err(|e| {
                            ScrapeError::storage_error(format!("{:#}", e))
                        })?;
                        report.records_sunk += 1;
                        tracing::trace!(id, title = %record.title, "record stored");
                    }
                    Err(e) if e.category == ErrorCategory::RequiredFieldMissing => {
                        report.cards_skipped += 1;
                        tracing::warn!(page = report.pages, card_index = index, error = %e, "skipping card");
                    }
                    Err(e) => return Err(e),
                }
            }

            match advance(driver, profile, pacing).await {
                PageTurn::Advanced { attempts } => {
                    tracing::debug!(attempts, "moved to next page");
                }
                PageTurn::Exhausted(reason) => {
                    tracing::debug!(?reason, "no more pages");
                    return Ok(());
                }
            }
        }
    }
}

async fn release_driver<D: PageDriver>(driver: D) {
    if let Err(e) = driver.close().await {
        tracing::warn!(error = %e, "failed to release browser");
    }
}

/// Runs each job as a fresh [`ScrapeSession`].
pub struct SessionWorker<L, C> {
    launcher: L,
    connector: C,
    config: Arc<ScrapeConfig>,
}

impl<L, C> SessionWorker<L, C> {
    pub fn new(launcher: L, connector: C, config: Arc<ScrapeConfig>) -> Self {
        Self { launcher, connector, config }
    }
}

#[async_trait]
impl<L, C> ScrapeWorker for SessionWorker<L, C>
where
    L: BrowserLauncher,
    C: SinkConnector,
{
    async fn execute(&self, job: &ScrapeJob) -> Result<SessionReport, ScrapeError> {
        ScrapeSession::new(&self.launcher, &self.connector, &self.config)
            .run(job)
            .await
    }
}
