use anyhow::{Context, Result, anyhow};
use careerscout_browser::ChromiumLauncher;
use careerscout_core::{BrowserLauncher, ScrapeConfig, SiteProfile};
use careerscout_engine::SessionWorker;
use careerscout_parser::{HttpSource, StaticLauncher};
use careerscout_scheduler::Scheduler;
use careerscout_storage::{
    MemoryStore, PgConnector, PgVacancyStore, Schedule, SinkConnector, VacancyQuery, migrate,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::runtime::Handle;

use crate::config::Config;
use crate::render;

/// Rows shown per answer.
pub const RESULT_LIMIT: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    Chromium,
    Static,
}

/// What the front end talks to: read queries on its own runtime, searches
/// through the worker pool.
pub struct App {
    queries: Arc<dyn VacancyQuery>,
    scheduler: Scheduler,
}

impl App {
    pub fn new(queries: Arc<dyn VacancyQuery>, scheduler: Scheduler) -> Self {
        Self { queries, scheduler }
    }

    /// Wires storage and the chosen driver, and starts the pool on `worker`.
    pub async fn connect(config: &Config, driver: DriverKind, dry_run: bool, worker: &Handle) -> Result<Self> {
        let scrape = Arc::new(ScrapeConfig {
            profile: config
                .site_url
                .as_deref()
                .map(SiteProfile::habr_career_at)
                .unwrap_or_default(),
            ..Default::default()
        });

        if dry_run {
            tracing::info!("dry run: results are kept in memory");
            let store = MemoryStore::new();
            let scheduler = start_pool(config, driver, store.connector(), scrape, worker);
            return Ok(Self::new(Arc::new(store), scheduler));
        }

        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(config.database.clone())
            .await
            .context("Failed to connect to database")?;
        migrate(&pool).await?;

        let connector = PgConnector::new(config.database.clone());
        let scheduler = start_pool(config, driver, connector, scrape, worker);
        Ok(Self::new(Arc::new(PgVacancyStore::new(pool)), scheduler))
    }

    /// Scrapes `query`, then shows what it added.
    pub async fn search(&self, query: &str) -> Result<String> {
        let mark = self.queries.latest_id().await?;
        let completion = self.scheduler.submit(query)?;
        tracing::info!(job_id = %completion.job_id, query, "search submitted");

        let report = completion.wait().await.map_err(|e| anyhow!(e.user_message()))?;
        tracing::info!(records = report.records_sunk, skipped = report.cards_skipped, "search complete");

        let fresh = self.queries.since(mark, RESULT_LIMIT).await?;
        Ok(render::vacancies(&fresh, Some("Новые вакансии:"), "Новые вакансии не найдены."))
    }

    pub async fn recent(&self) -> Result<String> {
        let rows = self.queries.random(RESULT_LIMIT).await?;
        Ok(render::vacancies(&rows, None, "Вакансии не найдены."))
    }

    pub async fn count(&self) -> Result<String> {
        Ok(render::total(self.queries.count().await?))
    }

    pub async fn schedule(&self, schedule: Schedule) -> Result<String> {
        let count = self.queries.count_by_schedule(schedule).await?;
        Ok(render::schedule_count(schedule, count))
    }

    pub async fn company(&self, name: &str) -> Result<String> {
        let rows = self.queries.by_company(name, RESULT_LIMIT).await?;
        Ok(render::vacancies(&rows, None, &format!("Вакансии компании \"{}\" не найдены.", name)))
    }

    pub async fn vacancy(&self, name: &str) -> Result<String> {
        let rows = self.queries.by_title(name, RESULT_LIMIT).await?;
        Ok(render::vacancies(&rows, None, &format!("Вакансии по запросу \"{}\" не найдены.", name)))
    }
}

fn start_pool<C>(
    config: &Config,
    driver: DriverKind,
    connector: C,
    scrape: Arc<ScrapeConfig>,
    worker: &Handle,
) -> Scheduler
where
    C: SinkConnector + 'static,
{
    match driver {
        DriverKind::Chromium => {
            let mut launcher = ChromiumLauncher::with_config(config.browser_timeouts.clone());
            if let Some(path) = &config.chrome_executable {
                launcher = launcher.with_executable(path);
            }
            spawn_scheduler(config, launcher, connector, scrape, worker)
        }
        DriverKind::Static => {
            spawn_scheduler(config, StaticLauncher::new(HttpSource::new()), connector, scrape, worker)
        }
    }
}

fn spawn_scheduler<L, C>(
    config: &Config,
    launcher: L,
    connector: C,
    scrape: Arc<ScrapeConfig>,
    worker: &Handle,
) -> Scheduler
where
    L: BrowserLauncher + 'static,
    C: SinkConnector + 'static,
{
    let session_worker = SessionWorker::new(launcher, connector, scrape);
    let (scheduler, receiver) = Scheduler::new(session_worker, config.queue_capacity, config.workers);
    worker.spawn(scheduler.clone().run(receiver));
    tracing::debug!(
        workers = config.workers,
        queue = config.queue_capacity,
        launcher = std::any::type_name::<L>(),
        "worker pool started"
    );
    scheduler
}

#[cfg(test)]
mod tests {
    use super::*;
    use careerscout_core::Pacing;
    use careerscout_parser::FixtureSource;
    use careerscout_storage::RecordSink;

    const RESULTS: &str = r#"<html><body>
        <div class="vacancy-card__info">
          <div class="vacancy-card__title"><a href="/vacancies/42">Rust developer</a></div>
          <div class="vacancy-card__meta">Москва • Неполный рабочий день</div>
        </div>
    </body></html>"#;

    async fn app(store: &MemoryStore, source: FixtureSource) -> App {
        let scrape = Arc::new(ScrapeConfig {
            profile: SiteProfile::habr_career_at("https://career.example"),
            pacing: Pacing::immediate(),
        });
        let worker = SessionWorker::new(StaticLauncher::new(source), store.connector(), scrape);
        let (scheduler, receiver) = Scheduler::new(worker, 4, 1);
        tokio::spawn(scheduler.clone().run(receiver));
        App::new(Arc::new(store.clone()), scheduler)
    }

    #[tokio::test]
    async fn search_shows_only_what_it_added() {
        let store = MemoryStore::new();
        let old = careerscout_core::ListingRecord::new(
            "Old Co", "Old job", "Москва", "ЗП не указана", "Go", "https://career.example/vacancies/1",
        )
        .unwrap();
        let mut sink = store.connector().connect().await.unwrap();
        sink.insert(&old).await.unwrap();

        let source = FixtureSource::new([
            ("https://career.example/", "<html></html>"),
            ("https://career.example/vacancies?q=rust&type=all", RESULTS),
        ]);
        let app = app(&store, source).await;

        let text = app.search("rust").await.unwrap();
        assert!(text.starts_with("Новые вакансии:"));
        assert!(text.contains("Вакансия: Rust developer"));
        assert!(text.contains("Компания: Компания не указана"));
        assert!(!text.contains("Old job"));

        assert_eq!(app.count().await.unwrap(), "Всего вакансий в базе данных: 2");
        assert!(app.schedule(Schedule::PartTime).await.unwrap().ends_with(": 1"));
        assert!(app.schedule(Schedule::FullTime).await.unwrap().ends_with(": 0"));
    }

    #[tokio::test]
    async fn failed_search_is_one_readable_line() {
        let store = MemoryStore::new();
        let app = app(&store, FixtureSource::new([("https://career.example/", "<html></html>")])).await;

        let err = app.search("rust").await.unwrap_err();
        let line = format!("{:#}", err);
        assert!(line.starts_with("Search failed:"));
        assert_eq!(line.lines().count(), 1);
    }

    #[tokio::test]
    async fn lookups_report_empty_results() {
        let store = MemoryStore::new();
        let app = app(&store, FixtureSource::default()).await;
        assert_eq!(app.company("Yandex").await.unwrap(), "Вакансии компании \"Yandex\" не найдены.");
        assert_eq!(app.vacancy("Rust").await.unwrap(), "Вакансии по запросу \"Rust\" не найдены.");
        assert_eq!(app.recent().await.unwrap(), "Вакансии не найдены.");
    }
}
