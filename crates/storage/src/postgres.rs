use anyhow::{Context, Result};
use async_trait::async_trait;
use careerscout_core::ListingRecord;
use sqlx::postgres::{PgConnectOptions, PgPool};
use sqlx::{ConnectOptions, Connection, PgConnection};

use crate::{RecordSink, Schedule, SinkConnector, StoredVacancy, VacancyQuery};

const SELECT_COLUMNS: &str = "SELECT id, company, vacancy, location, salary, skills, link FROM vacancies";

pub async fn migrate(pool: &PgPool) -> Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");
    Ok(())
}

/// Opens one `PgConnection` per scrape session.
#[derive(Debug, Clone)]
pub struct PgConnector {
    options: PgConnectOptions,
}

impl PgConnector {
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl SinkConnector for PgConnector {
    type Sink = PgSink;

    async fn connect(&self) -> Result<PgSink> {
        let conn = self.options
            .connect()
            .await
            .context("Failed to connect to database")?;
        tracing::debug!(host = self.options.get_host(), "storage connection opened");
        Ok(PgSink { conn })
    }
}

pub struct PgSink {
    conn: PgConnection,
}

#[async_trait]
impl RecordSink for PgSink {
    async fn insert(&mut self, record: &ListingRecord) -> Result<i64> {
        // Autocommit: visible to other connections once this returns
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO vacancies (company, vacancy, location, salary, skills, link)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&record.company)
        .bind(&record.title)
        .bind(&record.location)
        .bind(&record.salary)
        .bind(&record.skills)
        .bind(&record.link)
        .fetch_one(&mut self.conn)
        .await
        .context("Failed to insert vacancy")?;

        Ok(id)
    }

    async fn close(self) -> Result<()> {
        self.conn.close().await.context("Failed to close database connection")
    }
}

/// Pool-backed reads for the front end.
#[derive(Debug, Clone)]
pub struct PgVacancyStore {
    pool: PgPool,
}

impl PgVacancyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, sql: &str, pattern: Option<&str>, limit: i64) -> Result<Vec<StoredVacancy>> {
        let mut query = sqlx::query_as::<_, StoredVacancy>(sql);
        if let Some(pattern) = pattern {
            query = query.bind(format!("%{}%", pattern));
        }
        query
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .context("Failed to query vacancies")
    }
}

#[async_trait]
impl VacancyQuery for PgVacancyStore {
    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM vacancies")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count vacancies")
    }

    async fn latest_id(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) FROM vacancies")
            .fetch_one(&self.pool)
            .await
            .context("Failed to read latest vacancy id")
    }

    async fn since(&self, id: i64, limit: i64) -> Result<Vec<StoredVacancy>> {
        sqlx::query_as::<_, StoredVacancy>(&format!(
            "{} WHERE id > $1 ORDER BY id LIMIT $2",
            SELECT_COLUMNS
        ))
        .bind(id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to query new vacancies")
    }

    async fn random(&self, limit: i64) -> Result<Vec<StoredVacancy>> {
        self.fetch(&format!("{} ORDER BY RANDOM() LIMIT $1", SELECT_COLUMNS), None, limit).await
    }

    async fn by_company(&self, pattern: &str, limit: i64) -> Result<Vec<StoredVacancy>> {
        self.fetch(
            &format!("{} WHERE company ILIKE $1 ORDER BY RANDOM() LIMIT $2", SELECT_COLUMNS),
            Some(pattern),
            limit,
        )
        .await
    }

    async fn by_title(&self, pattern: &str, limit: i64) -> Result<Vec<StoredVacancy>> {
        self.fetch(
            &format!("{} WHERE vacancy ILIKE $1 ORDER BY RANDOM() LIMIT $2", SELECT_COLUMNS),
            Some(pattern),
            limit,
        )
        .await
    }

    async fn count_by_schedule(&self, schedule: Schedule) -> Result<i64> {
        let part = format!("%{}%", Schedule::PART_TIME_MARKER);
        let query = match schedule {
            Schedule::PartTime => {
                sqlx::query_scalar("SELECT COUNT(*) FROM vacancies WHERE location ILIKE $1")
                    .bind(part)
            }
            Schedule::FullTime => sqlx::query_scalar(
                "SELECT COUNT(*) FROM vacancies WHERE location ILIKE $1 AND location NOT ILIKE $2",
            )
            .bind(format!("%{}%", Schedule::FULL_TIME_MARKER))
            .bind(part),
        };
        query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count vacancies by schedule")
    }
}
