use anyhow::{Context, Result, bail};
use careerscout_browser::TimeoutConfig;
use dotenvy::dotenv;
use sqlx::postgres::PgConnectOptions;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database: PgConnectOptions,
    /// Concurrent scrape sessions
    pub workers: usize,
    /// Searches allowed to wait in the queue
    pub queue_capacity: usize,
    pub chrome_executable: Option<PathBuf>,
    pub site_url: Option<String>,
    pub browser_timeouts: TimeoutConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            database: database_options(&var)?,
            workers: parse_or(&var, "SCRAPE_WORKERS", 2)?,
            queue_capacity: parse_or(&var, "SCRAPE_QUEUE_CAPACITY", 16)?,
            chrome_executable: var("CHROME_EXECUTABLE").map(PathBuf::from),
            site_url: var("CAREER_SITE_URL"),
            browser_timeouts: match var("BROWSER_TIMEOUTS") {
                Some(name) => TimeoutConfig::preset(&name)
                    .with_context(|| format!("BROWSER_TIMEOUTS must be one of fast, default, patient (got {})", name))?,
                None => TimeoutConfig::default(),
            },
        })
    }
}

/// `DATABASE_URL` wins; otherwise the discrete `DB_*` variables are used.
fn database_options(var: &impl Fn(&str) -> Option<String>) -> Result<PgConnectOptions> {
    if let Some(url) = var("DATABASE_URL") {
        return PgConnectOptions::from_str(&url).context("DATABASE_URL is not a valid postgres URL");
    }

    let Some(name) = var("DB_NAME") else {
        bail!("DATABASE_URL or DB_NAME must be set");
    };
    let mut options = PgConnectOptions::new()
        .database(&name)
        .host(&var("DB_HOST").unwrap_or_else(|| "localhost".to_string()))
        .port(parse_or(var, "DB_PORT", 5432)?);
    if let Some(user) = var("DB_USER") {
        options = options.username(&user);
    }
    if let Some(password) = var("DB_PASSWORD") {
        options = options.password(&password);
    }
    Ok(options)
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw.trim().parse().with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
