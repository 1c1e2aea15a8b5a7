//! careerscout: scrape Habr Career vacancies into PostgreSQL and query them.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use careerscout_storage::Schedule;

mod commands;
mod config;
mod render;

use commands::{App, DriverKind};
use config::Config;

#[derive(Parser)]
#[command(
    name = "careerscout",
    about = "Search Habr Career vacancies and keep them in a local database",
    version
)]
struct Cli {
    /// Page driver used for searches.
    #[arg(long, value_enum, default_value_t = DriverArg::Chromium, global = true)]
    driver: DriverArg,

    /// Keep results in memory instead of PostgreSQL.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape vacancies for a query and show the new ones.
    Search {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// Show a random sample of stored vacancies.
    Recent,

    /// Count stored vacancies.
    Count,

    /// Count vacancies with the given work schedule.
    Schedule {
        #[arg(value_enum)]
        kind: ScheduleArg,
    },

    /// Find vacancies by company name.
    Company {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// Find vacancies by title.
    Vacancy {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DriverArg {
    /// Headless Chromium over CDP
    Chromium,
    /// Plain HTTP fetches, no JavaScript
    Static,
}

impl From<DriverArg> for DriverKind {
    fn from(arg: DriverArg) -> Self {
        match arg {
            DriverArg::Chromium => DriverKind::Chromium,
            DriverArg::Static => DriverKind::Static,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ScheduleArg {
    PartTime,
    FullTime,
}

impl From<ScheduleArg> for Schedule {
    fn from(arg: ScheduleArg) -> Self {
        match arg {
            ScheduleArg::PartTime => Schedule::PartTime,
            ScheduleArg::FullTime => Schedule::FullTime,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},sqlx=warn", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String> {
    let config = Config::from_env().context("Failed to load configuration")?;

    // Browser sessions never run on the front-end runtime.
    let worker = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers.max(1))
        .thread_name("scrape-worker")
        .enable_all()
        .build()
        .context("Failed to start worker runtime")?;
    let front = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start front-end runtime")?;

    let handle = worker.handle().clone();
    let Cli { driver, dry_run, command, .. } = cli;

    let output = front.block_on(async move {
        let app = App::connect(&config, driver.into(), dry_run, &handle).await?;
        match command {
            Commands::Search { words } => app.search(&words.join(" ")).await,
            Commands::Recent => app.recent().await,
            Commands::Count => app.count().await,
            Commands::Schedule { kind } => app.schedule(kind.into()).await,
            Commands::Company { words } => app.company(&words.join(" ")).await,
            Commands::Vacancy { words } => app.vacancy(&words.join(" ")).await,
        }
    });

    worker.shutdown_background();
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_words_are_collected() {
        let cli = Cli::parse_from(["careerscout", "--driver", "static", "search", "rust", "backend"]);
        assert!(matches!(cli.driver, DriverArg::Static));
        match cli.command {
            Commands::Search { words } => assert_eq!(words.join(" "), "rust backend"),
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn schedule_takes_kebab_case_names() {
        let cli = Cli::parse_from(["careerscout", "schedule", "part-time", "--dry-run"]);
        assert!(cli.dry_run);
        assert!(matches!(cli.command, Commands::Schedule { kind: ScheduleArg::PartTime }));
        assert!(Cli::try_parse_from(["careerscout", "schedule", "weekends"]).is_err());
        assert!(Cli::try_parse_from(["careerscout", "search"]).is_err());
    }
}
