use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Field;

pub const HABR_CAREER_URL: &str = "https://career.habr.com";

/// How a field value is read from the element matched by its selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldRead {
    /// Rendered text, trimmed
    Text,
    /// Absolute target of a link
    Link,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub selector: String,
    pub read: FieldRead,
}

impl FieldSpec {
    pub fn text(field: Field, selector: impl Into<String>) -> Self {
        Self { field, selector: selector.into(), read: FieldRead::Text }
    }

    pub fn link(field: Field, selector: impl Into<String>) -> Self {
        Self { field, selector: selector.into(), read: FieldRead::Link }
    }
}

/// Selectors and entry points describing one career site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteProfile {
    pub entry_url: String,
    pub search_input: String,
    /// Results URL with a `{query}` placeholder, for drivers that cannot type.
    pub search_url: Option<String>,
    pub card: String,
    pub next_page: String,
    pub fields: Vec<FieldSpec>,
}

impl SiteProfile {
    pub fn habr_career() -> Self {
        Self::habr_career_at(HABR_CAREER_URL)
    }

    /// Habr Career selectors against another base URL (mirrors, staging).
    pub fn habr_career_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            entry_url: base.to_string(),
            search_input: ".l-page-title__input".to_string(),
            search_url: Some(format!("{}/vacancies?q={{query}}&type=all", base)),
            card: ".vacancy-card__info".to_string(),
            next_page: r#"a.button-comp--appearance-pagination-button[rel="next"]"#.to_string(),
            fields: vec![
                FieldSpec::text(Field::Company, ".vacancy-card__company-title"),
                FieldSpec::text(Field::Title, ".vacancy-card__title"),
                FieldSpec::link(Field::Link, "a"),
                FieldSpec::text(Field::Location, ".vacancy-card__meta"),
                FieldSpec::text(Field::Salary, ".vacancy-card__salary"),
                FieldSpec::text(Field::Skills, ".vacancy-card__skills"),
            ],
        }
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::habr_career()
    }
}

/// Fixed pauses between session steps.
#[derive(Debug, Clone)]
pub struct Pacing {
    /// After the query is submitted
    pub search_settle: Duration,
    /// After the next control is scrolled into view
    pub scroll_settle: Duration,
    /// Before a click is retried on a re-located control
    pub retry_settle: Duration,
    /// After a successful page turn
    pub page_settle: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            search_settle: Duration::from_secs(1),
            scroll_settle: Duration::from_secs(1),
            retry_settle: Duration::from_secs(1),
            page_settle: Duration::from_secs(1),
        }
    }
}

impl Pacing {
    pub fn immediate() -> Self {
        Self {
            search_settle: Duration::ZERO,
            scroll_settle: Duration::ZERO,
            retry_settle: Duration::ZERO,
            page_settle: Duration::ZERO,
        }
    }
}

/// Everything a scrape session needs besides its resources.
#[derive(Debug, Clone, Default)]
pub struct ScrapeConfig {
    pub profile: SiteProfile,
    pub pacing: Pacing,
}
