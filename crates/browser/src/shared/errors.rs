use careerscout_core::{ErrorCategory, ScrapeError};

/// CDP messages seen when a node reference outlives a re-render.
const STALE_MARKERS: &[&str] = &[
    "Could not find node with given id",
    "No node with given id",
    "Node is detached",
    "Cannot find context with specified id",
    "Execution context was destroyed",
    "Could not find object with given id",
];

pub fn to_scrape_error(e: impl std::fmt::Display, action: &str) -> ScrapeError {
    let s = e.to_string();
    if STALE_MARKERS.iter().any(|m| s.contains(m)) {
        ScrapeError::stale_element(format!("{} hit a stale element: {}", action, s))
    } else if s.contains("intercept") || s.contains("not clickable") {
        ScrapeError::click_intercepted(format!("{} was intercepted: {}", action, s))
    } else if s.contains("timeout") || s.contains("Timeout") {
        ScrapeError::timeout_error(format!("{} timed out: {}", action, s))
    } else if s.contains("navigation") || s.contains("Navigation") {
        ScrapeError::navigation_error(format!("{} navigation failed: {}", action, s))
    } else if s.contains("not found") || s.contains("null") {
        ScrapeError::element_not_found(format!("{}: {}", action, s))
    } else {
        ScrapeError::browser_error(format!("{} failed: {}", action, s))
    }
}

/// Classifies an exception thrown inside an element script. Anything that is
/// not a recognised driver condition is the script's own failure.
pub fn script_exception_to_scrape_error(thrown: &str, action: &str) -> ScrapeError {
    let err = to_scrape_error(thrown, action);
    match err.category {
        ErrorCategory::Browser => ScrapeError::script_error(format!("{} script threw: {}", action, thrown)),
        _ => err,
    }
}
