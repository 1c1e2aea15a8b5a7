use serde::{Deserialize, Serialize};

/// Error categories for better error handling and recovery
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Element not found or selector issues
    ElementNotFound,
    /// Element reference invalidated by a re-render
    StaleElement,
    /// Click landed on another element (overlay, banner)
    ClickIntercepted,
    /// A listing lacks `title` or `link`
    RequiredFieldMissing,
    /// JavaScript execution errors
    ScriptExecution,
    /// Navigation or page load errors
    Navigation,
    /// Timeout errors
    Timeout,
    /// Browser/driver errors
    Browser,
    /// Parsing errors (HTML, selectors, URLs)
    Parsing,
    /// Browser or storage connection could not be established
    ResourceAcquisition,
    /// Insert or query against the store failed
    Storage,
    /// Unknown or uncategorized errors
    Unknown,
}

/// Structured error with context for debugging and reporting
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{category:?}] {message}")]
pub struct ScrapeError {
    /// Error category for programmatic handling
    pub category: ErrorCategory,
    /// Human-readable error message
    pub message: String,
    /// Optional context (URL, selector, field, card index, ...)
    pub context: serde_json::Value,
}

impl ScrapeError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            context: serde_json::json!({}),
        }
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    // Convenience constructors
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        let selector = selector.into();
        Self::new(ErrorCategory::ElementNotFound, format!("Element not found: {}", selector))
            .with_context(serde_json::json!({ "selector": selector }))
    }

    pub fn stale_element(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::StaleElement, message)
    }

    pub fn click_intercepted(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::ClickIntercepted, message)
    }

    pub fn required_field_missing(field: &str, card_index: usize) -> Self {
        Self::new(
            ErrorCategory::RequiredFieldMissing,
            format!("Card #{} has no {}", card_index, field),
        )
        .with_context(serde_json::json!({ "field": field, "card_index": card_index }))
    }

    pub fn timeout_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Timeout, message)
    }

    pub fn script_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::ScriptExecution, message)
    }

    pub fn navigation_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Navigation, message)
    }

    pub fn browser_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Browser, message)
    }

    pub fn parsing_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Parsing, message)
    }

    pub fn resource_acquisition(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::ResourceAcquisition, message)
    }

    pub fn storage_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Storage, message)
    }

    pub fn is_stale(&self) -> bool {
        self.category == ErrorCategory::StaleElement
    }

    /// One-line message for the front end.
    pub fn user_message(&self) -> String {
        match self.category {
            ErrorCategory::ResourceAcquisition => {
                format!("Search could not start: {}", self.message)
            }
            ErrorCategory::Storage => format!("Search stopped, storage failed: {}", self.message),
            _ => format!("Search failed: {}", self.message),
        }
    }
}
