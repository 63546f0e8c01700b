//! Error types for site-checks
//!
//! Check failures always name the selector together with the expected and
//! actual values, so a failed case can be diagnosed from the report alone.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for site-checks
#[derive(Error, Debug)]
pub enum Error {
    // === Check Failures ===
    #[error("Element '{selector}' not found after waiting {waited_ms}ms")]
    ElementNotFound { selector: String, waited_ms: u64 },

    #[error("Element '{selector}': expected {what} '{expected}', got '{actual}'")]
    ValueMismatch {
        selector: String,
        what: String,
        expected: String,
        actual: String,
    },

    #[error("Element '{selector}': expected {expected} children, got {actual}")]
    CountMismatch {
        selector: String,
        expected: usize,
        actual: usize,
    },

    #[error("No element matching '{selector}' contains text '{text}'")]
    TextNotFound { selector: String, text: String },

    // === Navigation Errors ===
    #[error("Failed to load '{url}': {reason}")]
    Navigation { url: String, reason: String },

    #[error("Loading '{url}' timed out after {secs} seconds")]
    NavigationTimeout { url: String, secs: u64 },

    #[error("Cannot click '{selector}': {reason}")]
    NotClickable { selector: String, reason: String },

    // === Input Errors ===
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unknown built-in checklist '{0}'. Use 'site-checks list' to see available checklists")]
    UnknownChecklist(String),

    #[error("Checklist has no case named '{0}'")]
    UnknownCase(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid checklist: {0}")]
    ChecklistParse(String),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a value mismatch error
    pub fn mismatch(selector: &str, what: &str, expected: &str, actual: &str) -> Self {
        Self::ValueMismatch {
            selector: selector.to_string(),
            what: what.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a navigation error
    pub fn navigation(url: &str, reason: impl ToString) -> Self {
        Self::Navigation {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a not-clickable error
    pub fn not_clickable(selector: &str, reason: &str) -> Self {
        Self::NotClickable {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-readable category, used in JSON reports
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ElementNotFound { .. } | Error::TextNotFound { .. } => "element_not_found",
            Error::ValueMismatch { .. } => "value_mismatch",
            Error::CountMismatch { .. } => "count_mismatch",
            Error::Navigation { .. } | Error::NavigationTimeout { .. } => "navigation",
            Error::NotClickable { .. } => "not_clickable",
            Error::InvalidSelector { .. } | Error::InvalidUrl { .. } => "invalid_input",
            Error::UnknownChecklist(_)
            | Error::UnknownCase(_)
            | Error::Config(_)
            | Error::ConfigParse(_)
            | Error::ChecklistParse(_) => "config",
            Error::FileRead { .. } | Error::Json(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_names_selector_and_values() {
        let err = Error::mismatch("[name=\"robots\"]", "attribute 'content'", "index, follow", "noindex, nofollow");
        let msg = err.to_string();
        assert!(msg.contains("[name=\"robots\"]"));
        assert!(msg.contains("'index, follow'"));
        assert!(msg.contains("'noindex, nofollow'"));
        assert_eq!(err.kind(), "value_mismatch");
    }

    #[test]
    fn test_error_kinds() {
        let count = Error::CountMismatch {
            selector: "aside".into(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(count.kind(), "count_mismatch");
        assert_eq!(count.to_string(), "Element 'aside': expected 3 children, got 2");

        let timeout = Error::NavigationTimeout {
            url: "http://localhost:1313/".into(),
            secs: 30,
        };
        assert_eq!(timeout.kind(), "navigation");
        assert_eq!(Error::Config("bad".into()).kind(), "config");
        assert_eq!(Error::UnknownChecklist("nope".into()).kind(), "config");
    }
}
