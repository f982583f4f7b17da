//! Result and error types for shopcheck.

use crate::config::TemplateKind;
use thiserror::Error;

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while configuring or driving templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A selector, feature or config entry is missing or malformed
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },

    /// Named element, action or validation absent from the template
    #[error("{what} '{name}' not found in template '{template}'")]
    NotFound {
        /// What was looked up ("Element", "Action", "Validation")
        what: &'static str,
        /// Requested name
        name: String,
        /// Template that was searched
        template: String,
    },

    /// Registry miss
    #[error("{kind} template '{name}' not found. Available templates: {available}")]
    TemplateNotFound {
        /// Template kind
        kind: TemplateKind,
        /// Requested template name
        name: String,
        /// Comma separated list of registered names
        available: String,
    },

    /// List item field lookup on a field missing from `item_fields`
    #[error("Field '{field}' not configured in template '{template}'")]
    FieldNotConfigured {
        /// Field name
        field: String,
        /// Template name
        template: String,
    },

    /// No list item matched the requested field value
    #[error("Cannot click item - not found with {field}: {value}")]
    ItemNotFound {
        /// Field name
        field: String,
        /// Field value searched for
        value: String,
    },

    /// Item index past the end of the current list
    #[error("Item index {index} out of range. Only {count} items available.")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Items present when the lookup ran
        count: usize,
    },

    /// Optional list feature (search, sort, load more) without a selector
    #[error("{feature} functionality not configured for template '{template}'")]
    FeatureNotConfigured {
        /// Feature name
        feature: &'static str,
        /// Template name
        template: String,
    },

    /// Required form field without a value in the supplied data
    #[error("Required field '{field}' is missing in form data")]
    MissingRequiredField {
        /// Field name
        field: String,
    },

    /// Form value rejected by the field's validation pattern
    #[error("Value '{value}' for field '{field}' does not match pattern '{pattern}'")]
    InvalidFieldValue {
        /// Field name
        field: String,
        /// Rejected value
        value: String,
        /// Pattern from the field descriptor
        pattern: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Wait expired before the element reached the requested state
    #[error("Timed out after {ms}ms waiting for {target}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of what was awaited
        target: String,
    },

    /// Failure reported by the page driver
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TemplateError {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a page driver error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::Page {
            message: message.into(),
        }
    }

    /// True for errors caused by the template configuration rather than the page
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::NotFound { .. }
                | Self::TemplateNotFound { .. }
                | Self::FieldNotConfigured { .. }
                | Self::FeatureNotConfigured { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_not_found_lists_available() {
        let err = TemplateError::TemplateNotFound {
            kind: TemplateKind::Form,
            name: "missing".to_string(),
            available: "login, signup".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("form template 'missing' not found"));
        assert!(message.contains("login, signup"));
    }

    #[test]
    fn test_index_out_of_range_reports_count() {
        let err = TemplateError::IndexOutOfRange { index: 7, count: 3 };
        assert!(err.to_string().contains("Only 3 items"));
    }

    #[test]
    fn test_is_configuration() {
        assert!(TemplateError::configuration("x").is_configuration());
        assert!(!TemplateError::assertion("x").is_configuration());
        assert!(!TemplateError::Timeout {
            ms: 10,
            target: "x".to_string()
        }
        .is_configuration());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TemplateError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
