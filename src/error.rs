use crate::error_class::ErrorClass;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "gemini_api_key", "template")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected format, offending value)
    pub details: Option<String>,
    /// Source of the error (e.g., "settings", "gemini", "github")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Unified error type for the roaster.
///
/// Configuration errors are fatal at startup. Validation errors come from
/// user input and never reach the network. Everything else is an upstream
/// failure that the form turns into a generic message.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Remote error: HTTP {status} ({class}): {message}")]
    Remote {
        status: u16,
        class: ErrorClass,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::validation_with_context(msg, ErrorContext::new())
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn remote(status: u16, class: ErrorClass, message: impl Into<String>) -> Self {
        Error::Remote {
            status,
            class,
            message: message.into(),
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// Error class for upstream failures; `None` for local errors.
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            Error::Remote { class, .. } => Some(*class),
            Error::Transport(e) if e.is_timeout() => Some(ErrorClass::Timeout),
            Error::Transport(_) => Some(ErrorClass::Network),
            _ => None,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. } | Error::Yaml(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = Error::configuration_with_context(
            "API key is missing",
            ErrorContext::new()
                .with_field_path("gemini_api_key")
                .with_source("settings"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: API key is missing (field: gemini_api_key, source: settings)"
        );
        assert!(err.is_configuration());
        assert!(err.class().is_none());
    }

    #[test]
    fn display_without_context_has_no_suffix() {
        let err = Error::validation("identifier is empty");
        assert_eq!(err.to_string(), "Validation error: identifier is empty");
        assert!(err.is_validation());
        assert_eq!(err.context(), Some(&ErrorContext::new()));
    }

    #[test]
    fn remote_error_exposes_class() {
        let err = Error::remote(429, ErrorClass::QuotaExhausted, "quota exceeded");
        assert_eq!(err.class(), Some(ErrorClass::QuotaExhausted));
        assert_eq!(
            err.to_string(),
            "Remote error: HTTP 429 (quota_exhausted): quota exceeded"
        );
    }
}
