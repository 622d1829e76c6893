//! Classification of upstream failures.
//!
//! The form never retries, so classes are only used for logging and for
//! choosing HTTP status codes on the web surface.

use std::fmt;

/// Standard error classes for upstream failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    InvalidRequest,
    Authentication,
    PermissionDenied,
    NotFound,
    QuotaExhausted,
    RateLimited,
    Timeout,
    ServerError,
    Overloaded,
    /// The model returned no text (safety or recitation block).
    ContentFilter,
    /// The request never produced an HTTP response.
    Network,
    Other,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::InvalidRequest => "invalid_request",
            ErrorClass::Authentication => "authentication",
            ErrorClass::PermissionDenied => "permission_denied",
            ErrorClass::NotFound => "not_found",
            ErrorClass::QuotaExhausted => "quota_exhausted",
            ErrorClass::RateLimited => "rate_limited",
            ErrorClass::Timeout => "timeout",
            ErrorClass::ServerError => "server_error",
            ErrorClass::Overloaded => "overloaded",
            ErrorClass::ContentFilter => "content_filter",
            ErrorClass::Network => "network",
            ErrorClass::Other => "other",
        }
    }

    /// Classify a non-success HTTP status. `message` is the provider's error
    /// text and only matters for 429, where quota exhaustion and short-term
    /// rate limiting share a status code.
    pub fn from_status(status: u16, message: &str) -> Self {
        match status {
            400 | 422 => ErrorClass::InvalidRequest,
            401 => ErrorClass::Authentication,
            403 => ErrorClass::PermissionDenied,
            404 => ErrorClass::NotFound,
            408 | 504 => ErrorClass::Timeout,
            429 => {
                let lower = message.to_ascii_lowercase();
                if lower.contains("quota") || lower.contains("resource_exhausted") {
                    ErrorClass::QuotaExhausted
                } else {
                    ErrorClass::RateLimited
                }
            }
            503 | 529 => ErrorClass::Overloaded,
            500..=599 => ErrorClass::ServerError,
            _ => ErrorClass::Other,
        }
    }

    /// Map a Gemini `finishReason` that carries no text to a class.
    pub fn from_finish_reason(reason: &str) -> Self {
        match reason {
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
                ErrorClass::ContentFilter
            }
            _ => ErrorClass::Other,
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_statuses() {
        let cases = [
            (400, ErrorClass::InvalidRequest),
            (401, ErrorClass::Authentication),
            (403, ErrorClass::PermissionDenied),
            (404, ErrorClass::NotFound),
            (408, ErrorClass::Timeout),
        ];
        for (status, expected) in cases {
            assert_eq!(
                ErrorClass::from_status(status, ""),
                expected,
                "status {} should classify as {}",
                status,
                expected
            );
        }
    }

    #[test]
    fn test_429_distinguishes_quota_from_rate_limit() {
        assert_eq!(
            ErrorClass::from_status(429, "Quota exceeded for metric generate_content"),
            ErrorClass::QuotaExhausted
        );
        assert_eq!(
            ErrorClass::from_status(429, "RESOURCE_EXHAUSTED"),
            ErrorClass::QuotaExhausted
        );
        assert_eq!(
            ErrorClass::from_status(429, "Too many requests"),
            ErrorClass::RateLimited
        );
    }

    #[test]
    fn test_server_error_statuses() {
        assert_eq!(ErrorClass::from_status(500, ""), ErrorClass::ServerError);
        assert_eq!(ErrorClass::from_status(502, ""), ErrorClass::ServerError);
        assert_eq!(ErrorClass::from_status(503, ""), ErrorClass::Overloaded);
        assert_eq!(ErrorClass::from_status(504, ""), ErrorClass::Timeout);
        assert_eq!(ErrorClass::from_status(302, ""), ErrorClass::Other);
    }

    #[test]
    fn test_finish_reasons() {
        assert_eq!(
            ErrorClass::from_finish_reason("SAFETY"),
            ErrorClass::ContentFilter
        );
        assert_eq!(ErrorClass::from_finish_reason("STOP"), ErrorClass::Other);
        assert_eq!(ErrorClass::ContentFilter.to_string(), "content_filter");
    }
}
