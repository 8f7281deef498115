//! Error types for the mail.tm client.

use thiserror::Error;

/// Errors that can occur during mail.tm operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response status was received (connect, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A success status was received but its body could not be read.
    #[error("HTTP {status} body could not be read: {source}")]
    Body {
        /// HTTP status code.
        status: u16,
        /// Underlying read failure.
        source: reqwest::Error,
    },

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider answered with HTTP 429.
    #[error("rate limited by the mail provider")]
    RateLimited,

    /// The provider rejected the request (duplicate address, invalid format, bad credentials...).
    #[error("HTTP {status}: {description}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider supplied description, or `"unknown"` when none was sent.
        description: String,
    },

    /// Required input was missing; no request was issued.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The provider returned an empty domain list.
    #[error("No domains available")]
    NoDomains,
}

impl Error {
    /// Whether retrying the same request later may succeed.
    ///
    /// Rate limiting and transport failures are transient; everything else is
    /// a definitive answer from the provider or a local mistake.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RateLimited | Error::Request(_))
    }

    /// Human-readable reason used when an error becomes a per-account failure.
    pub fn reason(&self) -> String {
        match self {
            Error::Api { description, .. } => description.clone(),
            Error::RateLimited => "rate limited".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(Error::RateLimited.is_retryable());
        assert!(!Error::NoDomains.is_retryable());
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!Error::Json(json).is_retryable());
        assert!(!Error::Validation("password".into()).is_retryable());
        assert!(
            !Error::Api {
                status: 422,
                description: "address: This value is already used.".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn api_reason_is_provider_description() {
        let err = Error::Api {
            status: 422,
            description: "unknown".into(),
        };
        assert_eq!(err.reason(), "unknown");
        assert_eq!(err.to_string(), "HTTP 422: unknown");
    }
}
