//! Error types for identity service calls.

use reqwest::StatusCode;
use serde::Deserialize;

/// Errors that can occur while talking to the identity service.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The service answered with an error status.
    ///
    /// Displays the service's own message so it can be forwarded to the
    /// login page unchanged.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code, if the service sent one.
        code: Option<String>,
        /// Human-readable message.
        message: String,
    },

    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Invalid response from identity service: {0}")]
    InvalidResponse(String),

    /// Failed to build an endpoint URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Error body returned by the identity service.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
    error_code: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl IdentityError {
    /// Creates a `Rejected` error.
    #[must_use]
    pub fn rejected(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            code,
            message: message.into(),
        }
    }

    /// Builds a `Rejected` error from an error response body.
    ///
    /// The message is the first of `msg`, `message`, `error_description` and
    /// `error` that is present; otherwise `HTTP <status>`.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .msg
            .or(parsed.message)
            .or(parsed.error_description)
            .or_else(|| parsed.error.clone())
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        let code = parsed.error_code.or(parsed.error);
        Self::rejected(status.as_u16(), code, message)
    }

    /// Returns `true` if the service answered and refused the request.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// HTTP status of a rejection.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
