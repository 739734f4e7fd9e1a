//! Error types for bundle loading and the education endpoints.

use std::path::PathBuf;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Errors raised while loading locale bundles.
#[derive(Debug, thiserror::Error)]
pub enum LocaleError {
    /// The bundle is not valid JSON.
    #[error("Locale '{locale}' is not valid JSON: {source}")]
    Parse {
        /// Locale tag.
        locale: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The bundle has no `education` object.
    #[error("Locale '{locale}' has no 'education' section")]
    MissingSection {
        /// Locale tag.
        locale: String,
    },

    /// A required key is absent.
    #[error("Locale '{locale}' is missing key 'education.{key}'")]
    MissingKey {
        /// Locale tag.
        locale: String,
        /// Key inside the `education` section.
        key: String,
    },

    /// A key has the wrong JSON type.
    #[error("Locale '{locale}' key 'education.{key}' must be {expected}")]
    WrongType {
        /// Locale tag.
        locale: String,
        /// Key inside the `education` section.
        key: String,
        /// Expected type description.
        expected: &'static str,
    },

    /// A bundle file could not be read.
    #[error("Failed to read locale bundle {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configured default locale has no bundle.
    #[error("Default locale '{0}' has no bundle")]
    UnknownDefault(String),
}

impl LocaleError {
    pub(crate) fn missing_key(locale: &str, key: impl Into<String>) -> Self {
        Self::MissingKey {
            locale: locale.to_string(),
            key: key.into(),
        }
    }

    pub(crate) fn wrong_type(locale: &str, key: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongType {
            locale: locale.to_string(),
            key: key.into(),
            expected,
        }
    }
}

/// Errors returned by the education endpoints.
#[derive(Debug, thiserror::Error)]
pub enum EducationError {
    /// No wound example with this id.
    #[error("Unknown wound example: {0}")]
    UnknownExample(String),

    /// No care topic with this id.
    #[error("Unknown care topic: {0}")]
    UnknownTopic(String),
}

impl EducationError {
    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownExample(_) => "unknown_example",
            Self::UnknownTopic(_) => "unknown_topic",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownExample(_) | Self::UnknownTopic(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for EducationError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LocaleError::missing_key("ko", "goodExample1Title");
        assert_eq!(
            err.to_string(),
            "Locale 'ko' is missing key 'education.goodExample1Title'"
        );

        let err = LocaleError::wrong_type("en", "dailyCareContent", "an array of strings");
        assert!(err.to_string().contains("an array of strings"));
    }

    #[test]
    fn test_education_error_status() {
        let err = EducationError::UnknownTopic("sleep".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "unknown_topic");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
