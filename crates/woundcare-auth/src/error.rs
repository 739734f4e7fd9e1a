//! Callback and configuration error types.
//!
//! Every [`CallbackError`] is recoverable at the request level: each maps to a
//! safe redirect, and [`CallbackError::ProfileFetch`] does not even end the
//! request.

use crate::profile::ProfileError;
use crate::redirect::{LoginErrorKind, RedirectTarget};

/// Errors raised while validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

/// Errors that can occur while handling an authentication callback.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    /// Identity service endpoint or key is not configured.
    #[error("Identity service is not configured")]
    Configuration,

    /// The identity service rejected the authorization code.
    #[error("Code exchange failed: {0}")]
    Exchange(String),

    /// No user could be resolved after a successful exchange.
    #[error("No user resolved after code exchange")]
    MissingUser,

    /// The profile could not be read. Treated as "privacy not agreed".
    #[error("Profile fetch failed: {0}")]
    ProfileFetch(#[from] ProfileError),
}

impl CallbackError {
    /// Returns `true` if this error ends the callback with a login redirect.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ProfileFetch(_))
    }

    /// The redirect a fatal error degrades to, `None` for non-fatal errors.
    #[must_use]
    pub fn redirect_target(&self) -> Option<RedirectTarget> {
        match self {
            Self::Configuration => Some(RedirectTarget::LoginError(LoginErrorKind::Configuration)),
            Self::Exchange(message) => Some(RedirectTarget::LoginError(LoginErrorKind::Exchange(
                message.clone(),
            ))),
            Self::MissingUser => Some(RedirectTarget::Login),
            Self::ProfileFetch(_) => None,
        }
    }
}
