//! Identity service configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! [identity]
//! url = "https://project.supabase.co"
//! anon_key = "public-anon-key"
//! cookie_name = "sb-auth-token"
//! request_timeout = "10s"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Environment variable consulted when `identity.url` is not configured.
pub const URL_ENV_FALLBACK: &str = "NEXT_PUBLIC_SUPABASE_URL";

/// Environment variable consulted when `identity.anon_key` is not configured.
pub const ANON_KEY_ENV_FALLBACK: &str = "NEXT_PUBLIC_SUPABASE_ANON_KEY";

/// Configuration of the external identity service and the session cookie.
///
/// Both `url` and `anon_key` are optional. When either is missing the
/// callback endpoint still serves requests but redirects every code to
/// `/login?error=configuration`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Base URL of the identity service (also hosts the profile REST API).
    pub url: Option<String>,

    /// Public API key sent as the `apikey` header.
    pub anon_key: Option<String>,

    /// Name of the session cookie. The PKCE verifier cookie uses this name
    /// with a `-code-verifier` suffix.
    pub cookie_name: String,

    /// Mark cookies as `Secure`.
    pub secure_cookies: bool,

    /// Lifetime of the session cookie.
    #[serde(with = "humantime_serde")]
    pub session_max_age: Duration,

    /// Timeout applied to each outbound request.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            cookie_name: "sb-auth-token".to_string(),
            secure_cookies: false,
            session_max_age: Duration::from_secs(400 * 24 * 3600),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Resolved endpoint and key, present only when both are configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCredentials {
    /// Base URL, always ending in `/` so relative joins keep any path prefix.
    pub url: Url,
    /// Public API key.
    pub anon_key: String,
}

impl IdentityCredentials {
    /// Parses the base URL and normalizes its trailing slash.
    pub fn new(url: &str, anon_key: impl Into<String>) -> Result<Self, url::ParseError> {
        let mut url = Url::parse(url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            url,
            anon_key: anon_key.into(),
        })
    }
}

impl IdentityConfig {
    /// Fills missing `url` / `anon_key` from the legacy public environment
    /// variables.
    #[must_use]
    pub fn with_env_fallbacks(mut self) -> Self {
        if is_blank(self.url.as_deref()) {
            self.url = std::env::var(URL_ENV_FALLBACK).ok();
        }
        if is_blank(self.anon_key.as_deref()) {
            self.anon_key = std::env::var(ANON_KEY_ENV_FALLBACK).ok();
        }
        self
    }

    /// Returns the credentials when both the URL and the key are present.
    pub fn credentials(&self) -> Option<IdentityCredentials> {
        let url = self.url.as_deref().filter(|u| !u.trim().is_empty())?;
        let key = self.anon_key.as_deref().filter(|k| !k.trim().is_empty())?;
        IdentityCredentials::new(url.trim(), key.trim()).ok()
    }

    /// Validates the configuration.
    ///
    /// Missing credentials are not an error; a present but malformed URL is.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `url` is set but is not an absolute http(s) URL
    /// - `cookie_name` is empty or contains characters invalid in a cookie name
    /// - `request_timeout` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            let parsed = Url::parse(url.trim())
                .map_err(|e| ConfigError::InvalidValue(format!("identity.url: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidValue(format!(
                    "identity.url must use http or https, got {}",
                    parsed.scheme()
                )));
            }
        }

        if self.cookie_name.is_empty() {
            return Err(ConfigError::InvalidValue(
                "identity.cookie_name cannot be empty".to_string(),
            ));
        }
        if self
            .cookie_name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ';' | ',' | '='))
        {
            return Err(ConfigError::InvalidValue(format!(
                "identity.cookie_name contains invalid characters: {}",
                self.cookie_name
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "identity.request_timeout must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_no_credentials() {
        let config = IdentityConfig::default();
        assert!(config.credentials().is_none());
        assert!(config.validate().is_ok());
        assert_eq!(config.cookie_name, "sb-auth-token");
    }

    #[test]
    fn test_credentials_require_both_values() {
        let mut config = IdentityConfig {
            url: Some("https://project.supabase.co".to_string()),
            ..Default::default()
        };
        assert!(config.credentials().is_none());

        config.anon_key = Some("   ".to_string());
        assert!(config.credentials().is_none());

        config.anon_key = Some("anon".to_string());
        let creds = config.credentials().unwrap();
        assert_eq!(creds.url.as_str(), "https://project.supabase.co/");
        assert_eq!(creds.anon_key, "anon");
    }

    #[test]
    fn test_credentials_keep_path_prefix() {
        let creds = IdentityCredentials::new("http://localhost:9999/proxy", "k").unwrap();
        assert_eq!(creds.url.as_str(), "http://localhost:9999/proxy/");
        assert_eq!(
            creds.url.join("auth/v1/user").unwrap().as_str(),
            "http://localhost:9999/proxy/auth/v1/user"
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = IdentityConfig {
            url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = IdentityConfig {
            url: Some("ftp://example.com".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = IdentityConfig {
            cookie_name: "bad name".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = IdentityConfig {
            request_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_humantime() {
        let config: IdentityConfig = serde_json::from_value(serde_json::json!({
            "url": "https://project.supabase.co",
            "anon_key": "anon",
            "request_timeout": "3s",
            "session_max_age": "7days"
        }))
        .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.session_max_age, Duration::from_secs(7 * 24 * 3600));
        assert_eq!(config.cookie_name, "sb-auth-token");
    }
}
