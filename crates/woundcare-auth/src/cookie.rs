//! Session and PKCE verifier cookies.
//!
//! The session cookie value is `base64-` followed by the unpadded base64url
//! encoding of the session JSON, the format the browser client reads.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::config::IdentityConfig;
use crate::identity::Session;

/// Prefix marking a base64-encoded cookie value.
pub const BASE64_PREFIX: &str = "base64-";

/// Suffix of the PKCE verifier cookie name.
pub const CODE_VERIFIER_SUFFIX: &str = "-code-verifier";

/// Cookie settings derived from [`IdentityConfig`].
#[derive(Debug, Clone)]
pub struct SessionCookies {
    name: String,
    secure: bool,
    max_age: time::Duration,
}

impl SessionCookies {
    /// Creates cookie settings.
    #[must_use]
    pub fn new(name: impl Into<String>, secure: bool, max_age: std::time::Duration) -> Self {
        Self {
            name: name.into(),
            secure,
            max_age: time::Duration::seconds(i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX)),
        }
    }

    /// Creates cookie settings from the identity configuration.
    #[must_use]
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(
            config.cookie_name.clone(),
            config.secure_cookies,
            config.session_max_age,
        )
    }

    /// Name of the session cookie.
    #[must_use]
    pub fn session_cookie_name(&self) -> &str {
        &self.name
    }

    /// Name of the PKCE verifier cookie.
    #[must_use]
    pub fn verifier_cookie_name(&self) -> String {
        format!("{}{}", self.name, CODE_VERIFIER_SUFFIX)
    }

    /// Reads the PKCE verifier from the request cookies.
    ///
    /// The verifier may be stored raw, JSON-quoted, or base64-encoded.
    #[must_use]
    pub fn code_verifier(&self, jar: &CookieJar) -> Option<String> {
        let raw = jar.get(&self.verifier_cookie_name())?.value().to_string();
        let decoded = match raw.strip_prefix(BASE64_PREFIX) {
            Some(encoded) => {
                let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
                String::from_utf8(bytes).ok()?
            }
            None => raw,
        };
        let verifier = serde_json::from_str::<String>(&decoded).unwrap_or(decoded);
        (!verifier.is_empty()).then_some(verifier)
    }

    /// Builds the session cookie.
    pub fn session_cookie(&self, session: &Session) -> Result<Cookie<'static>, serde_json::Error> {
        let value = encode_session(session)?;
        Ok(Cookie::build((self.name.clone(), value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(self.max_age)
            .build())
    }

    /// Applies a successful exchange to the response cookies: stores the
    /// session and drops the spent verifier.
    #[must_use]
    pub fn store_session(&self, jar: CookieJar, session: &Session) -> CookieJar {
        let jar = jar.remove(Cookie::build((self.verifier_cookie_name(), "")).path("/"));
        match self.session_cookie(session) {
            Ok(cookie) => jar.add(cookie),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode session cookie");
                jar
            }
        }
    }
}

/// Encodes a session as a cookie value.
pub fn encode_session(session: &Session) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(session)?;
    Ok(format!("{BASE64_PREFIX}{}", URL_SAFE_NO_PAD.encode(json)))
}

/// Decodes a cookie value produced by [`encode_session`].
#[must_use]
pub fn decode_session(value: &str) -> Option<Session> {
    let encoded = value.strip_prefix(BASE64_PREFIX)?;
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    serde_json::from_slice(&bytes).ok()
}
