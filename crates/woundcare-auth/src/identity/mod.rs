//! External identity service.
//!
//! The callback depends on the [`IdentityService`] trait only; the
//! [`SupabaseAuthClient`] implementation speaks the Supabase GoTrue HTTP API.

mod error;
mod supabase;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use error::IdentityError;
pub use supabase::SupabaseAuthClient;

use crate::role::Role;

/// Operations the callback needs from the identity service.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Exchanges a single-use authorization code for a session.
    ///
    /// `code_verifier` is the PKCE verifier stored when the flow started, if
    /// the browser still carries it.
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, IdentityError>;

    /// Resolves the user the session belongs to.
    ///
    /// Returns `Ok(None)` when the service does not recognize the session.
    async fn get_user(&self, session: &Session) -> Result<Option<User>, IdentityError>;
}

/// Session issued by a successful code exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for user-scoped requests.
    pub access_token: String,

    /// Token type (usually "bearer").
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Access token lifetime in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Access token expiry as a Unix timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,

    /// Refresh token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// User embedded in the token response, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Creates a session with only an access token.
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expires_in: None,
            expires_at: None,
            refresh_token: None,
            user: None,
        }
    }
}

/// An authenticated user as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable user id; also the profile key.
    pub id: String,

    /// Email address, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Free-form metadata editable by the user. Holds `role`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_metadata: HashMap<String, Value>,
}

impl User {
    /// Creates a user with empty metadata.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            user_metadata: HashMap::new(),
        }
    }

    /// Sets the `role` metadata entry.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.user_metadata
            .insert("role".to_string(), Value::String(role.into()));
        self
    }

    /// The user's role, defaulting to [`Role::Patient`].
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_metadata(self.user_metadata.get("role"))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_deserialize_token_response() {
        let json = r#"{
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1700003600,
            "refresh_token": "rt",
            "user": {"id": "u-1", "email": "p@example.com", "user_metadata": {"role": "clinician"}}
        }"#;

        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token, "at");
        assert_eq!(session.refresh_token.as_deref(), Some("rt"));
        let user = session.user.unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.role(), Role::Clinician);
    }

    #[test]
    fn test_user_metadata_null_or_missing() {
        let user: User = serde_json::from_str(r#"{"id": "u-2", "user_metadata": null}"#).unwrap();
        assert!(user.user_metadata.is_empty());
        assert_eq!(user.role(), Role::Patient);

        let user: User = serde_json::from_str(r#"{"id": "u-3"}"#).unwrap();
        assert_eq!(user.role(), Role::Patient);
    }

    #[test]
    fn test_user_builder() {
        let user = User::new("u-4").with_role("clinician");
        assert_eq!(user.role(), Role::Clinician);
    }
}
