//! Profile store.
//!
//! Profiles live in a `profiles` table exposed through the Supabase REST API.
//! Only the privacy agreement flag is read here.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::config::IdentityCredentials;
use crate::identity::Session;

/// Per-user profile data needed for routing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Profile {
    /// Owning user id.
    pub user_id: String,
    /// Whether the user accepted the privacy agreement.
    pub privacy_agreed: bool,
}

/// Errors that can occur while reading a profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// A network error occurred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The store answered with an error status.
    #[error("Profile store returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("Invalid profile response: {0}")]
    InvalidResponse(String),

    /// Failed to build the request URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Read access to user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetches the profile of `user_id`, using the caller's session for
    /// row-level access. Returns `Ok(None)` when no profile row exists.
    async fn get_profile(
        &self,
        user_id: &str,
        session: &Session,
    ) -> Result<Option<Profile>, ProfileError>;
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[serde(default, deserialize_with = "null_as_false")]
    privacy_agreed: bool,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// HTTP client for the `profiles` table (`/rest/v1/profiles`).
#[derive(Debug, Clone)]
pub struct SupabaseProfileStore {
    http_client: reqwest::Client,
    credentials: IdentityCredentials,
}

impl SupabaseProfileStore {
    /// Creates a store client with the given per-request timeout.
    pub fn new(
        credentials: IdentityCredentials,
        request_timeout: Duration,
    ) -> Result<Self, ProfileError> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            http_client,
            credentials,
        })
    }

    /// Creates a store client sharing an existing HTTP client.
    #[must_use]
    pub fn with_http_client(credentials: IdentityCredentials, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            credentials,
        }
    }

    fn profile_url(&self, user_id: &str) -> Result<Url, ProfileError> {
        let mut url = self.credentials.url.join("rest/v1/profiles")?;
        url.query_pairs_mut()
            .append_pair("select", "privacy_agreed")
            .append_pair("id", &format!("eq.{user_id}"));
        Ok(url)
    }
}

#[async_trait]
impl ProfileStore for SupabaseProfileStore {
    async fn get_profile(
        &self,
        user_id: &str,
        session: &Session,
    ) -> Result<Option<Profile>, ProfileError> {
        let url = self.profile_url(user_id)?;

        let response = self
            .http_client
            .get(url)
            .header("apikey", &self.credentials.anon_key)
            .header("accept", "application/json")
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProfileError::Status { status, body });
        }

        let rows: Vec<ProfileRow> = response
            .json()
            .await
            .map_err(|e| ProfileError::InvalidResponse(e.to_string()))?;

        Ok(rows.into_iter().next().map(|row| Profile {
            user_id: user_id.to_string(),
            privacy_agreed: row.privacy_agreed,
        }))
    }
}
