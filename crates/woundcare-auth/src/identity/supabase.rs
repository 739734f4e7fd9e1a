//! Supabase GoTrue client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use url::Url;

use super::{IdentityError, IdentityService, Session, User};
use crate::config::IdentityCredentials;

/// HTTP client for the Supabase auth API (`/auth/v1`).
#[derive(Debug, Clone)]
pub struct SupabaseAuthClient {
    http_client: reqwest::Client,
    credentials: IdentityCredentials,
}

#[derive(Debug, Serialize)]
struct PkceExchangeRequest<'a> {
    auth_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code_verifier: Option<&'a str>,
}

impl SupabaseAuthClient {
    /// Creates a client with the given per-request timeout.
    pub fn new(
        credentials: IdentityCredentials,
        request_timeout: Duration,
    ) -> Result<Self, IdentityError> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            http_client,
            credentials,
        })
    }

    /// Creates a client sharing an existing HTTP client.
    #[must_use]
    pub fn with_http_client(credentials: IdentityCredentials, http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            credentials,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        Ok(self.credentials.url.join(path)?)
    }
}

#[async_trait]
impl IdentityService for SupabaseAuthClient {
    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, IdentityError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "pkce");

        tracing::debug!(
            endpoint = %url.path(),
            has_verifier = code_verifier.is_some(),
            "Exchanging authorization code"
        );

        let response = self
            .http_client
            .post(url)
            .header("apikey", &self.credentials.anon_key)
            .json(&PkceExchangeRequest {
                auth_code: code,
                code_verifier,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::from_response(status, &body));
        }

        response.json::<Session>().await.map_err(|e| {
            IdentityError::InvalidResponse(format!("Failed to parse token response: {e}"))
        })
    }

    async fn get_user(&self, session: &Session) -> Result<Option<User>, IdentityError> {
        let url = self.endpoint("auth/v1/user")?;

        let response = self
            .http_client
            .get(url)
            .header("apikey", &self.credentials.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let user = response.json::<User>().await.map_err(|e| {
                    IdentityError::InvalidResponse(format!("Failed to parse user response: {e}"))
                })?;
                Ok(Some(user))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                tracing::debug!(status = %response.status(), "Session did not resolve to a user");
                Ok(None)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(IdentityError::from_response(status, &body))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SupabaseAuthClient {
        let credentials = IdentityCredentials::new(&server.uri(), "anon-key").unwrap();
        SupabaseAuthClient::new(credentials, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "pkce"))
            .and(header("apikey", "anon-key"))
            .and(body_json(json!({"auth_code": "code-1", "code_verifier": "verifier-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "at-1",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "rt-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server)
            .exchange_code_for_session("code-1", Some("verifier-1"))
            .await
            .unwrap();

        assert_eq!(session.access_token, "at-1");
        assert_eq!(session.refresh_token.as_deref(), Some("rt-1"));
    }

    #[tokio::test]
    async fn test_exchange_code_without_verifier_omits_field() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(body_json(json!({"auth_code": "code-2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "at-2"})))
            .expect(1)
            .mount(&server)
            .await;

        let session = client(&server)
            .exchange_code_for_session("code-2", None)
            .await
            .unwrap();
        assert_eq!(session.token_type, "bearer");
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error_code": "flow_state_not_found", "msg": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .exchange_code_for_session("stale", None)
            .await
            .unwrap_err();

        assert!(err.is_rejection());
        assert_eq!(err.to_string(), "invalid_grant");
    }

    #[tokio::test]
    async fn test_exchange_code_malformed_success_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
            .mount(&server)
            .await;

        let err = client(&server)
            .exchange_code_for_session("code", None)
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_get_user() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer at-3"))
            .and(header("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user-3",
                "role": "authenticated",
                "user_metadata": {"role": "clinician"}
            })))
            .mount(&server)
            .await;

        let user = client(&server)
            .get_user(&Session::new("at-3"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, "user-3");
        assert_eq!(user.role(), Role::Clinician);
    }

    #[tokio::test]
    async fn test_get_user_unauthorized_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"msg": "invalid JWT"})))
            .mount(&server)
            .await;

        let user = client(&server).get_user(&Session::new("bad")).await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_get_user_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server).get_user(&Session::new("at")).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
