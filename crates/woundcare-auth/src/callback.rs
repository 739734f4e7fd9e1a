//! Authentication callback handler.
//!
//! `GET /auth/callback?code=<code>&next=<path>` exchanges the code for a
//! session and answers with exactly one redirect:
//!
//! | condition | target |
//! |-----------|--------|
//! | no `code` | `/login` |
//! | identity service not configured | `/login?error=configuration` |
//! | exchange rejected | `/login?error=<message>` |
//! | no user after exchange | `/login` |
//! | clinician | `/clinician/register` |
//! | patient, privacy agreed | `/dashboard` |
//! | patient, otherwise | `/privacy-agreement` |
//!
//! The `next` parameter is accepted but does not influence the target.

use std::sync::Arc;

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use url::Url;

use crate::config::IdentityConfig;
use crate::cookie::SessionCookies;
use crate::error::CallbackError;
use crate::identity::{IdentityError, IdentityService, Session, SupabaseAuthClient};
use crate::profile::{ProfileStore, SupabaseProfileStore};
use crate::redirect::{RedirectTarget, decide};

/// Query parameters of the callback request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    /// Authorization code issued by the identity service.
    pub code: Option<String>,

    /// Post-login path hint. Currently unused for routing.
    pub next: Option<String>,
}

impl CallbackParams {
    /// Parses a raw query string. Never fails: repeated keys keep their
    /// first value and malformed escapes decode lossily.
    #[must_use]
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "next" => &mut params.next,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

/// External collaborators of the callback.
#[derive(Clone)]
pub struct CallbackServices {
    /// Identity service used for the code exchange and user lookup.
    pub identity: Arc<dyn IdentityService>,
    /// Profile store used for the privacy flag.
    pub profiles: Arc<dyn ProfileStore>,
}

impl CallbackServices {
    /// Creates the service bundle.
    pub fn new(identity: Arc<dyn IdentityService>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { identity, profiles }
    }

    /// Creates Supabase-backed services sharing one HTTP client, or `None`
    /// when the identity endpoint or key is not configured.
    pub fn from_config(config: &IdentityConfig) -> Result<Option<Self>, IdentityError> {
        let Some(credentials) = config.credentials() else {
            return Ok(None);
        };

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Some(Self::new(
            Arc::new(SupabaseAuthClient::with_http_client(
                credentials.clone(),
                http_client.clone(),
            )),
            Arc::new(SupabaseProfileStore::with_http_client(credentials, http_client)),
        )))
    }
}

/// State for the callback endpoint.
#[derive(Clone)]
pub struct CallbackState {
    /// `None` when the identity service is not configured.
    pub services: Option<CallbackServices>,
    /// Cookie settings.
    pub cookies: SessionCookies,
    /// Public origin; overrides the request's `Host` when set.
    pub public_origin: Option<Url>,
    /// Origin used when neither the public origin nor `Host` is available.
    pub fallback_origin: Url,
}

impl CallbackState {
    /// Creates callback state.
    pub fn new(
        services: Option<CallbackServices>,
        cookies: SessionCookies,
        fallback_origin: Url,
    ) -> Self {
        Self {
            services,
            cookies,
            public_origin: None,
            fallback_origin,
        }
    }

    /// Builds state from configuration.
    pub fn from_config(config: &IdentityConfig, fallback_origin: Url) -> Result<Self, IdentityError> {
        let services = CallbackServices::from_config(config)?;
        if services.is_none() {
            tracing::warn!(
                "Identity service URL or key not configured; auth callbacks will redirect to /login?error=configuration"
            );
        }
        Ok(Self::new(
            services,
            SessionCookies::from_config(config),
            fallback_origin,
        ))
    }

    /// Sets the public origin used for all redirects.
    #[must_use]
    pub fn with_public_origin(mut self, origin: Option<Url>) -> Self {
        self.public_origin = origin;
        self
    }

    /// Determines the origin redirects are built on.
    ///
    /// Priority: configured public origin, then `X-Forwarded-Proto` + `Host`
    /// of the request, then the fallback origin.
    #[must_use]
    pub fn request_origin(&self, headers: &HeaderMap) -> Url {
        if let Some(origin) = &self.public_origin {
            return origin.clone();
        }

        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .filter(|h| !h.is_empty());
        let Some(host) = host else {
            return self.fallback_origin.clone();
        };

        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| matches!(*s, "http" | "https"))
            .unwrap_or(self.fallback_origin.scheme());

        Url::parse(&format!("{scheme}://{host}/")).unwrap_or_else(|_| self.fallback_origin.clone())
    }
}

/// Result of resolving one callback.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackOutcome {
    /// Where to send the browser.
    pub target: RedirectTarget,
    /// Session established by the exchange, if it succeeded.
    pub session: Option<Session>,
}

impl CallbackOutcome {
    fn redirect(target: RedirectTarget) -> Self {
        Self {
            target,
            session: None,
        }
    }

    fn failed(error: &CallbackError, session: Option<Session>) -> Self {
        Self {
            target: error.redirect_target().unwrap_or(RedirectTarget::Login),
            session,
        }
    }
}

/// Resolves a callback to its redirect target.
///
/// Performs at most three sequential calls: code exchange, user lookup and
/// profile read. None of them is retried, and every failure degrades to a
/// redirect.
pub async fn resolve_callback(
    services: Option<&CallbackServices>,
    code: Option<&str>,
    code_verifier: Option<&str>,
) -> CallbackOutcome {
    let Some(code) = code.filter(|c| !c.is_empty()) else {
        return CallbackOutcome::redirect(RedirectTarget::Login);
    };

    let Some(services) = services else {
        return CallbackOutcome::failed(&CallbackError::Configuration, None);
    };

    let session = match services
        .identity
        .exchange_code_for_session(code, code_verifier)
        .await
    {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, status = ?e.status(), "Authorization code exchange failed");
            return CallbackOutcome::failed(&CallbackError::Exchange(e.to_string()), None);
        }
    };

    let user = match services.identity.get_user(&session).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!("{}", CallbackError::MissingUser);
            return CallbackOutcome::failed(&CallbackError::MissingUser, Some(session));
        }
        Err(e) => {
            tracing::warn!(error = %e, "User lookup failed after code exchange");
            return CallbackOutcome::failed(&CallbackError::MissingUser, Some(session));
        }
    };

    let role = user.role();

    let privacy_agreed = match services.profiles.get_profile(&user.id, &session).await {
        Ok(profile) => profile.is_some_and(|p| p.privacy_agreed),
        Err(e) => {
            let error = CallbackError::from(e);
            tracing::warn!(user_id = %user.id, error = %error, "Treating privacy agreement as not given");
            false
        }
    };

    let target = decide(role, privacy_agreed);

    tracing::info!(
        user_id = %user.id,
        role = %role,
        privacy_agreed,
        target = target.path(),
        "Authentication callback resolved"
    );

    CallbackOutcome {
        target,
        session: Some(session),
    }
}

/// Handler for `GET /auth/callback`.
pub async fn callback_handler(
    State(state): State<CallbackState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let params = CallbackParams::from_query(query.as_deref());
    if let Some(next) = params.next.as_deref() {
        tracing::debug!(next, "Ignoring `next` hint on auth callback");
    }

    let code_verifier = state.cookies.code_verifier(&jar);
    let outcome = resolve_callback(
        state.services.as_ref(),
        params.code.as_deref(),
        code_verifier.as_deref(),
    )
    .await;

    let location = outcome.target.to_url(&state.request_origin(&headers));

    let jar = match &outcome.session {
        Some(session) => state.cookies.store_session(jar, session),
        None => jar,
    };

    (jar, Redirect::temporary(location.as_str())).into_response()
}
