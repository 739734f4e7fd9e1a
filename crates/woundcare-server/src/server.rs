use std::net::SocketAddr;

use anyhow::Context;
use axum::{Router, middleware, routing::get};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use url::Url;
use woundcare_auth::{CallbackState, callback_handler};
use woundcare_education::{EducationState, LocaleRegistry, education_routes};

use crate::{
    config::{AppConfig, EducationConfig},
    handlers, middleware as app_middleware,
};

pub struct WoundcareServer {
    addr: SocketAddr,
    app: Router,
}

/// Loads the locale bundles named by the education config.
pub fn load_registry(cfg: &EducationConfig) -> anyhow::Result<LocaleRegistry> {
    let registry = match &cfg.locales_dir {
        Some(dir) => LocaleRegistry::with_directory(&cfg.default_locale, dir)
            .with_context(|| format!("loading locale bundles from {}", dir.display()))?,
        None => LocaleRegistry::embedded(&cfg.default_locale)?,
    };
    tracing::info!(
        default_locale = registry.default_locale(),
        locales = ?registry.locales().collect::<Vec<_>>(),
        "Education catalogs loaded"
    );
    Ok(registry)
}

pub fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let fallback_origin = Url::parse(&cfg.base_url()).context("server.base_url")?;
    let callback_state = CallbackState::from_config(&cfg.identity, fallback_origin)?
        .with_public_origin(cfg.public_origin());
    let education_state = EducationState::new(load_registry(&cfg.education)?);

    let auth_routes = Router::new()
        .route("/auth/callback", get(callback_handler))
        .with_state(callback_state);

    let app = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .merge(auth_routes)
        .merge(education_routes(education_state))
        // Outermost last: body limit, request id, trace, compression.
        // request_id must wrap the trace layer so the span sees its extension.
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    // Path only; the callback query string carries the auth code.
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = tracing::field::Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(axum::extract::DefaultBodyLimit::max(
            cfg.server.body_limit_bytes,
        ));

    Ok(app)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> anyhow::Result<WoundcareServer> {
        let app = build_app(&self.config)?;
        Ok(WoundcareServer {
            addr: self.addr,
            app,
        })
    }
}

impl WoundcareServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
