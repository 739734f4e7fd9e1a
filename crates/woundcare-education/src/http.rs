//! Education page endpoints.
//!
//! Each request opens a fresh [`EducationBrowser`] over the resolved locale,
//! so the server holds no per-user selection state.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::browser::EducationBrowser;
use crate::error::EducationError;
use crate::registry::LocaleRegistry;
use crate::view::{EducationPage, ExampleDetail, TopicDetail};

#[derive(Clone)]
pub struct EducationState {
    pub registry: Arc<LocaleRegistry>,
}

impl EducationState {
    pub fn new(registry: LocaleRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    fn browser(&self, locale: Option<&str>) -> EducationBrowser {
        EducationBrowser::new(self.registry.resolve(locale))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<String>,
}

pub fn education_routes(state: EducationState) -> Router {
    Router::new()
        .route("/education", get(education_page))
        .route("/education/examples/{id}", get(example_detail))
        .route("/education/topics/{id}", get(topic_detail))
        .with_state(state)
}

async fn education_page(
    State(state): State<EducationState>,
    Query(query): Query<LocaleQuery>,
) -> Json<EducationPage> {
    let browser = state.browser(query.locale.as_deref());
    Json(EducationPage::from_catalog(browser.catalog()))
}

async fn example_detail(
    State(state): State<EducationState>,
    Path(id): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<ExampleDetail>, EducationError> {
    let mut browser = state.browser(query.locale.as_deref());
    let detail = browser.select_example(&id)?;
    tracing::debug!(example = %id, locale = %browser.catalog().locale, "Example detail");
    Ok(Json(detail))
}

async fn topic_detail(
    State(state): State<EducationState>,
    Path(id): Path<String>,
    Query(query): Query<LocaleQuery>,
) -> Result<Json<TopicDetail>, EducationError> {
    let mut browser = state.browser(query.locale.as_deref());
    let detail = browser.select_topic(&id)?;
    tracing::debug!(topic = %id, locale = %browser.catalog().locale, "Topic detail");
    Ok(Json(detail))
}
