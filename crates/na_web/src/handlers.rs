use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use na_core::{Article, Error, StatsRecord};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::AppState;

const NEWS_FAILURE: &str = "Failed to fetch news";
const STATS_FAILURE: &str = "Failed to fetch stats";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub status: &'static str,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub data: Vec<Article>,
    pub metadata: Metadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Handler time such as `"412ms"`.
    pub request_time: String,
    pub timestamp: String,
}

impl NewsResponse {
    fn new(data: Vec<Article>, started: Instant) -> Self {
        Self {
            status: "success",
            count: data.len(),
            query: None,
            data,
            metadata: Metadata {
                request_time: format!("{}ms", started.elapsed().as_millis()),
                timestamp: now_iso(),
            },
        }
    }

    fn with_query(mut self, query: String) -> Self {
        self.query = Some(query);
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub status: &'static str,
    pub data: StatsRecord,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Maps pipeline errors onto the JSON error envelope.
#[derive(Debug)]
pub struct ApiError {
    message: &'static str,
    error: Error,
}

impl ApiError {
    pub fn new(message: &'static str, error: Error) -> Self {
        Self { message, error }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self::new(NEWS_FAILURE, error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.error {
            Error::UnknownCategory(_) => (
                StatusCode::NOT_FOUND,
                json!({ "status": "error", "message": self.error.to_string() }),
            ),
            Error::Validation(message) => {
                debug!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, json!({ "status": "error", "message": message }))
            }
            other => {
                error!("❌ {}: {}", self.message, other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "status": "error", "message": self.message, "error": other.to_string() }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub async fn all_news(State(state): State<Arc<AppState>>) -> Result<Json<NewsResponse>, ApiError> {
    let started = Instant::now();
    let articles = state.manager.get_all_news().await?;
    Ok(Json(NewsResponse::new(articles, started)))
}

pub async fn category_news(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<NewsResponse>, ApiError> {
    let started = Instant::now();
    let articles = state.manager.get_category_news(&category).await?;
    Ok(Json(NewsResponse::new(articles, started)))
}

pub async fn search_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<NewsResponse>, ApiError> {
    let started = Instant::now();
    let query = params.q.unwrap_or_default();
    let articles = state.manager.search_news(&query).await?;
    Ok(Json(NewsResponse::new(articles, started).with_query(query)))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: now_iso(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let data = state
        .stats
        .snapshot()
        .await
        .map_err(|e| ApiError::new(STATS_FAILURE, e))?;
    Ok(Json(StatsResponse { status: "success", data }))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": "error", "message": "Not found" })),
    )
}
