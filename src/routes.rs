use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::aggregator::Aggregator;
use crate::cache::NewsCache;
use crate::models::{GroupedHeadlines, NewsItem};

pub struct AppState {
    pub cache: Arc<NewsCache>,
    pub aggregator: Arc<Aggregator>,
}

pub enum AppError {
    NotFound(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(detail) => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": detail }))).into_response()
            }
            AppError::Internal(err) => {
                error!("Request failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError::Internal(err.into())
    }
}

pub fn router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/news", get(list_news))
        .route("/api/news/:id", get(news_detail))
        .route("/api/german-news", get(german_news))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

// Route handlers
pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to Papergum API" }))
}

pub async fn health() -> impl IntoResponse {
    "OK"
}

pub async fn list_news(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NewsItem>>, AppError> {
    let items = state.cache.get().await?;
    Ok(Json(items.to_vec()))
}

pub async fn news_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<NewsItem>, AppError> {
    state
        .cache
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("News item not found".to_string()))
}

pub async fn german_news(State(state): State<Arc<AppState>>) -> Json<GroupedHeadlines> {
    Json(state.aggregator.headlines_by_source().await)
}
