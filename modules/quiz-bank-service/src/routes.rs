//! Axum route handlers for the quiz bank HTTP API.

use crate::dashboard;
use crate::store::QuestionStore;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use quiz_bank_types::*;
use std::sync::Arc;
use std::time::Instant;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
    pub store: QuestionStore,
    pub start_time: Instant,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = tower_http::cors::CorsLayer::permissive();

    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/topics", get(topics))
        .route("/questions", get(all_questions))
        .route("/questions/topic/:topic_name", get(questions_by_topic))
        .route("/questions/:month_id", get(questions_by_month))
        .route("/months", get(months))
        .route("/status", get(status))
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
}

/// A JSON error response: `{"error": "<message>"}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}

// GET /topics
pub async fn topics(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    match state.store.topics().await {
        Ok(topics) => Ok(Json(topics).into_response()),
        Err(e) => {
            log::warn!("[API] /topics: {}", e);
            Err(ApiError::internal("Failed to load topics."))
        }
    }
}

// GET /questions
pub async fn all_questions(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let questions = state.store.all_questions().await.map_err(|e| {
        log::warn!("[API] /questions: {}", e);
        ApiError::internal("Failed to load questions.")
    })?;

    // A preloaded store with nothing in it means startup found no data;
    // live mode reports an empty directory as an empty list.
    if questions.is_empty() && state.store.mode() == StoreMode::Preload {
        return Err(ApiError::internal(
            "Questions not available. The server cache is empty.",
        ));
    }

    Ok(Json(questions).into_response())
}

// GET /questions/topic/:topic_name
pub async fn questions_by_topic(
    State(state): State<Arc<AppState>>,
    Path(topic_name): Path<String>,
) -> Result<Json<Vec<Question>>, ApiError> {
    let questions = state
        .store
        .questions_for_topic(&topic_name)
        .await
        .map_err(|e| {
            log::warn!("[API] /questions/topic/{}: {}", topic_name, e);
            ApiError::internal("Failed to load questions.")
        })?;

    if questions.is_empty() {
        return Err(ApiError::not_found(format!(
            "Questions for topic '{}' not found.",
            topic_name
        )));
    }
    Ok(Json(questions))
}

// GET /questions/:month_id
pub async fn questions_by_month(
    State(state): State<Arc<AppState>>,
    Path(month_id): Path<String>,
) -> Result<Json<Vec<Question>>, ApiError> {
    state
        .store
        .questions_for_month(&month_id)
        .await
        .map(Json)
        .ok_or_else(|| {
            ApiError::not_found(format!("Questions for month '{}' not found.", month_id))
        })
}

// GET /months
pub async fn months(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, ApiError> {
    state.store.months().await.map(Json).map_err(|e| {
        log::warn!("[API] /months: {}", e);
        ApiError::internal("Failed to list months.")
    })
}

// GET /status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<ServiceStatus> {
    let summary = state.store.summary().await;
    Json(ServiceStatus {
        running: true,
        version: VERSION.to_string(),
        mode: state.store.mode(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        question_count: summary.question_count,
        topic_count: summary.topic_count,
        month_count: summary.month_count,
        loaded_at: summary.loaded_at,
    })
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found.")
}
