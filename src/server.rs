//! HTTP front-end.
//!
//! Serves the single-page UI and the JSON endpoint the page posts questions to.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::answer::{AnswerError, AnswerResult, AnswerService};
use crate::preprocess::{ProcessedQuery, QueryPreprocessor};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Message returned when the question is empty or missing.
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question.";

/// State shared with all routes.
#[derive(Clone)]
pub struct AppState {
    service: Arc<AnswerService>,
}

/// Body of `POST /answer`.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// Body returned by `POST /answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub error: bool,
    pub message: String,
    pub processed: String,
    pub raw_response: String,
}

impl AnswerResponse {
    fn empty_question() -> Self {
        Self {
            error: true,
            message: EMPTY_QUESTION_MESSAGE.to_string(),
            processed: String::new(),
            raw_response: String::new(),
        }
    }

    fn from_result(processed: ProcessedQuery, result: &AnswerResult) -> Self {
        Self {
            error: result.is_error(),
            message: result.answer().to_string(),
            processed: processed.into_inner(),
            raw_response: result.raw_response().to_string(),
        }
    }
}

/// Body returned by `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub api_key_configured: bool,
}

/// Builds the application router.
pub fn router(service: Arc<AnswerService>) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/answer", post(answer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn run(addr: SocketAddr, service: Arc<AnswerService>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = state.service.config();
    Json(HealthResponse {
        status: "ok".to_string(),
        model: config.model().to_string(),
        api_key_configured: config.has_api_key(),
    })
}

async fn answer(
    State(state): State<AppState>,
    payload: Result<Json<AnswerRequest>, JsonRejection>,
) -> (StatusCode, Json<AnswerResponse>) {
    let question = match payload {
        Ok(Json(request)) => request.question.unwrap_or_default(),
        Err(rejection) => {
            warn!(error = %rejection, "Rejected malformed answer request");
            String::new()
        }
    };

    let question = question.trim();
    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AnswerResponse::empty_question()),
        );
    }

    let processed = QueryPreprocessor::process(question);
    info!(processed = %processed, "Answering question");

    let service = Arc::clone(&state.service);
    let query = processed.clone();
    // The provider call blocks; keep it off the async workers.
    let result = tokio::task::spawn_blocking(move || service.answer(&query))
        .await
        .unwrap_or_else(|e| AnswerResult::from(AnswerError::Unexpected(e.to_string())));

    let status = if result.is_error() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    (status, Json(AnswerResponse::from_result(processed, &result)))
}
