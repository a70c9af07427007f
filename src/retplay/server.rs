//! HTTP server for RetPlay using Axum.

use super::header::{render_page, RetPlayHeader};
use super::summary::PlaybackSummary;
use crate::playback::JsonResults;
use crate::utils::error::{Result, RetError};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared by every handler. The playback is loaded once and never changes.
pub struct AppState {
    pub results: JsonResults,
    pub summary: PlaybackSummary,
    pub playback_json: String,
    pub page: String,
}

impl AppState {
    pub fn new(results: JsonResults, title: &str) -> Result<Self> {
        let playback_json = results.json()?;
        Ok(Self {
            summary: PlaybackSummary::from_results(&results),
            page: render_page(&RetPlayHeader::default(), title),
            results,
            playback_json,
        })
    }
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

async fn handle_playback(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], state.playback_json.clone())
}

async fn handle_summary(State(state): State<Arc<AppState>>) -> Json<PlaybackSummary> {
    Json(state.summary.clone())
}

async fn handle_step(State(state): State<Arc<AppState>>, Path(step_number): Path<u64>) -> Response {
    match state.results.step_data.iter().find(|s| s.step_number == step_number) {
        Some(step) => Json(step.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Step {} not found", step_number) })),
        )
            .into_response(),
    }
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: Arc<AppState>, assets: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let mut app = Router::new()
        .route("/", get(handle_index))
        .route("/api/playback", get(handle_playback))
        .route("/api/summary", get(handle_summary))
        .route("/api/steps/:step_number", get(handle_step))
        .route("/health", get(handle_health));
    if let Some(assets) = assets {
        app = app.nest_service("/assets", ServeDir::new(assets));
    }

    app.layer(cors).layer(TraceLayer::new_for_http()).with_state(state)
}

/// Bind and serve in the background. Returns the bound address (useful when port is 0).
pub async fn start_server(state: Arc<AppState>, assets: Option<PathBuf>, host: &str, port: u16) -> Result<SocketAddr> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse().map_err(|_| RetError::InvalidConfigValueError {
        field: "host".to_string(),
        value: format!("{}:{}", host, port),
        reason: "Not a valid socket address".to_string(),
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!("🎞️ RetPlay listening on http://{}", actual_addr);

    let app = router(state, assets);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("❌ RetPlay server error: {}", e);
        }
    });

    Ok(actual_addr)
}
