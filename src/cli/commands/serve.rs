//! HTTP server exposing the video session API and web UI.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::TubechatError;
use crate::session::{FailedVideo, SessionCoordinator};
use crate::transcript::extract_video_id;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

/// Shared application state.
struct AppState {
    coordinator: RwLock<SessionCoordinator>,
}

/// Run the HTTP server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let static_dir = settings.static_dir();

    let coordinator = SessionCoordinator::new(&settings)?;
    let state = Arc::new(AppState {
        coordinator: RwLock::new(coordinator),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route("/process-video", post(process_video))
        .route("/add-video", post(add_video))
        .route("/remove-video", post(remove_video))
        .route("/chat", post(chat))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Tubechat Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Web UI", "GET  /");
    Output::kv("Process Videos", "POST /process-video");
    Output::kv("Add Video", "POST /add-video");
    Output::kv("Remove Video", "POST /remove-video");
    Output::kv("Chat", "POST /chat");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ProcessVideoRequest {
    /// YouTube URLs or bare video IDs to load
    urls: Vec<String>,
}

#[derive(Serialize)]
struct ProcessVideoResponse {
    success: bool,
    message: String,
    video_ids: Vec<String>,
    failed_videos: Vec<FailedVideo>,
    invalid_urls: Vec<String>,
}

#[derive(Deserialize)]
struct AddVideoRequest {
    url: String,
}

#[derive(Deserialize)]
struct RemoveVideoRequest {
    video_id: String,
}

#[derive(Serialize)]
struct MembershipResponse {
    success: bool,
    message: String,
    video_id: String,
    video_ids: Vec<String>,
}

#[derive(Deserialize)]
struct ChatRequest {
    question: String,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
    question: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn bad_request(msg: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: msg.into() }),
    )
        .into_response()
}

/// Map coordinator errors: precondition violations are the caller's fault,
/// everything else is an upstream failure.
fn error_response(e: TubechatError) -> Response {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

// === Handlers ===

async fn process_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProcessVideoRequest>,
) -> Response {
    if req.urls.is_empty() {
        return bad_request("Please provide at least one YouTube URL.");
    }

    let mut video_ids = Vec::new();
    let mut invalid_urls = Vec::new();

    for url in &req.urls {
        match extract_video_id(url) {
            Some(id) => video_ids.push(id),
            None => invalid_urls.push(url.clone()),
        }
    }

    if video_ids.is_empty() {
        return bad_request(format!(
            "No valid YouTube URLs found. Invalid URLs: {}",
            invalid_urls.join(", ")
        ));
    }

    let mut coordinator = state.coordinator.write().await;
    match coordinator.initialize(&video_ids).await {
        Ok(outcome) => Json(ProcessVideoResponse {
            success: true,
            message: format!("Processed {} video(s) successfully!", outcome.video_ids.len()),
            video_ids: outcome.video_ids,
            failed_videos: outcome.failed,
            invalid_urls,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn add_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddVideoRequest>,
) -> Response {
    let Some(video_id) = extract_video_id(&req.url) else {
        return bad_request("Invalid YouTube URL.");
    };

    let mut coordinator = state.coordinator.write().await;
    match coordinator.add_video(&video_id).await {
        Ok(video_ids) => Json(MembershipResponse {
            success: true,
            message: format!("Video {} added successfully!", video_id),
            video_id,
            video_ids,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn remove_video(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RemoveVideoRequest>,
) -> Response {
    let mut coordinator = state.coordinator.write().await;
    match coordinator.remove_video(&req.video_id).await {
        Ok(video_ids) => Json(MembershipResponse {
            success: true,
            message: format!("Video {} removed successfully!", req.video_id),
            video_id: req.video_id,
            video_ids,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> Response {
    let coordinator = state.coordinator.read().await;
    match coordinator.query(&req.question).await {
        Ok(answer) => Json(ChatResponse {
            answer,
            question: req.question,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    let coordinator = state.coordinator.read().await;
    Json(serde_json::json!({
        "status": "healthy",
        "video_loaded": coordinator.has_session(),
    }))
    .into_response()
}
