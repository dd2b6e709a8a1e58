//! HTTP route definitions

use axum::{
    extract::State,
    http::{header, Method},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::app::AppState;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - support multiple origins (comma-separated in
    // CLIENT_ORIGIN), or "*" for any
    let cors = if state.config.client_origin.trim() == "*" {
        CorsLayer::permissive()
    } else {
        let allowed_origins: Vec<header::HeaderValue> = state
            .config
            .client_origin
            .split(',')
            .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .route("/api/report-win", post(report_win_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_rooms: usize,
    connected_players: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        active_rooms: state.rooms.active_rooms(),
        connected_players: state.rooms.total_players(),
    })
}

// ============================================================================
// Win reporting
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportWinRequest {
    /// Lobby chat to announce the win in, when the match came from one
    chat_id: Option<String>,
    winner_name: String,
    winner_id: String,
}

#[derive(Serialize)]
struct ReportWinResponse {
    success: bool,
}

/// Record a match win and announce it in the originating chat. The caller is
/// acknowledged immediately; persistence and the announcement run in the
/// background and failures are only logged.
async fn report_win_handler(
    State(state): State<AppState>,
    Json(req): Json<ReportWinRequest>,
) -> Json<ReportWinResponse> {
    tokio::spawn(async move {
        info!(winner = %req.winner_name, "match win reported");

        if let Err(e) = state.stats.record_win(&req.winner_id, &req.winner_name).await {
            error!(error = %e, winner_id = %req.winner_id, "failed to record win");
        }

        if let Some(chat_id) = req.chat_id {
            let text = format!("🏆 {} won the battle royale!", req.winner_name);
            if let Err(e) = state.telegram.send_message(&chat_id, &text).await {
                error!(error = %e, chat_id = %chat_id, "failed to announce win");
            }
        }
    });

    Json(ReportWinResponse { success: true })
}
