use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::{referrals::ReferralRequest, ServiceError};

mod referrals;

#[derive(Clone)]
struct AppState {
    referral_channel: mpsc::Sender<ReferralRequest>,
}

/// Sends a request to the referral service and waits for its reply.
async fn dispatch<T>(
    state: &AppState,
    request: impl FnOnce(oneshot::Sender<T>) -> ReferralRequest,
) -> Result<T, ServiceError> {
    let (response_tx, response_rx) = oneshot::channel();

    state
        .referral_channel
        .send(request(response_tx))
        .await
        .map_err(|e| ServiceError::Internal(format!("Failed to process request: {}", e)))?;

    response_rx
        .await
        .map_err(|e| ServiceError::Internal(format!("Failed to receive response: {}", e)))
}

fn error_response(error: ServiceError) -> (StatusCode, Json<Value>) {
    match error {
        ServiceError::InvalidInput(message) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": message})),
        ),
        ServiceError::DuplicateReferrer { ref code, .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "code": code,
                "message": error.to_string(),
            })),
        ),
        ServiceError::AlreadyRedeemed { .. } => (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": error.to_string()})),
        ),
        ServiceError::CodeNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": error.to_string()})),
        ),
        ServiceError::Internal(details) => {
            log::error!("Server error: {}", details);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": "Internal server error"})),
            )
        }
    }
}

fn router(referral_channel: mpsc::Sender<ReferralRequest>, diagnostics: bool) -> Router {
    let app_state = AppState { referral_channel };

    let mut app = Router::new()
        .route(
            "/api/generate-referral-code",
            post(referrals::generate_referral_code),
        )
        .route(
            "/api/redeem-referral-code",
            post(referrals::redeem_referral_code),
        )
        .route("/api/referral-metrics", get(referrals::get_referral_metrics))
        .route("/health", get(|| async { "OK" }));

    if diagnostics {
        log::warn!("Diagnostics enabled: /api/debug exposes the full referral store.");
        app = app.route("/api/debug", get(referrals::debug_dump));
    }

    app.with_state(app_state).layer(TraceLayer::new_for_http())
}

pub async fn start_http_server(
    referral_channel: mpsc::Sender<ReferralRequest>,
    listen: &str,
    diagnostics: bool,
) -> Result<(), anyhow::Error> {
    let app = router(referral_channel, diagnostics);

    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
