//! `POST /reload`: re-read configuration without restarting

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::super::state::ProxyState;

/// Swap in freshly loaded config; the old config stays active on failure
pub(crate) async fn reload_handler(State(state): State<ProxyState>) -> Response {
    match state.live.reload().await {
        Ok(keys) => Json(json!({"status": "ok", "keys_count": keys})).into_response(),
        Err(e) => {
            let message = format!("{:#}", e);
            tracing::error!("Config reload failed: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": message})),
            )
                .into_response()
        }
    }
}
