//! Main proxy handler

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
};

use super::super::error::ProxyError;
use super::super::helpers::{body_preview, resolve_authorization, target_url};
use super::super::relay::{self, Outbound};
use super::super::state::ProxyState;
use super::super::transformation::prepare_body;

/// Rewrite and forward one inbound request
pub(crate) async fn proxy_handler(
    State(state): State<ProxyState>,
    req: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let start = Instant::now();
    // One snapshot for the whole request, even if a reload lands midway
    let snapshot = state.live.current();

    let (parts, body) = req.into_parts();
    tracing::debug!("Proxying {} {}", parts.method, parts.uri);

    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| ProxyError::BodyRead(e.to_string()))?;

    if snapshot.debug && !body_bytes.is_empty() {
        tracing::debug!("Inbound body: {}", body_preview(&body_bytes));
    }

    let prepared = prepare_body(&parts.method, body_bytes);
    let stream = prepared.wants_stream();
    let transformed = prepared.is_transformed();

    let (authorization, auth_source) = resolve_authorization(&parts.headers, &snapshot.rotator);
    let url = target_url(&snapshot.base_url, parts.uri.path(), parts.uri.query());

    if snapshot.debug {
        tracing::debug!(
            transformed,
            stream,
            passthrough = ?prepared.passthrough_reason(),
            "Forwarding to {}",
            url
        );
    }

    let outbound = Outbound {
        url,
        authorization,
        body: prepared.bytes().clone(),
        stream,
    };
    let result = relay::forward(&state.client, &snapshot, outbound).await;

    match &result {
        Ok(response) => tracing::info!(
            method = %parts.method,
            path = parts.uri.path(),
            status = response.status().as_u16(),
            stream,
            transformed,
            auth = ?auth_source,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Relayed"
        ),
        Err(e) => tracing::warn!(
            method = %parts.method,
            path = parts.uri.path(),
            status = e.status().as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Relay failed"
        ),
    }

    result
}
