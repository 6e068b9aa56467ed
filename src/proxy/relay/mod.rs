//! Relay engine: one forwarding attempt per inbound request
//!
//! The outbound call is always a POST to `{base_url}/{path}`. Whether the
//! response is streamed or buffered is decided by the caller from the parsed
//! payload, not by scanning bytes.

mod buffered;
mod streaming;

use axum::body::Body;
use axum::http::{header, Response};
use bytes::Bytes;

use super::error::ProxyError;
use super::state::UpstreamSnapshot;

/// Fully resolved outbound request
#[derive(Debug)]
pub(crate) struct Outbound {
    pub url: String,
    pub authorization: Option<String>,
    pub body: Bytes,
    pub stream: bool,
}

/// Send the request upstream and relay the response back
pub(crate) async fn forward(
    client: &reqwest::Client,
    snapshot: &UpstreamSnapshot,
    outbound: Outbound,
) -> Result<Response<Body>, ProxyError> {
    let mut request = client
        .post(&outbound.url)
        .header(header::CONTENT_TYPE, "application/json")
        .body(outbound.body);

    // Buffered calls get one total deadline. A stream may run for as long as
    // chunks keep arriving, so its timeout bounds the wait for headers and
    // then each gap between chunks.
    if !outbound.stream {
        request = request.timeout(snapshot.buffered_timeout);
    }

    if !snapshot.user_agent.is_empty() {
        request = request.header(header::USER_AGENT, snapshot.user_agent.as_str());
    }
    if let Some(auth) = outbound.authorization {
        request = request.header(header::AUTHORIZATION, auth);
    }

    // Transport failures surface before any byte reaches the caller
    let sent = if outbound.stream {
        tokio::time::timeout(snapshot.stream_timeout, request.send())
            .await
            .map_err(|_| {
                ProxyError::Upstream(format!(
                    "Timed out after {:?} waiting for upstream {}",
                    snapshot.stream_timeout, outbound.url
                ))
            })?
    } else {
        request.send().await
    };
    let response = sent.map_err(|e| {
        ProxyError::Upstream(format!("Failed to reach upstream {}: {}", outbound.url, e))
    })?;

    if outbound.stream {
        streaming::relay(response, snapshot.stream_timeout).await
    } else {
        buffered::relay(response).await
    }
}
