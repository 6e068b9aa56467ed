//! Buffered relay: status, body and content type passed through verbatim

use axum::body::Body;
use axum::http::{header, Response};

use super::super::error::ProxyError;

pub(super) async fn relay(response: reqwest::Response) -> Result<Response<Body>, ProxyError> {
    let status = response.status();
    let content_type = response.headers().get(header::CONTENT_TYPE).cloned();

    let body = response
        .bytes()
        .await
        .map_err(|e| ProxyError::Upstream(format!("Failed to read upstream body: {}", e)))?;

    if !status.is_success() {
        tracing::warn!(
            "Upstream {}: {}",
            status.as_u16(),
            crate::proxy::helpers::body_preview(&body)
        );
    }

    let mut builder = Response::builder().status(status);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    builder
        .body(Body::from(body))
        .map_err(|e| ProxyError::ResponseBuild(e.to_string()))
}
