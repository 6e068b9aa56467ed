//! Proxy error types and response handling

use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
};

/// Errors that can occur while relaying a request
#[derive(Debug)]
pub(crate) enum ProxyError {
    /// Inbound body could not be read
    BodyRead(String),
    /// Upstream unreachable, timed out, or reset before responding
    Upstream(String),
    /// Could not assemble the response to the caller
    ResponseBuild(String),
}

impl ProxyError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            ProxyError::BodyRead(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::ResponseBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response<Body> {
        let status = self.status();
        let message = match self {
            ProxyError::BodyRead(msg) | ProxyError::Upstream(msg) | ProxyError::ResponseBuild(msg) => {
                msg
            }
        };

        tracing::error!("Proxy error: {} - {}", status, message);

        Response::builder()
            .status(status)
            .body(Body::from(message))
            .unwrap_or_else(|_| Response::new(Body::from("Internal error building error response")))
    }
}
