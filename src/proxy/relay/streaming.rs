//! Streaming relay
//!
//! Success: upstream chunks are forwarded as they arrive, in order.
//! Failure status: the whole error body is drained first and sent as one
//! chunk so the caller sees the complete diagnostic.

use std::io;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use bytes::Bytes;
use futures::{Stream, StreamExt};

use super::super::error::ProxyError;

pub(super) async fn relay(
    response: reqwest::Response,
    idle: Duration,
) -> Result<Response<Body>, ProxyError> {
    let status = response.status();

    let body = if status.is_success() {
        Body::from_stream(with_idle_timeout(response.bytes_stream(), idle))
    } else {
        let error_body = tokio::time::timeout(idle, response.bytes())
            .await
            .map_err(|_| {
                ProxyError::Upstream(format!("Timed out reading upstream error body ({})", status))
            })?
            .map_err(|e| {
                ProxyError::Upstream(format!(
                    "Failed to read upstream error body ({}): {}",
                    status, e
                ))
            })?;
        tracing::error!(
            "Upstream {}: {}",
            status.as_u16(),
            String::from_utf8_lossy(&error_body)
        );
        Body::from(error_body)
    };

    // The stream is already committed to the caller, so the status is always 200
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|e| ProxyError::ResponseBuild(e.to_string()))
}

/// Forward chunks until the upstream ends, fails, or goes quiet for `idle`
///
/// The deadline restarts with every chunk, so a long generation that keeps
/// producing output is never cut off.
fn with_idle_timeout<S>(upstream: S, idle: Duration) -> impl Stream<Item = io::Result<Bytes>>
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
{
    futures::stream::unfold(Some(Box::pin(upstream)), move |state| async move {
        let mut upstream = state?;
        match tokio::time::timeout(idle, upstream.next()).await {
            Ok(Some(Ok(chunk))) => Some((Ok(chunk), Some(upstream))),
            Ok(Some(Err(e))) => {
                tracing::error!("Upstream stream interrupted: {}", e);
                Some((Err(io::Error::other(e)), None))
            }
            Ok(None) => None,
            Err(_) => {
                tracing::error!("Upstream stream idle for {:?}, closing", idle);
                Some((
                    Err(io::Error::new(io::ErrorKind::TimedOut, "upstream stream idle")),
                    None,
                ))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(items: Vec<&'static str>) -> impl Stream<Item = reqwest::Result<Bytes>> {
        futures::stream::iter(items.into_iter().map(|c| Ok(Bytes::from_static(c.as_bytes()))))
    }

    #[tokio::test]
    async fn test_idle_guard_passes_every_chunk_in_order() {
        let out: Vec<_> = with_idle_timeout(chunks(vec!["a", "b", "c"]), Duration::from_secs(1))
            .collect()
            .await;
        let bytes: Vec<Bytes> = out.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(bytes, vec![Bytes::from("a"), Bytes::from("b"), Bytes::from("c")]);
    }

    #[tokio::test]
    async fn test_idle_guard_closes_a_stalled_stream() {
        let stalled = chunks(vec!["a"]).chain(futures::stream::pending());
        let out: Vec<_> = with_idle_timeout(stalled, Duration::from_millis(50))
            .collect()
            .await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap(), &Bytes::from("a"));
        assert_eq!(
            out[1].as_ref().unwrap_err().kind(),
            io::ErrorKind::TimedOut
        );
    }
}
