//! Utility functions for request processing

use axum::http::{header, HeaderMap};

use super::credentials::{fingerprint, CredentialRotator};

/// Bytes of a request body shown in debug logs
pub(crate) const DEBUG_PREVIEW_BYTES: usize = 300;

/// Where an outbound credential came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthSource {
    /// Caller sent its own credential
    Caller,
    /// Taken from the rotation pool
    Pool,
    /// Caller sent nothing and the pool is empty
    Missing,
}

/// Pick the Authorization header value for the outbound request
///
/// A caller-supplied header is forwarded verbatim (trimmed) unless it is
/// blank or a bare `Bearer` scheme, in which case the next pooled credential
/// is used. Returns `None` when there is nothing to send.
pub(crate) fn resolve_authorization(
    headers: &HeaderMap,
    rotator: &CredentialRotator,
) -> (Option<String>, AuthSource) {
    let supplied = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("bearer"));

    if let Some(value) = supplied {
        return (Some(value.to_string()), AuthSource::Caller);
    }

    match rotator.next() {
        Some(key) => {
            tracing::debug!(key = %fingerprint(&key), "Using pooled credential");
            (Some(format!("Bearer {}", key)), AuthSource::Pool)
        }
        None => (None, AuthSource::Missing),
    }
}

/// Join the upstream base URL with the inbound path and query
pub(crate) fn target_url(base_url: &str, path: &str, query: Option<&str>) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("{}/{}?{}", base, path, q),
        None => format!("{}/{}", base, path),
    }
}

/// Lossy, length-capped rendering of a body for debug logs
pub(crate) fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= DEBUG_PREVIEW_BYTES {
        return text.into_owned();
    }
    let mut end = DEBUG_PREVIEW_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
