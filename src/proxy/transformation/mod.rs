//! Request transformation pipeline
//!
//! Rewrites an inbound chat request into the shape the upstream accepts.
//!
//! # Architecture
//!
//! ```text
//! bytes → ChatRequest → extract system text → normalize turns → assemble → bytes
//! ```
//!
//! # Fail-Safe Guarantee
//!
//! `prepare_body` ALWAYS returns a body to forward. Anything that cannot be
//! parsed as a chat request goes out exactly as it came in, through the
//! explicit `PreparedBody::Passthrough` branch.

mod assembler;
mod conversation;
mod model;
mod system_prompt;

use assembler::{assemble, GenerationParams};
use conversation::normalize;
use model::{ChatRequest, OutboundPayload};
use system_prompt::extract_system_text;

use axum::http::Method;
use bytes::Bytes;
use serde::Deserialize;

// ============================================================================
// Prepared Body
// ============================================================================

/// Why a body was forwarded without transformation
#[derive(Debug, Clone, PartialEq)]
pub enum PassthroughReason {
    /// Not a POST, or no body at all
    NotApplicable,
    /// Body is not a chat request we can parse
    Malformed(String),
}

/// Body ready to forward upstream
#[derive(Debug)]
pub enum PreparedBody {
    /// Rewritten by the pipeline
    Transformed {
        payload: Box<OutboundPayload>,
        bytes: Bytes,
    },
    /// Forwarded byte-for-byte
    Passthrough {
        bytes: Bytes,
        reason: PassthroughReason,
    },
}

impl PreparedBody {
    /// Bytes to send upstream
    pub fn bytes(&self) -> &Bytes {
        match self {
            PreparedBody::Transformed { bytes, .. } | PreparedBody::Passthrough { bytes, .. } => {
                bytes
            }
        }
    }

    /// Whether the upstream call should stream
    ///
    /// Transformed bodies answer from the assembled payload. Passthrough
    /// bodies are checked for a top-level boolean `stream` field; anything
    /// that is not JSON is buffered.
    pub fn wants_stream(&self) -> bool {
        match self {
            PreparedBody::Transformed { payload, .. } => payload.wants_stream(),
            PreparedBody::Passthrough { bytes, .. } => stream_flag(bytes),
        }
    }

    pub fn is_transformed(&self) -> bool {
        matches!(self, PreparedBody::Transformed { .. })
    }

    pub fn passthrough_reason(&self) -> Option<&PassthroughReason> {
        match self {
            PreparedBody::Passthrough { reason, .. } => Some(reason),
            PreparedBody::Transformed { .. } => None,
        }
    }
}

#[derive(Deserialize)]
struct StreamFlag {
    #[serde(default)]
    stream: Option<bool>,
}

fn stream_flag(bytes: &[u8]) -> bool {
    serde_json::from_slice::<StreamFlag>(bytes)
        .ok()
        .and_then(|f| f.stream)
        .unwrap_or(false)
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run the full pipeline over a parsed request
fn transform_request(request: ChatRequest) -> OutboundPayload {
    let ChatRequest {
        system,
        messages,
        max_tokens,
        temperature,
        stream,
        extra,
    } = request;

    let system_text = extract_system_text(system.as_ref());
    let messages = normalize(messages, &system_text);

    assemble(
        messages,
        GenerationParams {
            max_tokens,
            temperature,
            stream,
        },
        extra,
    )
}

/// Entry point: decide whether to transform, and produce the bytes to forward
pub fn prepare_body(method: &Method, body: Bytes) -> PreparedBody {
    if method != Method::POST || body.is_empty() {
        return PreparedBody::Passthrough {
            bytes: body,
            reason: PassthroughReason::NotApplicable,
        };
    }

    let request = match serde_json::from_slice::<ChatRequest>(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Request body is not a chat request, forwarding unchanged");
            return PreparedBody::Passthrough {
                bytes: body,
                reason: PassthroughReason::Malformed(e.to_string()),
            };
        }
    };

    let payload = transform_request(request);
    match serde_json::to_vec(&payload) {
        Ok(serialized) => PreparedBody::Transformed {
            payload: Box::new(payload),
            bytes: Bytes::from(serialized),
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize transformed body, forwarding original");
            PreparedBody::Passthrough {
                bytes: body,
                reason: PassthroughReason::Malformed(e.to_string()),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
