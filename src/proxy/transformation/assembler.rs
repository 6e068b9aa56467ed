//! Request assembler
//!
//! Puts the fixed preamble, the normalized turns and the generation
//! parameters together. Caller-supplied parameters always win over defaults.

use serde_json::{json, Map, Value};

use super::model::{OutboundPayload, Turn};
use super::system_prompt::fixed_preamble;

/// Default `max_tokens` when the caller leaves it out
pub const DEFAULT_MAX_TOKENS: u64 = 32_000;

/// Default `temperature` when the caller leaves it out
pub const DEFAULT_TEMPERATURE: f64 = 1.0;

/// Default `stream` flag when the caller leaves it out
pub const DEFAULT_STREAM: bool = true;

/// Generation parameters as the caller sent them
///
/// `None` means the key was absent. A present value, even `null`, is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: Option<Value>,
    pub temperature: Option<Value>,
    pub stream: Option<Value>,
}

/// Build the outbound payload
///
/// `extra` holds every top-level field the pipeline does not own (model,
/// tools, metadata, ...) and is forwarded untouched.
pub fn assemble(
    messages: Vec<Turn>,
    params: GenerationParams,
    extra: Map<String, Value>,
) -> OutboundPayload {
    OutboundPayload {
        system: fixed_preamble(),
        messages,
        max_tokens: params.max_tokens.unwrap_or_else(|| json!(DEFAULT_MAX_TOKENS)),
        temperature: params.temperature.unwrap_or_else(|| json!(DEFAULT_TEMPERATURE)),
        stream: params.stream.unwrap_or_else(|| json!(DEFAULT_STREAM)),
        extra,
    }
}
