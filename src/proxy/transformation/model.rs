//! Typed request bodies
//!
//! Callers send loosely-shaped JSON: `system` may be a string or a list of
//! labeled blocks, and turn content may be a string or a list of blocks.
//! These types name each shape explicitly so the pipeline matches on
//! variants instead of probing `serde_json::Value`s. Fields the pipeline does
//! not touch (model, tools, metadata, ...) ride along in `extra` maps and are
//! serialized back unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

// ============================================================================
// Cache Annotation
// ============================================================================

/// Opaque caching marker attached to content blocks
///
/// Never interpreted here. Existing annotations are carried through verbatim;
/// new ones are always `{"type": "ephemeral"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheControl(pub Value);

impl CacheControl {
    pub fn ephemeral() -> Self {
        Self(json!({"type": "ephemeral"}))
    }
}

// ============================================================================
// Content
// ============================================================================

/// One unit of turn content
///
/// Text blocks are the only kind the pipeline creates. Other kinds (images,
/// tool calls) deserialize into the same struct with `text: None` and their
/// remaining fields in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<CacheControl>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentBlock {
    /// Text block carrying the ephemeral cache annotation
    pub fn cached_text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
            cache_control: Some(CacheControl::ephemeral()),
            extra: Map::new(),
        }
    }

    /// Untyped blocks are treated as text
    pub fn is_text(&self) -> bool {
        self.kind.is_empty() || self.kind == "text"
    }

    pub fn has_visible_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// Turn content: a bare string or an ordered list of blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    PlainText(String),
    BlockList(Vec<ContentBlock>),
}

impl Default for Content {
    fn default() -> Self {
        Self::PlainText(String::new())
    }
}

impl Content {
    /// True when there is no non-whitespace text anywhere in the content
    pub fn is_blank(&self) -> bool {
        match self {
            Content::PlainText(text) => text.trim().is_empty(),
            Content::BlockList(blocks) => !blocks.iter().any(ContentBlock::has_visible_text),
        }
    }

    /// All text carried by the content; block texts are joined by newlines
    pub fn text(&self) -> String {
        match self {
            Content::PlainText(text) => text.clone(),
            Content::BlockList(blocks) => blocks
                .iter()
                .filter_map(|b| b.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

// ============================================================================
// Turns
// ============================================================================

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: String,
    #[serde(default)]
    pub content: Content,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Turn {
    pub fn is_user(&self) -> bool {
        self.role == "user"
    }

    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }
}

// ============================================================================
// Caller System Input
// ============================================================================

/// One entry of a list-shaped `system` field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SystemItem {
    /// Any object with a string `text` field
    Labeled { text: String },
    /// Anything else; skipped during extraction
    Other(Value),
}

/// The caller's `system` field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SystemPrompt {
    PlainText(String),
    BlockList(Vec<SystemItem>),
    /// Numbers, objects, ... carry no usable instructions
    Other(Value),
}

// ============================================================================
// Requests
// ============================================================================

/// `None` only when the key is absent; an explicit `null` is `Some(Null)`
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Inbound chat request as sent by the caller
///
/// `system` is consumed by the pipeline and never serialized back out, so this
/// type only deserializes. Generation parameters stay untyped: whatever the
/// caller sent (`4096.0`, `null`, ...) is forwarded as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub system: Option<SystemPrompt>,
    #[serde(default)]
    pub messages: Vec<Turn>,
    #[serde(default, deserialize_with = "present")]
    pub max_tokens: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub temperature: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub stream: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Final body forwarded upstream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundPayload {
    pub system: Vec<ContentBlock>,
    pub messages: Vec<Turn>,
    pub max_tokens: Value,
    pub temperature: Value,
    pub stream: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutboundPayload {
    /// Only a literal `true` selects the streaming relay
    pub fn wants_stream(&self) -> bool {
        self.stream == Value::Bool(true)
    }
}
