//! System prompt handling
//!
//! The upstream only accepts its own fixed two-block system preamble, so the
//! caller's `system` field is reduced to plain text here and later folded into
//! the first user turn.

use super::model::{ContentBlock, SystemItem, SystemPrompt};

/// Text of the fixed system preamble, in order
pub const PREAMBLE_TEXTS: [&str; 2] = [
    "You are Claude Code, Anthropic's official CLI for Claude.",
    ".",
];

const INSTRUCTIONS_OPEN: &str = "[System Instructions]\n";
const INSTRUCTIONS_CLOSE: &str = "\n[/System Instructions]\n\n";

/// The fixed preamble as annotated content blocks
pub fn fixed_preamble() -> Vec<ContentBlock> {
    PREAMBLE_TEXTS
        .iter()
        .map(|text| ContentBlock::cached_text(*text))
        .collect()
}

/// Reduce the caller's `system` field to plain text
///
/// Blank strings and unusable shapes give an empty string. List items are
/// trimmed and joined with a blank line; items without text are skipped.
pub fn extract_system_text(system: Option<&SystemPrompt>) -> String {
    match system {
        Some(SystemPrompt::PlainText(text)) => text.trim().to_string(),
        Some(SystemPrompt::BlockList(items)) => items
            .iter()
            .filter_map(|item| match item {
                SystemItem::Labeled { text } => Some(text.trim()),
                SystemItem::Other(_) => None,
            })
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"),
        Some(SystemPrompt::Other(_)) | None => String::new(),
    }
}

/// Wrap extracted system text for injection into a user turn
pub fn instructions_wrapper(system_text: &str) -> String {
    format!("{INSTRUCTIONS_OPEN}{system_text}{INSTRUCTIONS_CLOSE}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn system(value: serde_json::Value) -> SystemPrompt {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_absent_and_blank_yield_empty() {
        assert_eq!(extract_system_text(None), "");
        assert_eq!(extract_system_text(Some(&system(json!("   \n")))), "");
    }

    #[test]
    fn test_string_is_trimmed() {
        assert_eq!(
            extract_system_text(Some(&system(json!("  Be terse.\n")))),
            "Be terse."
        );
    }

    #[test]
    fn test_list_joins_usable_items_with_blank_line() {
        let prompt = system(json!([
            {"type": "text", "text": " first "},
            {"type": "text", "text": "   "},
            {"type": "image"},
            "bare string",
            {"type": "text", "text": "second"}
        ]));
        assert_eq!(extract_system_text(Some(&prompt)), "first\n\nsecond");
    }

    #[test]
    fn test_list_without_text_is_empty() {
        let prompt = system(json!([{"type": "image"}, {"text": ""}]));
        assert_eq!(extract_system_text(Some(&prompt)), "");
    }

    #[test]
    fn test_other_shapes_are_empty() {
        assert_eq!(extract_system_text(Some(&system(json!(12)))), "");
        assert_eq!(
            extract_system_text(Some(&system(json!({"text": "object"})))),
            ""
        );
    }

    #[test]
    fn test_wrapper_format() {
        assert_eq!(
            instructions_wrapper("Be terse."),
            "[System Instructions]\nBe terse.\n[/System Instructions]\n\n"
        );
    }

    #[test]
    fn test_preamble_is_two_annotated_blocks() {
        let preamble = fixed_preamble();
        assert_eq!(preamble.len(), 2);
        assert!(preamble.iter().all(|b| b.cache_control.is_some()));
        assert_eq!(preamble[1].text.as_deref(), Some("."));
    }
}
