//! Conversation normalizer
//!
//! Four passes, each total:
//! 1. fold the caller's system text into the first user turn
//! 2. drop assistant turns with no visible text
//! 3. merge adjacent turns that share a role
//! 4. make sure every content block carries a cache annotation
//!
//! Single-pass semantics: running the output through again reasserts the
//! annotations but cannot recover system text that was already folded away.

use super::model::{CacheControl, Content, ContentBlock, Turn};
use super::system_prompt::instructions_wrapper;

/// Normalize the caller's turns for the upstream
pub fn normalize(mut messages: Vec<Turn>, system_text: &str) -> Vec<Turn> {
    inject_system_text(&mut messages, system_text);
    let merged = merge_adjacent(drop_empty_assistant(messages));
    merged.into_iter().map(annotate).collect()
}

/// Prefix the first user turn with the wrapped system text
///
/// Only the first user turn is touched. Without a user turn the text is
/// dropped.
fn inject_system_text(messages: &mut [Turn], system_text: &str) {
    if system_text.is_empty() {
        return;
    }
    let Some(turn) = messages.iter_mut().find(|t| t.is_user()) else {
        tracing::debug!("No user turn to carry system instructions; dropping them");
        return;
    };

    let prefix = instructions_wrapper(system_text);
    match &mut turn.content {
        Content::PlainText(text) => text.insert_str(0, &prefix),
        Content::BlockList(blocks) => match blocks.first_mut() {
            Some(first) if first.is_text() => {
                let text = first.text.get_or_insert_with(String::new);
                text.insert_str(0, &prefix);
            }
            // Leading image/tool block: give the instructions their own block
            Some(_) => blocks.insert(0, ContentBlock::cached_text(prefix)),
            None => {}
        },
    }
}

fn drop_empty_assistant(messages: Vec<Turn>) -> Vec<Turn> {
    messages
        .into_iter()
        .filter(|t| !(t.is_assistant() && t.content.is_blank()))
        .collect()
}

/// Collapse runs of same-role turns into one turn
fn merge_adjacent(messages: Vec<Turn>) -> Vec<Turn> {
    let mut retained: Vec<Turn> = Vec::with_capacity(messages.len());

    for turn in messages {
        match retained.last_mut() {
            Some(prev) if prev.role == turn.role => {
                let merged = format!("{}\n{}", prev.content.text(), turn.content.text());
                prev.content = Content::BlockList(vec![ContentBlock::cached_text(merged)]);
            }
            _ => retained.push(turn),
        }
    }

    retained
}

/// Lift plain text into a block and annotate blocks that lack a marker
fn annotate(mut turn: Turn) -> Turn {
    turn.content = match turn.content {
        Content::PlainText(text) => Content::BlockList(vec![ContentBlock::cached_text(text)]),
        Content::BlockList(mut blocks) => {
            for block in &mut blocks {
                block
                    .cache_control
                    .get_or_insert_with(CacheControl::ephemeral);
            }
            Content::BlockList(blocks)
        }
    };
    turn
}
