//! Prompt plans and tagged-block parsing shared by the conversation strategies.

use thiserror::Error;

use crate::domain::foundation::ErrorCode;
use crate::domain::item::Item;

use super::context::ConversationTurn;

/// Placeholder rendered for an empty list so templates never interpolate an empty string.
pub const NONE_YET: &str = "(none yet)";

/// Everything needed for one language-model call, without the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPlan {
    pub system_prompt: String,
    /// Conversation turns, oldest first, ending with the new user message.
    pub turns: Vec<ConversationTurn>,
    pub max_tokens: u32,
}

/// Renders items as a 1-based numbered list, or [`NONE_YET`] when empty.
pub fn numbered_list(items: &[Item]) -> String {
    if items.is_empty() {
        return NONE_YET.to_string();
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A recoverable problem found while parsing a completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIssue {
    #[error("<{tag}> block is never closed")]
    Unterminated { tag: &'static str },

    #[error("<{tag}> block is empty")]
    EmptyBlock { tag: &'static str },
}

impl ParseIssue {
    /// Error code the issue corresponds to; always recovered inline.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::ExtractionParseFailure
    }
}

/// Removes the first `<tag>...</tag>` block and returns its trimmed contents.
///
/// Matching is case-sensitive and non-greedy. An unclosed tag is left in
/// place and reported; an empty block is removed and reported.
pub(crate) fn take_block(
    text: &str,
    tag: &'static str,
    issues: &mut Vec<ParseIssue>,
) -> (String, Option<String>) {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);

    let Some(start) = text.find(&open) else {
        return (text.to_string(), None);
    };
    let body_start = start + open.len();

    let Some(body_len) = text[body_start..].find(&close) else {
        issues.push(ParseIssue::Unterminated { tag });
        return (text.to_string(), None);
    };
    let body_end = body_start + body_len;

    let body = text[body_start..body_end].trim();
    let mut remaining = String::with_capacity(text.len());
    remaining.push_str(&text[..start]);
    remaining.push_str(&text[body_end + close.len()..]);

    if body.is_empty() {
        issues.push(ParseIssue::EmptyBlock { tag });
        return (remaining, None);
    }

    (remaining, Some(body.to_string()))
}

/// Removes every `<tag>...</tag>` block, in order of appearance.
pub(crate) fn take_all_blocks(
    text: &str,
    tag: &'static str,
    issues: &mut Vec<ParseIssue>,
) -> (String, Vec<String>) {
    let mut remaining = text.to_string();
    let mut bodies = Vec::new();
    loop {
        let before = issues.len();
        let (rest, body) = take_block(&remaining, tag, issues);
        let unterminated = issues[before..]
            .iter()
            .any(|issue| matches!(issue, ParseIssue::Unterminated { .. }));
        let progressed = rest.len() != remaining.len();
        remaining = rest;
        if let Some(body) = body {
            bodies.push(body);
        }
        if unterminated || !progressed {
            break;
        }
    }
    (remaining, bodies)
}

/// Drops control characters other than line breaks and tabs.
pub(crate) fn strip_control_chars(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::ItemState;

    #[test]
    fn empty_list_renders_placeholder() {
        assert_eq!(numbered_list(&[]), "(none yet)");
    }

    #[test]
    fn items_are_numbered_from_one() {
        let items = vec![
            Item::new("Use Rust", ItemState::Decided).unwrap(),
            Item::new("Ship weekly", ItemState::Decided).unwrap(),
        ];
        assert_eq!(numbered_list(&items), "1. Use Rust\n2. Ship weekly");
    }

    #[test]
    fn take_all_blocks_collects_in_order() {
        let mut issues = Vec::new();
        let (rest, bodies) =
            take_all_blocks("A <idea>one</idea> B <idea>two</idea> C", "idea", &mut issues);
        assert_eq!(bodies, vec!["one", "two"]);
        assert_eq!(rest, "A  B  C");
        assert!(issues.is_empty());
    }

    #[test]
    fn take_all_blocks_skips_empty_and_stops_on_unclosed() {
        let mut issues = Vec::new();
        let (rest, bodies) =
            take_all_blocks("<idea> </idea><idea>kept</idea><idea>lost", "idea", &mut issues);
        assert_eq!(bodies, vec!["kept"]);
        assert_eq!(rest, "<idea>lost");
        assert_eq!(
            issues,
            vec![
                ParseIssue::EmptyBlock { tag: "idea" },
                ParseIssue::Unterminated { tag: "idea" },
            ]
        );
    }
}
