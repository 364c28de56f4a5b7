//! Read-only conversation context handed to routing, extraction and export.

use serde::{Deserialize, Serialize};

use crate::domain::item::{Item, ItemState};

/// Number of most recent turns a context keeps.
pub const CONTEXT_TURN_WINDOW: usize = 12;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One message of the recent conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Snapshot of a project as seen by one request.
///
/// Built fresh per request from the item store and never mutated; changes
/// go back through the store as new items or state transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationContext {
    project_title: String,
    decisions: Vec<Item>,
    ideas: Vec<Item>,
    recent_turns: Vec<ConversationTurn>,
}

impl ConversationContext {
    /// Projects canonical items and history into a context.
    ///
    /// Decided items become `decisions`, exploring items become `ideas`;
    /// parked and rejected items are left out. Only the last
    /// [`CONTEXT_TURN_WINDOW`] turns of `history` are kept.
    pub fn new(
        project_title: impl Into<String>,
        items: &[Item],
        history: &[ConversationTurn],
    ) -> Self {
        let mut decisions = Vec::new();
        let mut ideas = Vec::new();
        for item in items {
            match item.state {
                ItemState::Decided => decisions.push(item.clone()),
                ItemState::Exploring => ideas.push(item.clone()),
                ItemState::Parked | ItemState::Rejected => {}
            }
        }

        let start = history.len().saturating_sub(CONTEXT_TURN_WINDOW);
        Self {
            project_title: project_title.into(),
            decisions,
            ideas,
            recent_turns: history[start..].to_vec(),
        }
    }

    pub fn project_title(&self) -> &str {
        &self.project_title
    }

    pub fn decisions(&self) -> &[Item] {
        &self.decisions
    }

    pub fn ideas(&self) -> &[Item] {
        &self.ideas
    }

    pub fn recent_turns(&self) -> &[ConversationTurn] {
        &self.recent_turns
    }

    /// The last `n` turns, oldest first.
    pub fn last_turns(&self, n: usize) -> &[ConversationTurn] {
        let start = self.recent_turns.len().saturating_sub(n);
        &self.recent_turns[start..]
    }

    /// True when there is neither a decision nor an idea to work with.
    pub fn has_no_items(&self) -> bool {
        self.decisions.is_empty() && self.ideas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str, state: ItemState) -> Item {
        Item::new(text, state).unwrap()
    }

    #[test]
    fn partitions_items_by_state() {
        let items = vec![
            item("Use Rust", ItemState::Decided),
            item("Try WASM", ItemState::Exploring),
            item("Blockchain", ItemState::Rejected),
            item("Mobile app", ItemState::Parked),
        ];

        let context = ConversationContext::new("Demo", &items, &[]);

        assert_eq!(context.decisions().len(), 1);
        assert_eq!(context.decisions()[0].text, "Use Rust");
        assert_eq!(context.ideas().len(), 1);
        assert_eq!(context.ideas()[0].text, "Try WASM");
        assert!(!context.has_no_items());
    }

    #[test]
    fn parked_and_rejected_only_counts_as_empty() {
        let items = vec![item("Blockchain", ItemState::Rejected)];
        let context = ConversationContext::new("Demo", &items, &[]);
        assert!(context.has_no_items());
    }

    #[test]
    fn history_is_bounded_to_window() {
        let history: Vec<ConversationTurn> = (0..30)
            .map(|i| ConversationTurn::user(format!("message {}", i)))
            .collect();

        let context = ConversationContext::new("Demo", &[], &history);

        assert_eq!(context.recent_turns().len(), CONTEXT_TURN_WINDOW);
        assert_eq!(context.recent_turns()[0].content, "message 18");
    }

    #[test]
    fn last_turns_returns_tail() {
        let history = vec![
            ConversationTurn::user("a"),
            ConversationTurn::assistant("b"),
            ConversationTurn::user("c"),
        ];
        let context = ConversationContext::new("Demo", &[], &history);

        let tail = context.last_turns(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].content, "b");
        assert_eq!(context.last_turns(10).len(), 3);
    }
}
