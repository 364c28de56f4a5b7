//! Mode routing.
//!
//! Picks the conversational strategy for one user message by checking
//! trigger sets in a fixed order: export first, then decide, otherwise
//! brainstorm. A message that matches both export and decide triggers is
//! an export.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversational strategy for a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Brainstorm,
    Decide,
    Export,
}

impl Mode {
    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Brainstorm => "brainstorm",
            Mode::Decide => "decide",
            Mode::Export => "export",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger vocabulary for the router.
///
/// Commands only match at the start of the message, as the whole first
/// word. Phrases match anywhere. Both are compared against the
/// normalized (trimmed, lower-cased, whitespace-collapsed) message.
#[derive(Debug, Clone)]
pub struct ModeTriggers {
    pub export_commands: Vec<String>,
    pub export_phrases: Vec<String>,
    pub decide_commands: Vec<String>,
    pub decide_phrases: Vec<String>,
}

impl ModeTriggers {
    fn normalized(self) -> Self {
        fn each(values: Vec<String>) -> Vec<String> {
            values
                .iter()
                .map(|value| normalize(value))
                .filter(|value| !value.is_empty())
                .collect()
        }

        Self {
            export_commands: each(self.export_commands),
            export_phrases: each(self.export_phrases),
            decide_commands: each(self.decide_commands),
            decide_phrases: each(self.decide_phrases),
        }
    }
}

impl Default for ModeTriggers {
    fn default() -> Self {
        fn owned(values: &[&str]) -> Vec<String> {
            values.iter().map(|v| v.to_string()).collect()
        }

        Self {
            export_commands: owned(&["/export", "/summary", "/prd", "/tasks", "/roadmap"]),
            export_phrases: owned(&[
                "generate a summary",
                "export my",
                "export the",
                "export this",
                "export everything",
                "generate a prd",
                "write a prd",
                "create a roadmap",
                "generate a roadmap",
                "generate a task list",
                "create a task list",
            ]),
            decide_commands: owned(&["/decide"]),
            decide_phrases: owned(&[
                "i've decided",
                "i have decided",
                "we've decided",
                "we have decided",
                "let's go with",
                "lets go with",
                "let us go with",
                "decision:",
                "final decision",
                "i'm going with",
                "we're going with",
                "i'll go with",
                "we'll go with",
                "lock it in",
                "settled on",
            ]),
        }
    }
}

/// Classifies messages into modes. Pure and deterministic.
#[derive(Debug, Clone, Default)]
pub struct ModeRouter {
    triggers: ModeTriggers,
}

impl ModeRouter {
    /// Creates a router with a custom vocabulary, normalized the same way
    /// as incoming messages.
    pub fn new(triggers: ModeTriggers) -> Self {
        Self {
            triggers: triggers.normalized(),
        }
    }

    /// Returns the mode for a message. Never fails; unmatched input is brainstorming.
    pub fn detect_mode(&self, message: &str) -> Mode {
        let normalized = normalize(message);

        if matches_any(&normalized, &self.triggers.export_commands, &self.triggers.export_phrases) {
            return Mode::Export;
        }

        if matches_any(&normalized, &self.triggers.decide_commands, &self.triggers.decide_phrases) {
            return Mode::Decide;
        }

        Mode::Brainstorm
    }
}

/// Mode for a message under the default vocabulary.
pub fn detect_mode(message: &str) -> Mode {
    ModeRouter::default().detect_mode(message)
}

/// Trims, lower-cases, straightens curly apostrophes and collapses runs of whitespace.
pub(crate) fn normalize(message: &str) -> String {
    message
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace(['\u{2019}', '\u{2018}'], "'")
}

fn matches_any(normalized: &str, commands: &[String], phrases: &[String]) -> bool {
    commands.iter().any(|command| starts_with_command(normalized, command))
        || phrases.iter().any(|phrase| normalized.contains(phrase.as_str()))
}

fn starts_with_command(normalized: &str, command: &str) -> bool {
    match normalized.strip_prefix(command) {
        // A command ends at whitespace or punctuation, never mid-word.
        Some(rest) => match rest.chars().next() {
            None => true,
            Some(next) => !(next.is_alphanumeric() || next == '_' || next == '-'),
        },
        None => false,
    }
}
