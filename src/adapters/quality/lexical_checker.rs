//! Keyword and overlap based quality checker.
//!
//! Runs in-process with no model call. Assumptions come from hedging
//! language; conflicts come from close resemblance to rejected items, or
//! from negation near a decided item.

use async_trait::async_trait;

use crate::domain::item::{Item, ItemState};
use crate::domain::reconciliation::{Assumption, Conflict};
use crate::domain::similarity::{SimilarityEngine, SimilarityPolicy};
use crate::ports::{CanonicalByState, QualityCheckError, QualityChecker};

/// Phrases that signal an unstated assumption.
const HEDGE_PHRASES: &[&str] = &[
    "should be fine",
    "for now",
    "i think",
    "i guess",
    "we can always",
    "assume",
    "assuming",
    "presumably",
    "probably",
    "hopefully",
    "likely",
    "might",
    "maybe",
];

/// Words that turn overlap with a decision into a possible contradiction.
const NEGATION_CUES: &[&str] = &[
    "instead of",
    "no longer",
    "rather than",
    "not",
    "don't",
    "dont",
    "never",
    "avoid",
    "drop",
    "without",
    "replace",
];

/// Quality checker built on the lexical similarity engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalQualityChecker {
    engine: SimilarityEngine,
}

impl LexicalQualityChecker {
    pub fn new(policy: SimilarityPolicy) -> Self {
        Self {
            engine: SimilarityEngine::new(policy),
        }
    }

    fn rejected_conflict(&self, content: &str, rejected: &[Item]) -> Option<Conflict> {
        let best = self.engine.find_best_match(content, rejected, |item| item.text.as_str())?;
        if best.similarity < self.engine.policy().high_threshold {
            return None;
        }
        Some(Conflict {
            item_id: best.candidate.id,
            item_state: ItemState::Rejected,
            description: format!(
                "Closely resembles the rejected item \"{}\" ({:.0}% overlap)",
                best.candidate.text,
                best.similarity * 100.0
            ),
        })
    }

    fn decided_conflicts(&self, content: &str, decided: &[Item]) -> Vec<Conflict> {
        let Some(cue) = find_phrase(content, NEGATION_CUES) else {
            return Vec::new();
        };

        let floor = self.engine.policy().low_threshold;
        decided
            .iter()
            .filter(|item| self.engine.similarity(content, &item.text) >= floor)
            .map(|item| Conflict {
                item_id: item.id,
                item_state: ItemState::Decided,
                description: format!(
                    "Uses \"{}\" while overlapping the decision \"{}\"",
                    cue, item.text
                ),
            })
            .collect()
    }
}

#[async_trait]
impl QualityChecker for LexicalQualityChecker {
    async fn scan(&self, content: &str) -> Result<Vec<Assumption>, QualityCheckError> {
        let words = words_of(content);
        let lower = words.join(" ");

        let assumptions = HEDGE_PHRASES
            .iter()
            .filter(|phrase| contains_phrase(&lower, &words, phrase))
            .map(|phrase| Assumption {
                trigger: phrase.to_string(),
                description: format!("\"{}\" suggests an unverified assumption", phrase),
            })
            .collect();

        Ok(assumptions)
    }

    async fn check_consistency(
        &self,
        content: &str,
        canonical_by_state: &CanonicalByState,
    ) -> Result<Vec<Conflict>, QualityCheckError> {
        let empty = Vec::new();
        let rejected = canonical_by_state.get(&ItemState::Rejected).unwrap_or(&empty);
        let decided = canonical_by_state.get(&ItemState::Decided).unwrap_or(&empty);

        let mut conflicts: Vec<Conflict> =
            self.rejected_conflict(content, rejected).into_iter().collect();
        conflicts.extend(self.decided_conflicts(content, decided));
        Ok(conflicts)
    }
}

/// Lower-cased words with surrounding punctuation trimmed.
fn words_of(content: &str) -> Vec<String> {
    content
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
                .replace('\u{2019}', "'")
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Single words must match a whole word; multi-word phrases match as a substring of the joined words.
fn contains_phrase(joined: &str, words: &[String], phrase: &str) -> bool {
    if phrase.contains(' ') {
        joined.contains(phrase)
    } else {
        words.iter().any(|w| w == phrase)
    }
}

fn find_phrase(content: &str, phrases: &[&'static str]) -> Option<&'static str> {
    let words = words_of(content);
    let joined = words.join(" ");
    phrases
        .iter()
        .copied()
        .find(|phrase| contains_phrase(&joined, &words, phrase))
}
