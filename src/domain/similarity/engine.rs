//! Lexical similarity scoring and the duplicate recommendation policy.
//!
//! Scores are Jaccard indices over lower-cased whitespace tokens. There is
//! no stemming and no synonym handling; two phrasings of the same idea
//! that share few words score low.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::policy::SimilarityPolicy;
use crate::domain::item::ItemState;

/// Qualitative band for a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityBand {
    VeryHigh,
    High,
    Moderate,
    Low,
    None,
}

impl SimilarityBand {
    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityBand::VeryHigh => "very_high",
            SimilarityBand::High => "high",
            SimilarityBand::Moderate => "moderate",
            SimilarityBand::Low => "low",
            SimilarityBand::None => "none",
        }
    }
}

impl fmt::Display for SimilarityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action suggested for a candidate that resembles a canonical item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Drop the candidate; the canonical item already covers it.
    Skip,
    /// Surface the pair for a manual merge.
    Merge,
    /// Admit the candidate as a separate item.
    ExtractAnyway,
}

impl Recommendation {
    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Skip => "skip",
            Recommendation::Merge => "merge",
            Recommendation::ExtractAnyway => "extract_anyway",
        }
    }

    /// Short explanation suitable for showing next to the match.
    pub fn rationale(&self) -> &'static str {
        match self {
            Recommendation::Skip => "Nearly identical to something already decided",
            Recommendation::Merge => "Overlaps an existing item; consider merging them",
            Recommendation::ExtractAnyway => "Distinct enough to keep as its own item",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The highest-scoring entry found by [`SimilarityEngine::find_best_match`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch<'a, T> {
    pub candidate: &'a T,
    pub index: usize,
    pub similarity: f64,
}

/// Scores text pairs and turns scores into recommendations.
///
/// Stateless apart from its thresholds, so one instance can be shared
/// across any number of concurrent callers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimilarityEngine {
    policy: SimilarityPolicy,
}

impl SimilarityEngine {
    /// Creates an engine with custom thresholds.
    pub fn new(policy: SimilarityPolicy) -> Self {
        Self { policy }
    }

    /// Returns the thresholds in use.
    pub fn policy(&self) -> &SimilarityPolicy {
        &self.policy
    }

    /// Jaccard similarity using the configured minimum word length.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        similarity_with_min_length(a, b, self.policy.min_word_length)
    }

    /// Classifies a score into a band.
    pub fn band(&self, score: f64) -> SimilarityBand {
        let p = &self.policy;
        if score >= p.very_high_threshold {
            SimilarityBand::VeryHigh
        } else if score >= p.high_threshold {
            SimilarityBand::High
        } else if score >= p.moderate_threshold {
            SimilarityBand::Moderate
        } else if score >= p.low_threshold {
            SimilarityBand::Low
        } else {
            SimilarityBand::None
        }
    }

    /// Recommends what to do with a candidate given its best canonical match.
    pub fn recommend(&self, similarity: f64, matched_state: ItemState) -> Recommendation {
        let p = &self.policy;
        match matched_state {
            ItemState::Decided => {
                if similarity > p.skip_threshold {
                    Recommendation::Skip
                } else if similarity > p.merge_threshold {
                    Recommendation::Merge
                } else {
                    Recommendation::ExtractAnyway
                }
            }
            ItemState::Exploring | ItemState::Parked | ItemState::Rejected => {
                if similarity > p.merge_threshold {
                    Recommendation::Merge
                } else {
                    Recommendation::ExtractAnyway
                }
            }
        }
    }

    /// Returns true if a score is high enough to report as a duplicate match.
    pub fn is_reportable(&self, similarity: f64) -> bool {
        similarity > self.policy.admission_threshold
    }

    /// Finds the candidate whose text is most similar to `text`.
    ///
    /// Ties keep the earliest candidate. Returns `None` only when
    /// `candidates` is empty.
    pub fn find_best_match<'a, T, F>(
        &self,
        text: &str,
        candidates: &'a [T],
        text_of: F,
    ) -> Option<BestMatch<'a, T>>
    where
        F: Fn(&T) -> &str,
    {
        let mut best: Option<BestMatch<'a, T>> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            let score = self.similarity(text, text_of(candidate));
            let better = match &best {
                Some(current) => score > current.similarity,
                None => true,
            };
            if better {
                best = Some(BestMatch {
                    candidate,
                    index,
                    similarity: score,
                });
            }
        }
        best
    }
}

/// Jaccard similarity with the default minimum word length.
pub fn similarity(a: &str, b: &str) -> f64 {
    SimilarityEngine::default().similarity(a, b)
}

/// Recommendation under the default thresholds.
pub fn recommend(similarity: f64, matched_state: ItemState) -> Recommendation {
    SimilarityEngine::default().recommend(similarity, matched_state)
}

/// Jaccard similarity over word sets, ignoring words shorter than `min_word_length`.
///
/// Two texts with no qualifying words are identical (1.0); if only one
/// side is empty the score is 0.0.
pub fn similarity_with_min_length(a: &str, b: &str, min_word_length: usize) -> f64 {
    let left = word_set(a, min_word_length);
    let right = word_set(b, min_word_length);

    match (left.is_empty(), right.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => {
            let intersection = left.intersection(&right).count();
            let union = left.union(&right).count();
            intersection as f64 / union as f64
        }
    }
}

fn word_set(text: &str, min_word_length: usize) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() >= min_word_length)
        .map(str::to_owned)
        .collect()
}
