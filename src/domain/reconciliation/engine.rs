//! Reconciliation of candidate ideas against the canonical item set.
//!
//! Pure: reads a snapshot of canonical items and returns what should be
//! admitted. Persisting the result, and making sure nobody committed in the
//! meantime, is the caller's job.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{CandidateId, ItemId};
use crate::domain::item::{CandidateIdea, Item};
use crate::domain::similarity::{
    Recommendation, SimilarityBand, SimilarityEngine, SimilarityPolicy,
};

use super::quality::QualityReport;

/// How strictly candidates are filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationMode {
    /// Admit everything; matches are advisory only.
    #[default]
    Quick,
    /// Drop candidates with a `skip` match and run the quality checker.
    Verified,
}

impl fmt::Display for ReconciliationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciliationMode::Quick => f.write_str("quick"),
            ReconciliationMode::Verified => f.write_str("verified"),
        }
    }
}

/// A candidate that resembles a canonical item closely enough to report.
///
/// Recomputed on every pass and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    pub candidate_id: CandidateId,
    pub canonical_item_id: ItemId,
    pub similarity: f64,
    pub band: SimilarityBand,
    pub recommendation: Recommendation,
}

/// A candidate excluded by verified reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedCandidate {
    pub candidate_id: CandidateId,
    pub text: String,
    /// The canonical item whose `skip` match caused the drop.
    pub duplicate_of: ItemId,
    pub similarity: f64,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub mode: ReconciliationMode,
    /// Items to persist, in candidate order.
    pub admitted: Vec<Item>,
    /// Reportable matches, grouped by candidate in candidate order.
    pub matches: Vec<DuplicateMatch>,
    pub dropped: Vec<DroppedCandidate>,
    /// Candidates whose item is already canonical. Skipped, so a replayed
    /// batch never overwrites state changed since the first admission.
    #[serde(default)]
    pub already_admitted: Vec<CandidateId>,
    /// Quality findings; only present for verified passes that ran a checker.
    pub quality: Option<QualityReport>,
}

impl ReconciliationResult {
    /// Attaches a quality report. Admission is unaffected.
    pub fn with_quality(mut self, report: QualityReport) -> Self {
        self.quality = Some(report);
        self
    }

    /// Matches reported for one candidate.
    pub fn matches_for(&self, candidate_id: CandidateId) -> impl Iterator<Item = &DuplicateMatch> {
        self.matches
            .iter()
            .filter(move |m| m.candidate_id == candidate_id)
    }

    pub fn was_dropped(&self, candidate_id: CandidateId) -> bool {
        self.dropped.iter().any(|d| d.candidate_id == candidate_id)
    }

    pub fn was_already_admitted(&self, candidate_id: CandidateId) -> bool {
        self.already_admitted.contains(&candidate_id)
    }
}

/// Admits or drops candidates against a canonical snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReconciliationEngine {
    similarity: SimilarityEngine,
}

impl ReconciliationEngine {
    pub fn new(policy: SimilarityPolicy) -> Self {
        Self {
            similarity: SimilarityEngine::new(policy),
        }
    }

    pub fn similarity_engine(&self) -> &SimilarityEngine {
        &self.similarity
    }

    /// Compares every candidate with every canonical item.
    ///
    /// In quick mode every candidate is admitted. In verified mode a
    /// candidate is dropped iff one of its matches recommends `skip`.
    /// A candidate already present in `canonical` is never admitted again.
    /// Output depends only on the inputs, so repeated calls with the same
    /// snapshot give the same result.
    pub fn reconcile(
        &self,
        candidates: &[CandidateIdea],
        canonical: &[Item],
        mode: ReconciliationMode,
    ) -> ReconciliationResult {
        let mut result = ReconciliationResult {
            mode,
            ..ReconciliationResult::default()
        };

        for candidate in candidates {
            let admitted_id = candidate.id.admitted_id();
            if canonical.iter().any(|item| item.id == admitted_id) {
                result.already_admitted.push(candidate.id);
                continue;
            }

            let mut skip_match: Option<(ItemId, f64)> = None;

            for item in canonical {
                let score = self.similarity.similarity(&candidate.text, &item.text);
                if !self.similarity.is_reportable(score) {
                    continue;
                }

                let recommendation = self.similarity.recommend(score, item.state);
                if recommendation == Recommendation::Skip && skip_match.is_none() {
                    skip_match = Some((item.id, score));
                }

                result.matches.push(DuplicateMatch {
                    candidate_id: candidate.id,
                    canonical_item_id: item.id,
                    similarity: score,
                    band: self.similarity.band(score),
                    recommendation,
                });
            }

            match (mode, skip_match) {
                (ReconciliationMode::Verified, Some((duplicate_of, similarity))) => {
                    result.dropped.push(DroppedCandidate {
                        candidate_id: candidate.id,
                        text: candidate.text.clone(),
                        duplicate_of,
                        similarity,
                    });
                }
                (ReconciliationMode::Verified, None) | (ReconciliationMode::Quick, _) => {
                    result.admitted.push(candidate.admit());
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::ItemState;

    fn decided(text: &str) -> Item {
        Item::new(text, ItemState::Decided).unwrap()
    }

    fn exploring(text: &str) -> Item {
        Item::new(text, ItemState::Exploring).unwrap()
    }

    fn candidate(text: &str) -> CandidateIdea {
        CandidateIdea::new(text).unwrap()
    }

    // Ten shared words out of eleven distinct ones scores 10/11 ≈ 0.91.
    const CANONICAL: &str = "use postgres database for storing every customer order record safely";
    const NEAR_DUPLICATE: &str =
        "use postgres database for storing every customer order record safely today";

    mod empty_inputs {
        use super::*;

        #[test]
        fn no_candidates_yields_empty_result() {
            let result = ReconciliationEngine::default().reconcile(
                &[],
                &[decided("Use Rust")],
                ReconciliationMode::Verified,
            );
            assert!(result.admitted.is_empty());
            assert!(result.matches.is_empty());
            assert!(result.dropped.is_empty());
        }

        #[test]
        fn no_canonical_admits_everything() {
            let candidates = vec![candidate("Offline sync"), candidate("Dark mode")];
            let result = ReconciliationEngine::default().reconcile(
                &candidates,
                &[],
                ReconciliationMode::Verified,
            );
            assert_eq!(result.admitted.len(), 2);
            assert!(result.matches.is_empty());
        }
    }

    mod modes {
        use super::*;

        #[test]
        fn verified_drops_near_duplicate_of_decided_item() {
            let canonical = vec![decided(CANONICAL)];
            let c = candidate(NEAR_DUPLICATE);

            let result = ReconciliationEngine::default().reconcile(
                &[c.clone()],
                &canonical,
                ReconciliationMode::Verified,
            );

            assert!(result.admitted.is_empty());
            assert!(result.was_dropped(c.id));
            assert_eq!(result.dropped[0].duplicate_of, canonical[0].id);
            assert_eq!(result.matches.len(), 1);
            assert_eq!(result.matches[0].recommendation, Recommendation::Skip);
            assert_eq!(result.matches[0].band, SimilarityBand::VeryHigh);
        }

        #[test]
        fn quick_admits_the_same_candidate() {
            let canonical = vec![decided(CANONICAL)];
            let c = candidate(NEAR_DUPLICATE);

            let result = ReconciliationEngine::default().reconcile(
                &[c.clone()],
                &canonical,
                ReconciliationMode::Quick,
            );

            assert_eq!(result.admitted.len(), 1);
            assert_eq!(result.admitted[0].id, c.id.admitted_id());
            assert_eq!(result.matches.len(), 1);
            assert!(result.dropped.is_empty());
        }

        #[test]
        fn verified_keeps_near_duplicate_of_exploring_item() {
            let canonical = vec![exploring(CANONICAL)];

            let result = ReconciliationEngine::default().reconcile(
                &[candidate(NEAR_DUPLICATE)],
                &canonical,
                ReconciliationMode::Verified,
            );

            assert_eq!(result.admitted.len(), 1);
            assert_eq!(result.matches[0].recommendation, Recommendation::Merge);
        }

        #[test]
        fn admitted_candidates_default_to_exploring() {
            let result = ReconciliationEngine::default().reconcile(
                &[candidate("Offline sync")],
                &[],
                ReconciliationMode::Verified,
            );
            assert_eq!(result.admitted[0].state, ItemState::Exploring);
        }
    }

    mod matching {
        use super::*;

        #[test]
        fn scores_at_threshold_are_not_reported() {
            // Two shared words out of four is exactly 0.5.
            let canonical = vec![exploring("alpha beta gamma")];
            let result = ReconciliationEngine::default().reconcile(
                &[candidate("alpha beta delta")],
                &canonical,
                ReconciliationMode::Quick,
            );
            assert!(result.matches.is_empty());
        }

        #[test]
        fn all_reportable_matches_are_listed_in_order() {
            let canonical = vec![
                exploring("mobile offline sync support"),
                decided("unrelated billing change"),
                exploring("mobile offline sync"),
            ];
            let c = candidate("mobile offline sync support");

            let result = ReconciliationEngine::default().reconcile(
                &[c.clone()],
                &canonical,
                ReconciliationMode::Quick,
            );

            let ids: Vec<ItemId> = result.matches_for(c.id).map(|m| m.canonical_item_id).collect();
            assert_eq!(ids, vec![canonical[0].id, canonical[2].id]);
        }

        #[test]
        fn reconcile_is_idempotent() {
            let canonical = vec![decided(CANONICAL), exploring("offline sync for mobile")];
            let candidates = vec![
                candidate(NEAR_DUPLICATE),
                candidate("offline sync for mobile users"),
                candidate("something else entirely"),
            ];
            let engine = ReconciliationEngine::default();

            let first = engine.reconcile(&candidates, &canonical, ReconciliationMode::Verified);
            let second = engine.reconcile(&candidates, &canonical, ReconciliationMode::Verified);

            assert_eq!(first.admitted, second.admitted);
            assert_eq!(first.matches, second.matches);
            assert_eq!(first.dropped, second.dropped);
        }
    }

    mod replay {
        use super::*;

        #[test]
        fn admitted_candidate_is_not_admitted_again() {
            let c = candidate("offline sync for mobile users");
            let engine = ReconciliationEngine::default();

            let first = engine.reconcile(&[c.clone()], &[], ReconciliationMode::Quick);
            let canonical = first.admitted.clone();
            let second = engine.reconcile(&[c.clone()], &canonical, ReconciliationMode::Quick);

            assert!(second.admitted.is_empty());
            assert!(second.matches.is_empty());
            assert!(second.was_already_admitted(c.id));
        }

        #[test]
        fn replay_leaves_later_state_changes_alone() {
            let c = candidate("offline sync for mobile users");
            let engine = ReconciliationEngine::default();

            let admitted = engine
                .reconcile(&[c.clone()], &[], ReconciliationMode::Quick)
                .admitted;
            let decided = admitted[0].transitioned(ItemState::Decided).unwrap();

            let replay = engine.reconcile(
                &[c.clone(), candidate("dark mode")],
                &[decided],
                ReconciliationMode::Verified,
            );

            assert_eq!(replay.already_admitted, vec![c.id]);
            assert_eq!(replay.admitted.len(), 1);
            assert_eq!(replay.admitted[0].text, "dark mode");
        }
    }

    #[test]
    fn quality_report_does_not_change_admission() {
        let result = ReconciliationEngine::default()
            .reconcile(&[candidate("Offline sync")], &[], ReconciliationMode::Verified)
            .with_quality(QualityReport::unavailable("down"));
        assert_eq!(result.admitted.len(), 1);
        assert!(result.quality.is_some());
    }
}
