//! Similarity thresholds.
//!
//! The values have no derivation beyond product tuning. They live here as
//! named constants so configuration and tests can refer to them.

use serde::Deserialize;

use crate::domain::foundation::ValidationError;

/// Tokens shorter than this (in characters) are ignored.
pub const DEFAULT_MIN_WORD_LENGTH: usize = 3;

/// Lower bound (inclusive) of the very-high band.
pub const VERY_HIGH_THRESHOLD: f64 = 0.8;
/// Lower bound (inclusive) of the high band.
pub const HIGH_THRESHOLD: f64 = 0.65;
/// Lower bound (inclusive) of the moderate band.
pub const MODERATE_THRESHOLD: f64 = 0.5;
/// Lower bound (inclusive) of the low band.
pub const LOW_THRESHOLD: f64 = 0.3;

/// Scores strictly above this against a decided item recommend `skip`.
pub const SKIP_THRESHOLD: f64 = 0.8;
/// Scores strictly above this recommend `merge`.
pub const MERGE_THRESHOLD: f64 = 0.65;
/// Scores strictly above this are reported as duplicate matches.
pub const ADMISSION_THRESHOLD: f64 = 0.5;

/// Tunable thresholds for scoring, banding and recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimilarityPolicy {
    pub min_word_length: usize,
    pub very_high_threshold: f64,
    pub high_threshold: f64,
    pub moderate_threshold: f64,
    pub low_threshold: f64,
    pub skip_threshold: f64,
    pub merge_threshold: f64,
    pub admission_threshold: f64,
}

impl Default for SimilarityPolicy {
    fn default() -> Self {
        Self {
            min_word_length: DEFAULT_MIN_WORD_LENGTH,
            very_high_threshold: VERY_HIGH_THRESHOLD,
            high_threshold: HIGH_THRESHOLD,
            moderate_threshold: MODERATE_THRESHOLD,
            low_threshold: LOW_THRESHOLD,
            skip_threshold: SKIP_THRESHOLD,
            merge_threshold: MERGE_THRESHOLD,
            admission_threshold: ADMISSION_THRESHOLD,
        }
    }
}

impl SimilarityPolicy {
    /// Checks that every threshold is in [0, 1] and the bands are ordered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let named = [
            ("very_high_threshold", self.very_high_threshold),
            ("high_threshold", self.high_threshold),
            ("moderate_threshold", self.moderate_threshold),
            ("low_threshold", self.low_threshold),
            ("skip_threshold", self.skip_threshold),
            ("merge_threshold", self.merge_threshold),
            ("admission_threshold", self.admission_threshold),
        ];
        for (field, value) in named {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::invalid_format(
                    field,
                    format!("{} is outside [0, 1]", value),
                ));
            }
        }

        let ordered = self.low_threshold < self.moderate_threshold
            && self.moderate_threshold < self.high_threshold
            && self.high_threshold < self.very_high_threshold;
        if !ordered {
            return Err(ValidationError::invalid_format(
                "similarity",
                "band thresholds must satisfy low < moderate < high < very_high",
            ));
        }

        if self.merge_threshold > self.skip_threshold {
            return Err(ValidationError::invalid_format(
                "merge_threshold",
                "merge threshold cannot exceed skip threshold",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_named_constants() {
        let policy = SimilarityPolicy::default();
        assert_eq!(policy.min_word_length, 3);
        assert_eq!(policy.very_high_threshold, 0.8);
        assert_eq!(policy.high_threshold, 0.65);
        assert_eq!(policy.moderate_threshold, 0.5);
        assert_eq!(policy.low_threshold, 0.3);
        assert_eq!(policy.admission_threshold, 0.5);
    }

    #[test]
    fn default_policy_is_valid() {
        assert!(SimilarityPolicy::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let policy = SimilarityPolicy {
            admission_threshold: 1.5,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn unordered_bands_are_rejected() {
        let policy = SimilarityPolicy {
            high_threshold: 0.9,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn merge_above_skip_is_rejected() {
        let policy = SimilarityPolicy {
            merge_threshold: 0.85,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }
}
