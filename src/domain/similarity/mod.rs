//! Similarity module - lexical duplicate detection.

mod engine;
mod policy;

pub use engine::{
    recommend, similarity, similarity_with_min_length, BestMatch, Recommendation,
    SimilarityBand, SimilarityEngine,
};
pub use policy::{
    SimilarityPolicy, ADMISSION_THRESHOLD, DEFAULT_MIN_WORD_LENGTH, HIGH_THRESHOLD,
    LOW_THRESHOLD, MERGE_THRESHOLD, MODERATE_THRESHOLD, SKIP_THRESHOLD, VERY_HIGH_THRESHOLD,
};
