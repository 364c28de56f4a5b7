//! Quality Checker Port - optional assumption and consistency scanning.
//!
//! Used only by verified reconciliation. Findings are advisory: they are
//! attached to the reconciliation result and never drop a candidate.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::domain::item::{Item, ItemState};
use crate::domain::reconciliation::{Assumption, Conflict};

/// Canonical items grouped by state, in a stable order.
pub type CanonicalByState = BTreeMap<ItemState, Vec<Item>>;

/// Groups items by state, preserving their relative order.
pub fn group_by_state(items: &[Item]) -> CanonicalByState {
    let mut grouped = CanonicalByState::new();
    for item in items {
        grouped.entry(item.state).or_default().push(item.clone());
    }
    grouped
}

/// Quality checker errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QualityCheckError {
    #[error("quality checker unavailable: {0}")]
    Unavailable(String),

    #[error("quality check failed: {0}")]
    Failed(String),
}

/// Port for the quality-check collaborator.
#[async_trait]
pub trait QualityChecker: Send + Sync {
    /// Scans content for unstated assumptions.
    async fn scan(&self, content: &str) -> Result<Vec<Assumption>, QualityCheckError>;

    /// Checks content against the canonical items.
    async fn check_consistency(
        &self,
        content: &str,
        canonical_by_state: &CanonicalByState,
    ) -> Result<Vec<Conflict>, QualityCheckError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_by_state_keeps_order_within_state() {
        let a = Item::new("first idea", ItemState::Exploring).unwrap();
        let b = Item::new("a decision", ItemState::Decided).unwrap();
        let c = Item::new("second idea", ItemState::Exploring).unwrap();

        let grouped = group_by_state(&[a.clone(), b.clone(), c.clone()]);

        assert_eq!(grouped[&ItemState::Exploring], vec![a, c]);
        assert_eq!(grouped[&ItemState::Decided], vec![b]);
        assert!(!grouped.contains_key(&ItemState::Parked));
    }
}
