//! Item and CandidateIdea - canonical and not-yet-admitted units of intent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Confidence, ItemState};
use crate::domain::foundation::{
    CandidateId, ItemId, StateMachine, Timestamp, ValidationError,
};

/// A canonical, persisted unit of captured idea or decision.
///
/// Items are never mutated in place: state changes produce a new value
/// that the caller writes back through the item store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub text: String,
    pub state: ItemState,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    pub created_at: Timestamp,
}

impl Item {
    /// Creates a new item with a fresh id and creation time.
    pub fn new(text: impl Into<String>, state: ItemState) -> Result<Self, ValidationError> {
        let text = validate_text(text.into())?;
        Ok(Self {
            id: ItemId::new(),
            text,
            state,
            tags: BTreeSet::new(),
            confidence: None,
            created_at: Timestamp::now(),
        })
    }

    /// Rebuilds an item from stored parts.
    pub fn restore(
        id: ItemId,
        text: impl Into<String>,
        state: ItemState,
        created_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        let text = validate_text(text.into())?;
        Ok(Self {
            id,
            text,
            state,
            tags: BTreeSet::new(),
            confidence: None,
            created_at,
        })
    }

    /// Adds tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Sets the confidence score.
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Returns a copy moved to `target`, validating the transition.
    pub fn transitioned(&self, target: ItemState) -> Result<Self, ValidationError> {
        let state = self.state.transition_to(target)?;
        Ok(Self {
            state,
            ..self.clone()
        })
    }
}

/// An item not yet admitted to the canonical set.
///
/// Same shape as [`Item`] except that the state is optional: producers
/// only set it when overriding the `exploring` default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateIdea {
    pub id: CandidateId,
    pub text: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub confidence: Option<Confidence>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub state_override: Option<ItemState>,
}

impl CandidateIdea {
    /// Creates a candidate with a fresh id.
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = validate_text(text.into())?;
        Ok(Self {
            id: CandidateId::new(),
            text,
            tags: BTreeSet::new(),
            confidence: None,
            created_at: Timestamp::now(),
            state_override: None,
        })
    }

    /// Overrides the state the candidate will be admitted with.
    pub fn with_state(mut self, state: ItemState) -> Self {
        self.state_override = Some(state);
        self
    }

    /// Adds tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Sets the confidence score.
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// The state this candidate will have once admitted.
    pub fn state(&self) -> ItemState {
        self.state_override.unwrap_or_default()
    }

    /// Converts into a canonical item.
    ///
    /// Deterministic: the item id reuses the candidate id and the
    /// creation time is carried over.
    pub fn admit(&self) -> Item {
        Item {
            id: self.id.admitted_id(),
            text: self.text.clone(),
            state: self.state(),
            tags: self.tags.clone(),
            confidence: self.confidence,
            created_at: self.created_at,
        }
    }
}

fn validate_text(text: String) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("text"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_requires_text() {
        assert!(matches!(
            Item::new("   ", ItemState::Exploring),
            Err(ValidationError::EmptyField { .. })
        ));
    }

    #[test]
    fn item_trims_text() {
        let item = Item::new("  Use Postgres ", ItemState::Decided).unwrap();
        assert_eq!(item.text, "Use Postgres");
    }

    #[test]
    fn tags_are_deduplicated() {
        let item = Item::new("Dark mode", ItemState::Exploring)
            .unwrap()
            .with_tags(["ui", "ui", "theme"]);
        assert_eq!(item.tags.len(), 2);
    }

    #[test]
    fn transitioned_returns_new_value_and_keeps_identity() {
        let item = Item::new("Offline sync", ItemState::Exploring).unwrap();
        let parked = item.transitioned(ItemState::Parked).unwrap();

        assert_eq!(parked.id, item.id);
        assert_eq!(parked.created_at, item.created_at);
        assert_eq!(parked.state, ItemState::Parked);
        assert_eq!(item.state, ItemState::Exploring);
    }

    #[test]
    fn transitioned_rejects_invalid_edges() {
        let item = Item::new("Offline sync", ItemState::Rejected).unwrap();
        assert!(item.transitioned(ItemState::Decided).is_err());
    }

    #[test]
    fn candidate_defaults_to_exploring() {
        let candidate = CandidateIdea::new("Add comments").unwrap();
        assert_eq!(candidate.state(), ItemState::Exploring);
        assert_eq!(candidate.admit().state, ItemState::Exploring);
    }

    #[test]
    fn candidate_override_is_respected() {
        let candidate = CandidateIdea::new("Use JWT auth")
            .unwrap()
            .with_state(ItemState::Decided);
        assert_eq!(candidate.admit().state, ItemState::Decided);
    }

    #[test]
    fn admit_is_deterministic() {
        let candidate = CandidateIdea::new("Use JWT auth")
            .unwrap()
            .with_tags(["auth"])
            .with_confidence(Confidence::try_new(70).unwrap());
        assert_eq!(candidate.admit(), candidate.admit());
        assert_eq!(candidate.admit().id, candidate.id.admitted_id());
    }

    #[test]
    fn item_deserializes_without_optional_fields() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "text": "Ship it",
            "state": "decided",
            "created_at": "2024-01-15T10:30:00Z"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(item.tags.is_empty());
        assert!(item.confidence.is_none());
    }
}
