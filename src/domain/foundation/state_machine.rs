//! Validated transitions for closed lifecycle enums.

use super::ValidationError;

/// A lifecycle enum whose values move along a fixed set of edges.
///
/// Implementors only list outgoing edges; `transition_to` rejects
/// everything else, including staying in place unless listed.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// States reachable in one step from `self`.
    fn valid_transitions(&self) -> Vec<Self>;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns `target` if the edge exists.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_format(
                "state",
                format!("no transition from {:?} to {:?}", self, target),
            ));
        }
        Ok(target)
    }
}
