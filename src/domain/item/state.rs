//! ItemState enum for the lifecycle of captured ideas and decisions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Lifecycle state of a canonical item.
///
/// Every state-dependent branch in the crate matches on this enum
/// exhaustively, so adding a variant fails to compile until each site
/// decides how to treat it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Decided,
    #[default]
    Exploring,
    Parked,
    Rejected,
}

impl ItemState {
    /// All states in declaration order.
    pub const ALL: [ItemState; 4] = [
        ItemState::Decided,
        ItemState::Exploring,
        ItemState::Parked,
        ItemState::Rejected,
    ];

    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemState::Decided => "decided",
            ItemState::Exploring => "exploring",
            ItemState::Parked => "parked",
            ItemState::Rejected => "rejected",
        }
    }

    /// Returns true if the item still counts toward the active backlog.
    pub fn is_active(&self) -> bool {
        match self {
            ItemState::Decided | ItemState::Exploring => true,
            ItemState::Parked | ItemState::Rejected => false,
        }
    }
}

impl StateMachine for ItemState {
    fn valid_transitions(&self) -> Vec<Self> {
        use ItemState::*;
        match self {
            Exploring => vec![Decided, Parked, Rejected],
            Parked => vec![Exploring, Decided, Rejected],
            Decided => vec![Exploring, Rejected],
            Rejected => vec![Exploring],
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemState {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "decided" => Ok(ItemState::Decided),
            "exploring" => Ok(ItemState::Exploring),
            "parked" => Ok(ItemState::Parked),
            "rejected" => Ok(ItemState::Rejected),
            other => Err(ValidationError::invalid_format(
                "state",
                format!("unknown item state '{}'", other),
            )),
        }
    }
}
