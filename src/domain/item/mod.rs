//! Item module - canonical items and candidate ideas.

mod confidence;
#[allow(clippy::module_inception)]
mod item;
mod state;

pub use confidence::Confidence;
pub use item::{CandidateIdea, Item};
pub use state::ItemState;
