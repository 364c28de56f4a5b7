//! Quality Checker Adapters.
//!
//! - `LexicalQualityChecker` - In-process hedge and overlap heuristics
//! - `MockQualityChecker` - Scripted findings for tests

mod lexical_checker;
mod mock_checker;

pub use lexical_checker::LexicalQualityChecker;
pub use mock_checker::MockQualityChecker;
