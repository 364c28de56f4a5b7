//! Export module - turns captured items into generated documents.

mod formatter;

pub use formatter::{
    ExportFormat, ExportFormatter, ExportPlan, EXPORT_MAX_TOKENS, NOTHING_TO_EXPORT_MESSAGE,
};
