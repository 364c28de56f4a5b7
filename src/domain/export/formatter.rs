//! Export formatting.
//!
//! Classifies an export request into one of four document types and fills
//! the matching template. A project with no decisions and no ideas is never
//! sent to the language model.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::conversation::{
    numbered_list, ConversationContext, ConversationTurn, PromptPlan,
};

/// Completion budget for generated documents.
pub const EXPORT_MAX_TOKENS: u32 = 4096;

/// User-facing reply when there is nothing to export.
pub const NOTHING_TO_EXPORT_MESSAGE: &str =
    "There's nothing to export yet. Capture a few ideas or decisions first.";

/// Document type produced by an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Summary,
    Prd,
    Tasks,
    Roadmap,
}

impl ExportFormat {
    /// Classifies a request. First matching rule wins; summary is the default.
    pub fn classify(request: &str) -> Self {
        let lower = request.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

        if has(&["prd", "product requirement"]) {
            ExportFormat::Prd
        } else if has(&["task", "todo", "action"]) {
            ExportFormat::Tasks
        } else if has(&["roadmap", "timeline", "phase"]) {
            ExportFormat::Roadmap
        } else {
            ExportFormat::Summary
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Summary => "summary",
            ExportFormat::Prd => "prd",
            ExportFormat::Tasks => "tasks",
            ExportFormat::Roadmap => "roadmap",
        }
    }

    fn instructions(&self) -> &'static str {
        match self {
            ExportFormat::Summary => {
                "Write a concise project summary in Markdown. Start with a one-paragraph \
                 overview, then a \"Decisions\" section and an \"Open Ideas\" section. \
                 Do not invent decisions that are not listed."
            }
            ExportFormat::Prd => {
                "Write a product requirements document in Markdown with the sections \
                 Overview, Goals, Requirements, Out of Scope and Open Questions. Treat the \
                 decisions as settled requirements and the ideas as open questions or \
                 candidate features."
            }
            ExportFormat::Tasks => {
                "Write an actionable task list in Markdown. Break every decision into \
                 concrete checklist items (\"- [ ] ...\"), grouped by area. List ideas \
                 under a final \"Needs investigation\" heading."
            }
            ExportFormat::Roadmap => {
                "Write a phased roadmap in Markdown. Order the decisions into phases \
                 (Now, Next, Later) with a short goal per phase. Place ideas in the \
                 Later phase unless a decision depends on them."
            }
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller should do for an export request.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportPlan {
    /// Nothing has been captured; reply with [`NOTHING_TO_EXPORT_MESSAGE`] and skip the model call.
    NothingToExport { format: ExportFormat },
    /// Send this prompt to the language model.
    Generate {
        format: ExportFormat,
        prompt: PromptPlan,
    },
}

impl ExportPlan {
    pub fn format(&self) -> ExportFormat {
        match self {
            ExportPlan::NothingToExport { format } | ExportPlan::Generate { format, .. } => *format,
        }
    }
}

/// Turns export requests into prompts. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportFormatter;

impl ExportFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Classifies the request and builds the prompt, or short-circuits on an empty project.
    pub fn format(&self, request: &str, context: &ConversationContext) -> ExportPlan {
        let format = ExportFormat::classify(request);

        if context.has_no_items() {
            return ExportPlan::NothingToExport { format };
        }

        let system_prompt = format!(
            "You are preparing a {kind} for the project \"{title}\".\n\n\
             Decisions:\n{decisions}\n\n\
             Ideas:\n{ideas}\n\n\
             {instructions}",
            kind = document_name(format),
            title = context.project_title(),
            decisions = numbered_list(context.decisions()),
            ideas = numbered_list(context.ideas()),
            instructions = format.instructions(),
        );

        ExportPlan::Generate {
            format,
            prompt: PromptPlan {
                system_prompt,
                turns: vec![ConversationTurn::user(request)],
                max_tokens: EXPORT_MAX_TOKENS,
            },
        }
    }
}

fn document_name(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Summary => "project summary",
        ExportFormat::Prd => "product requirements document",
        ExportFormat::Tasks => "task list",
        ExportFormat::Roadmap => "roadmap",
    }
}
