//! Prompt generation phases.
//!
//! Each phase turns one slice of the [`Analysis`] into a rendering context:
//!
//! - **Phase 0**: documentation review (README, architecture, setup, API docs)
//! - **Phase 1**: code structure (languages, frameworks, entry points)
//! - **Phase 2**: dependencies
//! - **Phase 3**: documentation drift (validation results)
//! - **Phase 4**: rule findings
//!
//! A phase whose input is absent yields no context, and so no prompts.

pub mod generator;
pub mod phase0_documentation;
pub mod phase1_structure;
pub mod phase2_dependencies;
pub mod phase3_validation;
pub mod phase4_findings;

pub use generator::{PromptGenerator, TemplateOutcome};

use serde_json::Value;

use crate::analysis::Analysis;
use crate::templates::{Context, Template};

/// Default character budget for document text pulled into a context
pub const MAX_DOCUMENT_CHARS: usize = 6000;

/// Display name of a phase
pub fn phase_name(phase: u8) -> &'static str {
    match phase {
        0 => phase0_documentation::NAME,
        1 => phase1_structure::NAME,
        2 => phase2_dependencies::NAME,
        3 => phase3_validation::NAME,
        4 => phase4_findings::NAME,
        _ => "Unknown",
    }
}

/// Build the context for `template` in `phase`.
///
/// Returns `None` when the phase has no input or when a key listed in the
/// template's `context_requirements` could not be produced.
pub fn build_context(
    phase: u8,
    template: &Template,
    analysis: &Analysis,
    max_chars: usize,
) -> Option<Context> {
    let context = match phase {
        0 => phase0_documentation::build_context(analysis, max_chars),
        1 => phase1_structure::build_context(analysis),
        2 => phase2_dependencies::build_context(analysis),
        3 => phase3_validation::build_context(analysis, max_chars),
        4 => phase4_findings::build_context(analysis),
        _ => None,
    }?;

    for key in &template.context_requirements {
        if !context.contains_key(key) {
            tracing::debug!(
                "Template '{}' requires '{}', which phase {} could not provide",
                template.id,
                key,
                phase
            );
            return None;
        }
    }
    Some(context)
}

/// Cut `text` to at most `max_chars` characters, noting how much was dropped
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{}\n\n[... truncated {} characters]", kept, total - max_chars)
}

/// Repository directory name, used as the project name
pub fn project_name(analysis: &Analysis) -> String {
    analysis
        .root
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| analysis.root.display().to_string())
}

fn base_context(analysis: &Analysis) -> Context {
    let mut context = Context::new();
    context.insert(
        "project_name".to_string(),
        Value::String(project_name(analysis)),
    );
    context
}
