//! Phase 1: code structure context.

use serde_json::Value;

use crate::analysis::Analysis;
use crate::phases::base_context;
use crate::templates::Context;

pub const NAME: &str = "Code Structure";

pub fn build_context(analysis: &Analysis) -> Option<Context> {
    let structure = analysis.structure.as_ref()?;
    let mut context = base_context(analysis);

    context.insert("total_files".to_string(), Value::from(structure.total_files));
    context.insert("total_lines".to_string(), Value::from(structure.total_lines));
    context.insert(
        "language_count".to_string(),
        Value::from(structure.languages.len()),
    );
    context.insert(
        "framework_count".to_string(),
        Value::from(structure.frameworks.len()),
    );

    if let Some(primary) = structure.primary_language() {
        context.insert(
            "primary_language".to_string(),
            Value::String(primary.to_string()),
        );
    }
    if !structure.languages.is_empty() {
        let summary = structure
            .languages
            .iter()
            .map(|l| {
                format!(
                    "- {}: {} files, {} lines ({:.1}%)",
                    l.language, l.files, l.lines, l.percentage
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        context.insert("language_summary".to_string(), Value::String(summary));
    }
    if !structure.frameworks.is_empty() {
        context.insert(
            "frameworks".to_string(),
            Value::String(structure.frameworks.join(", ")),
        );
    }
    if !structure.entry_points.is_empty() {
        let entries = structure
            .entry_points
            .iter()
            .map(|p| format!("- {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n");
        context.insert("entry_points".to_string(), Value::String(entries));
    }
    if !structure.top_level_dirs.is_empty() {
        context.insert(
            "top_level_dirs".to_string(),
            Value::String(structure.top_level_dirs.join(", ")),
        );
    }

    Some(context)
}
