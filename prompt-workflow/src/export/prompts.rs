//! Prompt export: one markdown document or a JSON array.

use std::fmt::Write;

use crate::error::ExportError;
use crate::phases::phase_name;
use crate::templates::render::value_text;
use crate::templates::Prompt;

/// Render prompts as a single markdown document, one section per prompt
pub fn prompts_to_markdown(title: &str, prompts: &[Prompt]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", title);
    let total_tokens: u64 = prompts.iter().map(Prompt::estimated_tokens).sum();
    let _ = writeln!(
        out,
        "{} prompts, about {} context tokens in total.\n",
        prompts.len(),
        total_tokens
    );

    let mut current_phase: Option<Option<u8>> = None;
    for (index, prompt) in prompts.iter().enumerate() {
        if current_phase != Some(prompt.phase) {
            current_phase = Some(prompt.phase);
            match prompt.phase {
                Some(phase) => {
                    let _ = writeln!(out, "## Phase {}: {}\n", phase, phase_name(phase));
                }
                None => {
                    let _ = writeln!(out, "## Custom prompts\n");
                }
            }
        }

        let _ = writeln!(out, "### {}. {}\n", index + 1, prompt.title);
        let _ = writeln!(out, "*Template:* `{}`", prompt.template_id);
        if !prompt.dependencies.is_empty() {
            let _ = writeln!(out, "*Depends on:* {}", prompt.dependencies.join(", "));
        }
        let _ = writeln!(out, "*Estimated tokens:* {}\n", prompt.estimated_tokens());

        let _ = writeln!(out, "**Objective**\n\n{}\n", prompt.objective.trim());
        let _ = writeln!(out, "**Tasks**\n");
        for (n, task) in prompt.tasks.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", n + 1, task.trim());
        }
        let _ = writeln!(out, "\n**Deliverable**\n\n{}\n", prompt.deliverable.trim());

        let hints: Vec<String> = prompt
            .model_hints
            .iter()
            .filter(|(key, _)| key.as_str() != "estimated_tokens")
            .map(|(key, value)| format!("{}={}", key, value_text(value)))
            .collect();
        if !hints.is_empty() {
            let _ = writeln!(out, "*Model hints:* {}\n", hints.join(", "));
        }
        let _ = writeln!(out, "---\n");
    }
    out
}

pub fn prompts_to_json(prompts: &[Prompt]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(prompts)?)
}
