//! Template rendering: placeholder substitution and token estimation.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::templates::types::{Context, Prompt, Template};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Default for a context key the analysis could not supply
pub fn default_value(key: &str) -> Value {
    if key.ends_with("_count") || key.starts_with("total_") {
        Value::from(0)
    } else {
        Value::String(String::new())
    }
}

/// Text form of a context value: strings verbatim, everything else as compact JSON
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Approximate token count: sum of `chars / 4` per context value
pub fn estimate_tokens(context: &Context) -> u64 {
    context
        .values()
        .map(|v| (value_text(v).chars().count() / 4) as u64)
        .sum()
}

/// Replace `{key}` placeholders from `context`, defaulting missing keys
pub fn substitute(text: &str, context: &Context) -> String {
    PLACEHOLDER_RE
        .replace_all(text, |caps: &Captures| {
            let key = &caps[1];
            match context.get(key) {
                Some(value) => value_text(value),
                None => value_text(&default_value(key)),
            }
        })
        .into_owned()
}

/// Render `template` against `context` into a finished prompt
pub fn render(phase: u8, template: &Template, mut context: Context) -> Prompt {
    for key in &template.context_requirements {
        context
            .entry(key.clone())
            .or_insert_with(|| default_value(key));
    }

    let mut model_hints = template.ai_model_hints.clone();
    model_hints.insert(
        "estimated_tokens".to_string(),
        Value::from(estimate_tokens(&context)),
    );

    Prompt {
        phase: Some(phase),
        template_id: template.id.clone(),
        title: substitute(&template.title, &context),
        objective: substitute(&template.objective, &context),
        tasks: template
            .tasks
            .iter()
            .map(|t| substitute(t, &context))
            .collect(),
        deliverable: substitute(&template.deliverable, &context),
        model_hints,
        dependencies: template.dependencies.clone(),
        context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn template() -> Template {
        Template {
            id: "overview".to_string(),
            title: "Overview of {project_name}".to_string(),
            objective: "Review {file_count} files in {project_name}".to_string(),
            tasks: vec!["Read {readme_content}".to_string(), "Note {missing}".to_string()],
            deliverable: "Summary".to_string(),
            ai_model_hints: BTreeMap::from([("model".to_string(), json!("large"))]),
            dependencies: vec!["earlier".to_string()],
            context_requirements: vec!["project_name".to_string(), "file_count".to_string()],
            conditional: None,
        }
    }

    #[test]
    fn test_estimate_tokens_floors_per_value() {
        let mut context = Context::new();
        context.insert("a".to_string(), json!("1234567"));
        context.insert("b".to_string(), json!(12345));
        context.insert("c".to_string(), json!(["ab", "cd"]));
        // 7/4=1, 5/4=1, ["ab","cd"] is 11 chars -> 2
        assert_eq!(estimate_tokens(&context), 4);
        assert_eq!(estimate_tokens(&Context::new()), 0);
    }

    #[test]
    fn test_render_defaults_missing_values() {
        let mut context = Context::new();
        context.insert("project_name".to_string(), json!("demo"));
        context.insert("readme_content".to_string(), json!("hello"));

        let prompt = render(0, &template(), context);
        assert_eq!(prompt.title, "Overview of demo");
        assert_eq!(prompt.objective, "Review 0 files in demo");
        assert_eq!(prompt.tasks, vec!["Read hello", "Note "]);
        assert_eq!(prompt.context["file_count"], json!(0));
        assert_eq!(prompt.model_hints["model"], json!("large"));
        assert_eq!(prompt.dependencies, vec!["earlier".to_string()]);
    }

    #[test]
    fn test_estimated_tokens_hint_is_appended() {
        let mut context = Context::new();
        context.insert("project_name".to_string(), json!("x".repeat(40)));
        let prompt = render(1, &template(), context);
        // 40/4 for the name, "0" for file_count contributes nothing
        assert_eq!(prompt.estimated_tokens(), 10);
    }

    #[test]
    fn test_substitute_leaves_non_placeholders() {
        let context = Context::new();
        assert_eq!(substitute("fn main() { }", &context), "fn main() { }");
        assert_eq!(substitute("{ spaced }", &context), "{ spaced }");
    }
}
