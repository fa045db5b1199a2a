//! Template and prompt data types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::TemplateError;
use crate::templates::conditional::Conditional;

/// Rendering context: context key -> value
pub type Context = BTreeMap<String, Value>;

/// A validated prompt template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub id: String,
    pub title: String,
    pub objective: String,
    pub tasks: Vec<String>,
    pub deliverable: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ai_model_hints: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context_requirements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Conditional>,
}

/// Template record as written in configuration, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateConfig {
    pub id: Option<String>,
    pub title: Option<String>,
    pub objective: Option<String>,
    pub tasks: Option<Vec<String>>,
    pub deliverable: Option<String>,
    #[serde(default)]
    pub ai_model_hints: BTreeMap<String, Value>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub context_requirements: Vec<String>,
    #[serde(default)]
    pub conditional: Option<String>,
}

fn present(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|s| !s.trim().is_empty())
}

impl TemplateConfig {
    /// Check required fields and build a [`Template`].
    ///
    /// `index` names the entry in errors when it has no usable id.
    pub fn validate(self, phase: u8, index: usize) -> Result<Template, TemplateError> {
        let mut missing = Vec::new();
        if present(&self.id).is_none() {
            missing.push("id");
        }
        if present(&self.title).is_none() {
            missing.push("title");
        }
        if present(&self.objective).is_none() {
            missing.push("objective");
        }
        if self.tasks.as_ref().map(|t| t.is_empty()).unwrap_or(true) {
            missing.push("tasks");
        }
        if present(&self.deliverable).is_none() {
            missing.push("deliverable");
        }

        if !missing.is_empty() {
            let template = present(&self.id)
                .cloned()
                .unwrap_or_else(|| format!("#{}", index + 1));
            return Err(TemplateError::MissingFields {
                phase,
                template,
                fields: missing,
            });
        }

        Ok(Template {
            id: self.id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            objective: self.objective.unwrap_or_default(),
            tasks: self.tasks.unwrap_or_default(),
            deliverable: self.deliverable.unwrap_or_default(),
            ai_model_hints: self.ai_model_hints,
            dependencies: self.dependencies,
            context_requirements: self.context_requirements,
            conditional: self
                .conditional
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(Conditional::parse),
        })
    }
}

/// Reference to a template: `[scope#]id`.
///
/// The scope names the template file (e.g. `phase1`); without it every phase
/// is searched in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub scope: Option<String>,
    pub id: String,
}

impl TemplateRef {
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('#') {
            Some((scope, id)) if !scope.trim().is_empty() => Self {
                scope: Some(scope.trim().to_string()),
                id: id.trim().to_string(),
            },
            Some((_, id)) => Self {
                scope: None,
                id: id.trim().to_string(),
            },
            None => Self {
                scope: None,
                id: raw.trim().to_string(),
            },
        }
    }

    /// Phase number named by the scope (`phase1`, `phase_1`, `1`)
    pub fn phase(&self) -> Option<u8> {
        let scope = self.scope.as_deref()?.to_ascii_lowercase();
        let digits = scope
            .trim_start_matches("phase")
            .trim_start_matches(['_', '-']);
        digits.parse().ok()
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}#{}", scope, self.id),
            None => f.write_str(&self.id),
        }
    }
}

/// A rendered prompt, ready for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Phase the template belongs to; `None` for inline custom prompts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<u8>,
    pub template_id: String,
    pub title: String,
    pub context: Context,
    pub objective: String,
    pub tasks: Vec<String>,
    pub deliverable: String,
    pub model_hints: BTreeMap<String, Value>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Prompt {
    pub fn estimated_tokens(&self) -> u64 {
        self.model_hints
            .get("estimated_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reports_all_missing_fields() {
        let config = TemplateConfig {
            id: Some("arch".to_string()),
            title: Some("Architecture".to_string()),
            tasks: Some(vec![]),
            ..Default::default()
        };
        match config.validate(0, 0) {
            Err(TemplateError::MissingFields {
                phase,
                template,
                fields,
            }) => {
                assert_eq!(phase, 0);
                assert_eq!(template, "arch");
                assert_eq!(fields, vec!["objective", "tasks", "deliverable"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_without_id_uses_position() {
        let err = TemplateConfig::default().validate(3, 4).unwrap_err();
        assert!(err.to_string().contains("'#5'"));
    }

    #[test]
    fn test_validate_parses_conditional() {
        let config = TemplateConfig {
            id: Some("t".to_string()),
            title: Some("T".to_string()),
            objective: Some("o".to_string()),
            tasks: Some(vec!["a".to_string()]),
            deliverable: Some("d".to_string()),
            conditional: Some("has_api_docs".to_string()),
            ..Default::default()
        };
        let template = config.validate(0, 0).unwrap();
        assert_eq!(template.conditional, Some(Conditional::HasApiDocs));
    }

    #[test]
    fn test_template_ref_parse() {
        let r = TemplateRef::parse("phase1#language_overview");
        assert_eq!(r.scope.as_deref(), Some("phase1"));
        assert_eq!(r.id, "language_overview");
        assert_eq!(r.phase(), Some(1));
        assert_eq!(r.to_string(), "phase1#language_overview");

        let bare = TemplateRef::parse("dependency_audit");
        assert_eq!(bare.scope, None);
        assert_eq!(bare.phase(), None);

        assert_eq!(TemplateRef::parse("phase_3#x").phase(), Some(3));
        assert_eq!(TemplateRef::parse("custom#x").phase(), None);
    }
}
