//! Workflow definitions and per-run execution bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::templates::{Context, Prompt, TemplateRef};

// ============================================================================
// Definition Types
// ============================================================================

/// A named, versioned composition of prompt references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub settings: WorkflowSettings,
    pub sections: Vec<WorkflowSection>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl WorkflowDefinition {
    pub fn total_prompts(&self) -> usize {
        self.sections.iter().map(|s| s.prompts.len()).sum()
    }

    /// Every reference with its section, in execution order
    pub fn references(&self) -> impl Iterator<Item = (&WorkflowSection, &PromptReference)> {
        self.sections
            .iter()
            .flat_map(|s| s.prompts.iter().map(move |p| (s, p)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    /// Recorded only; references always run in order
    #[serde(default)]
    pub parallel_execution: bool,
    /// Stop at the first failed reference
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default = "default_true")]
    pub cache_results: bool,
}

fn default_true() -> bool {
    true
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            parallel_execution: false,
            fail_fast: false,
            cache_results: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSection {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub prompts: Vec<PromptReference>,
}

/// Inline prompt text defined directly in a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPrompt {
    pub id: String,
    pub title: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverable: Option<String>,
}

impl CustomPrompt {
    /// Turn the inline definition into a prompt. The prompt text becomes the
    /// objective when no separate objective is given.
    pub fn to_prompt(&self, context: Context) -> Prompt {
        let mut tasks = self.tasks.clone();
        let objective = match &self.objective {
            Some(objective) => {
                tasks.insert(0, self.prompt.clone());
                objective.clone()
            }
            None => self.prompt.clone(),
        };
        Prompt {
            phase: None,
            template_id: self.id.clone(),
            title: self.title.clone(),
            context,
            objective,
            tasks,
            deliverable: self.deliverable.clone().unwrap_or_default(),
            model_hints: Default::default(),
            dependencies: Vec::new(),
        }
    }
}

/// One entry of a workflow section: a template pointer or inline text, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPromptReference", into = "RawPromptReference")]
pub enum PromptReference {
    Template(TemplateRef),
    Custom(CustomPrompt),
}

impl PromptReference {
    /// Identifier used in execution records
    pub fn id(&self) -> String {
        match self {
            PromptReference::Template(r) => r.to_string(),
            PromptReference::Custom(c) => c.id.clone(),
        }
    }
}

impl fmt::Display for PromptReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptReference::Template(r) => write!(f, "template {}", r),
            PromptReference::Custom(c) => write!(f, "custom {}", c.id),
        }
    }
}

/// Prompt reference as written in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPromptReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom: Option<CustomPrompt>,
}

impl TryFrom<RawPromptReference> for PromptReference {
    type Error = String;

    fn try_from(raw: RawPromptReference) -> Result<Self, Self::Error> {
        match (raw.template, raw.custom) {
            (Some(template), None) if !template.trim().is_empty() => {
                Ok(PromptReference::Template(TemplateRef::parse(&template)))
            }
            (Some(_), None) => Err("template reference is empty".to_string()),
            (None, Some(custom)) => Ok(PromptReference::Custom(custom)),
            (Some(_), Some(_)) => {
                Err("prompt reference sets both 'template' and 'custom'".to_string())
            }
            (None, None) => Err("prompt reference needs 'template' or 'custom'".to_string()),
        }
    }
}

impl From<PromptReference> for RawPromptReference {
    fn from(reference: PromptReference) -> Self {
        match reference {
            PromptReference::Template(r) => RawPromptReference {
                template: Some(r.to_string()),
                custom: None,
            },
            PromptReference::Custom(c) => RawPromptReference {
                template: None,
                custom: Some(c),
            },
        }
    }
}

// ============================================================================
// Execution Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

/// Tracking record for one prompt reference during a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptExecution {
    pub section_id: String,
    pub prompt_id: String,
    pub state: ExecutionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PromptExecution {
    pub fn pending(section_id: &str, prompt_id: String) -> Self {
        Self {
            section_id: section_id.to_string(),
            prompt_id,
            state: ExecutionState::Pending,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    pub fn start(&mut self) {
        self.state = ExecutionState::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn finish(&mut self, state: ExecutionState, error: Option<String>) {
        self.state = state;
        self.finished_at = Some(Utc::now());
        self.error = error;
    }
}

/// Counters over the executions of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowProgress {
    pub total_prompts: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub running: usize,
}

impl WorkflowProgress {
    pub fn from_executions(executions: &[PromptExecution]) -> Self {
        let count = |state| executions.iter().filter(|e| e.state == state).count();
        Self {
            total_prompts: executions.len(),
            completed: count(ExecutionState::Completed),
            failed: count(ExecutionState::Failed),
            skipped: count(ExecutionState::Skipped),
            running: count(ExecutionState::Running),
        }
    }

    pub fn pending(&self) -> usize {
        self.total_prompts
            .saturating_sub(self.completed)
            .saturating_sub(self.failed)
            .saturating_sub(self.skipped)
            .saturating_sub(self.running)
    }

    /// Completed share in percent; an empty workflow counts as complete
    pub fn completion_percentage(&self) -> f64 {
        if self.total_prompts == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total_prompts as f64 * 100.0
    }
}
