//! Named workflows: ordered sections of template references and inline prompts.

pub mod executor;
pub mod loader;
pub mod types;

pub use executor::{
    AcknowledgeRunner, GeneratingRunner, StepOutcome, StepRunner, WorkflowExecutor, WorkflowRun,
};
pub use loader::{parse_workflow, user_workflow_dir, WorkflowLoader};
pub use types::{
    CustomPrompt, ExecutionState, PromptExecution, PromptReference, WorkflowDefinition,
    WorkflowProgress, WorkflowSection, WorkflowSettings,
};
