//! Workflow execution and progress tracking.
//!
//! The executor walks a workflow's references in section order and records one
//! [`PromptExecution`] per reference. What "running" a reference means is left
//! to a [`StepRunner`]:
//!
//! - [`AcknowledgeRunner`] marks every reference completed without producing
//!   anything. Prompts are generated separately through the phase generator.
//! - [`GeneratingRunner`] resolves each reference against an [`Analysis`] and
//!   reports failed or skipped references as such.

use anyhow::Result;
use chrono::{DateTime, Utc};
use prompt_workflow_sdk::{
    log_prompt_complete, log_prompt_failed, log_prompt_skipped, log_prompt_start,
    log_section_start,
};
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::Analysis;
use crate::phases::{project_name, PromptGenerator};
use crate::templates::{Context, Prompt};
use crate::workflow::types::{
    ExecutionState, PromptExecution, PromptReference, WorkflowDefinition, WorkflowProgress,
    WorkflowSection,
};

/// Result of running one reference
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Completed(Option<Prompt>),
    Skipped(String),
}

/// Runs a single prompt reference on behalf of the executor
pub trait StepRunner {
    fn run(&mut self, section: &WorkflowSection, reference: &PromptReference)
        -> Result<StepOutcome>;
}

/// Marks every reference completed and produces no prompts
#[derive(Debug, Default, Clone, Copy)]
pub struct AcknowledgeRunner;

impl StepRunner for AcknowledgeRunner {
    fn run(&mut self, _section: &WorkflowSection, _reference: &PromptReference) -> Result<StepOutcome> {
        Ok(StepOutcome::Completed(None))
    }
}

/// Generates a prompt per reference from an analysis
pub struct GeneratingRunner<'a> {
    generator: &'a mut PromptGenerator,
    analysis: &'a Analysis,
}

impl<'a> GeneratingRunner<'a> {
    pub fn new(generator: &'a mut PromptGenerator, analysis: &'a Analysis) -> Self {
        Self {
            generator,
            analysis,
        }
    }
}

impl StepRunner for GeneratingRunner<'_> {
    fn run(&mut self, _section: &WorkflowSection, reference: &PromptReference) -> Result<StepOutcome> {
        match reference {
            PromptReference::Template(template_ref) => {
                let outcome = self.generator.generate_template(template_ref, self.analysis)?;
                Ok(match outcome.skip_reason() {
                    Some(reason) => StepOutcome::Skipped(reason),
                    None => StepOutcome::Completed(outcome.into_prompt()),
                })
            }
            PromptReference::Custom(custom) => {
                let mut context = Context::new();
                context.insert(
                    "project_name".to_string(),
                    serde_json::Value::String(project_name(self.analysis)),
                );
                Ok(StepOutcome::Completed(Some(custom.to_prompt(context))))
            }
        }
    }
}

/// Everything one execution produced
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRun {
    pub run_id: Uuid,
    pub workflow_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub executions: Vec<PromptExecution>,
    pub progress: WorkflowProgress,
    pub prompts: Vec<Prompt>,
}

impl WorkflowRun {
    pub fn succeeded(&self) -> bool {
        self.progress.failed == 0
    }
}

pub struct WorkflowExecutor<R: StepRunner> {
    runner: R,
}

impl Default for WorkflowExecutor<AcknowledgeRunner> {
    fn default() -> Self {
        Self::new(AcknowledgeRunner)
    }
}

impl<R: StepRunner> WorkflowExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn execute(&mut self, workflow: &WorkflowDefinition) -> WorkflowRun {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(
            "Executing workflow '{}' v{} ({} prompts, run {})",
            workflow.name,
            workflow.version,
            workflow.total_prompts(),
            run_id
        );
        if workflow.settings.parallel_execution {
            tracing::debug!("parallel_execution is set; references still run in order");
        }

        let mut executions: Vec<PromptExecution> = workflow
            .references()
            .map(|(section, reference)| PromptExecution::pending(&section.id, reference.id()))
            .collect();

        let mut prompts = Vec::new();
        let mut index = 0;

        'sections: for section in &workflow.sections {
            log_section_start!(section.id, section.title, section.prompts.len());
            for reference in &section.prompts {
                let execution = &mut executions[index];
                index += 1;

                execution.start();
                log_prompt_start!(section.id, execution.prompt_id);

                match self.runner.run(section, reference) {
                    Ok(StepOutcome::Completed(prompt)) => {
                        execution.finish(ExecutionState::Completed, None);
                        log_prompt_complete!(execution.prompt_id);
                        prompts.extend(prompt);
                    }
                    Ok(StepOutcome::Skipped(reason)) => {
                        tracing::debug!("Skipped {}: {}", reference, reason);
                        log_prompt_skipped!(execution.prompt_id, reason);
                        execution.finish(ExecutionState::Skipped, None);
                    }
                    Err(e) => {
                        tracing::warn!("{} failed: {:#}", reference, e);
                        log_prompt_failed!(execution.prompt_id, e);
                        execution.finish(ExecutionState::Failed, Some(format!("{:#}", e)));
                        if workflow.settings.fail_fast {
                            break 'sections;
                        }
                    }
                }
            }
        }

        let progress = WorkflowProgress::from_executions(&executions);
        tracing::info!(
            "Workflow '{}' finished: {}/{} completed, {} failed, {} skipped",
            workflow.name,
            progress.completed,
            progress.total_prompts,
            progress.failed,
            progress.skipped
        );

        WorkflowRun {
            run_id,
            workflow_name: workflow.name.clone(),
            started_at,
            finished_at: Utc::now(),
            executions,
            progress,
            prompts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::loader::parse_workflow;

    const WORKFLOW: &str = r#"
workflow:
  name: Test
  settings:
    fail_fast: true
  sections:
    - id: one
      title: One
      prompts:
        - template: phase0#readme_review
        - template: phase9#nothing
    - id: two
      title: Two
      prompts:
        - custom: {id: c, title: C, prompt: Say hi}
"#;

    struct FailOn(&'static str);

    impl StepRunner for FailOn {
        fn run(&mut self, _section: &WorkflowSection, reference: &PromptReference) -> Result<StepOutcome> {
            if reference.id() == self.0 {
                anyhow::bail!("boom");
            }
            Ok(StepOutcome::Completed(None))
        }
    }

    #[test]
    fn test_acknowledge_runner_completes_everything() {
        let workflow = parse_workflow("test", WORKFLOW).unwrap();
        let run = WorkflowExecutor::<AcknowledgeRunner>::default().execute(&workflow);

        assert_eq!(run.progress.total_prompts, 3);
        assert_eq!(run.progress.completed, 3);
        assert_eq!(run.progress.completion_percentage(), 100.0);
        assert!(run.prompts.is_empty());
        assert!(run.succeeded());
    }

    #[test]
    fn test_fail_fast_leaves_rest_pending() {
        let workflow = parse_workflow("test", WORKFLOW).unwrap();
        let run = WorkflowExecutor::new(FailOn("phase0#readme_review")).execute(&workflow);

        let states: Vec<ExecutionState> = run.executions.iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            vec![
                ExecutionState::Failed,
                ExecutionState::Pending,
                ExecutionState::Pending
            ]
        );
        assert_eq!(run.executions[0].error.as_deref(), Some("boom"));
        assert_eq!(run.progress.pending(), 2);
        assert!(!run.succeeded());
    }

    #[test]
    fn test_generating_runner_reports_each_outcome() {
        let workflow = parse_workflow("test", WORKFLOW).unwrap();
        let analysis = Analysis::new("/work/demo");
        let mut generator = PromptGenerator::default();
        let run = WorkflowExecutor::new(GeneratingRunner::new(&mut generator, &analysis))
            .execute(&workflow);

        // readme_review has no documentation to work from; phase 9 does not exist
        assert_eq!(run.executions[0].state, ExecutionState::Skipped);
        assert_eq!(run.executions[1].state, ExecutionState::Failed);
        assert!(run.executions[1]
            .error
            .as_deref()
            .unwrap()
            .contains("phase 9"));
        // fail_fast stops before the custom prompt
        assert_eq!(run.executions[2].state, ExecutionState::Pending);
        assert!(run.prompts.is_empty());
    }

    #[test]
    fn test_custom_prompt_is_generated() {
        let yaml = r#"
workflow:
  name: Custom only
  sections:
    - id: s
      title: S
      prompts:
        - custom: {id: hello, title: Hello, prompt: Greet the team}
"#;
        let workflow = parse_workflow("custom", yaml).unwrap();
        let analysis = Analysis::new("/work/demo");
        let mut generator = PromptGenerator::default();
        let run = WorkflowExecutor::new(GeneratingRunner::new(&mut generator, &analysis))
            .execute(&workflow);

        assert_eq!(run.prompts.len(), 1);
        assert_eq!(run.prompts[0].template_id, "hello");
        assert_eq!(run.prompts[0].context["project_name"], "demo");
    }
}
