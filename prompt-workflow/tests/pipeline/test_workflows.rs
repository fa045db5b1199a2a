//! Workflow loading, caching and execution

use super::common::*;
use prompt_workflow::config::OrchestratorConfig;
use prompt_workflow::orchestrator;
use prompt_workflow::workflow::{
    ExecutionState, PromptExecution, WorkflowLoader, WorkflowProgress,
};
use std::sync::Arc;

#[test]
fn test_cache_returns_same_definition_until_cleared() {
    let mut loader = WorkflowLoader::new(vec![]);
    let first = loader.load("full_review").unwrap();
    let second = loader.load("full_review").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(loader.is_cached("full_review"));

    loader.clear_cache();
    assert!(!loader.is_cached("full_review"));
    let third = loader.load("full_review").unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(*first, *third);
}

#[test]
fn test_not_found_lists_available_names() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "nightly.yaml",
        "workflow:\n  name: Nightly\n  sections: []\n",
    );
    let mut loader = WorkflowLoader::new(vec![dir.path().to_path_buf()]).without_builtin();

    let err = loader.load("weekly").unwrap_err().to_string();
    assert!(err.contains("weekly"));
    assert!(err.contains("nightly"));
    assert!(!err.contains("full_review"));
}

#[test]
fn test_directory_overrides_builtin() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "full_review.yml",
        "workflow:\n  name: Team review\n  sections:\n    - id: only\n      title: Only\n      prompts:\n        - template: phase1#structure_overview\n",
    );
    let mut loader = WorkflowLoader::new(vec![dir.path().to_path_buf()]);
    let workflow = loader.load("full_review").unwrap();
    assert_eq!(workflow.name, "Team review");
    assert_eq!(workflow.total_prompts(), 1);

    let names = loader.list_available();
    assert_eq!(names.iter().filter(|n| *n == "full_review").count(), 1);
}

#[test]
fn test_progress_arithmetic() {
    let states = [
        ExecutionState::Completed,
        ExecutionState::Completed,
        ExecutionState::Failed,
        ExecutionState::Skipped,
        ExecutionState::Pending,
    ];
    let executions: Vec<PromptExecution> = states
        .iter()
        .enumerate()
        .map(|(i, state)| {
            let mut execution = PromptExecution::pending("s", format!("p{}", i));
            execution.state = *state;
            execution
        })
        .collect();

    let progress = WorkflowProgress::from_executions(&executions);
    assert_eq!(progress.total_prompts, 5);
    assert_eq!(progress.completed, 2);
    assert_eq!(progress.pending(), 1);
    assert_eq!(progress.completion_percentage(), 40.0);
}

#[test]
fn test_acknowledged_run_completes_every_reference() {
    let repo = readme_only_repo();
    let mut loader = WorkflowLoader::new(vec![]);
    let run = orchestrator::run_workflow(
        &mut loader,
        "security_audit",
        repo.path(),
        false,
        &OrchestratorConfig::default(),
    )
    .unwrap();

    assert!(run.succeeded());
    assert_eq!(run.progress.completed, run.progress.total_prompts);
    assert!(run.prompts.is_empty());
}

#[test]
fn test_generating_run_skips_gated_templates() {
    let repo = readme_only_repo();
    let mut loader = WorkflowLoader::new(vec![]);
    let run = orchestrator::run_workflow(
        &mut loader,
        "full_review",
        repo.path(),
        true,
        &OrchestratorConfig::default(),
    )
    .unwrap();

    let state_of = |id: &str| {
        run.executions
            .iter()
            .find(|e| e.prompt_id.ends_with(id))
            .map(|e| e.state)
    };
    assert_eq!(state_of("architecture_review"), Some(ExecutionState::Skipped));
    assert_eq!(state_of("readme_review"), Some(ExecutionState::Completed));
    assert_eq!(state_of("executive_summary"), Some(ExecutionState::Completed));
    assert!(run.succeeded());
    assert!(run.prompts.iter().any(|p| p.phase.is_none()));
}

#[test]
fn test_misspelled_scope_fails_the_prompt() {
    let repo = sample_repo();
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "typo.yaml",
        "workflow:\n  name: Typo\n  sections:\n    - id: triage\n      title: Triage\n      prompts:\n        - template: phse4#findings_triage\n",
    );
    let mut loader = WorkflowLoader::new(vec![dir.path().to_path_buf()]);
    let run = orchestrator::run_workflow(
        &mut loader,
        "typo",
        repo.path(),
        true,
        &OrchestratorConfig::default(),
    )
    .unwrap();

    assert_eq!(run.executions.len(), 1);
    assert_eq!(run.executions[0].state, ExecutionState::Failed);
    assert!(run.executions[0].error.as_deref().is_some_and(|e| e.contains("phse4#findings_triage")));
    assert!(!run.succeeded());
}
