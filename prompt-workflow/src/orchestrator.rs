//! High-level operations behind the CLI commands.

use anyhow::{Context, Result};
use prompt_workflow_sdk::{log_found, log_info};
use std::path::{Path, PathBuf};

use crate::analysis::{analyze_repository, languages::file_language_map, Analysis};
use crate::config::OrchestratorConfig;
use crate::export::{write_artifact, FindingFormat, PromptFormat};
use crate::phases::{project_name, PromptGenerator};
use crate::rules::{Finding, Severity};
use crate::templates::{Prompt, PHASE_COUNT};
use crate::workflow::{
    AcknowledgeRunner, GeneratingRunner, WorkflowExecutor, WorkflowLoader, WorkflowRun,
};

fn checked_root(root: &Path) -> Result<PathBuf> {
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {}", root.display());
    }
    root.canonicalize()
        .with_context(|| format!("Failed to resolve {}", root.display()))
}

/// Run the rule engine over every recognised source file under `root`
pub fn scan(root: &Path, config: &OrchestratorConfig) -> Result<Vec<Finding>> {
    let root = checked_root(root)?;
    let mut engine = config.rule_engine()?;
    for id in engine.compile_failures() {
        tracing::warn!("Rule '{}' has an invalid pattern and will not run", id);
    }

    let files = file_language_map(&root, &config.skip_dirs);
    log_found!(files.len(), "source files");
    let findings = engine.scan_directory(&root, &files).to_vec();
    Ok(findings)
}

/// Analysis of `root` including rule findings
pub fn analyze(root: &Path, config: &OrchestratorConfig) -> Result<Analysis> {
    let checked = checked_root(root)?;
    let findings = scan(&checked, config)?;
    Ok(analyze_repository(&checked, &config.skip_dirs).with_findings(findings))
}

/// Render prompts for `phases` (all phases when empty)
pub fn generate(
    analysis: &Analysis,
    phases: &[u8],
    config: &OrchestratorConfig,
) -> Result<Vec<Prompt>> {
    let phases: Vec<u8> = if phases.is_empty() {
        (0..PHASE_COUNT).collect()
    } else {
        phases.to_vec()
    };
    let mut generator = PromptGenerator::new(config.template_loader())
        .with_max_document_chars(config.max_document_chars);
    let prompts = generator
        .generate_phases(&phases, analysis)
        .context("Prompt generation failed")?;
    log_found!(prompts.len(), "prompts");
    Ok(prompts)
}

/// Execute a named workflow.
///
/// With `generate` unset every reference is acknowledged without rendering;
/// otherwise each reference is rendered against a fresh analysis of `root`.
pub fn run_workflow(
    loader: &mut WorkflowLoader,
    name: &str,
    root: &Path,
    generate: bool,
    config: &OrchestratorConfig,
) -> Result<WorkflowRun> {
    let workflow = loader.load(name)?;
    log_info!(
        "Workflow '{}' v{}: {} sections, {} prompts",
        workflow.name,
        workflow.version,
        workflow.sections.len(),
        workflow.total_prompts()
    );

    if !generate {
        return Ok(WorkflowExecutor::new(AcknowledgeRunner).execute(&workflow));
    }

    let analysis = analyze(root, config)?;
    let mut generator = PromptGenerator::new(config.template_loader())
        .with_max_document_chars(config.max_document_chars);
    let run = WorkflowExecutor::new(GeneratingRunner::new(&mut generator, &analysis))
        .execute(&workflow);
    Ok(run)
}

pub fn export_prompts(
    title: &str,
    prompts: &[Prompt],
    format: PromptFormat,
    output_dir: &Path,
) -> Result<PathBuf> {
    let content = format.render(title, prompts)?;
    let path = write_artifact(output_dir, "prompts", format.extension(), &content, "Generated prompts")?;
    Ok(path)
}

pub fn export_findings(
    findings: &[Finding],
    format: FindingFormat,
    output_dir: &Path,
) -> Result<PathBuf> {
    let content = format.render(findings)?;
    let path = write_artifact(output_dir, "findings", format.extension(), &content, "Scan findings")?;
    Ok(path)
}

/// Findings at or above `threshold`
pub fn filter_severity(findings: Vec<Finding>, threshold: Severity) -> Vec<Finding> {
    findings
        .into_iter()
        .filter(|f| f.severity <= threshold)
        .collect()
}

/// True if any finding is critical or high
pub fn has_blocking_findings(findings: &[Finding]) -> bool {
    findings.iter().any(|f| f.severity <= Severity::High)
}

/// Title used for prompt exports
pub fn export_title(analysis: &Analysis) -> String {
    format!("Review prompts for {}", project_name(analysis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_rejects_missing_directory() {
        let err = scan(Path::new("/definitely/not/here"), &OrchestratorConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Not a directory"));
    }

    #[test]
    fn test_filter_severity_keeps_worse_and_equal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("app.py"),
            "password = \"hunter2\"\n# TODO: tidy\nprint(\"debug\")\n",
        )
        .unwrap();
        let findings = scan(dir.path(), &OrchestratorConfig::default()).unwrap();
        assert!(has_blocking_findings(&findings));

        let high_only = filter_severity(findings.clone(), Severity::High);
        assert!(!high_only.is_empty());
        assert!(high_only.iter().all(|f| f.severity <= Severity::High));
        assert!(high_only.len() < findings.len());
    }
}
