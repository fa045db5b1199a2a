//! Analyse, generate and export in one pass

use super::common::*;
use prompt_workflow::config::OrchestratorConfig;
use prompt_workflow::export::{FindingFormat, PromptFormat};
use prompt_workflow::orchestrator;
use std::fs;

#[test]
fn test_generate_and_export_markdown() {
    let repo = sample_repo();
    let out = tempfile::tempdir().unwrap();
    let config = OrchestratorConfig::default();

    let analysis = orchestrator::analyze(repo.path(), &config).unwrap();
    assert!(analysis.findings.as_ref().is_some_and(|f| !f.is_empty()));

    let prompts = orchestrator::generate(&analysis, &[], &config).unwrap();
    let phases: Vec<u8> = prompts.iter().filter_map(|p| p.phase).collect();
    assert!(phases.contains(&0));
    assert!(phases.contains(&1));
    assert!(phases.contains(&2));
    assert!(phases.contains(&4));
    assert!(phases.windows(2).all(|w| w[0] <= w[1]));

    let title = orchestrator::export_title(&analysis);
    let path = orchestrator::export_prompts(&title, &prompts, PromptFormat::Markdown, out.path()).unwrap();
    let markdown = fs::read_to_string(path).unwrap();
    assert!(markdown.starts_with("# Review prompts for "));
    assert!(markdown.contains("## Phase 0: Documentation Review"));
    assert!(markdown.contains("findings_triage"));
}

#[test]
fn test_scan_exports_sarif() {
    let repo = sample_repo();
    let out = tempfile::tempdir().unwrap();
    let config = OrchestratorConfig::default();

    let findings = orchestrator::scan(repo.path(), &config).unwrap();
    assert!(orchestrator::has_blocking_findings(&findings));

    let path = orchestrator::export_findings(&findings, FindingFormat::Sarif, out.path()).unwrap();
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("sarif"));
    let sarif: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(sarif["version"], "2.1.0");
    let results = sarif["runs"][0]["results"].as_array().unwrap();
    assert_eq!(results.len(), findings.len());
    assert!(results.iter().any(|r| r["ruleId"] == "hardcoded-password" && r["level"] == "error"));

    let root = repo.path().canonicalize().unwrap();
    for finding in &findings {
        assert!(finding.file_path.is_relative(), "{}", finding.file_path.display());
    }
    for result in results {
        let uri = result["locations"][0]["physicalLocation"]["artifactLocation"]["uri"]
            .as_str()
            .unwrap();
        assert!(!uri.starts_with('/'), "{}", uri);
        assert!(!uri.contains(&*root.to_string_lossy()), "{}", uri);
    }
}

#[test]
fn test_repo_config_file_is_discovered() {
    let repo = sample_repo();
    write_file(
        repo.path(),
        "prompt-workflow.yaml",
        "include_builtin_rules: false\nrule_files: [rules/local.yaml]\n",
    );
    write_file(
        repo.path(),
        "rules/local.yaml",
        "rules:\n  - id: no-println\n    name: println\n    severity: info\n    pattern: 'println!'\n    languages: [rust]\n",
    );

    let config = OrchestratorConfig::discover(None, Some(repo.path())).unwrap();
    let findings = orchestrator::scan(repo.path(), &config).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, "no-println");
    assert!(!orchestrator::has_blocking_findings(&findings));
}
