//! Rule engine behaviour over files on disk

use super::common::*;
use prompt_workflow::analysis::languages::file_language_map;
use prompt_workflow::config::OrchestratorConfig;
use prompt_workflow::orchestrator;
use prompt_workflow::rules::{builtin_rules, parse_rules, RuleEngine, Severity};

#[test]
fn test_password_line_yields_one_high_finding() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "settings.py", "password = \"abc123\"");

    let engine = RuleEngine::from_configs(builtin_rules());
    let findings = engine.scan_file(&dir.path().join("settings.py"), "python");

    let hits: Vec<_> = findings
        .iter()
        .filter(|f| f.rule_id == "hardcoded-password")
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].severity, Severity::High);
    assert_eq!(hits[0].line_number, 1);
    assert_eq!(hits[0].category, "secrets");
}

#[test]
fn test_rules_only_apply_to_their_languages() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "notes.txt", "print(\"hello\")\n");

    let engine = RuleEngine::from_configs(builtin_rules());
    assert!(engine
        .scan_file(&dir.path().join("notes.txt"), "plaintext")
        .is_empty());
    assert!(!engine
        .scan_file(&dir.path().join("notes.txt"), "python")
        .is_empty());
}

#[test]
fn test_scan_is_deterministic() {
    let repo = sample_repo();
    let config = OrchestratorConfig::default();

    let first = orchestrator::scan(repo.path(), &config).unwrap();
    let second = orchestrator::scan(repo.path(), &config).unwrap();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_severity_buckets_always_present() {
    let repo = sample_repo();
    let files = file_language_map(repo.path(), &OrchestratorConfig::default().skip_dirs);
    let mut engine = RuleEngine::from_configs(builtin_rules());
    engine.scan_directory(repo.path(), &files);

    let grouped = engine.findings_by_severity();
    assert_eq!(grouped.len(), 5);
    assert!(grouped[&Severity::Critical].is_empty());
    assert!(!grouped[&Severity::High].is_empty());
    assert!(!grouped[&Severity::Info].is_empty());
}

#[test]
fn test_invalid_pattern_is_reported_not_fatal() {
    let yaml = r#"
rules:
  - id: broken
    name: Broken
    severity: low
    pattern: '(unclosed'
    languages: [python]
  - id: print-call
    name: Print call
    severity: low
    pattern: 'print\('
    languages: [python]
"#;
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a.py", "print(1)\n");

    let engine = RuleEngine::from_configs(parse_rules(yaml).unwrap());
    assert_eq!(engine.compile_failures(), vec!["broken"]);
    let findings = engine.scan_file(&dir.path().join("a.py"), "python");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, "print-call");
}
