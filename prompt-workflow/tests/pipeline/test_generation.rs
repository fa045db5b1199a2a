//! Phase generation and template gating against analysed repositories

use super::common::*;
use prompt_workflow::analysis::Analysis;
use prompt_workflow::config::OrchestratorConfig;
use prompt_workflow::orchestrator;
use prompt_workflow::phases::{PromptGenerator, TemplateOutcome};
use prompt_workflow::templates::{TemplateLoader, TemplateRef};

fn ids(prompts: &[prompt_workflow::templates::Prompt]) -> Vec<&str> {
    prompts.iter().map(|p| p.template_id.as_str()).collect()
}

#[test]
fn test_architecture_review_needs_architecture_docs() {
    let config = OrchestratorConfig::default();

    let plain = readme_only_repo();
    let analysis = orchestrator::analyze(plain.path(), &config).unwrap();
    let prompts = orchestrator::generate(&analysis, &[0], &config).unwrap();
    assert!(ids(&prompts).contains(&"readme_review"));
    assert!(!ids(&prompts).contains(&"architecture_review"));

    let documented = sample_repo();
    let analysis = orchestrator::analyze(documented.path(), &config).unwrap();
    let prompts = orchestrator::generate(&analysis, &[0], &config).unwrap();
    assert!(ids(&prompts).contains(&"architecture_review"));
    assert!(prompts.iter().all(|p| p.phase == Some(0)));
}

#[test]
fn test_empty_analysis_generates_nothing() {
    let mut generator = PromptGenerator::default();
    let prompts = generator
        .generate_phases(&[0, 1, 2, 3, 4], &Analysis::new("/work/empty"))
        .unwrap();
    assert!(prompts.is_empty());
}

#[test]
fn test_missing_context_requirement_excludes_template() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "phase1.yaml",
        r#"
templates:
  - id: needs_unknown
    title: Needs an unknown key
    objective: Look at {unknown_key}
    tasks: [Inspect]
    deliverable: Notes
    context_requirements: [unknown_key]
  - id: languages
    title: Languages
    objective: Review {language_summary}
    tasks: [Inspect]
    deliverable: Notes
    context_requirements: [language_summary]
"#,
    );
    let repo = sample_repo();
    let config = OrchestratorConfig::default();
    let analysis = orchestrator::analyze(repo.path(), &config).unwrap();

    let mut generator = PromptGenerator::new(TemplateLoader::from_dir(dir.path()));
    let prompts = generator.generate_phase(1, &analysis).unwrap();
    assert_eq!(ids(&prompts), vec!["languages"]);
    assert!(prompts[0].objective.contains("rust"));
}

#[test]
fn test_reference_lookup_reports_gate() {
    let repo = readme_only_repo();
    let analysis = orchestrator::analyze(repo.path(), &OrchestratorConfig::default()).unwrap();
    let mut generator = PromptGenerator::default();

    let outcome = generator
        .generate_template(&TemplateRef::parse("architecture_review"), &analysis)
        .unwrap();
    assert!(matches!(outcome, TemplateOutcome::ConditionalFalse(_)));

    let outcome = generator
        .generate_template(&TemplateRef::parse("phase0#readme_review"), &analysis)
        .unwrap();
    assert!(outcome.skip_reason().is_none());

    assert!(generator
        .generate_template(&TemplateRef::parse("no_such_template"), &analysis)
        .is_err());
}
