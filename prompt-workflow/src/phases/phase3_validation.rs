//! Phase 3: documentation drift context.

use serde_json::Value;

use crate::analysis::{Analysis, ValidationCategory, ValidationFinding, ValidationStatus};
use crate::phases::{base_context, truncate_text};
use crate::templates::Context;

pub const NAME: &str = "Documentation Drift";

fn finding_line(finding: &ValidationFinding) -> String {
    format!(
        "- [{}] {} ({}): {}\n  Recommendation: {}",
        finding.severity,
        finding.category.as_str(),
        finding.status.as_str(),
        finding.evidence,
        finding.recommendation
    )
}

fn lines<'a>(findings: impl Iterator<Item = &'a ValidationFinding>) -> Option<String> {
    let text = findings.map(finding_line).collect::<Vec<_>>().join("\n");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Context for drift templates, or `None` when validation has not produced results
pub fn build_context(analysis: &Analysis, max_chars: usize) -> Option<Context> {
    let results = analysis.validation.as_ref().filter(|v| !v.is_empty())?;
    let mut context = base_context(analysis);

    let count = |status: ValidationStatus| results.iter().filter(|f| f.status == status).count();
    context.insert("validation_count".to_string(), Value::from(results.len()));
    context.insert(
        "drift_count".to_string(),
        Value::from(count(ValidationStatus::Drift)),
    );
    context.insert(
        "consistent_count".to_string(),
        Value::from(count(ValidationStatus::Consistent)),
    );
    context.insert(
        "unverifiable_count".to_string(),
        Value::from(count(ValidationStatus::Unverifiable)),
    );

    if let Some(summary) = lines(results.iter()) {
        context.insert(
            "validation_summary".to_string(),
            Value::String(truncate_text(&summary, max_chars)),
        );
    }

    let mut drift: Vec<&ValidationFinding> = results
        .iter()
        .filter(|f| f.status == ValidationStatus::Drift)
        .collect();
    drift.sort_by_key(|f| f.severity);
    if let Some(text) = lines(drift.into_iter()) {
        context.insert(
            "drift_findings".to_string(),
            Value::String(truncate_text(&text, max_chars)),
        );
    }

    let categories = [
        ("architecture_validation", ValidationCategory::Architecture),
        ("setup_validation", ValidationCategory::Setup),
        ("api_validation", ValidationCategory::Api),
    ];
    for (key, category) in categories {
        if let Some(text) = lines(results.iter().filter(|f| f.category == category)) {
            context.insert(key.to_string(), Value::String(truncate_text(&text, max_chars)));
        }
    }

    if let Some(claimed) = analysis
        .documentation
        .as_ref()
        .and_then(|d| d.claimed_architecture.as_deref())
    {
        context.insert(
            "claimed_architecture".to_string(),
            Value::String(truncate_text(claimed.trim(), max_chars)),
        );
    }

    Some(context)
}
