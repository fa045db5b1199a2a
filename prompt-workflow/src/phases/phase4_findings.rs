//! Phase 4: rule finding context.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::analysis::Analysis;
use crate::phases::base_context;
use crate::rules::{Finding, Severity};
use crate::templates::Context;

pub const NAME: &str = "Findings Review";

/// Findings listed individually; the rest are summarised as a count
const MAX_LISTED_FINDINGS: usize = 50;
const MAX_TOP_FILES: usize = 10;

pub fn build_context(analysis: &Analysis) -> Option<Context> {
    let findings = analysis.findings.as_ref().filter(|f| !f.is_empty())?;
    let mut context = base_context(analysis);

    context.insert("finding_count".to_string(), Value::from(findings.len()));
    for severity in Severity::ALL {
        let count = findings.iter().filter(|f| f.severity == severity).count();
        context.insert(format!("{}_count", severity.as_str()), Value::from(count));
    }
    let effort: u64 = findings
        .iter()
        .filter_map(|f| f.effort_minutes)
        .map(u64::from)
        .sum();
    context.insert("total_effort_minutes".to_string(), Value::from(effort));

    let mut ordered: Vec<&Finding> = findings.iter().collect();
    ordered.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.file_path.cmp(&b.file_path))
            .then_with(|| a.line_number.cmp(&b.line_number))
    });
    let mut summary: Vec<String> = ordered
        .iter()
        .take(MAX_LISTED_FINDINGS)
        .map(|f| {
            format!(
                "- [{}] {} at {}:{}: {}",
                f.severity,
                f.rule_name,
                f.file_path.display(),
                f.line_number,
                f.line_content
            )
        })
        .collect();
    if ordered.len() > MAX_LISTED_FINDINGS {
        summary.push(format!(
            "- ... and {} more",
            ordered.len() - MAX_LISTED_FINDINGS
        ));
    }
    context.insert(
        "findings_summary".to_string(),
        Value::String(summary.join("\n")),
    );

    let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
    for finding in findings {
        *by_category.entry(finding.category.as_str()).or_default() += 1;
    }
    let categories = by_category
        .iter()
        .map(|(category, count)| format!("- {}: {}", category, count))
        .collect::<Vec<_>>()
        .join("\n");
    context.insert("category_summary".to_string(), Value::String(categories));

    let mut by_file: BTreeMap<String, usize> = BTreeMap::new();
    for finding in findings {
        *by_file
            .entry(finding.file_path.display().to_string())
            .or_default() += 1;
    }
    let mut files: Vec<(String, usize)> = by_file.into_iter().collect();
    files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let top_files = files
        .iter()
        .take(MAX_TOP_FILES)
        .map(|(file, count)| format!("- {} ({})", file, count))
        .collect::<Vec<_>>()
        .join("\n");
    context.insert("top_files".to_string(), Value::String(top_files));

    Some(context)
}
