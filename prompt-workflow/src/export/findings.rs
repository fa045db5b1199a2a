//! Finding export: terminal text, JSON and SARIF 2.1.0.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::error::ExportError;
use crate::rules::{Finding, Severity};

pub const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";
pub const SARIF_VERSION: &str = "2.1.0";

/// SARIF result level for a severity
pub fn sarif_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low | Severity::Info => "note",
    }
}

/// Human-readable report, worst findings first
pub fn findings_to_text(findings: &[Finding]) -> String {
    let mut out = String::new();
    if findings.is_empty() {
        out.push_str("No findings.\n");
        return out;
    }

    let mut by_severity: BTreeMap<Severity, Vec<&Finding>> = BTreeMap::new();
    for finding in findings {
        by_severity.entry(finding.severity).or_default().push(finding);
    }

    for (severity, group) in &by_severity {
        let _ = writeln!(
            out,
            "{} ({})",
            severity.as_str().to_uppercase(),
            group.len()
        );
        for finding in group {
            let _ = writeln!(
                out,
                "  {}:{}  [{}] {}",
                finding.file_path.display(),
                finding.line_number,
                finding.rule_id,
                finding.rule_name
            );
            let _ = writeln!(out, "      {}", finding.line_content);
            if !finding.remediation.is_empty() {
                let _ = writeln!(out, "      fix: {}", finding.remediation);
            }
        }
        out.push('\n');
    }

    let counts: Vec<String> = Severity::ALL
        .iter()
        .map(|s| {
            let n = by_severity.get(s).map(Vec::len).unwrap_or(0);
            format!("{} {}", n, s)
        })
        .collect();
    let _ = writeln!(out, "{} findings: {}", findings.len(), counts.join(", "));
    out
}

pub fn findings_to_json(findings: &[Finding]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(findings)?)
}

/// SARIF log with one run; rules are derived from the distinct rule ids seen
pub fn findings_to_sarif(findings: &[Finding]) -> Result<String, ExportError> {
    let mut rules: BTreeMap<&str, &Finding> = BTreeMap::new();
    for finding in findings {
        rules.entry(finding.rule_id.as_str()).or_insert(finding);
    }
    let rule_index: BTreeMap<&str, usize> = rules
        .keys()
        .enumerate()
        .map(|(i, id)| (*id, i))
        .collect();

    let rule_descriptors: Vec<Value> = rules
        .values()
        .map(|f| {
            let full = if f.description.is_empty() {
                &f.rule_name
            } else {
                &f.description
            };
            json!({
                "id": f.rule_id,
                "name": f.rule_name,
                "shortDescription": { "text": f.rule_name },
                "fullDescription": { "text": full },
                "help": { "text": f.remediation },
                "defaultConfiguration": { "level": sarif_level(f.severity) },
                "properties": {
                    "category": f.category,
                    "severity": f.severity.as_str(),
                },
            })
        })
        .collect();

    let results: Vec<Value> = findings
        .iter()
        .map(|f| {
            let uri = f.file_path.to_string_lossy().replace('\\', "/");
            json!({
                "ruleId": f.rule_id,
                "ruleIndex": rule_index[f.rule_id.as_str()],
                "level": sarif_level(f.severity),
                "message": { "text": format!("{}: {}", f.rule_name, f.line_content) },
                "locations": [{
                    "physicalLocation": {
                        "artifactLocation": { "uri": uri },
                        "region": {
                            "startLine": f.line_number,
                            "snippet": { "text": f.line_content },
                        },
                    },
                }],
            })
        })
        .collect();

    let log = json!({
        "$schema": SARIF_SCHEMA,
        "version": SARIF_VERSION,
        "runs": [{
            "tool": {
                "driver": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                    "rules": rule_descriptors,
                },
            },
            "results": results,
        }],
    });
    Ok(serde_json::to_string_pretty(&log)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn finding(rule_id: &str, severity: Severity, line: usize) -> Finding {
        Finding {
            rule_id: rule_id.to_string(),
            rule_name: format!("{} rule", rule_id),
            severity,
            file_path: PathBuf::from("src/app.py"),
            line_number: line,
            line_content: "password = \"x\"".to_string(),
            description: String::new(),
            category: "security".to_string(),
            remediation: "Use a secret store".to_string(),
            effort_minutes: None,
        }
    }

    #[test]
    fn test_sarif_levels_and_rule_index() {
        let findings = vec![
            finding("b-rule", Severity::Critical, 3),
            finding("a-rule", Severity::Medium, 7),
            finding("b-rule", Severity::Critical, 9),
        ];
        let sarif: Value = serde_json::from_str(&findings_to_sarif(&findings).unwrap()).unwrap();

        assert_eq!(sarif["version"], "2.1.0");
        let run = &sarif["runs"][0];
        let rules = run["tool"]["driver"]["rules"].as_array().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0]["id"], "a-rule");

        let results = run["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0]["level"], "error");
        assert_eq!(results[0]["ruleIndex"], 1);
        assert_eq!(results[1]["level"], "warning");
        assert_eq!(
            results[2]["locations"][0]["physicalLocation"]["region"]["startLine"],
            9
        );
    }

    #[test]
    fn test_low_and_info_are_notes() {
        assert_eq!(sarif_level(Severity::Low), "note");
        assert_eq!(sarif_level(Severity::Info), "note");
        assert_eq!(sarif_level(Severity::High), "error");
    }

    #[test]
    fn test_text_report() {
        let text = findings_to_text(&[
            finding("weak", Severity::Low, 2),
            finding("secret", Severity::High, 1),
        ]);
        let high = text.find("HIGH (1)").unwrap();
        let low = text.find("LOW (1)").unwrap();
        assert!(high < low);
        assert!(text.contains("src/app.py:1  [secret] secret rule"));
        assert!(text.ends_with("2 findings: 0 critical, 1 high, 0 medium, 1 low, 0 info\n"));
        assert_eq!(findings_to_text(&[]), "No findings.\n");
    }
}
