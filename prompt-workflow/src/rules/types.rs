//! Data types for the rule engine.
//!
//! - **Severity** - explicitly ranked severity levels
//! - **RuleConfig** - a rule record as it appears in configuration
//! - **Rule** - a rule with its pattern compiled (or marked unusable)
//! - **Finding** - a single rule match at a file/line

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ScanError;

// ============================================================================
// Severity
// ============================================================================

/// Severity of a rule and of the findings it produces.
///
/// Ordering is by [`Severity::rank`]: `Critical < High < Medium < Low < Info`,
/// so "less than" reads as "more severe than" and sorting puts the worst first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// All levels, most severe first
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    /// Explicit rank; lower is more severe
    pub fn rank(self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Info => 4,
        }
    }

    /// True if `self` is strictly more severe than `other`
    pub fn is_more_severe_than(self, other: Severity) -> bool {
        self.rank() < other.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            "info" => Ok(Severity::Info),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

// ============================================================================
// Rule Types
// ============================================================================

/// Rule record as found in rule configuration files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Case-insensitive severity name
    pub severity: String,
    pub pattern: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub remediation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort_minutes: Option<u32>,
}

fn default_category() -> String {
    "general".to_string()
}

/// Descriptive metadata carried by a rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort_minutes: Option<u32>,
}

/// A scanning rule.
///
/// `compiled` is `None` when the pattern failed to compile; such a rule is kept
/// for reporting but never matches anything.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub pattern: String,
    compiled: Option<Regex>,
    pub languages: BTreeSet<String>,
    pub remediation: String,
    pub metadata: RuleMetadata,
}

impl Rule {
    /// Build a rule, compiling its pattern once.
    ///
    /// A pattern that does not compile is logged and leaves the rule unusable.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        severity: Severity,
        pattern: impl Into<String>,
        languages: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let id = id.into();
        let pattern = pattern.into();
        let compiled = match compile_pattern(&id, &pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!("{}; rule excluded from scanning", e);
                None
            }
        };

        Self {
            id,
            name: name.into(),
            description: String::new(),
            severity,
            pattern,
            compiled,
            languages: languages.into_iter().map(Into::into).collect(),
            remediation: String::new(),
            metadata: RuleMetadata {
                category: default_category(),
                ..Default::default()
            },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = remediation.into();
        self
    }

    pub fn with_metadata(mut self, metadata: RuleMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Build a rule from a configuration record.
    ///
    /// Fails only on an unknown severity; a bad pattern yields an unusable rule.
    pub fn from_config(config: RuleConfig) -> Result<Self, ScanError> {
        let severity: Severity = config.severity.parse().map_err(|_| ScanError::InvalidSeverity {
            rule_id: config.id.clone(),
            value: config.severity.clone(),
        })?;
        Ok(Rule::new(
            config.id,
            config.name,
            severity,
            config.pattern,
            config.languages,
        )
        .with_description(config.description)
        .with_remediation(config.remediation)
        .with_metadata(RuleMetadata {
            category: config.category,
            code_example: config.code_example,
            effort_minutes: config.effort_minutes,
        }))
    }

    pub fn compiled(&self) -> Option<&Regex> {
        self.compiled.as_ref()
    }

    pub fn is_usable(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn applies_to(&self, language: &str) -> bool {
        self.languages.contains(language)
    }
}

fn compile_pattern(rule_id: &str, pattern: &str) -> Result<Regex, ScanError> {
    Regex::new(pattern).map_err(|e| ScanError::InvalidPattern {
        rule_id: rule_id.to_string(),
        message: e.to_string(),
    })
}

// ============================================================================
// Finding
// ============================================================================

/// A single rule match at a specific file and line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub rule_name: String,
    pub severity: Severity,
    pub file_path: PathBuf,
    /// 1-based line number
    pub line_number: usize,
    /// Matched line with surrounding whitespace trimmed
    pub line_content: String,
    pub description: String,
    pub category: String,
    pub remediation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort_minutes: Option<u32>,
}

impl Finding {
    pub(crate) fn new(rule: &Rule, file_path: PathBuf, line_number: usize, line: &str) -> Self {
        Self {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            severity: rule.severity,
            file_path,
            line_number,
            line_content: line.trim().to_string(),
            description: rule.description.clone(),
            category: rule.metadata.category.clone(),
            remediation: rule.remediation.clone(),
            effort_minutes: rule.metadata.effort_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_total_order() {
        assert!(Severity::Critical < Severity::High);
        assert!(Severity::High < Severity::Medium);
        assert!(Severity::Medium < Severity::Low);
        assert!(Severity::Low < Severity::Info);
        assert!(Severity::Critical.is_more_severe_than(Severity::Info));
        assert!(!Severity::Low.is_more_severe_than(Severity::Low));

        let mut levels = vec![Severity::Info, Severity::Critical, Severity::Low, Severity::High];
        levels.sort();
        assert_eq!(
            levels,
            vec![Severity::Critical, Severity::High, Severity::Low, Severity::Info]
        );
    }

    #[test]
    fn test_severity_ranks_match_all_order() {
        for (i, level) in Severity::ALL.iter().enumerate() {
            assert_eq!(level.rank() as usize, i);
        }
    }

    #[test]
    fn test_severity_parse_case_insensitive() {
        assert_eq!("HIGH".parse::<Severity>(), Ok(Severity::High));
        assert_eq!(" Critical ".parse::<Severity>(), Ok(Severity::Critical));
        assert_eq!("info".parse::<Severity>(), Ok(Severity::Info));
        assert!("severe".parse::<Severity>().is_err());
    }

    #[test]
    fn test_invalid_pattern_marks_rule_unusable() {
        let rule = Rule::new("bad", "Bad", Severity::Low, "([unclosed", ["python"]);
        assert!(!rule.is_usable());
        assert!(rule.compiled().is_none());
    }

    #[test]
    fn test_from_config_defaults() {
        let config: RuleConfig = serde_yaml::from_str(
            r#"
id: py-eval
name: Use of eval
severity: High
pattern: '\beval\('
languages: [python]
"#,
        )
        .unwrap();
        let rule = Rule::from_config(config).unwrap();
        assert_eq!(rule.severity, Severity::High);
        assert_eq!(rule.metadata.category, "general");
        assert!(rule.applies_to("python"));
        assert!(!rule.applies_to("rust"));
    }

    #[test]
    fn test_from_config_unknown_severity() {
        let config = RuleConfig {
            id: "x".to_string(),
            name: "X".to_string(),
            description: String::new(),
            severity: "urgent".to_string(),
            pattern: "x".to_string(),
            languages: vec![],
            category: "general".to_string(),
            remediation: String::new(),
            code_example: None,
            effort_minutes: None,
        };
        match Rule::from_config(config) {
            Err(ScanError::InvalidSeverity { rule_id, value }) => {
                assert_eq!(rule_id, "x");
                assert_eq!(value, "urgent");
            }
            other => panic!("expected InvalidSeverity, got {:?}", other.map(|r| r.id)),
        }
    }
}
