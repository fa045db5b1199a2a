//! Rule set loading from YAML.
//!
//! Rule files look like:
//!
//! ```yaml
//! rules:
//!   - id: hardcoded-password
//!     name: Hardcoded password
//!     severity: high
//!     pattern: 'password\s*=\s*["''][^"'']+["'']'
//!     languages: [python]
//! ```
//!
//! Individual malformed records are skipped with a warning; only an unreadable
//! or structurally broken file is an error.

use anyhow::{Context, Result};
use serde_yaml::Value;
use std::path::Path;

use crate::error::ScanError;
use crate::rules::types::RuleConfig;

const BUILTIN_SECURITY: &str = include_str!("../../config/rules/security.yaml");
const BUILTIN_QUALITY: &str = include_str!("../../config/rules/quality.yaml");

/// Parse rule records from YAML text, skipping malformed entries
pub fn parse_rules(yaml: &str) -> Result<Vec<RuleConfig>> {
    let doc: Value = serde_yaml::from_str(yaml).context("Failed to parse rule YAML")?;
    let entries = match &doc {
        Value::Mapping(map) => map
            .get("rules")
            .and_then(Value::as_sequence)
            .ok_or_else(|| anyhow::anyhow!("rule file must contain a 'rules' list"))?,
        Value::Sequence(seq) => seq,
        _ => anyhow::bail!("rule file must be a 'rules' mapping or a list of rules"),
    };

    let mut configs = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match parse_record(index, entry) {
            Ok(config) => configs.push(config),
            Err(e) => tracing::warn!("{}; skipping", e),
        }
    }
    Ok(configs)
}

fn parse_record(index: usize, entry: &Value) -> Result<RuleConfig, ScanError> {
    serde_yaml::from_value(entry.clone()).map_err(|e| ScanError::MalformedRule {
        index,
        message: e.to_string(),
    })
}

/// Load rule records from a YAML file
pub fn load_rules_file(path: &Path) -> Result<Vec<RuleConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rule file: {}", path.display()))?;
    parse_rules(&content).with_context(|| format!("Invalid rule file: {}", path.display()))
}

/// Rule records shipped with the binary (security, then quality)
pub fn builtin_rules() -> Vec<RuleConfig> {
    let mut configs = Vec::new();
    for (name, yaml) in [("security", BUILTIN_SECURITY), ("quality", BUILTIN_QUALITY)] {
        match parse_rules(yaml) {
            Ok(rules) => configs.extend(rules),
            Err(e) => tracing::warn!("Built-in {} rules failed to load: {:#}", name, e),
        }
    }
    configs
}
