//! Line-oriented rule matching over files.
//!
//! The engine is tolerant: unreadable files and unusable rules are logged and
//! skipped, and a scan always completes with whatever could be matched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ScanError;
use crate::rules::types::{Finding, Rule, RuleConfig, Severity};

/// Applies a fixed set of rules to files
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
    findings: Vec<Finding>,
}

impl RuleEngine {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            findings: Vec::new(),
        }
    }

    /// Build an engine from configuration records.
    ///
    /// Records with an unknown severity are skipped with a warning.
    pub fn from_configs(configs: Vec<RuleConfig>) -> Self {
        let mut rules = Vec::with_capacity(configs.len());
        for config in configs {
            let id = config.id.clone();
            match Rule::from_config(config) {
                Ok(rule) => rules.push(rule),
                Err(e) => tracing::warn!("Skipping rule '{}': {}", id, e),
            }
        }
        Self::new(rules)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Ids of rules whose pattern failed to compile
    pub fn compile_failures(&self) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|r| !r.is_usable())
            .map(|r| r.id.as_str())
            .collect()
    }

    /// Findings from the most recent directory scan
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Scan one file with every usable rule that applies to `language`.
    ///
    /// Returns an empty list if the file cannot be read.
    pub fn scan_file(&self, path: &Path, language: &str) -> Vec<Finding> {
        match self.try_scan_file(path, language) {
            Ok(findings) => findings,
            Err(e) => {
                tracing::warn!("{}", e);
                Vec::new()
            }
        }
    }

    fn try_scan_file(&self, path: &Path, language: &str) -> Result<Vec<Finding>, ScanError> {
        let applicable: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|r| r.is_usable() && r.applies_to(language))
            .collect();
        if applicable.is_empty() {
            return Ok(Vec::new());
        }

        let bytes = std::fs::read(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8_lossy(&bytes);
        let lines: Vec<&str> = content.lines().collect();

        let mut findings = Vec::new();
        for rule in applicable {
            let Some(re) = rule.compiled() else { continue };
            for (idx, line) in lines.iter().enumerate() {
                if re.is_match(line) {
                    findings.push(Finding::new(rule, path.to_path_buf(), idx + 1, line));
                }
            }
        }
        Ok(findings)
    }

    /// Scan every file in `file_languages` and replace the stored findings.
    ///
    /// Relative paths are resolved against `root`. Entries that no longer exist
    /// or are not regular files are skipped.
    pub fn scan_directory(
        &mut self,
        root: &Path,
        file_languages: &BTreeMap<PathBuf, String>,
    ) -> &[Finding] {
        let mut findings = Vec::new();
        let mut scanned = 0usize;

        for (path, language) in file_languages {
            let full = if path.is_absolute() {
                path.clone()
            } else {
                root.join(path)
            };
            if !full.is_file() {
                tracing::debug!("Skipping {}: not a regular file", full.display());
                continue;
            }
            scanned += 1;
            // Report paths relative to the scanned root
            let reported = full.strip_prefix(root).unwrap_or(&full).to_path_buf();
            findings.extend(self.scan_file(&full, language).into_iter().map(|mut f| {
                f.file_path = reported.clone();
                f
            }));
        }

        tracing::info!("Scanned {} files, {} findings", scanned, findings.len());
        prompt_workflow_sdk::log_scan_complete!(scanned, findings.len());
        self.findings = findings;
        &self.findings
    }

    /// Latest findings bucketed by severity; all five levels are present
    pub fn findings_by_severity(&self) -> BTreeMap<Severity, Vec<&Finding>> {
        let mut grouped: BTreeMap<Severity, Vec<&Finding>> =
            Severity::ALL.iter().map(|s| (*s, Vec::new())).collect();
        for finding in &self.findings {
            grouped.entry(finding.severity).or_default().push(finding);
        }
        grouped
    }

    /// Latest findings keyed by rule category
    pub fn findings_by_category(&self) -> BTreeMap<String, Vec<&Finding>> {
        let mut grouped: BTreeMap<String, Vec<&Finding>> = BTreeMap::new();
        for finding in &self.findings {
            grouped
                .entry(finding.category.clone())
                .or_default()
                .push(finding);
        }
        grouped
    }

    /// Number of latest findings at or above `threshold`
    pub fn count_at_least(&self, threshold: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity <= threshold)
            .count()
    }
}
