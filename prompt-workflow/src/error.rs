//! Error types for scanning, template loading and workflow loading.
//!
//! Scanning is best-effort: [`ScanError`] values are logged by the caller and the
//! offending item is dropped. Template and workflow loading is strict: their
//! errors abort the load and are surfaced to the user.

use std::path::PathBuf;
use thiserror::Error;

/// Per-item failure while scanning or analysing a repository
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rule '{rule_id}' has an invalid pattern: {message}")]
    InvalidPattern { rule_id: String, message: String },

    #[error("rule '{rule_id}' has unknown severity '{value}'")]
    InvalidSeverity { rule_id: String, value: String },

    #[error("rule record #{index} is malformed: {message}")]
    MalformedRule { index: usize, message: String },

    #[error("failed to parse manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error("failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

/// Failure loading the templates of a phase
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("phase {0} is out of range (expected 0-4)")]
    UnknownPhase(u8),

    #[error("no template file for phase {phase} at {path}")]
    Missing { phase: u8, path: PathBuf },

    #[error("failed to read template file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse templates for phase {phase}: {message}")]
    Parse { phase: u8, message: String },

    #[error("template '{template}' in phase {phase} is missing required field(s): {}", .fields.join(", "))]
    MissingFields {
        phase: u8,
        template: String,
        fields: Vec<&'static str>,
    },

    #[error("template '{reference}' was not found")]
    NotFound { reference: String },
}

/// Failure loading a workflow definition
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("workflow '{name}' not found. Available workflows: {}", format_available(.available))]
    NotFound { name: String, available: Vec<String> },

    #[error("failed to read workflow file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse workflow '{name}': {message}")]
    Parse { name: String, message: String },

    #[error("workflow '{name}' is invalid: {message}")]
    InvalidStructure { name: String, message: String },
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "(none)".to_string()
    } else {
        available.join(", ")
    }
}

/// Failure writing an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_names_template_and_fields() {
        let err = TemplateError::MissingFields {
            phase: 2,
            template: "dependency_audit".to_string(),
            fields: vec!["objective", "tasks"],
        };
        let msg = err.to_string();
        assert!(msg.contains("dependency_audit"));
        assert!(msg.contains("objective, tasks"));
        assert!(msg.contains("phase 2"));
    }

    #[test]
    fn test_not_found_lists_available() {
        let err = WorkflowError::NotFound {
            name: "nightly".to_string(),
            available: vec!["full_review".to_string(), "security_audit".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("nightly"));
        assert!(msg.contains("full_review, security_audit"));
    }

    #[test]
    fn test_not_found_with_no_workflows() {
        let err = WorkflowError::NotFound {
            name: "x".to_string(),
            available: vec![],
        };
        assert!(err.to_string().contains("(none)"));
    }
}
