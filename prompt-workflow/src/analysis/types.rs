//! Result shapes produced by the repository analysers.
//!
//! The prompt phases consume these through [`Analysis`], which holds whatever
//! has been collected so far. Every section is optional: a phase whose input is
//! missing produces no prompts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::rules::{Finding, Severity};

// ============================================================================
// Languages & Structure
// ============================================================================

/// Per-language totals for a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageStats {
    pub language: String,
    pub files: usize,
    pub lines: usize,
    /// Share of all counted lines, 0-100
    pub percentage: f64,
}

/// Structural overview of a repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeStructure {
    pub total_files: usize,
    pub total_lines: usize,
    /// Sorted by line count, largest first
    pub languages: Vec<LanguageStats>,
    pub frameworks: Vec<String>,
    pub top_level_dirs: Vec<String>,
    /// Paths relative to the repository root
    pub entry_points: Vec<PathBuf>,
}

impl CodeStructure {
    pub fn primary_language(&self) -> Option<&str> {
        self.languages.first().map(|l| l.language.as_str())
    }
}

// ============================================================================
// Documentation
// ============================================================================

/// Category assigned to a discovered document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Primary,
    Architecture,
    Setup,
    Api,
    Other,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Primary => "primary",
            DocumentType::Architecture => "architecture",
            DocumentType::Setup => "setup",
            DocumentType::Api => "api",
            DocumentType::Other => "other",
        }
    }
}

/// A documentation file and its raw text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredDocument {
    /// Path relative to the repository root
    pub path: PathBuf,
    pub doc_type: DocumentType,
    pub content: String,
}

/// Everything documentation discovery found
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentationFindings {
    pub documents: Vec<DiscoveredDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_instructions: Option<String>,
}

impl DocumentationFindings {
    pub fn of_type(&self, doc_type: DocumentType) -> impl Iterator<Item = &DiscoveredDocument> {
        self.documents.iter().filter(move |d| d.doc_type == doc_type)
    }

    pub fn has(&self, doc_type: DocumentType) -> bool {
        self.of_type(doc_type).next().is_some()
    }

    pub fn primary(&self) -> Option<&DiscoveredDocument> {
        self.of_type(DocumentType::Primary).next()
    }
}

// ============================================================================
// Dependencies
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    Runtime,
    Development,
    Build,
}

/// A declared dependency and the manifest it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
    pub dep_type: DependencyType,
    /// Manifest path relative to the repository root
    pub source: PathBuf,
}

// ============================================================================
// Validation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCategory {
    Architecture,
    Setup,
    Api,
}

impl ValidationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationCategory::Architecture => "architecture",
            ValidationCategory::Setup => "setup",
            ValidationCategory::Api => "api",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Documentation agrees with the code
    Consistent,
    /// Documentation claims something the code contradicts
    Drift,
    /// Nothing concrete to check
    Unverifiable,
}

impl ValidationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationStatus::Consistent => "consistent",
            ValidationStatus::Drift => "drift",
            ValidationStatus::Unverifiable => "unverifiable",
        }
    }
}

/// Outcome of checking one documentation claim against the repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub category: ValidationCategory,
    pub status: ValidationStatus,
    pub evidence: String,
    pub recommendation: String,
    pub severity: Severity,
}

// ============================================================================
// Analysis
// ============================================================================

/// Partial analysis of a repository, filled in by the analysers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analysis {
    pub root: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<CodeStructure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<DocumentationFindings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<Dependency>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Vec<ValidationFinding>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<Vec<Finding>>,
}

impl Analysis {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_structure(mut self, structure: CodeStructure) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn with_documentation(mut self, documentation: DocumentationFindings) -> Self {
        self.documentation = Some(documentation);
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = Some(dependencies);
        self
    }

    pub fn with_validation(mut self, validation: Vec<ValidationFinding>) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_findings(mut self, findings: Vec<Finding>) -> Self {
        self.findings = Some(findings);
        self
    }

    /// Documentation findings, if any document was discovered
    pub fn discovered_docs(&self) -> Option<&DocumentationFindings> {
        self.documentation
            .as_ref()
            .filter(|d| !d.documents.is_empty())
    }

    pub fn has_doc_type(&self, doc_type: DocumentType) -> bool {
        self.discovered_docs()
            .map(|d| d.has(doc_type))
            .unwrap_or(false)
    }
}
