//! Named predicates gating template inclusion.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::analysis::{Analysis, DocumentType, ValidationStatus};

/// A named boolean gate evaluated against the current analysis.
///
/// Names that are not recognised parse to [`Conditional::Unknown`], which always
/// evaluates to false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conditional {
    HasDocumentation,
    HasArchitectureDocs,
    HasSetupInstructions,
    HasApiDocs,
    HasDependencies,
    HasValidationResults,
    HasDrift,
    HasFindings,
    Unknown(String),
}

impl Conditional {
    pub fn parse(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "has_documentation" | "has_docs" => Conditional::HasDocumentation,
            "has_architecture_docs" | "has_architecture_documentation" => {
                Conditional::HasArchitectureDocs
            }
            "has_setup_instructions" | "has_setup_docs" => Conditional::HasSetupInstructions,
            "has_api_docs" | "has_api_documentation" => Conditional::HasApiDocs,
            "has_dependencies" => Conditional::HasDependencies,
            "has_validation_results" => Conditional::HasValidationResults,
            "has_drift" => Conditional::HasDrift,
            "has_findings" => Conditional::HasFindings,
            _ => Conditional::Unknown(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Conditional::HasDocumentation => "has_documentation",
            Conditional::HasArchitectureDocs => "has_architecture_docs",
            Conditional::HasSetupInstructions => "has_setup_instructions",
            Conditional::HasApiDocs => "has_api_docs",
            Conditional::HasDependencies => "has_dependencies",
            Conditional::HasValidationResults => "has_validation_results",
            Conditional::HasDrift => "has_drift",
            Conditional::HasFindings => "has_findings",
            Conditional::Unknown(name) => name,
        }
    }

    pub fn evaluate(&self, analysis: &Analysis) -> bool {
        match self {
            Conditional::HasDocumentation => analysis.discovered_docs().is_some(),
            Conditional::HasArchitectureDocs => analysis.has_doc_type(DocumentType::Architecture),
            Conditional::HasSetupInstructions => analysis
                .documentation
                .as_ref()
                .and_then(|d| d.setup_instructions.as_ref())
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false),
            Conditional::HasApiDocs => analysis.has_doc_type(DocumentType::Api),
            Conditional::HasDependencies => analysis
                .dependencies
                .as_ref()
                .map(|d| !d.is_empty())
                .unwrap_or(false),
            Conditional::HasValidationResults => analysis
                .validation
                .as_ref()
                .map(|v| !v.is_empty())
                .unwrap_or(false),
            Conditional::HasDrift => analysis
                .validation
                .as_ref()
                .map(|v| v.iter().any(|f| f.status == ValidationStatus::Drift))
                .unwrap_or(false),
            Conditional::HasFindings => analysis
                .findings
                .as_ref()
                .map(|f| !f.is_empty())
                .unwrap_or(false),
            Conditional::Unknown(name) => {
                tracing::debug!("Unknown conditional '{}' evaluates to false", name);
                false
            }
        }
    }
}

impl fmt::Display for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Conditional {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Conditional {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Conditional::parse(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{DiscoveredDocument, DocumentationFindings};
    use std::path::PathBuf;

    fn analysis_with_docs(types: &[DocumentType]) -> Analysis {
        let documents = types
            .iter()
            .map(|t| DiscoveredDocument {
                path: PathBuf::from(format!("{}.md", t.as_str())),
                doc_type: *t,
                content: "content".to_string(),
            })
            .collect();
        Analysis::new("/repo").with_documentation(DocumentationFindings {
            documents,
            claimed_architecture: None,
            setup_instructions: None,
        })
    }

    #[test]
    fn test_parse_known_names() {
        assert_eq!(
            Conditional::parse("has_architecture_docs"),
            Conditional::HasArchitectureDocs
        );
        assert_eq!(
            Conditional::parse("Has-Setup-Instructions"),
            Conditional::HasSetupInstructions
        );
        assert_eq!(Conditional::parse("has_dependencies"), Conditional::HasDependencies);
    }

    #[test]
    fn test_unknown_fails_closed() {
        let cond = Conditional::parse("has_quantum_entanglement");
        assert_eq!(cond, Conditional::Unknown("has_quantum_entanglement".to_string()));
        let analysis = analysis_with_docs(&[DocumentType::Primary, DocumentType::Architecture]);
        assert!(!cond.evaluate(&analysis));
    }

    #[test]
    fn test_architecture_docs() {
        let without = analysis_with_docs(&[DocumentType::Primary]);
        let with = analysis_with_docs(&[DocumentType::Primary, DocumentType::Architecture]);
        assert!(!Conditional::HasArchitectureDocs.evaluate(&without));
        assert!(Conditional::HasArchitectureDocs.evaluate(&with));
        assert!(Conditional::HasDocumentation.evaluate(&without));
    }

    #[test]
    fn test_empty_analysis_is_false_everywhere() {
        let analysis = Analysis::new("/repo");
        for cond in [
            Conditional::HasDocumentation,
            Conditional::HasArchitectureDocs,
            Conditional::HasSetupInstructions,
            Conditional::HasApiDocs,
            Conditional::HasDependencies,
            Conditional::HasValidationResults,
            Conditional::HasDrift,
            Conditional::HasFindings,
        ] {
            assert!(!cond.evaluate(&analysis), "{} should be false", cond);
        }
    }

    #[test]
    fn test_serde_roundtrip_as_string() {
        let cond: Conditional = serde_yaml::from_str("has_findings").unwrap();
        assert_eq!(cond, Conditional::HasFindings);
        assert_eq!(serde_yaml::to_string(&cond).unwrap().trim(), "has_findings");
    }
}
