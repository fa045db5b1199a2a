//! Repository analysers.
//!
//! These produce the inputs the prompt phases consume:
//! - **languages**: extension-based language stats, frameworks, entry points
//! - **docs**: documentation discovery, architecture and setup claims
//! - **dependencies**: manifest parsing
//! - **validation**: drift between documentation and code
//!
//! All analysers are best-effort; unreadable items are logged and skipped.

pub mod dependencies;
pub mod docs;
pub mod languages;
pub mod types;
pub mod validation;

pub use types::{
    Analysis, CodeStructure, Dependency, DependencyType, DiscoveredDocument, DocumentType,
    DocumentationFindings, LanguageStats, ValidationCategory, ValidationFinding, ValidationStatus,
};

use std::path::Path;

/// Run every analyser over `root`.
///
/// Rule findings are not included; attach them with [`Analysis::with_findings`].
pub fn analyze_repository(root: &Path, skip_dirs: &[String]) -> Analysis {
    let dependencies = dependencies::discover_dependencies(root, skip_dirs);
    let structure = languages::detect_structure(root, skip_dirs, &dependencies);
    let documentation = docs::discover_documentation(root, skip_dirs);
    let files = languages::file_language_map(root, skip_dirs);
    let validation = validation::validate(root, &documentation, &files);

    tracing::info!(
        "Analysed {}: {} files, {} documents, {} dependencies, {} validation findings",
        root.display(),
        structure.total_files,
        documentation.documents.len(),
        dependencies.len(),
        validation.len()
    );

    Analysis::new(root)
        .with_structure(structure)
        .with_documentation(documentation)
        .with_dependencies(dependencies)
        .with_validation(validation)
}
