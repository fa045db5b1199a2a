//! Phase 0: documentation review context.

use serde_json::Value;

use crate::analysis::{Analysis, DocumentType, DocumentationFindings};
use crate::phases::{base_context, truncate_text};
use crate::templates::Context;

pub const NAME: &str = "Documentation Review";

/// Concatenate every document of `doc_type`, each under a path header
fn documents_text(docs: &DocumentationFindings, doc_type: DocumentType) -> Option<String> {
    let parts: Vec<String> = docs
        .of_type(doc_type)
        .map(|d| format!("--- {} ---\n{}", d.path.display(), d.content.trim()))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

/// Context for documentation templates, or `None` when nothing was discovered
pub fn build_context(analysis: &Analysis, max_chars: usize) -> Option<Context> {
    let docs = analysis.discovered_docs()?;
    let mut context = base_context(analysis);

    context.insert(
        "document_count".to_string(),
        Value::from(docs.documents.len()),
    );
    let list = docs
        .documents
        .iter()
        .map(|d| format!("- {} ({})", d.path.display(), d.doc_type.as_str()))
        .collect::<Vec<_>>()
        .join("\n");
    context.insert("document_list".to_string(), Value::String(list));

    if let Some(readme) = docs.primary() {
        context.insert(
            "readme_content".to_string(),
            Value::String(truncate_text(readme.content.trim(), max_chars)),
        );
    }

    let sections = [
        ("architecture_content", DocumentType::Architecture),
        ("api_docs_content", DocumentType::Api),
    ];
    for (key, doc_type) in sections {
        if let Some(text) = documents_text(docs, doc_type) {
            context.insert(key.to_string(), Value::String(truncate_text(&text, max_chars)));
        }
    }

    if let Some(claimed) = docs.claimed_architecture.as_deref() {
        context.insert(
            "claimed_architecture".to_string(),
            Value::String(truncate_text(claimed.trim(), max_chars)),
        );
    }
    if let Some(setup) = docs.setup_instructions.as_deref().filter(|s| !s.trim().is_empty()) {
        context.insert(
            "setup_instructions".to_string(),
            Value::String(truncate_text(setup.trim(), max_chars)),
        );
    }

    Some(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DiscoveredDocument;
    use std::path::PathBuf;

    fn doc(path: &str, doc_type: DocumentType, content: &str) -> DiscoveredDocument {
        DiscoveredDocument {
            path: PathBuf::from(path),
            doc_type,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_no_documents_means_no_context() {
        assert!(build_context(&Analysis::new("/repo"), 100).is_none());
        let empty = Analysis::new("/repo").with_documentation(DocumentationFindings::default());
        assert!(build_context(&empty, 100).is_none());
    }

    #[test]
    fn test_context_keys_follow_discovered_types() {
        let analysis = Analysis::new("/work/app").with_documentation(DocumentationFindings {
            documents: vec![
                doc("README.md", DocumentType::Primary, "# App\nDoes things"),
                doc("docs/api.md", DocumentType::Api, "GET /users"),
            ],
            claimed_architecture: None,
            setup_instructions: Some("cargo build".to_string()),
        });
        let context = build_context(&analysis, 1000).unwrap();

        assert_eq!(context["project_name"], "app");
        assert_eq!(context["document_count"], 2);
        assert_eq!(context["readme_content"], "# App\nDoes things");
        assert_eq!(context["setup_instructions"], "cargo build");
        assert!(context["api_docs_content"]
            .as_str()
            .unwrap()
            .contains("--- docs/api.md ---\nGET /users"));
        assert!(!context.contains_key("architecture_content"));
        assert!(!context.contains_key("claimed_architecture"));
    }

    #[test]
    fn test_readme_is_truncated() {
        let analysis = Analysis::new("/repo").with_documentation(DocumentationFindings {
            documents: vec![doc("README.md", DocumentType::Primary, &"x".repeat(50))],
            ..Default::default()
        });
        let context = build_context(&analysis, 10).unwrap();
        let readme = context["readme_content"].as_str().unwrap();
        assert!(readme.starts_with("xxxxxxxxxx\n"));
        assert!(readme.contains("truncated 40 characters"));
    }
}
