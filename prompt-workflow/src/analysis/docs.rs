//! Documentation discovery and claim extraction.

use std::path::Path;
use walkdir::WalkDir;

use crate::analysis::types::{DiscoveredDocument, DocumentType, DocumentationFindings};
use crate::error::ScanError;

const DOC_EXTENSIONS: &[&str] = &["md", "markdown", "rst", "txt", "adoc"];
const MAX_DOC_DEPTH: usize = 4;

const SETUP_HEADINGS: &[&str] = &[
    "install",
    "setup",
    "set up",
    "getting started",
    "quick start",
    "quickstart",
    "build",
    "usage",
];

/// Classify a documentation path (relative to the repository root)
pub fn classify_document(rel: &Path) -> Option<DocumentType> {
    let ext = rel.extension().and_then(|e| e.to_str())?.to_ascii_lowercase();
    if !DOC_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    let stem = rel
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let in_docs = rel
        .components()
        .next()
        .and_then(|c| c.as_os_str().to_str())
        .map(|first| matches!(first.to_ascii_lowercase().as_str(), "docs" | "doc" | "documentation"))
        .unwrap_or(false);
    let at_root = rel.components().count() == 1;
    // Plain text only counts at the root or under docs/
    if ext == "txt" && !(at_root || in_docs) {
        return None;
    }

    if stem == "readme" && at_root {
        return Some(DocumentType::Primary);
    }
    if stem.contains("architecture") || stem.starts_with("design") || stem == "adr" {
        return Some(DocumentType::Architecture);
    }
    if ["contributing", "install", "installation", "setup", "getting-started", "getting_started", "development"]
        .iter()
        .any(|s| stem == *s || stem.starts_with(s))
    {
        return Some(DocumentType::Setup);
    }
    if stem == "api" || stem.starts_with("api-") || stem.starts_with("api_") || stem.contains("openapi") {
        return Some(DocumentType::Api);
    }
    if in_docs && ext != "txt" {
        return Some(DocumentType::Other);
    }
    None
}

/// Find documentation under `root` and extract architecture and setup claims
pub fn discover_documentation(root: &Path, skip_dirs: &[String]) -> DocumentationFindings {
    let mut documents = Vec::new();

    let walker = WalkDir::new(root)
        .max_depth(MAX_DOC_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e.file_type().is_dir()
                || e.file_name()
                    .to_str()
                    .map(|n| !n.starts_with('.') && !skip_dirs.iter().any(|s| s == n))
                    .unwrap_or(false)
        });

    for entry in walker.flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let Some(doc_type) = classify_document(rel) else {
            continue;
        };
        match read_document(entry.path()) {
            Ok(content) => documents.push(DiscoveredDocument {
                path: rel.to_path_buf(),
                doc_type,
                content,
            }),
            Err(e) => tracing::warn!("{}", e),
        }
    }

    documents.sort_by(|a, b| a.doc_type.cmp(&b.doc_type).then_with(|| a.path.cmp(&b.path)));

    let claimed_architecture = extract_architecture(&documents);
    let setup_instructions = extract_setup(&documents);
    DocumentationFindings {
        documents,
        claimed_architecture,
        setup_instructions,
    }
}

fn read_document(path: &Path) -> Result<String, ScanError> {
    let bytes = std::fs::read(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Markdown sections whose heading satisfies `pred`, joined with blank lines
pub fn extract_sections(content: &str, pred: impl Fn(&str) -> bool) -> Option<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current: Option<(usize, Vec<&str>)> = None;
    let mut fence: Option<&str> = None;

    for line in content.lines() {
        let marker = fence_marker(line);
        match (fence, marker) {
            (None, Some(open)) => fence = Some(open),
            (Some(open), Some(close)) if open == close => fence = None,
            _ => {}
        }
        let in_code = fence.is_some() || marker.is_some();

        if let Some((level, title)) = heading(line).filter(|_| !in_code) {
            if let Some((open_level, body)) = current.take() {
                if level > open_level {
                    let mut body = body;
                    body.push(line);
                    current = Some((open_level, body));
                    continue;
                }
                out.push(body.join("\n").trim().to_string());
            }
            if pred(&title.to_ascii_lowercase()) {
                current = Some((level, vec![line]));
            }
            continue;
        }
        if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((_, body)) = current {
        out.push(body.join("\n").trim().to_string());
    }

    let joined = out
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// "```" or "~~~" when `line` opens or closes a fenced code block
fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.starts_with(' ') {
        return None;
    }
    Some((level, rest.trim()))
}

fn extract_architecture(documents: &[DiscoveredDocument]) -> Option<String> {
    if let Some(doc) = documents
        .iter()
        .find(|d| d.doc_type == DocumentType::Architecture && !d.content.trim().is_empty())
    {
        return Some(doc.content.trim().to_string());
    }
    documents
        .iter()
        .find(|d| d.doc_type == DocumentType::Primary)
        .and_then(|d| extract_sections(&d.content, |h| h.contains("architecture")))
}

fn extract_setup(documents: &[DiscoveredDocument]) -> Option<String> {
    let from_readme = documents
        .iter()
        .find(|d| d.doc_type == DocumentType::Primary)
        .and_then(|d| {
            extract_sections(&d.content, |h| SETUP_HEADINGS.iter().any(|s| h.contains(s)))
        });
    if from_readme.is_some() {
        return from_readme;
    }
    documents
        .iter()
        .find(|d| d.doc_type == DocumentType::Setup && !d.content.trim().is_empty())
        .map(|d| d.content.trim().to_string())
}
