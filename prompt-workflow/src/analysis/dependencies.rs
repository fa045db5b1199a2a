//! Dependency extraction from package manifests.
//!
//! Supported manifests: `Cargo.toml`, `package.json`, `requirements*.txt`.
//! A manifest that fails to parse is logged and contributes nothing.

use std::path::Path;
use walkdir::WalkDir;

use crate::analysis::types::{Dependency, DependencyType};
use crate::error::ScanError;

const MAX_MANIFEST_DEPTH: usize = 3;

/// Find and parse every supported manifest under `root`
pub fn discover_dependencies(root: &Path, skip_dirs: &[String]) -> Vec<Dependency> {
    let mut deps = Vec::new();
    let walker = WalkDir::new(root)
        .max_depth(MAX_MANIFEST_DEPTH)
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
        match parse_manifest(entry.path(), rel) {
            Ok(Some(found)) => deps.extend(found),
            Ok(None) => {}
            Err(e) => tracing::warn!("{}", e),
        }
    }
    deps
}

/// Parse `path` if it is a supported manifest; `rel` is recorded as the source
pub fn parse_manifest(path: &Path, rel: &Path) -> Result<Option<Vec<Dependency>>, ScanError> {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    let parser: fn(&str, &Path) -> Result<Vec<Dependency>, ScanError> = match name {
        "Cargo.toml" => parse_cargo_toml,
        "package.json" => parse_package_json,
        n if n.starts_with("requirements") && n.ends_with(".txt") => parse_requirements,
        _ => return Ok(None),
    };

    let content = std::fs::read_to_string(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parser(&content, rel).map(Some)
}

fn manifest_error(source: &Path, e: impl std::fmt::Display) -> ScanError {
    ScanError::Manifest {
        path: source.to_path_buf(),
        message: e.to_string(),
    }
}

pub fn parse_cargo_toml(content: &str, source: &Path) -> Result<Vec<Dependency>, ScanError> {
    let doc: toml::Table = content
        .parse()
        .map_err(|e: toml::de::Error| manifest_error(source, e))?;
    let mut deps = Vec::new();
    for (section, dep_type) in [
        ("dependencies", DependencyType::Runtime),
        ("dev-dependencies", DependencyType::Development),
        ("build-dependencies", DependencyType::Build),
    ] {
        let tables = [
            doc.get(section),
            doc.get("workspace").and_then(|w| w.get(section)),
        ];
        for table in tables.into_iter().flatten().filter_map(toml::Value::as_table) {
            for (name, spec) in table {
                let version = match spec {
                    toml::Value::String(v) => v.clone(),
                    toml::Value::Table(t) => t
                        .get("version")
                        .and_then(toml::Value::as_str)
                        .map(str::to_string)
                        .or_else(|| t.get("path").map(|_| "path".to_string()))
                        .or_else(|| t.get("git").map(|_| "git".to_string()))
                        .or_else(|| t.get("workspace").map(|_| "workspace".to_string()))
                        .unwrap_or_else(|| "*".to_string()),
                    _ => "*".to_string(),
                };
                deps.push(Dependency {
                    name: name.clone(),
                    version,
                    dep_type,
                    source: source.to_path_buf(),
                });
            }
        }
    }
    Ok(deps)
}

pub fn parse_package_json(content: &str, source: &Path) -> Result<Vec<Dependency>, ScanError> {
    let doc: serde_json::Value =
        serde_json::from_str(content).map_err(|e| manifest_error(source, e))?;
    let mut deps = Vec::new();
    for (section, dep_type) in [
        ("dependencies", DependencyType::Runtime),
        ("devDependencies", DependencyType::Development),
    ] {
        if let Some(map) = doc.get(section).and_then(|v| v.as_object()) {
            for (name, version) in map {
                deps.push(Dependency {
                    name: name.clone(),
                    version: version.as_str().unwrap_or("*").to_string(),
                    dep_type,
                    source: source.to_path_buf(),
                });
            }
        }
    }
    Ok(deps)
}

pub fn parse_requirements(content: &str, source: &Path) -> Result<Vec<Dependency>, ScanError> {
    let mut deps = Vec::new();
    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() || line.starts_with('-') {
            continue;
        }
        let line = line.split(';').next().unwrap_or(line).trim();
        let split_at = line
            .find(|c: char| matches!(c, '=' | '<' | '>' | '~' | '!' | '['))
            .unwrap_or(line.len());
        let (name, rest) = line.split_at(split_at);
        // Skip an extras list such as `[standard]`
        let version = match rest.strip_prefix('[') {
            Some(after) => after.split_once(']').map(|(_, v)| v).unwrap_or(""),
            None => rest,
        }
        .trim();
        deps.push(Dependency {
            name: name.trim().to_string(),
            version: if version.is_empty() {
                "*".to_string()
            } else {
                version.to_string()
            },
            dep_type: DependencyType::Runtime,
            source: source.to_path_buf(),
        });
    }
    Ok(deps)
}
