//! Language and framework detection by extension sniffing.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::analysis::types::{CodeStructure, Dependency, LanguageStats};
use crate::error::ScanError;

/// Map a file extension to a language tag used by rules
pub fn language_for_extension(ext: &str) -> Option<&'static str> {
    let lang = match ext.to_ascii_lowercase().as_str() {
        "rs" => "rust",
        "py" | "pyw" => "python",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "rb" => "ruby",
        "php" => "php",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "cs" => "csharp",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "hh" => "cpp",
        "swift" => "swift",
        "sh" | "bash" | "zsh" => "shell",
        "yaml" | "yml" => "yaml",
        "json" => "json",
        _ => return None,
    };
    Some(lang)
}

const ENTRY_POINT_NAMES: &[&str] = &[
    "main.rs",
    "main.py",
    "__main__.py",
    "app.py",
    "manage.py",
    "wsgi.py",
    "index.js",
    "index.ts",
    "server.js",
    "server.ts",
    "app.js",
    "main.go",
    "Main.java",
    "Program.cs",
];

/// Dependency name -> framework display name
const FRAMEWORK_DEPENDENCIES: &[(&str, &str)] = &[
    ("django", "Django"),
    ("flask", "Flask"),
    ("fastapi", "FastAPI"),
    ("react", "React"),
    ("next", "Next.js"),
    ("vue", "Vue"),
    ("@angular/core", "Angular"),
    ("express", "Express"),
    ("svelte", "Svelte"),
    ("actix-web", "Actix Web"),
    ("axum", "Axum"),
    ("rocket", "Rocket"),
    ("tokio", "Tokio"),
    ("spring-boot", "Spring Boot"),
];

/// Marker file -> framework display name
const FRAMEWORK_MARKERS: &[(&str, &str)] = &[
    ("manage.py", "Django"),
    ("next.config.js", "Next.js"),
    ("angular.json", "Angular"),
    ("Gemfile.lock", "Bundler"),
];

fn is_skipped(entry: &DirEntry, skip_dirs: &[String]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| skip_dirs.iter().any(|s| s == name))
            .unwrap_or(false)
}

/// Walk `root` yielding regular files outside skipped directories.
///
/// Walk errors are logged and the entry skipped.
pub fn walk_files(root: &Path, skip_dirs: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e, skip_dirs));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                let err = ScanError::Walk {
                    path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
                    message: e.to_string(),
                };
                tracing::warn!("{}", err);
            }
        }
    }
    files
}

/// Relative path -> language tag for every recognised source file
pub fn file_language_map(root: &Path, skip_dirs: &[String]) -> BTreeMap<PathBuf, String> {
    walk_files(root, skip_dirs)
        .into_iter()
        .filter_map(|path| {
            let lang = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(language_for_extension)?;
            let rel = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            Some((rel, lang.to_string()))
        })
        .collect()
}

fn count_lines(path: &Path) -> Result<usize, ScanError> {
    let bytes = std::fs::read(path).map_err(|source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).lines().count())
}

/// Build per-language statistics and structural facts for `root`
pub fn detect_structure(
    root: &Path,
    skip_dirs: &[String],
    dependencies: &[Dependency],
) -> CodeStructure {
    let files = walk_files(root, skip_dirs);
    let mut per_language: BTreeMap<&'static str, (usize, usize)> = BTreeMap::new();
    let mut entry_points = Vec::new();
    let mut total_lines = 0usize;

    for path in &files {
        let rel = path.strip_prefix(root).unwrap_or(path);
        if let Some(name) = rel.file_name().and_then(|n| n.to_str()) {
            if ENTRY_POINT_NAMES.contains(&name) {
                entry_points.push(rel.to_path_buf());
            }
        }

        let Some(lang) = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(language_for_extension)
        else {
            continue;
        };

        let lines = match count_lines(path) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("{}", e);
                continue;
            }
        };
        let stats = per_language.entry(lang).or_insert((0, 0));
        stats.0 += 1;
        stats.1 += lines;
        total_lines += lines;
    }

    let mut languages: Vec<LanguageStats> = per_language
        .into_iter()
        .map(|(language, (files, lines))| LanguageStats {
            language: language.to_string(),
            files,
            lines,
            percentage: if total_lines == 0 {
                0.0
            } else {
                (lines as f64 / total_lines as f64 * 1000.0).round() / 10.0
            },
        })
        .collect();
    languages.sort_by(|a, b| b.lines.cmp(&a.lines).then_with(|| a.language.cmp(&b.language)));

    CodeStructure {
        total_files: files.len(),
        total_lines,
        languages,
        frameworks: detect_frameworks(root, dependencies),
        top_level_dirs: top_level_dirs(root, skip_dirs),
        entry_points,
    }
}

fn top_level_dirs(root: &Path, skip_dirs: &[String]) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };
    let mut dirs: Vec<String> = entries
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.') && !skip_dirs.contains(name))
        .collect();
    dirs.sort();
    dirs
}

/// Frameworks implied by declared dependencies and marker files
pub fn detect_frameworks(root: &Path, dependencies: &[Dependency]) -> Vec<String> {
    let mut found = BTreeSet::new();
    for dep in dependencies {
        let name = dep.name.to_ascii_lowercase();
        for (dep_name, framework) in FRAMEWORK_DEPENDENCIES {
            if name == *dep_name {
                found.insert(framework.to_string());
            }
        }
    }
    for (marker, framework) in FRAMEWORK_MARKERS {
        if root.join(marker).is_file() {
            found.insert(framework.to_string());
        }
    }
    found.into_iter().collect()
}
