//! Drift checks between documentation claims and the repository.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::analysis::types::{
    DocumentType, DocumentationFindings, ValidationCategory, ValidationFinding, ValidationStatus,
};
use crate::rules::Severity;

static BACKTICK_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([A-Za-z0-9_.\-]+(?:/[A-Za-z0-9_.\-]+)*/?)`").unwrap());

static ROUTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"@(app|router|bp|blueprint)\.(get|post|put|patch|delete|route)\(|\b(app|router)\.(get|post|put|patch|delete)\(\s*["'/]|#\[(get|post|put|patch|delete)\(|\.route\(\s*"|HandleFunc\(|@(Get|Post|Put|Delete|Request)Mapping"#,
    )
    .unwrap()
});

/// Setup command pattern and the manifests any one of which makes it plausible
static SETUP_COMMANDS: Lazy<Vec<(Regex, &'static str, &'static [&'static str])>> =
    Lazy::new(|| {
        vec![
            (
                Regex::new(r"\b(npm (install|ci|run)|yarn( install| add)?|pnpm (install|i))\b").unwrap(),
                "npm/yarn/pnpm",
                &["package.json"][..],
            ),
            (
                Regex::new(r"\bcargo (build|run|install|test)\b").unwrap(),
                "cargo",
                &["Cargo.toml"][..],
            ),
            (
                Regex::new(r"\bpip3? install -r\s+(\S+)").unwrap(),
                "pip -r",
                &["requirements.txt"][..],
            ),
            (
                Regex::new(r"\b(pip3? install (-e )?\.|poetry install)").unwrap(),
                "pip/poetry",
                &["pyproject.toml", "setup.py"][..],
            ),
            (
                Regex::new(r"\bgo (build|run|install)\b").unwrap(),
                "go",
                &["go.mod"][..],
            ),
            (
                Regex::new(r"(?m)^\s*\$?\s*make\b").unwrap(),
                "make",
                &["Makefile", "makefile", "GNUmakefile"][..],
            ),
            (
                Regex::new(r"\bdocker[ -]compose\b").unwrap(),
                "docker compose",
                &["docker-compose.yml", "docker-compose.yaml", "compose.yml", "compose.yaml"][..],
            ),
        ]
    });

/// Check documentation claims against the repository at `root`.
///
/// `files` maps relative source paths to language tags; it is used to look for
/// route definitions when API documentation exists.
pub fn validate(
    root: &Path,
    docs: &DocumentationFindings,
    files: &BTreeMap<PathBuf, String>,
) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();
    if let Some(arch) = &docs.claimed_architecture {
        findings.extend(validate_architecture(root, arch));
    }
    if let Some(setup) = &docs.setup_instructions {
        findings.extend(validate_setup(root, setup));
    }
    if docs.has(DocumentType::Api) {
        findings.push(validate_api(root, files));
    }
    findings
}

/// Paths quoted in backticks must exist
pub fn validate_architecture(root: &Path, claimed: &str) -> Vec<ValidationFinding> {
    let claimed_paths: BTreeSet<&str> = BACKTICK_PATH_RE
        .captures_iter(claimed)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .filter(|p| p.contains('/') || p.contains('.'))
        .collect();

    if claimed_paths.is_empty() {
        return vec![ValidationFinding {
            category: ValidationCategory::Architecture,
            status: ValidationStatus::Unverifiable,
            evidence: "Architecture description names no concrete paths".to_string(),
            recommendation: "Reference the directories or modules that implement each component"
                .to_string(),
            severity: Severity::Info,
        }];
    }

    let (present, missing): (Vec<&str>, Vec<&str>) = claimed_paths
        .into_iter()
        .partition(|p| root.join(p.trim_end_matches('/')).exists());

    let mut findings = Vec::new();
    if !missing.is_empty() {
        findings.push(ValidationFinding {
            category: ValidationCategory::Architecture,
            status: ValidationStatus::Drift,
            evidence: format!("Documented paths not found: {}", missing.join(", ")),
            recommendation: "Update the architecture documentation to match the current layout"
                .to_string(),
            severity: Severity::Medium,
        });
    }
    if !present.is_empty() {
        findings.push(ValidationFinding {
            category: ValidationCategory::Architecture,
            status: ValidationStatus::Consistent,
            evidence: format!("Documented paths present: {}", present.join(", ")),
            recommendation: String::new(),
            severity: Severity::Info,
        });
    }
    findings
}

/// Commands in setup instructions need their manifest
pub fn validate_setup(root: &Path, instructions: &str) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();
    for (re, tool, manifests) in SETUP_COMMANDS.iter() {
        let Some(caps) = re.captures(instructions) else {
            continue;
        };
        let Some(m) = caps.get(0) else {
            continue;
        };
        // `pip install -r <file>` names its own manifest
        let named = caps
            .get(1)
            .filter(|_| *tool == "pip -r")
            .map(|file| file.as_str().trim_end_matches(['`', '"', '\'', ')', ',', ';', '.']))
            .filter(|file| !file.is_empty());
        let candidates: Vec<&str> = match named {
            Some(file) => vec![file],
            None => manifests.to_vec(),
        };
        let found = candidates.iter().find(|name| root.join(name).is_file());
        let finding = match found {
            Some(manifest) => ValidationFinding {
                category: ValidationCategory::Setup,
                status: ValidationStatus::Consistent,
                evidence: format!("`{}` is backed by {}", m.as_str().trim(), manifest),
                recommendation: String::new(),
                severity: Severity::Info,
            },
            None => ValidationFinding {
                category: ValidationCategory::Setup,
                status: ValidationStatus::Drift,
                evidence: format!(
                    "Setup uses `{}` ({}) but none of {} exists",
                    m.as_str().trim(),
                    tool,
                    candidates.join(", ")
                ),
                recommendation: "Fix the setup instructions or restore the missing manifest"
                    .to_string(),
                severity: Severity::High,
            },
        };
        findings.push(finding);
    }
    findings
}

/// API docs should have route definitions somewhere in the source
pub fn validate_api(root: &Path, files: &BTreeMap<PathBuf, String>) -> ValidationFinding {
    let mut routes = Vec::new();
    for rel in files.keys() {
        let Ok(bytes) = std::fs::read(root.join(rel)) else {
            continue;
        };
        let content = String::from_utf8_lossy(&bytes);
        if ROUTE_RE.is_match(&content) {
            routes.push(rel.display().to_string());
        }
    }

    if routes.is_empty() {
        ValidationFinding {
            category: ValidationCategory::Api,
            status: ValidationStatus::Drift,
            evidence: "API documentation exists but no route definitions were found".to_string(),
            recommendation: "Confirm the documented API is still served, or remove the stale docs"
                .to_string(),
            severity: Severity::Medium,
        }
    } else {
        ValidationFinding {
            category: ValidationCategory::Api,
            status: ValidationStatus::Consistent,
            evidence: format!("Route definitions found in: {}", routes.join(", ")),
            recommendation: "Compare each documented endpoint with these handlers".to_string(),
            severity: Severity::Info,
        }
    }
}
