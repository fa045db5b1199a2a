//! Workflow discovery and loading.
//!
//! Workflows are looked up by name as `<name>.yaml` (or `.yml`) in the search
//! directories, in order, then among the built-in workflows. Loaded definitions
//! are cached by name and shared as `Arc`s, so repeat loads hand back the very
//! same definition until [`WorkflowLoader::clear_cache`] is called.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::WorkflowError;
use crate::workflow::types::WorkflowDefinition;

const BUILTIN_WORKFLOWS: &[(&str, &str)] = &[
    (
        "full_review",
        include_str!("../../config/workflows/full_review.yaml"),
    ),
    (
        "security_audit",
        include_str!("../../config/workflows/security_audit.yaml"),
    ),
];

const WORKFLOW_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// User workflow directory: `~/.prompt-workflow/workflows`
pub fn user_workflow_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".prompt-workflow").join("workflows"))
}

#[derive(Debug)]
pub struct WorkflowLoader {
    search_dirs: Vec<PathBuf>,
    include_builtin: bool,
    cache: HashMap<String, Arc<WorkflowDefinition>>,
}

impl Default for WorkflowLoader {
    fn default() -> Self {
        Self::new(user_workflow_dir().into_iter().collect())
    }
}

impl WorkflowLoader {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            include_builtin: true,
            cache: HashMap::new(),
        }
    }

    /// Only search the configured directories
    pub fn without_builtin(mut self) -> Self {
        self.include_builtin = false;
        self
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// Load `name`, returning the cached definition when there is one
    pub fn load(&mut self, name: &str) -> Result<Arc<WorkflowDefinition>, WorkflowError> {
        if let Some(cached) = self.cache.get(name) {
            tracing::debug!("Workflow cache hit for '{}'", name);
            return Ok(Arc::clone(cached));
        }

        let definition = match self.find_file(name) {
            Some(path) => {
                tracing::debug!("Loading workflow '{}' from {}", name, path.display());
                let yaml = std::fs::read_to_string(&path)
                    .map_err(|source| WorkflowError::Io { path, source })?;
                parse_workflow(name, &yaml)?
            }
            None => match self.builtin(name) {
                Some(yaml) => parse_workflow(name, yaml)?,
                None => {
                    return Err(WorkflowError::NotFound {
                        name: name.to_string(),
                        available: self.list_available(),
                    })
                }
            },
        };

        let definition = Arc::new(definition);
        self.cache.insert(name.to_string(), Arc::clone(&definition));
        Ok(definition)
    }

    /// Names of every discoverable workflow, sorted and deduplicated
    pub fn list_available(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for dir in &self.search_dirs {
            let entries = match std::fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.is_file() || !has_workflow_extension(&path) {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.insert(stem.to_string());
                }
            }
        }
        if self.include_builtin {
            names.extend(BUILTIN_WORKFLOWS.iter().map(|(name, _)| name.to_string()));
        }
        names.into_iter().collect()
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn find_file(&self, name: &str) -> Option<PathBuf> {
        self.search_dirs.iter().find_map(|dir| {
            WORKFLOW_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{}.{}", name, ext)))
                .find(|path| path.is_file())
        })
    }

    fn builtin(&self, name: &str) -> Option<&'static str> {
        if !self.include_builtin {
            return None;
        }
        BUILTIN_WORKFLOWS
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, yaml)| *yaml)
    }
}

fn has_workflow_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| WORKFLOW_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Parse a workflow file body; the definition lives under a top-level `workflow:` key
pub fn parse_workflow(name: &str, yaml: &str) -> Result<WorkflowDefinition, WorkflowError> {
    let document: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(|e| WorkflowError::Parse {
        name: name.to_string(),
        message: e.to_string(),
    })?;

    let body = document
        .as_mapping()
        .and_then(|m| m.get("workflow"))
        .cloned()
        .ok_or_else(|| WorkflowError::InvalidStructure {
            name: name.to_string(),
            message: "missing top-level 'workflow' key".to_string(),
        })?;

    let definition: WorkflowDefinition =
        serde_yaml::from_value(body).map_err(|e| WorkflowError::Parse {
            name: name.to_string(),
            message: e.to_string(),
        })?;

    if definition.name.trim().is_empty() {
        return Err(WorkflowError::InvalidStructure {
            name: name.to_string(),
            message: "workflow name is empty".to_string(),
        });
    }
    let mut seen = BTreeSet::new();
    for section in &definition.sections {
        if !seen.insert(section.id.as_str()) {
            return Err(WorkflowError::InvalidStructure {
                name: name.to_string(),
                message: format!("duplicate section id '{}'", section.id),
            });
        }
    }

    Ok(definition)
}
