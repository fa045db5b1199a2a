//! Orchestrator configuration.
//!
//! Resolution order: built-in defaults, then `prompt-workflow.yaml` in the
//! target repository (or the file given with `--config`), then CLI flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::phases::MAX_DOCUMENT_CHARS;
use crate::rules::{builtin_rules, load_rules_file, RuleConfig, RuleEngine};
use crate::templates::{TemplateLoader, TemplateSource};
use crate::workflow::{user_workflow_dir, WorkflowLoader};

/// File looked up in the repository root when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "prompt-workflow.yaml";

pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    ".git",
    "target",
    "node_modules",
    "vendor",
    "dist",
    "build",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    ".idea",
    ".vscode",
];

/// Configuration shared by every command
///
/// # Examples
///
/// ```
/// use prompt_workflow::config::OrchestratorConfig;
///
/// let config = OrchestratorConfig {
///     include_builtin_rules: false,
///     rule_files: vec!["rules/team.yaml".into()],
///     ..Default::default()
/// };
/// assert!(config.skip_dirs.contains(&"node_modules".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Directory of `phase{N}.yaml` template files; built-in templates when unset
    pub templates_dir: Option<PathBuf>,
    /// Extra directories searched for workflows before the user directory
    pub workflow_dirs: Vec<PathBuf>,
    /// Rule files loaded in addition to (or instead of) the built-in rules
    pub rule_files: Vec<PathBuf>,
    pub include_builtin_rules: bool,
    /// Where exports are written
    pub output_dir: PathBuf,
    /// Directory names never descended into
    pub skip_dirs: Vec<String>,
    /// Character budget for document text in prompt contexts
    pub max_document_chars: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            templates_dir: None,
            workflow_dirs: Vec::new(),
            rule_files: Vec::new(),
            include_builtin_rules: true,
            output_dir: PathBuf::from("./OUTPUT"),
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            max_document_chars: MAX_DOCUMENT_CHARS,
        }
    }
}

impl OrchestratorConfig {
    /// Parse a configuration file. Relative paths inside it are resolved
    /// against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Load `explicit` if given, else `<repo>/prompt-workflow.yaml` if present,
    /// else defaults
    pub fn discover(explicit: Option<&Path>, repo: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(candidate) = repo.map(|r| r.join(CONFIG_FILE_NAME)) {
            if candidate.is_file() {
                tracing::debug!("Using config file {}", candidate.display());
                return Self::from_file(&candidate);
            }
        }
        Ok(Self::default())
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(dir) = self.templates_dir.as_mut() {
            resolve(dir);
        }
        self.workflow_dirs.iter_mut().for_each(&resolve);
        self.rule_files.iter_mut().for_each(&resolve);
    }

    pub fn template_loader(&self) -> TemplateLoader {
        match &self.templates_dir {
            Some(dir) => TemplateLoader::new(TemplateSource::Directory(dir.clone())),
            None => TemplateLoader::default(),
        }
    }

    /// Configured workflow directories followed by `~/.prompt-workflow/workflows`
    pub fn workflow_loader(&self) -> WorkflowLoader {
        let mut dirs = self.workflow_dirs.clone();
        dirs.extend(user_workflow_dir());
        WorkflowLoader::new(dirs)
    }

    /// Rule records from the built-in set and every configured rule file
    pub fn rule_configs(&self) -> Result<Vec<RuleConfig>> {
        let mut configs = if self.include_builtin_rules {
            builtin_rules()
        } else {
            Vec::new()
        };
        for file in &self.rule_files {
            configs.extend(load_rules_file(file)?);
        }
        Ok(configs)
    }

    pub fn rule_engine(&self) -> Result<RuleEngine> {
        let configs = self.rule_configs()?;
        if configs.is_empty() {
            anyhow::bail!("No rules configured: enable built-in rules or pass --rules");
        }
        Ok(RuleEngine::from_configs(configs))
    }
}
