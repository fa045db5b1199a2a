//! Per-phase template loading with an in-memory cache.
//!
//! Template files contain a `templates:` list. Loading is strict: a single
//! invalid entry fails the whole phase.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::TemplateError;
use crate::templates::types::{Template, TemplateConfig};

pub const PHASE_COUNT: u8 = 5;

const BUILTIN_TEMPLATES: [&str; PHASE_COUNT as usize] = [
    include_str!("../../config/templates/phase0.yaml"),
    include_str!("../../config/templates/phase1.yaml"),
    include_str!("../../config/templates/phase2.yaml"),
    include_str!("../../config/templates/phase3.yaml"),
    include_str!("../../config/templates/phase4.yaml"),
];

/// Where templates come from
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSource {
    /// Templates compiled into the binary
    Builtin,
    /// `phase{N}.yaml` files in a directory
    Directory(PathBuf),
}

#[derive(Debug, Deserialize)]
struct TemplateFile {
    templates: Vec<TemplateConfig>,
}

/// Loads and caches templates per phase
#[derive(Debug)]
pub struct TemplateLoader {
    source: TemplateSource,
    cache: HashMap<u8, Arc<Vec<Template>>>,
}

impl Default for TemplateLoader {
    fn default() -> Self {
        Self::new(TemplateSource::Builtin)
    }
}

impl TemplateLoader {
    pub fn new(source: TemplateSource) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(TemplateSource::Directory(dir.into()))
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Templates for `phase`, loaded on first use and cached afterwards
    pub fn load_phase(&mut self, phase: u8) -> Result<Arc<Vec<Template>>, TemplateError> {
        if phase >= PHASE_COUNT {
            return Err(TemplateError::UnknownPhase(phase));
        }
        if let Some(cached) = self.cache.get(&phase) {
            tracing::debug!("Template cache hit for phase {}", phase);
            return Ok(Arc::clone(cached));
        }

        let yaml = match &self.source {
            TemplateSource::Builtin => BUILTIN_TEMPLATES[phase as usize].to_string(),
            TemplateSource::Directory(dir) => read_phase_file(dir, phase)?,
        };
        let templates = Arc::new(parse_templates(phase, &yaml)?);
        tracing::debug!("Loaded {} templates for phase {}", templates.len(), phase);
        self.cache.insert(phase, Arc::clone(&templates));
        Ok(templates)
    }

    pub fn is_cached(&self, phase: u8) -> bool {
        self.cache.contains_key(&phase)
    }

    /// Drop every cached phase so the next load re-reads the source
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Path of the template file for `phase` inside `dir`
pub fn phase_file(dir: &Path, phase: u8) -> PathBuf {
    dir.join(format!("phase{}.yaml", phase))
}

fn read_phase_file(dir: &Path, phase: u8) -> Result<String, TemplateError> {
    let path = phase_file(dir, phase);
    if !path.is_file() {
        return Err(TemplateError::Missing { phase, path });
    }
    std::fs::read_to_string(&path).map_err(|source| TemplateError::Io { path, source })
}

/// Parse and validate the templates of one phase
pub fn parse_templates(phase: u8, yaml: &str) -> Result<Vec<Template>, TemplateError> {
    let file: TemplateFile = serde_yaml::from_str(yaml).map_err(|e| TemplateError::Parse {
        phase,
        message: e.to_string(),
    })?;
    file.templates
        .into_iter()
        .enumerate()
        .map(|(index, config)| config.validate(phase, index))
        .collect()
}
