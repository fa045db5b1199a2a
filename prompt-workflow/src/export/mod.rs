//! Output formatting and artifact writing.

pub mod findings;
pub mod prompts;

pub use findings::{findings_to_json, findings_to_sarif, findings_to_text, sarif_level};
pub use prompts::{prompts_to_json, prompts_to_markdown};

use chrono::Local;
use clap::ValueEnum;
use prompt_workflow_sdk::log_state_file;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::rules::Finding;
use crate::templates::Prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PromptFormat {
    Markdown,
    Json,
}

impl PromptFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PromptFormat::Markdown => "md",
            PromptFormat::Json => "json",
        }
    }

    pub fn render(self, title: &str, prompts: &[Prompt]) -> Result<String, ExportError> {
        match self {
            PromptFormat::Markdown => Ok(prompts_to_markdown(title, prompts)),
            PromptFormat::Json => prompts_to_json(prompts),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FindingFormat {
    Text,
    Json,
    Sarif,
}

impl FindingFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FindingFormat::Text => "txt",
            FindingFormat::Json => "json",
            FindingFormat::Sarif => "sarif",
        }
    }

    pub fn render(self, findings: &[Finding]) -> Result<String, ExportError> {
        match self {
            FindingFormat::Text => Ok(findings_to_text(findings)),
            FindingFormat::Json => findings_to_json(findings),
            FindingFormat::Sarif => findings_to_sarif(findings),
        }
    }
}

/// Write `content` to `<dir>/<stem>_<timestamp>.<ext>`, creating `dir` as needed
pub fn write_artifact(
    dir: &Path,
    stem: &str,
    extension: &str,
    content: &str,
    description: &str,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{}_{}.{}", stem, timestamp, extension));
    fs::write(&path, content).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::info!("Wrote {} to {}", description, path.display());
    log_state_file!(None, path.display().to_string(), description);
    Ok(path)
}
