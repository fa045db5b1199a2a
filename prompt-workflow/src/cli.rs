//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OrchestratorConfig;
use crate::export::{FindingFormat, PromptFormat};
use crate::rules::Severity;

/// Heuristic repository scanning and phased prompt generation
#[derive(Parser, Debug)]
#[command(name = "prompt-workflow", version, about)]
pub struct Cli {
    /// Configuration file (default: <path>/prompt-workflow.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit structured __WF_EVENT__ lines on stderr
    #[arg(long, global = true)]
    pub emit_events: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a repository with the regex rule sets
    Scan(ScanArgs),
    /// Analyse a repository and render phase prompts
    Generate(GenerateArgs),
    /// List or run named workflows
    #[command(subcommand)]
    Workflow(WorkflowCommand),
    /// Show the templates of a phase
    Templates {
        /// Phase number (0-4)
        #[arg(value_parser = clap::value_parser!(u8).range(0..5))]
        phase: u8,
    },
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Repository to scan
    pub path: PathBuf,

    /// Additional rule file (repeatable)
    #[arg(long = "rules")]
    pub rules: Vec<PathBuf>,

    /// Only use rules from --rules files
    #[arg(long)]
    pub no_builtin_rules: bool,

    #[arg(long, value_enum, default_value_t = FindingFormat::Text)]
    pub format: FindingFormat,

    /// Drop findings less severe than this (critical, high, medium, low, info)
    #[arg(long)]
    pub min_severity: Option<Severity>,

    /// Write the report to this directory instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Repository to analyse
    pub path: PathBuf,

    /// Phase to render (repeatable; default: all)
    #[arg(long = "phase", value_parser = clap::value_parser!(u8).range(0..5))]
    pub phases: Vec<u8>,

    #[arg(long, value_enum, default_value_t = PromptFormat::Markdown)]
    pub format: PromptFormat,

    /// Output directory (default: from config, ./OUTPUT)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum WorkflowCommand {
    /// List discoverable workflows
    List,
    /// Execute a workflow against a repository
    Run {
        /// Workflow name
        name: String,
        /// Repository to analyse
        path: PathBuf,
        /// Render a prompt for each reference instead of only tracking progress
        #[arg(long)]
        generate: bool,
        #[arg(long, value_enum, default_value_t = PromptFormat::Markdown)]
        format: PromptFormat,
        /// Output directory (default: from config, ./OUTPUT)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl ScanArgs {
    pub fn apply(&self, config: &mut OrchestratorConfig) {
        config.rule_files.extend(self.rules.iter().cloned());
        if self.no_builtin_rules {
            config.include_builtin_rules = false;
        }
        if let Some(dir) = &self.output {
            config.output_dir = dir.clone();
        }
    }
}

impl GenerateArgs {
    pub fn apply(&self, config: &mut OrchestratorConfig) {
        if let Some(dir) = &self.output {
            config.output_dir = dir.clone();
        }
    }
}
