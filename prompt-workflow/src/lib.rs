//! Heuristic repository scanning and phased prompt generation.
//!
//! A repository is analysed (languages, documentation, dependencies, drift),
//! scanned with regex rules, and turned into review prompts rendered from
//! phase templates or assembled by named workflows.

// Error types
pub mod error;

// Regex rule engine
pub mod rules;

// Repository analysers
pub mod analysis;

// Template loading, gating and rendering
pub mod templates;

// Per-phase context builders and the prompt generator
pub mod phases;

// Named workflows and their execution
pub mod workflow;

// Markdown, JSON and SARIF exports
pub mod export;

pub mod config;
pub mod cli;
pub mod orchestrator;
