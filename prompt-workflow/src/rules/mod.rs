//! Pattern-based rule engine.
//!
//! Rules are severity-tagged regular expressions scoped to language tags. The
//! engine scans files line by line and produces [`Finding`]s without any LLM
//! involvement.

pub mod engine;
pub mod loader;
pub mod types;

pub use engine::RuleEngine;
pub use loader::{builtin_rules, load_rules_file, parse_rules};
pub use types::{Finding, Rule, RuleConfig, RuleMetadata, Severity};
