//! Prompt templates: loading, gating and rendering.

pub mod conditional;
pub mod loader;
pub mod render;
pub mod types;

pub use conditional::Conditional;
pub use loader::{TemplateLoader, TemplateSource, PHASE_COUNT};
pub use render::{estimate_tokens, render};
pub use types::{Context, Prompt, Template, TemplateConfig, TemplateRef};
