//! Phase prompt generation: load, gate, build context, render.

use prompt_workflow_sdk::{log_phase_complete, log_phase_failed, log_phase_start};

use crate::analysis::Analysis;
use crate::error::TemplateError;
use crate::phases::{build_context, phase_name, MAX_DOCUMENT_CHARS};
use crate::templates::{render, Conditional, Prompt, Template, TemplateLoader, TemplateRef, PHASE_COUNT};

/// What happened to a single template against an analysis
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateOutcome {
    Rendered(Prompt),
    /// The template's conditional evaluated false
    ConditionalFalse(Conditional),
    /// The phase could not build the context the template needs
    NoContext,
}

impl TemplateOutcome {
    pub fn into_prompt(self) -> Option<Prompt> {
        match self {
            TemplateOutcome::Rendered(prompt) => Some(prompt),
            _ => None,
        }
    }

    /// Reason a template was left out, for logs
    pub fn skip_reason(&self) -> Option<String> {
        match self {
            TemplateOutcome::Rendered(_) => None,
            TemplateOutcome::ConditionalFalse(cond) => {
                Some(format!("conditional '{}' is false", cond))
            }
            TemplateOutcome::NoContext => Some("required context unavailable".to_string()),
        }
    }
}

/// Turns templates and an [`Analysis`] into prompts
#[derive(Debug)]
pub struct PromptGenerator {
    loader: TemplateLoader,
    max_document_chars: usize,
}

impl Default for PromptGenerator {
    fn default() -> Self {
        Self::new(TemplateLoader::default())
    }
}

impl PromptGenerator {
    pub fn new(loader: TemplateLoader) -> Self {
        Self {
            loader,
            max_document_chars: MAX_DOCUMENT_CHARS,
        }
    }

    pub fn with_max_document_chars(mut self, max_chars: usize) -> Self {
        self.max_document_chars = max_chars;
        self
    }

    /// Gate and render one template of `phase`
    pub fn evaluate(&self, phase: u8, template: &Template, analysis: &Analysis) -> TemplateOutcome {
        if let Some(cond) = &template.conditional {
            if !cond.evaluate(analysis) {
                return TemplateOutcome::ConditionalFalse(cond.clone());
            }
        }
        match build_context(phase, template, analysis, self.max_document_chars) {
            Some(context) => TemplateOutcome::Rendered(render(phase, template, context)),
            None => TemplateOutcome::NoContext,
        }
    }

    /// Render every applicable template of `phase`, in template order
    pub fn generate_phase(
        &mut self,
        phase: u8,
        analysis: &Analysis,
    ) -> Result<Vec<Prompt>, TemplateError> {
        let name = phase_name(phase);
        log_phase_start!(phase as usize, name, PHASE_COUNT as usize);

        let templates = match self.loader.load_phase(phase) {
            Ok(templates) => templates,
            Err(e) => {
                log_phase_failed!(phase as usize, name, e);
                return Err(e);
            }
        };

        let mut prompts = Vec::new();
        for template in templates.iter() {
            let outcome = self.evaluate(phase, template, analysis);
            if let Some(reason) = outcome.skip_reason() {
                tracing::debug!("Skipping template '{}' in phase {}: {}", template.id, phase, reason);
            }
            if let Some(prompt) = outcome.into_prompt() {
                prompts.push(prompt);
            }
        }

        tracing::info!(
            "Phase {} ({}): {} of {} templates rendered",
            phase,
            name,
            prompts.len(),
            templates.len()
        );
        log_phase_complete!(phase as usize, name, prompts.len());
        Ok(prompts)
    }

    /// Render several phases in the given order
    pub fn generate_phases(
        &mut self,
        phases: &[u8],
        analysis: &Analysis,
    ) -> Result<Vec<Prompt>, TemplateError> {
        let mut prompts = Vec::new();
        for &phase in phases {
            prompts.extend(self.generate_phase(phase, analysis)?);
        }
        Ok(prompts)
    }

    /// Resolve a single template reference.
    ///
    /// A scope naming a phase restricts the search to that phase and any
    /// other scope is unresolvable. Without a scope phases are searched in
    /// order and the first matching id wins.
    pub fn generate_template(
        &mut self,
        reference: &TemplateRef,
        analysis: &Analysis,
    ) -> Result<TemplateOutcome, TemplateError> {
        let phases: Vec<u8> = match (reference.phase(), &reference.scope) {
            (Some(phase), _) => vec![phase],
            (None, None) => (0..PHASE_COUNT).collect(),
            // A scope that names no phase matches nothing
            (None, Some(_)) => {
                return Err(TemplateError::NotFound {
                    reference: reference.to_string(),
                })
            }
        };

        for phase in phases {
            let templates = self.loader.load_phase(phase)?;
            if let Some(template) = templates.iter().find(|t| t.id == reference.id) {
                return Ok(self.evaluate(phase, template, analysis));
            }
        }
        Err(TemplateError::NotFound {
            reference: reference.to_string(),
        })
    }
}
