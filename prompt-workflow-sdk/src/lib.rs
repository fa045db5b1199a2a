//! Shared logging surface for prompt-workflow runs.
//!
//! Two channels are provided:
//! - [`WorkflowLog`] structured events, emitted as `__WF_EVENT__:<json>` lines on
//!   stderr so wrapping tools can follow a run
//! - console macros (`log_info!`, `log_warning!`, ...) for human-readable output

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Prefix written before every serialized event line
pub const EVENT_PREFIX: &str = "__WF_EVENT__:";

static EVENTS_ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable or disable emission of structured events on stderr
pub fn set_events_enabled(enabled: bool) {
    EVENTS_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn events_enabled() -> bool {
    EVENTS_ENABLED.load(Ordering::Relaxed)
}

/// Structured events emitted while scanning, generating and executing workflows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowLog {
    /// Phase started
    PhaseStarted {
        phase: usize,
        name: String,
        total_phases: usize,
    },
    /// Phase completed
    PhaseCompleted {
        phase: usize,
        name: String,
        prompts: usize,
    },
    /// Phase failed
    PhaseFailed {
        phase: usize,
        name: String,
        error: String,
    },
    /// Workflow section started
    SectionStarted {
        section_id: String,
        title: String,
        total_prompts: usize,
    },
    /// Prompt reference picked up by the executor
    PromptStarted {
        section_id: String,
        prompt_id: String,
    },
    /// Prompt reference finished
    PromptCompleted {
        prompt_id: String,
        result: Option<String>,
    },
    /// Prompt reference failed
    PromptFailed {
        prompt_id: String,
        error: String,
    },
    /// Prompt reference gated out (conditional false or no context)
    PromptSkipped {
        prompt_id: String,
        reason: String,
    },
    /// Scan finished over a set of files
    ScanCompleted {
        files: usize,
        findings: usize,
    },
    /// State file created (exported prompts, reports)
    StateFileCreated {
        phase: Option<usize>,
        file_path: String,
        description: String,
    },
}

impl WorkflowLog {
    /// Emit this event to stderr when event emission is enabled
    pub fn emit(&self) {
        if !events_enabled() {
            return;
        }
        if let Ok(json) = serde_json::to_string(self) {
            use std::io::Write;
            eprintln!("{}{}", EVENT_PREFIX, json);
            let _ = std::io::stderr().flush();
        }
    }

    /// Parse an event line previously produced by [`WorkflowLog::emit`]
    pub fn parse_line(line: &str) -> Option<Self> {
        let json = line.trim().strip_prefix(EVENT_PREFIX)?;
        serde_json::from_str(json).ok()
    }
}

#[macro_export]
macro_rules! log_phase_start {
    ($phase:expr, $name:expr, $total:expr) => {
        $crate::WorkflowLog::PhaseStarted {
            phase: $phase,
            name: $name.to_string(),
            total_phases: $total,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_complete {
    ($phase:expr, $name:expr, $prompts:expr) => {
        $crate::WorkflowLog::PhaseCompleted {
            phase: $phase,
            name: $name.to_string(),
            prompts: $prompts,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_phase_failed {
    ($phase:expr, $name:expr, $error:expr) => {
        $crate::WorkflowLog::PhaseFailed {
            phase: $phase,
            name: $name.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_section_start {
    ($section_id:expr, $title:expr, $total:expr) => {
        $crate::WorkflowLog::SectionStarted {
            section_id: $section_id.to_string(),
            title: $title.to_string(),
            total_prompts: $total,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_prompt_start {
    ($section_id:expr, $prompt_id:expr) => {
        $crate::WorkflowLog::PromptStarted {
            section_id: $section_id.to_string(),
            prompt_id: $prompt_id.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_prompt_complete {
    ($prompt_id:expr) => {
        $crate::WorkflowLog::PromptCompleted {
            prompt_id: $prompt_id.to_string(),
            result: None,
        }
        .emit();
    };
    ($prompt_id:expr, $result:expr) => {
        $crate::WorkflowLog::PromptCompleted {
            prompt_id: $prompt_id.to_string(),
            result: Some($result.to_string()),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_prompt_failed {
    ($prompt_id:expr, $error:expr) => {
        $crate::WorkflowLog::PromptFailed {
            prompt_id: $prompt_id.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_prompt_skipped {
    ($prompt_id:expr, $reason:expr) => {
        $crate::WorkflowLog::PromptSkipped {
            prompt_id: $prompt_id.to_string(),
            reason: $reason.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_scan_complete {
    ($files:expr, $findings:expr) => {
        $crate::WorkflowLog::ScanCompleted {
            files: $files,
            findings: $findings,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_state_file {
    ($phase:expr, $path:expr, $desc:expr) => {
        $crate::WorkflowLog::StateFileCreated {
            phase: $phase,
            file_path: $path.to_string(),
            description: $desc.to_string(),
        }
        .emit();
    };
}

// ============================================================================
// Console Logging Macros
// ============================================================================
// Colored human-readable output on stderr, leaving stdout for reports.
// ============================================================================

/// Logs the start of a phase with a header and description.
///
/// # Example
/// ```
/// use prompt_workflow_sdk::log_phase_start_console;
/// log_phase_start_console!(1, "Code Structure", "Render structure prompts");
/// ```
///
/// Outputs:
/// ```text
/// ═══ PHASE 1: Code Structure ═══
/// Render structure prompts
/// ```
#[macro_export]
macro_rules! log_phase_start_console {
    ($phase:expr, $title:expr, $description:expr) => {
        eprintln!("\x1b[1;36m═══ PHASE {}: {} ═══\x1b[0m", $phase, $title);
        eprintln!("\x1b[36m{}\x1b[0m", $description);
    };
}

/// Logs the completion of a phase.
#[macro_export]
macro_rules! log_phase_complete_console {
    ($phase:expr) => {
        eprintln!("\x1b[32m✓ Phase {} complete\x1b[0m", $phase);
    };
}

/// Logs progress of an operation.
///
/// # Example
/// ```
/// use prompt_workflow_sdk::log_progress;
/// log_progress!(3, 5, "prompts");
/// ```
///
/// Outputs:
/// ```text
/// Progress: 3/5 prompts
/// ```
#[macro_export]
macro_rules! log_progress {
    ($current:expr, $total:expr, $item_type:expr) => {
        eprintln!(
            "\x1b[36mProgress: {}/{} {}\x1b[0m",
            $current, $total, $item_type
        );
    };
}

/// Logs the number of items found.
///
/// # Example
/// ```
/// use prompt_workflow_sdk::log_found;
/// log_found!(14, "findings");
/// ```
#[macro_export]
macro_rules! log_found {
    ($count:expr, $item_type:expr) => {
        eprintln!("\x1b[36mFound {} {}\x1b[0m", $count, $item_type);
    };
}

/// Logs an informational message.
///
/// # Example
/// ```
/// use prompt_workflow_sdk::log_info;
/// log_info!("Loading templates...");
/// let phase = 2;
/// log_info!("Loading phase {}", phase);
/// ```
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        eprintln!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        eprintln!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
///
/// # Example
/// ```
/// use prompt_workflow_sdk::log_warning;
/// log_warning!("No documentation discovered");
/// ```
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        eprintln!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        eprintln!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs that a file has been saved.
///
/// # Example
/// ```
/// use prompt_workflow_sdk::log_file_saved;
/// log_file_saved!("./prompts/phase_0.md");
/// ```
#[macro_export]
macro_rules! log_file_saved {
    ($path:expr) => {
        eprintln!("\x1b[32m✓ Saved: {}\x1b[0m", $path);
    };
}

// ============================================================================
// End of Console Logging Macros
// ============================================================================
