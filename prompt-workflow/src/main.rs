use anyhow::{Context, Result};
use clap::Parser;
use prompt_workflow::cli::{Cli, Command, GenerateArgs, ScanArgs, WorkflowCommand};
use prompt_workflow::config::OrchestratorConfig;
use prompt_workflow::orchestrator;
use prompt_workflow::phases::phase_name;
use prompt_workflow::templates::{TemplateLoader, PHASE_COUNT};
use prompt_workflow::workflow::ExecutionState;
use prompt_workflow_sdk::{
    log_file_saved, log_info, log_phase_complete_console, log_phase_start_console, log_progress,
    log_warning, set_events_enabled,
};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    set_events_enabled(cli.emit_events);

    match &cli.command {
        Command::Scan(args) => {
            let mut config = OrchestratorConfig::discover(cli.config.as_deref(), Some(&args.path))?;
            if run_scan(args, &mut config)? {
                std::process::exit(1);
            }
        }
        Command::Generate(args) => {
            let mut config = OrchestratorConfig::discover(cli.config.as_deref(), Some(&args.path))?;
            run_generate(args, &mut config)?;
        }
        Command::Workflow(WorkflowCommand::List) => {
            let config = OrchestratorConfig::discover(cli.config.as_deref(), None)?;
            let loader = config.workflow_loader();
            for name in loader.list_available() {
                println!("{}", name);
            }
        }
        Command::Workflow(WorkflowCommand::Run {
            name,
            path,
            generate,
            format,
            output,
        }) => {
            let mut config = OrchestratorConfig::discover(cli.config.as_deref(), Some(path))?;
            if let Some(dir) = output {
                config.output_dir = dir.clone();
            }
            let mut loader = config.workflow_loader();
            let run = orchestrator::run_workflow(&mut loader, name, path, *generate, &config)?;

            for execution in &run.executions {
                let marker = match execution.state {
                    ExecutionState::Completed => "done",
                    ExecutionState::Skipped => "skipped",
                    ExecutionState::Failed => "FAILED",
                    ExecutionState::Running => "running",
                    ExecutionState::Pending => "pending",
                };
                println!("[{:>7}] {}/{}", marker, execution.section_id, execution.prompt_id);
                if let Some(error) = &execution.error {
                    println!("          {}", error);
                }
            }
            log_progress!(run.progress.completed, run.progress.total_prompts, "prompts completed");
            log_info!(
                "{:.1}% complete ({} pending)",
                run.progress.completion_percentage(),
                run.progress.pending()
            );

            if !run.prompts.is_empty() {
                let title = format!("{} prompts", run.workflow_name);
                let path = orchestrator::export_prompts(&title, &run.prompts, *format, &config.output_dir)?;
                log_file_saved!(path.display());
            }
            if !run.succeeded() {
                std::process::exit(1);
            }
        }
        Command::Templates { phase } => {
            let config = OrchestratorConfig::discover(cli.config.as_deref(), None)?;
            let mut loader: TemplateLoader = config.template_loader();
            let templates = loader
                .load_phase(*phase)
                .with_context(|| format!("Failed to load templates for phase {}", phase))?;
            for template in templates.iter() {
                let gate = template
                    .conditional
                    .as_ref()
                    .map(|c| format!(" [if {}]", c))
                    .unwrap_or_default();
                println!("{:<28} {}{}", template.id, template.title, gate);
            }
        }
    }
    Ok(())
}

/// Returns true when blocking (critical or high) findings were reported
fn run_scan(args: &ScanArgs, config: &mut OrchestratorConfig) -> Result<bool> {
    args.apply(config);
    let mut findings = orchestrator::scan(&args.path, config)?;
    if let Some(threshold) = args.min_severity {
        findings = orchestrator::filter_severity(findings, threshold);
    }

    match &args.output {
        Some(dir) => {
            let path = orchestrator::export_findings(&findings, args.format, dir)?;
            log_file_saved!(path.display());
        }
        None => print!("{}", args.format.render(&findings)?),
    }

    let blocking = orchestrator::has_blocking_findings(&findings);
    if blocking {
        log_warning!("Critical or high severity findings present");
    }
    Ok(blocking)
}

fn run_generate(args: &GenerateArgs, config: &mut OrchestratorConfig) -> Result<()> {
    args.apply(config);

    log_info!("Analysing {}", args.path.display());
    let analysis = orchestrator::analyze(&args.path, config)?;

    let phases: Vec<u8> = if args.phases.is_empty() {
        (0..PHASE_COUNT).collect()
    } else {
        args.phases.clone()
    };
    let mut prompts = Vec::new();
    for phase in phases {
        log_phase_start_console!(phase, phase_name(phase), "Rendering templates");
        prompts.extend(orchestrator::generate(&analysis, &[phase], config)?);
        log_phase_complete_console!(phase);
    }

    if prompts.is_empty() {
        log_warning!("No templates applied to {}", args.path.display());
        return Ok(());
    }
    let title = orchestrator::export_title(&analysis);
    let path = orchestrator::export_prompts(&title, &prompts, args.format, &config.output_dir)?;
    log_file_saved!(path.display());
    Ok(())
}
