use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use crate::audit::WorkflowLogger;
use crate::cli::commands::ScanArgs;
use crate::cli::prompt;
use crate::config::credentials::{resolve_credential, Secret};
use crate::config::{self, GenmapConfig};
use crate::errors::GenmapError;
use crate::knowledge::{KnowledgeBase, RecommendationEngine};
use crate::pipeline::orchestrator::PhaseOrchestrator;
use crate::pipeline::state::{PipelineReport, RunContext};
use crate::reporting::ResultArchiver;
use crate::scanner::invoker::{Elevation, NmapInvoker, ToolSettings};
use crate::scanner::target::ScanTarget;
use crate::ui::events::PipelineEvent;
use crate::ui::progress::ScanProgress;
use crate::ui::renderer::render_event;
use crate::ui::banner::show_banner;
use tracing::{info, warn};

/// Everything resolved from flags and the config file before a run starts.
pub struct ScanPlan {
    pub tool: ToolSettings,
    pub knowledge_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub write_report: bool,
    pub color: bool,
}

impl ScanPlan {
    /// Flags win over the config file.
    pub fn resolve(args: &ScanArgs, file: &GenmapConfig) -> Self {
        let scan = file.scan();
        let elevation = file.elevation();
        let output = file.output();

        let tool = ToolSettings {
            tool: args.nmap.clone().or(scan.nmap_path).unwrap_or_else(|| "nmap".to_string()),
            elevation: if args.no_elevate || !elevation.enabled {
                None
            } else {
                Some(match elevation.program {
                    Some(program) if program != "sudo" => Elevation { program, args: Vec::new() },
                    _ => Elevation::default(),
                })
            },
            timeout: args.timeout.or(scan.phase_timeout_secs).map(Duration::from_secs),
        };

        Self {
            tool,
            knowledge_dir: args
                .knowledge
                .clone()
                .or_else(|| file.knowledge.as_ref().and_then(|k| k.directory.clone())),
            output_dir: args
                .output
                .clone()
                .or(output.directory)
                .unwrap_or_else(|| PathBuf::from(".")),
            write_report: args.report || output.report.unwrap_or(false),
            color: output.color.unwrap_or(true),
        }
    }

    pub fn context(
        &self,
        args: &ScanArgs,
        file: &GenmapConfig,
        target: ScanTarget,
        credential: Option<Secret>,
    ) -> RunContext {
        let scan = file.scan();
        let mut context = RunContext::new(target, credential);
        context.failure_policy = args.on_failure.or(scan.on_failure).unwrap_or_default();
        context.empty_port_policy = args.empty_ports.or(scan.empty_ports).unwrap_or_default();
        context.output_dir = self.output_dir.clone();
        context
    }
}

fn resolve_target(args: &ScanArgs) -> Result<ScanTarget, GenmapError> {
    match (&args.target, &args.input_list) {
        (Some(host), _) => ScanTarget::host(host),
        (None, Some(list)) => ScanTarget::input_list(list),
        (None, None) => prompt::read_target(),
    }
}

/// The password is asked for once per run and reused by every phase.
fn resolve_credential_for(plan: &ScanPlan, file: &GenmapConfig) -> Result<Option<Secret>, GenmapError> {
    let Some(ref elevation) = plan.tool.elevation else { return Ok(None) };
    if let Some(configured) = file.elevation().password {
        return Ok(Some(Secret::new(resolve_credential(&configured))));
    }
    let password = prompt::read_password(&elevation.program)?;
    Ok(Some(Secret::new(password)))
}

pub async fn handle_scan(args: ScanArgs, quiet: bool) -> Result<(), GenmapError> {
    let file_config = match &args.config {
        Some(path) => config::parse_config(path).await?,
        None => GenmapConfig::default(),
    };

    let plan = ScanPlan::resolve(&args, &file_config);
    if !plan.color {
        console::set_colors_enabled(false);
    }
    if !quiet && !args.no_banner {
        show_banner();
    }

    let target = resolve_target(&args)?;
    let credential = resolve_credential_for(&plan, &file_config)?;
    let context = plan.context(&args, &file_config, target, credential);

    let kb = Arc::new(KnowledgeBase::load(plan.knowledge_dir.as_deref())?);
    info!(advisories = kb.len(), "Knowledge base loaded");

    tokio::fs::create_dir_all(&plan.output_dir).await?;
    let secrets: Vec<String> = context
        .credential
        .iter()
        .map(|s| s.expose().to_string())
        .collect();
    let archiver = ResultArchiver::new(&plan.output_dir).with_secrets(secrets.clone());
    let workflow = WorkflowLogger::new(&plan.output_dir);

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping current phase");
            ctrl_c_token.cancel();
        }
    });

    let (tx, rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(render_events(rx, quiet));

    let invoker = Arc::new(NmapInvoker::new(plan.tool.clone()));
    let orchestrator = PhaseOrchestrator::new(context, invoker, RecommendationEngine::new(kb))
        .with_archiver(archiver)
        .with_workflow_log(workflow)
        .with_cancel_token(cancel)
        .with_event_channel(tx);

    let result = orchestrator.run().await;
    // Closing the channel lets the renderer drain and exit
    drop(orchestrator);
    join_renderer(renderer).await;

    let report = result?;
    if plan.write_report {
        save_report(&plan, secrets, &report).await;
    }
    Ok(())
}

async fn save_report(plan: &ScanPlan, secrets: Vec<String>, report: &PipelineReport) {
    let archiver = ResultArchiver::new(&plan.output_dir).with_secrets(secrets);
    match archiver.save_report(report).await {
        Ok(path) => println!("Report written to {}", path.display()),
        Err(e) => warn!(error = %e, "Failed to write run report"),
    }
}

async fn render_events(mut rx: mpsc::UnboundedReceiver<PipelineEvent>, quiet: bool) {
    if quiet {
        while let Some(event) = rx.recv().await {
            if matches!(event, PipelineEvent::PipelineCompleted { .. } | PipelineEvent::PipelineFailed { .. }) {
                println!("{}", render_event(&event));
            }
        }
        return;
    }

    let mut progress = ScanProgress::new();
    while let Some(event) = rx.recv().await {
        progress.handle_event(&event);
        progress.println(&render_event(&event));
    }
}

/// Wait for the renderer to drain. Returns false when the task died.
async fn join_renderer(renderer: tokio::task::JoinHandle<()>) -> bool {
    match renderer.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Event renderer task failed");
            false
        }
    }
}
