use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use crate::audit::WorkflowLogger;
use crate::classify::classify;
use crate::errors::GenmapError;
use crate::knowledge::RecommendationEngine;
use crate::models::finding::FindingSet;
use crate::models::scan_result::ScanResult;
use crate::reporting::ResultArchiver;
use crate::scanner::diagnostics::check_output;
use crate::scanner::ToolInvoker;
use crate::ui::events::PipelineEvent;
use crate::utils::truncation::truncate_output;
use super::metrics::compute_summary;
use super::phase::ScanPhase;
use super::state::*;
use tracing::{debug, error, info, warn};

/// Port range used for the vulnerability phase when TCP found nothing and
/// the run asked for a full sweep.
const ALL_PORTS: &str = "1-65535";

/// Drives TCP → UDP → VULN for one target.
pub struct PhaseOrchestrator {
    context: Arc<RunContext>,
    invoker: Arc<dyn ToolInvoker>,
    engine: RecommendationEngine,
    archiver: Option<ResultArchiver>,
    workflow: Option<WorkflowLogger>,
    state: Arc<RwLock<PipelineState>>,
    cancel_token: CancellationToken,
    event_tx: Option<mpsc::UnboundedSender<PipelineEvent>>,
}

/// What the vulnerability phase will do given TCP's results.
enum VulnPlan {
    Run(String),
    Skip,
}

impl PhaseOrchestrator {
    pub fn new(
        context: RunContext,
        invoker: Arc<dyn ToolInvoker>,
        engine: RecommendationEngine,
    ) -> Self {
        Self {
            context: Arc::new(context),
            invoker,
            engine,
            archiver: None,
            workflow: None,
            state: Arc::new(RwLock::new(PipelineState::new())),
            cancel_token: CancellationToken::new(),
            event_tx: None,
        }
    }

    pub fn with_archiver(mut self, archiver: ResultArchiver) -> Self {
        self.archiver = Some(archiver);
        self
    }

    pub fn with_workflow_log(mut self, logger: WorkflowLogger) -> Self {
        self.workflow = Some(logger);
        self
    }

    /// Replace the internal cancel token with an external one (e.g. wired to Ctrl-C).
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Attach an event channel for streaming progress to the terminal renderer.
    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn state(&self) -> Arc<RwLock<PipelineState>> {
        self.state.clone()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    async fn log_workflow(&self, message: &str) {
        if let Some(ref logger) = self.workflow {
            if let Err(e) = logger.log_event(message).await {
                warn!(error = %e, "Failed to write workflow log");
            }
        }
    }

    pub async fn run(&self) -> Result<PipelineReport, GenmapError> {
        let started = Instant::now();
        info!(
            run_id = %self.context.run_id,
            target = %self.context.target,
            output_dir = %self.context.output_dir.display(),
            "Pipeline started"
        );
        self.emit(PipelineEvent::PipelineStarted {
            run_id: self.context.run_id.clone(),
            target: self.context.target.to_string(),
        });
        if let Some(ref logger) = self.workflow {
            if let Err(e) = logger
                .initialize(&self.context.run_id, &self.context.target.to_string())
                .await
            {
                warn!(error = %e, "Failed to initialize workflow log");
            }
        }

        let mut tcp_ports = String::new();

        loop {
            let machine = self.state.read().await.machine;
            let Some(phase) = machine.pending_phase() else { break };

            if let Err(e) = self.check_cancelled() {
                self.fail_pipeline(&e).await;
                return Err(e);
            }

            let ports = match phase {
                ScanPhase::Vuln => match self.plan_vuln(&tcp_ports) {
                    VulnPlan::Run(ports) => ports,
                    VulnPlan::Skip => {
                        self.skip_phase(phase, "no open TCP ports were found").await;
                        continue;
                    }
                },
                _ => String::new(),
            };

            match self.run_phase(phase, &ports).await {
                Ok(report) => {
                    if phase == ScanPhase::Tcp {
                        if let Some(ref findings) = report.findings {
                            tcp_ports = findings.tcp_port_list();
                        }
                        info!(ports = %tcp_ports, "Carrying TCP ports forward");
                        self.emit(PipelineEvent::PortsCarried { ports: tcp_ports.clone() });
                    }
                    self.record(report, |m| m.complete().advance()).await;
                }
                Err((e, report)) => {
                    self.handle_failure(phase, e, report).await?;
                }
            }
        }

        let report = self.finish(tcp_ports, started).await;
        self.emit(PipelineEvent::PipelineCompleted { report: Box::new(report.clone()) });
        Ok(report)
    }

    fn plan_vuln(&self, tcp_ports: &str) -> VulnPlan {
        if !tcp_ports.is_empty() {
            return VulnPlan::Run(tcp_ports.to_string());
        }
        match self.context.empty_port_policy {
            EmptyPortPolicy::Skip => VulnPlan::Skip,
            EmptyPortPolicy::AllPorts => VulnPlan::Run(ALL_PORTS.to_string()),
            EmptyPortPolicy::Empty => VulnPlan::Run(String::new()),
        }
    }

    async fn skip_phase(&self, phase: ScanPhase, reason: &str) {
        info!(phase = %phase, reason, "Phase skipped");
        self.emit(PipelineEvent::PhaseSkipped { phase, reason: reason.to_string() });
        self.log_workflow(&format!("{} skipped: {}", phase.display_name(), reason)).await;
        self.record(PhaseReport::skipped(phase, reason), |m| m.complete().advance()).await;
    }

    async fn record(&self, report: PhaseReport, transition: impl FnOnce(PhaseState) -> PhaseState) {
        let mut state = self.state.write().await;
        let next = transition(state.machine);
        state.machine = next;
        state.phases.push(report);
    }

    /// Invoke one phase, archive its output and classify it. On failure the
    /// partial report is handed back with the error.
    async fn run_phase(
        &self,
        phase: ScanPhase,
        ports: &str,
    ) -> Result<PhaseReport, (GenmapError, PhaseReport)> {
        let args = phase.arguments(ports);
        let command = self.invoker.command_line(&args, &self.context.target);
        let display_name = phase.display_name();
        let started = Instant::now();

        info!(phase = %phase, command = %command.join(" "), "Phase started");
        self.emit(PipelineEvent::PhaseStarted {
            phase,
            display_name: display_name.to_string(),
            command: command.join(" "),
        });
        self.log_workflow(&format!("{} started: {}", display_name, command.join(" "))).await;

        let elapsed = |started: Instant| started.elapsed().as_millis() as u64;

        let output = match self
            .invoker
            .run(&args, self.context.credential.as_ref(), &self.context.target, &self.cancel_token)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let report = PhaseReport::failed(phase, command, &e.to_string(), elapsed(started));
                return Err((e, report));
            }
        };

        let result = ScanResult::new(phase, self.context.target.clone(), output);

        // Archive before diagnosing so failed runs still leave their output behind
        let artifact = match self.archiver {
            Some(ref archiver) => match archiver.save(&result).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!(phase = %phase, error = %e, "Failed to archive scan output");
                    None
                }
            },
            None => None,
        };

        if let Err(e) = check_output(&result.output, self.invoker.tool_name()) {
            let mut report = PhaseReport::failed(phase, command, &e.to_string(), elapsed(started));
            report.artifact = artifact;
            report.result = Some(result);
            return Err((e, report));
        }

        let findings = classify(result.raw_text());
        let duration_ms = elapsed(started);
        debug!(
            phase = %phase,
            findings = findings.total_findings(),
            general = ?findings.general_info_summaries(),
            output = %truncate_output(result.raw_text()),
            "Output classified"
        );
        info!(phase = %phase, duration_ms, "Phase completed");

        self.emit(PipelineEvent::PhaseCompleted {
            phase,
            display_name: display_name.to_string(),
            raw_output: result.raw_text().to_string(),
            findings: findings.clone(),
            artifact: artifact.clone(),
            duration_ms,
        });
        self.log_workflow(&format!(
            "{} completed: {} open ports, {} CVEs",
            display_name,
            findings.open_ports.len(),
            findings.cves.len()
        ))
        .await;

        Ok(PhaseReport {
            phase,
            status: PhaseStatus::Completed,
            command,
            result: Some(result),
            findings: Some(findings),
            artifact,
            error: None,
            duration_ms,
        })
    }

    async fn handle_failure(
        &self,
        phase: ScanPhase,
        e: GenmapError,
        report: PhaseReport,
    ) -> Result<(), GenmapError> {
        let classification = e.classify();
        let continuing = self.context.failure_policy == FailurePolicy::Continue
            && classification.degradable
            && !self.cancel_token.is_cancelled();

        self.emit(PipelineEvent::PhaseFailed { phase, error: e.to_string(), continuing });
        self.log_workflow(&format!("{} failed: {}", phase.display_name(), e)).await;

        if continuing {
            warn!(
                phase = %phase,
                error_type = classification.error_type,
                error = %e,
                "Phase failed, continuing with next phase"
            );
            self.record(report, |m| m.complete().advance()).await;
            return Ok(());
        }

        error!(phase = %phase, error_type = classification.error_type, error = %e, "Phase failed");
        self.record(report, PhaseState::fail).await;
        self.fail_pipeline(&e).await;
        Err(e)
    }

    async fn fail_pipeline(&self, e: &GenmapError) {
        self.emit(PipelineEvent::PipelineFailed { error: e.to_string() });
        self.log_workflow(&format!("Run aborted: {}", e)).await;
    }

    fn check_cancelled(&self) -> Result<(), GenmapError> {
        if self.cancel_token.is_cancelled() {
            info!("Pipeline cancelled by user");
            Err(GenmapError::Cancelled("pipeline cancelled by user".into()))
        } else {
            Ok(())
        }
    }

    /// Recommendations come from the vulnerability phase when it produced
    /// findings, otherwise from everything the earlier phases saw.
    async fn finish(&self, tcp_ports: String, started: Instant) -> PipelineReport {
        let state = self.state.read().await;
        let completed = || {
            state.phases.iter().filter_map(|p| match p.status {
                PhaseStatus::Completed => p.findings.as_ref().map(|f| (p.phase, f)),
                _ => None,
            })
        };

        let findings = match completed().find(|(phase, _)| *phase == ScanPhase::Vuln) {
            Some((_, vuln)) => vuln.clone(),
            None => completed().fold(FindingSet::default(), |mut acc, (_, f)| {
                acc.merge(f);
                acc
            }),
        };

        let recommendations = self.engine.recommend_for(&findings);
        let total_duration_ms = started.elapsed().as_millis() as u64;
        let summary = compute_summary(&state.phases, &findings, recommendations.len(), total_duration_ms);

        info!(
            run_id = %self.context.run_id,
            recommendations = recommendations.len(),
            final_state = ?state.machine,
            "Pipeline completed"
        );

        PipelineReport {
            run_id: self.context.run_id.clone(),
            target: self.context.target.clone(),
            final_state: state.machine,
            phases: state.phases.clone(),
            tcp_ports,
            findings,
            recommendations,
            summary,
        }
    }
}
