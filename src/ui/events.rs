use std::path::PathBuf;
use crate::models::finding::FindingSet;
use crate::pipeline::phase::ScanPhase;
use crate::pipeline::state::PipelineReport;

/// Messages sent from the pipeline to the terminal renderer.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    PipelineStarted {
        run_id: String,
        target: String,
    },
    /// A phase is about to launch the scanner
    PhaseStarted {
        phase: ScanPhase,
        display_name: String,
        command: String,
    },
    /// A phase finished and its output was classified
    PhaseCompleted {
        phase: ScanPhase,
        display_name: String,
        raw_output: String,
        findings: FindingSet,
        artifact: Option<PathBuf>,
        duration_ms: u64,
    },
    PhaseSkipped {
        phase: ScanPhase,
        reason: String,
    },
    PhaseFailed {
        phase: ScanPhase,
        error: String,
        continuing: bool,
    },
    /// TCP ports handed to the vulnerability phase
    PortsCarried {
        ports: String,
    },
    PipelineCompleted {
        report: Box<PipelineReport>,
    },
    PipelineFailed {
        error: String,
    },
}
