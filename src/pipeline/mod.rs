pub mod phase;
pub mod state;
pub mod metrics;
pub mod orchestrator;

pub use phase::ScanPhase;
pub use state::{EmptyPortPolicy, FailurePolicy, PhaseState, PipelineReport, RunContext};
pub use orchestrator::PhaseOrchestrator;
