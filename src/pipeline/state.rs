use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use crate::config::credentials::Secret;
use crate::models::finding::FindingSet;
use crate::models::recommendation::RecommendationEntry;
use crate::models::scan_result::ScanResult;
use crate::scanner::target::ScanTarget;
use super::phase::ScanPhase;

/// Position of a run in the TCP → UDP → VULN sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", tag = "state", content = "phase")]
pub enum PhaseState {
    TcpPending,
    TcpDone,
    UdpPending,
    UdpDone,
    VulnPending,
    VulnDone,
    Failed(ScanPhase),
}

impl PhaseState {
    pub fn initial() -> Self {
        PhaseState::TcpPending
    }

    /// The phase waiting to run, if any.
    pub fn pending_phase(&self) -> Option<ScanPhase> {
        match self {
            PhaseState::TcpPending => Some(ScanPhase::Tcp),
            PhaseState::UdpPending => Some(ScanPhase::Udp),
            PhaseState::VulnPending => Some(ScanPhase::Vuln),
            _ => None,
        }
    }

    /// Pending → Done for the current phase.
    pub fn complete(self) -> Self {
        match self {
            PhaseState::TcpPending => PhaseState::TcpDone,
            PhaseState::UdpPending => PhaseState::UdpDone,
            PhaseState::VulnPending => PhaseState::VulnDone,
            other => other,
        }
    }

    /// Done → next phase's Pending. VulnDone is terminal.
    pub fn advance(self) -> Self {
        match self {
            PhaseState::TcpDone => PhaseState::UdpPending,
            PhaseState::UdpDone => PhaseState::VulnPending,
            other => other,
        }
    }

    pub fn fail(self) -> Self {
        match self.pending_phase() {
            Some(phase) => PhaseState::Failed(phase),
            None => self,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PhaseState::VulnDone | PhaseState::Failed(_))
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::initial()
    }
}

/// What to do when a phase fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the run at the failed phase.
    #[default]
    Abort,
    /// Record the failure and move on, when the error allows it.
    Continue,
}

/// What the Vuln phase does when the TCP phase found no open ports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyPortPolicy {
    /// Do not run the Vuln phase.
    #[default]
    Skip,
    /// Run it against every port.
    AllPorts,
    /// Pass an empty `-p` value through to nmap.
    Empty,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            other => Err(format!("unknown failure policy '{}' (expected abort or continue)", other)),
        }
    }
}

impl std::str::FromStr for EmptyPortPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "all-ports" => Ok(Self::AllPorts),
            "empty" => Ok(Self::Empty),
            other => Err(format!(
                "unknown empty-port policy '{}' (expected skip, all-ports or empty)",
                other
            )),
        }
    }
}

/// Everything a run needs, fixed before the first phase starts and shared by
/// every phase.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub target: ScanTarget,
    pub credential: Option<Secret>,
    pub failure_policy: FailurePolicy,
    pub empty_port_policy: EmptyPortPolicy,
    pub output_dir: PathBuf,
}

impl RunContext {
    pub fn new(target: ScanTarget, credential: Option<Secret>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            target,
            credential,
            failure_policy: FailurePolicy::default(),
            empty_port_policy: EmptyPortPolicy::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Completed,
    Skipped,
    Failed,
}

/// Outcome of one phase as kept in the run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: ScanPhase,
    pub status: PhaseStatus,
    pub command: Vec<String>,
    pub result: Option<ScanResult>,
    pub findings: Option<FindingSet>,
    pub artifact: Option<PathBuf>,
    pub error: Option<String>,
    pub duration_ms: u64,
}

impl PhaseReport {
    pub fn skipped(phase: ScanPhase, reason: &str) -> Self {
        Self {
            phase,
            status: PhaseStatus::Skipped,
            command: Vec::new(),
            result: None,
            findings: None,
            artifact: None,
            error: Some(reason.to_string()),
            duration_ms: 0,
        }
    }

    pub fn failed(phase: ScanPhase, command: Vec<String>, error: &str, duration_ms: u64) -> Self {
        Self {
            phase,
            status: PhaseStatus::Failed,
            command,
            result: None,
            findings: None,
            artifact: None,
            error: Some(error.to_string()),
            duration_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub machine: PhaseState,
    pub phases: Vec<PhaseReport>,
    pub start_time: DateTime<Utc>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self {
            machine: PhaseState::initial(),
            phases: Vec::new(),
            start_time: Utc::now(),
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub phases_completed: usize,
    pub phases_skipped: usize,
    pub phases_failed: usize,
    pub total_duration_ms: u64,
    pub open_ports: usize,
    pub cves: usize,
    pub recommendations: usize,
}

/// Final product of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub target: ScanTarget,
    pub final_state: PhaseState,
    pub phases: Vec<PhaseReport>,
    /// The `-p` value derived from the TCP phase.
    pub tcp_ports: String,
    /// Findings the recommendations were derived from.
    pub findings: FindingSet,
    pub recommendations: Vec<RecommendationEntry>,
    pub summary: RunSummary,
}

impl PipelineReport {
    pub fn phase(&self, phase: ScanPhase) -> Option<&PhaseReport> {
        self.phases.iter().find(|p| p.phase == phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut state = PhaseState::initial();
        let mut visited = Vec::new();
        while let Some(phase) = state.pending_phase() {
            visited.push(phase);
            state = state.complete().advance();
        }
        assert_eq!(visited, ScanPhase::ALL.to_vec());
        assert_eq!(state, PhaseState::VulnDone);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_complete_then_advance_steps() {
        assert_eq!(PhaseState::TcpPending.complete(), PhaseState::TcpDone);
        assert_eq!(PhaseState::TcpDone.advance(), PhaseState::UdpPending);
        assert_eq!(PhaseState::UdpPending.complete(), PhaseState::UdpDone);
        assert_eq!(PhaseState::UdpDone.advance(), PhaseState::VulnPending);
        assert_eq!(PhaseState::VulnPending.complete(), PhaseState::VulnDone);
        assert_eq!(PhaseState::VulnDone.advance(), PhaseState::VulnDone);
    }

    #[test]
    fn test_fail_records_phase() {
        assert_eq!(PhaseState::UdpPending.fail(), PhaseState::Failed(ScanPhase::Udp));
        assert!(PhaseState::Failed(ScanPhase::Udp).is_terminal());
        assert_eq!(PhaseState::Failed(ScanPhase::Udp).pending_phase(), None);
    }

    #[test]
    fn test_fail_on_done_state_is_noop() {
        assert_eq!(PhaseState::TcpDone.fail(), PhaseState::TcpDone);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("continue".parse::<FailurePolicy>().unwrap(), FailurePolicy::Continue);
        assert_eq!("all-ports".parse::<EmptyPortPolicy>().unwrap(), EmptyPortPolicy::AllPorts);
        assert!("sometimes".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn test_policy_defaults() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Abort);
        assert_eq!(EmptyPortPolicy::default(), EmptyPortPolicy::Skip);
    }

    #[test]
    fn test_policy_yaml_names() {
        let parsed: EmptyPortPolicy = serde_yaml::from_str("all-ports").unwrap();
        assert_eq!(parsed, EmptyPortPolicy::AllPorts);
    }
}
