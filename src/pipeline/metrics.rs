use super::state::{PhaseReport, PhaseStatus, RunSummary};
use crate::models::finding::FindingSet;

pub fn compute_summary(
    phases: &[PhaseReport],
    findings: &FindingSet,
    recommendations: usize,
    total_duration_ms: u64,
) -> RunSummary {
    let count = |status: PhaseStatus| phases.iter().filter(|p| p.status == status).count();

    RunSummary {
        phases_completed: count(PhaseStatus::Completed),
        phases_skipped: count(PhaseStatus::Skipped),
        phases_failed: count(PhaseStatus::Failed),
        total_duration_ms,
        open_ports: findings.open_ports.len(),
        cves: findings.cves.len(),
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::phase::ScanPhase;

    #[test]
    fn test_counts_by_status() {
        let phases = vec![
            PhaseReport::failed(ScanPhase::Tcp, vec![], "timed out", 10),
            PhaseReport::skipped(ScanPhase::Vuln, "no ports"),
        ];
        let summary = compute_summary(&phases, &FindingSet::default(), 0, 10);
        assert_eq!(summary.phases_failed, 1);
        assert_eq!(summary.phases_skipped, 1);
        assert_eq!(summary.phases_completed, 0);
        assert_eq!(summary.total_duration_ms, 10);
    }
}
