use crate::models::finding::{FindingSet, Protocol};
use crate::models::recommendation::RecommendationEntry;
use crate::pipeline::state::{PhaseStatus, PipelineReport};
use crate::utils::formatting::{format_duration, join_or_none};

pub fn format_findings_markdown(findings: &FindingSet) -> String {
    let ports = |protocol: Protocol| {
        join_or_none(
            &findings.ports_for(protocol).map(|p| format!("{}/{}", p, protocol)).collect::<Vec<_>>(),
        )
    };

    let mut out = String::new();
    out.push_str(&format!("- **Open TCP ports:** {}\n", ports(Protocol::Tcp)));
    out.push_str(&format!("- **Open UDP ports:** {}\n", ports(Protocol::Udp)));
    out.push_str(&format!("- **OS:** {}\n", findings.os_guess.display_text()));
    out.push_str(&format!("- **Service info:** {}\n", join_or_none(&findings.service_info)));
    out.push_str(&format!("- **Directory services:** {}\n", join_or_none(&findings.ad_indicators)));
    out.push_str(&format!("- **CVEs:** {}\n", join_or_none(&findings.cves)));
    for info in &findings.general_info {
        out.push_str(&format!("- **{}:** {}\n", info.category, join_or_none(&info.matches)));
    }
    out
}

pub fn format_recommendations_markdown(entries: &[RecommendationEntry]) -> String {
    if entries.is_empty() {
        return "No recommendations.\n".to_string();
    }
    entries
        .iter()
        .map(|e| format!("- {}\n", e.text))
        .collect()
}

pub fn format_pipeline_report(report: &PipelineReport) -> String {
    let mut out = format!(
        "# genMAP Report\n\n- Run: {}\n- Target: {}\n- Final state: {:?}\n- Duration: {}\n\n",
        report.run_id,
        report.target,
        report.final_state,
        format_duration(report.summary.total_duration_ms),
    );

    out.push_str("## Phases\n\n| Phase | Status | Duration | Notes |\n|---|---|---|---|\n");
    for phase in &report.phases {
        let status = match phase.status {
            PhaseStatus::Completed => "completed",
            PhaseStatus::Skipped => "skipped",
            PhaseStatus::Failed => "failed",
        };
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            phase.phase.display_name(),
            status,
            format_duration(phase.duration_ms),
            phase.error.as_deref().unwrap_or(""),
        ));
    }

    out.push_str(&format!(
        "\nDetected TCP Ports: {}\n\n## Findings\n\n",
        if report.tcp_ports.is_empty() { "None" } else { report.tcp_ports.as_str() }
    ));
    out.push_str(&format_findings_markdown(&report.findings));
    out.push_str("\n## Recommendations\n\n");
    out.push_str(&format_recommendations_markdown(&report.recommendations));
    out
}
