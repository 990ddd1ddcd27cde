use std::ops::Range;
use console::{style, StyledObject};

use crate::classify::patterns::{Highlight, HIGHLIGHTS};
use crate::models::finding::{FindingSet, Protocol};
use crate::models::recommendation::RecommendationEntry;
use crate::pipeline::phase::ScanPhase;
use crate::pipeline::state::{PhaseStatus, PipelineReport};
use crate::ui::events::PipelineEvent;
use crate::utils::formatting::{format_duration, join_or_none};

/// Render a pipeline event as styled terminal output, returning the formatted block.
pub fn render_event(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::PipelineStarted { run_id, target } => {
            format!(
                "\n{} Starting run {} against {}",
                style("▶").green().bold(),
                style(run_id).cyan(),
                style(target).white().bold(),
            )
        }
        PipelineEvent::PhaseStarted { phase, display_name, command } => {
            format!(
                "\n{} {} {}\n  {}\n  {}",
                style("---").cyan().bold(),
                style(display_name).cyan().bold(),
                style("---").cyan().bold(),
                phase.definition().description,
                style(command).dim(),
            )
        }
        PipelineEvent::PhaseCompleted {
            phase,
            display_name,
            raw_output,
            findings,
            artifact,
            duration_ms,
        } => {
            let mut out = colorize_raw(raw_output);
            out.push_str(&render_findings(*phase, findings));
            if let Some(path) = artifact {
                out.push_str(&format!(
                    "\n  {} saved to {}",
                    style("↳").dim(),
                    style(path.display()).white(),
                ));
            }
            out.push_str(&format!(
                "\n  {} {} complete ({})",
                style("✓").green(),
                style(display_name).green(),
                format_duration(*duration_ms),
            ));
            out
        }
        PipelineEvent::PhaseSkipped { phase, reason } => {
            format!(
                "\n  {} {} skipped ({})",
                style("↷").yellow(),
                style(phase.display_name()).yellow(),
                style(reason).dim(),
            )
        }
        PipelineEvent::PhaseFailed { phase, error, continuing } => {
            let next = if *continuing { "continuing" } else { "aborting" };
            format!(
                "  {} {} failed, {} ({})",
                style("✗").red(),
                style(phase.display_name()).red(),
                next,
                style(error).red().dim(),
            )
        }
        PipelineEvent::PortsCarried { ports } => {
            format!(
                "\n{} {}",
                style("Detected TCP Ports:").red().bold(),
                if ports.is_empty() { "None" } else { ports.as_str() },
            )
        }
        PipelineEvent::PipelineCompleted { report } => render_report(report),
        PipelineEvent::PipelineFailed { error } => {
            format!(
                "\n{} {}\n",
                style("✗ Run failed:").red().bold(),
                style(error).red(),
            )
        }
    }
}

/// Non-overlapping highlighted spans, earliest match first. When two
/// patterns start at the same offset the longer match wins.
pub fn highlight_spans(text: &str) -> Vec<(Range<usize>, Highlight)> {
    let mut candidates: Vec<(Range<usize>, Highlight)> = HIGHLIGHTS
        .iter()
        .flat_map(|(kind, re)| re.find_iter(text).map(move |m| (m.range(), *kind)))
        .collect();
    candidates.sort_by(|a, b| a.0.start.cmp(&b.0.start).then(b.0.end.cmp(&a.0.end)));

    let mut spans = Vec::new();
    let mut cursor = 0;
    for (range, kind) in candidates {
        if range.start >= cursor {
            cursor = range.end;
            spans.push((range, kind));
        }
    }
    spans
}

fn paint(kind: Highlight, text: &str) -> StyledObject<&str> {
    match kind {
        Highlight::OpenPort => style(text).red().bold(),
        Highlight::ServiceInfo => style(text).blue(),
        Highlight::OsDetails => style(text).green(),
        Highlight::Vulnerability => style(text).yellow().bold(),
        Highlight::Directory => style(text).magenta(),
    }
}

/// Echo raw scanner output with findings highlighted in place.
pub fn colorize_raw(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (range, kind) in highlight_spans(text) {
        out.push_str(&text[cursor..range.start]);
        out.push_str(&paint(kind, &text[range.clone()]).to_string());
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// The parsed-data block printed after each phase.
pub fn render_findings(phase: ScanPhase, findings: &FindingSet) -> String {
    let ports: Vec<String> = [Protocol::Tcp, Protocol::Udp]
        .into_iter()
        .flat_map(|p| findings.ports_for(p).map(move |port| format!("{}/{}", port, p)))
        .collect();

    let mut out = format!("\n{}\n", style(format!("[{} parsed data]", phase.display_name())).bold());
    out.push_str(&format!("  {} {}\n", style("Open Ports:").red().bold(), join_or_none(&ports)));
    out.push_str(&format!("  {} {}\n", style("OS:").green().bold(), findings.os_guess.display_text()));
    out.push_str(&format!(
        "  {} {}\n",
        style("Service Info:").blue().bold(),
        join_or_none(&findings.service_info)
    ));
    out.push_str(&format!(
        "  {} {}\n",
        style("Directory Services:").magenta().bold(),
        join_or_none(&findings.ad_indicators)
    ));
    out.push_str(&format!(
        "  {} {}\n",
        style("Vulnerabilities:").yellow().bold(),
        join_or_none(&findings.cves)
    ));
    for info in &findings.general_info {
        out.push_str(&format!(
            "  {} {}\n",
            style(format!("{}:", info.category)).white().bold(),
            join_or_none(&info.matches)
        ));
    }
    out
}

pub fn render_recommendations(entries: &[RecommendationEntry]) -> String {
    let mut out = format!("\n{}\n", style("Recommended Next Steps").white().bold().underlined());
    if entries.is_empty() {
        out.push_str(&format!("  {}\n", style("None").dim()));
        return out;
    }
    for entry in entries {
        let bullet = if entry.is_port_based() { style("•").red() } else { style("•").yellow() };
        out.push_str(&format!("  {} {}\n", bullet, entry.text));
    }
    out
}

pub fn render_report(report: &PipelineReport) -> String {
    let mut out = render_recommendations(&report.recommendations);
    out.push_str(&format!("\n{}\n", style("Phase Summary").white().bold()));
    for phase in &report.phases {
        let status = match phase.status {
            PhaseStatus::Completed => style("completed").green(),
            PhaseStatus::Skipped => style("skipped").yellow(),
            PhaseStatus::Failed => style("failed").red(),
        };
        out.push_str(&format!(
            "  {:<12} {} {}\n",
            phase.phase.display_name(),
            status,
            style(format_duration(phase.duration_ms)).dim(),
        ));
    }
    out.push_str(&format!(
        "\n{} {} open ports | {} CVEs | {} recommendations | {}\n",
        style("✓ Run complete:").green().bold(),
        report.summary.open_ports,
        report.summary.cves,
        report.summary.recommendations,
        format_duration(report.summary.total_duration_ms),
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    #[test]
    fn test_spans_cover_each_category() {
        let text = "22/tcp open ssh\nService Info: OS: Linux\nOS details: Linux 5.4\nCVE-2021-1234\nLDAP\n";
        let kinds: Vec<Highlight> = highlight_spans(text).into_iter().map(|(_, k)| k).collect();
        assert_eq!(
            kinds,
            vec![
                Highlight::OpenPort,
                Highlight::ServiceInfo,
                Highlight::OsDetails,
                Highlight::Vulnerability,
                Highlight::Directory,
            ]
        );
    }

    #[test]
    fn test_spans_never_overlap() {
        let text = "| smb-vuln-ms17-010: VULNERABLE exploit SMB\nService Info: Host: DC01; SMB";
        let spans = highlight_spans(text);
        for pair in spans.windows(2) {
            assert!(pair[0].0.end <= pair[1].0.start);
        }
    }

    #[test]
    fn test_colorize_preserves_text() {
        let text = "80/tcp   open  http\nhttp-title: Welcome\nnothing here\n";
        assert_eq!(console::strip_ansi_codes(&colorize_raw(text)), text);
    }

    #[test]
    fn test_parsed_block_shows_none_for_empty_groups() {
        let block = console::strip_ansi_codes(&render_findings(ScanPhase::Udp, &classify("")))
            .to_string();
        assert!(block.contains("Open Ports: None"));
        assert!(block.contains("Credentials: None"));
        assert!(block.contains("OS: Unknown OS"));
    }

    #[test]
    fn test_parsed_block_lists_ports() {
        let findings = classify("22/tcp open ssh\n161/udp open snmp\n");
        let block = console::strip_ansi_codes(&render_findings(ScanPhase::Tcp, &findings)).to_string();
        assert!(block.contains("Open Ports: 22/tcp, 161/udp"));
    }

    #[test]
    fn test_ports_carried_line() {
        let line = render_event(&PipelineEvent::PortsCarried { ports: String::new() });
        assert!(console::strip_ansi_codes(&line).contains("Detected TCP Ports: None"));
    }

    #[test]
    fn test_pipeline_failed_line() {
        console::set_colors_enabled(false);
        let line = render_event(&PipelineEvent::PipelineFailed { error: "nmap timed out".into() });
        assert!(line.contains("Run failed:"));
        assert!(line.contains("nmap timed out"));
    }
}
