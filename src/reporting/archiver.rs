use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};
use crate::audit::utils::atomic_write;
use crate::config::credentials::redact_credentials;
use crate::errors::GenmapError;
use crate::models::scan_result::{ScanResult, ToolOutput};
use crate::pipeline::state::PipelineReport;
use super::formatter::format_pipeline_report;
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Writes raw phase output and run reports to the output directory.
pub struct ResultArchiver {
    output_dir: PathBuf,
    secrets: Vec<String>,
}

impl ResultArchiver {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into(), secrets: Vec::new() }
    }

    /// Values scrubbed from tool stderr and error text written to disk.
    /// Scan output itself is kept verbatim.
    pub fn with_secrets(mut self, secrets: Vec<String>) -> Self {
        self.secrets = secrets.into_iter().filter(|s| !s.is_empty()).collect();
        self
    }

    /// Persist one phase's captured text verbatim and return the file path.
    pub async fn save(&self, result: &ScanResult) -> Result<PathBuf, GenmapError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let name = artifact_name(result.phase.tag(), &result.target.label(), &result.timestamp);
        let path = unique_path(&self.output_dir, &name);
        let output = ToolOutput {
            stderr: self.scrub(&result.output.stderr),
            ..result.output.clone()
        };
        atomic_write(&path, &output.combined()).await?;
        info!(phase = %result.phase, path = %path.display(), "Saved scan output");
        Ok(path)
    }

    /// Persist the markdown summary of a finished run.
    pub async fn save_report(&self, report: &PipelineReport) -> Result<PathBuf, GenmapError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let name = format!(
            "genMAP_report_{}_{}.md",
            sanitize(&report.target.label()),
            Local::now().format(TIMESTAMP_FORMAT)
        );
        let path = unique_path(&self.output_dir, &name);
        let mut report = report.clone();
        for phase in &mut report.phases {
            phase.error = phase.error.as_deref().map(|e| self.scrub(e));
        }
        atomic_write(&path, &format_pipeline_report(&report)).await?;
        info!(path = %path.display(), "Saved run report");
        Ok(path)
    }

    fn scrub(&self, text: &str) -> String {
        let secrets: Vec<&str> = self.secrets.iter().map(String::as_str).collect();
        redact_credentials(text, &secrets)
    }
}

/// `genMAP_<tag>_scan_<target>_<YYYY-MM-DD_HH-MM-SS>.txt`
pub fn artifact_name(tag: &str, target_label: &str, timestamp: &DateTime<Local>) -> String {
    format!(
        "genMAP_{}_scan_{}_{}.txt",
        tag,
        sanitize(target_label),
        timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Keeps hostnames, IPv4/IPv6 text and CIDR ranges readable while making
/// them safe as a single path component.
fn sanitize(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "target".to_string()
    } else {
        cleaned
    }
}

/// Two phases finishing within the same second must not overwrite each other.
fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{}", ext)),
        None => (name, String::new()),
    };
    (1..)
        .map(|n| dir.join(format!("{}_{}{}", stem, n, ext)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}
