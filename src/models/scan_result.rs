use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use crate::pipeline::phase::ScanPhase;
use crate::scanner::target::ScanTarget;

/// What a finished child process left behind. stdout and stderr are kept
/// apart so classification never mistakes a tool diagnostic for a finding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Set when stdout contained bytes that were not valid UTF-8.
    pub lossy: bool,
}

impl ToolOutput {
    pub fn from_bytes(status: Option<i32>, stdout: &[u8], stderr: &[u8]) -> Self {
        let lossy = std::str::from_utf8(stdout).is_err();
        Self {
            status,
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
            lossy,
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// The full captured text as archived: stdout, then stderr when present.
    pub fn combined(&self) -> String {
        if self.stderr.trim().is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() || self.stdout.ends_with('\n') {
            format!("{}{}", self.stdout, self.stderr)
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// The result of a single phase invocation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub phase: ScanPhase,
    pub target: ScanTarget,
    pub output: ToolOutput,
    pub timestamp: DateTime<Local>,
}

impl ScanResult {
    pub fn new(phase: ScanPhase, target: ScanTarget, output: ToolOutput) -> Self {
        Self { phase, target, output, timestamp: Local::now() }
    }

    /// Text handed to the classifier.
    pub fn raw_text(&self) -> &str {
        &self.output.stdout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_without_stderr() {
        let out = ToolOutput { status: Some(0), stdout: "80/tcp open\n".into(), ..Default::default() };
        assert_eq!(out.combined(), "80/tcp open\n");
    }

    #[test]
    fn test_combined_appends_stderr_on_new_line() {
        let out = ToolOutput {
            status: Some(1),
            stdout: "Starting Nmap".into(),
            stderr: "QUITTING!\n".into(),
            lossy: false,
        };
        assert_eq!(out.combined(), "Starting Nmap\nQUITTING!\n");
    }

    #[test]
    fn test_from_bytes_flags_invalid_utf8() {
        let out = ToolOutput::from_bytes(Some(0), &[0x66, 0xff, 0x6f], b"");
        assert!(out.lossy);
        assert!(out.success());
        let clean = ToolOutput::from_bytes(Some(0), b"ok", b"");
        assert!(!clean.lossy);
    }

    #[test]
    fn test_signal_termination_is_not_success() {
        let out = ToolOutput::from_bytes(None, b"", b"");
        assert!(!out.success());
    }
}
