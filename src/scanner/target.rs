use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::errors::GenmapError;

/// What nmap is pointed at: one host/domain/CIDR, or a file of targets passed
/// with `-iL`. Fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum ScanTarget {
    Host(String),
    InputList(PathBuf),
}

impl ScanTarget {
    pub fn host(value: &str) -> Result<Self, GenmapError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(GenmapError::InvalidTarget("target is empty".into()));
        }
        // nmap would parse a leading dash as one of its own options
        if value.starts_with('-') {
            return Err(GenmapError::InvalidTarget(format!(
                "target '{}' looks like a command-line flag",
                value
            )));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(GenmapError::InvalidTarget(format!(
                "target '{}' contains whitespace; use an input list for multiple targets",
                value
            )));
        }
        Ok(Self::Host(value.to_string()))
    }

    pub fn input_list(path: &Path) -> Result<Self, GenmapError> {
        if !path.is_file() {
            return Err(GenmapError::InvalidTarget(format!(
                "input list not found: {}",
                path.display()
            )));
        }
        Ok(Self::InputList(path.to_path_buf()))
    }

    /// Trailing nmap arguments selecting this target.
    pub fn to_args(&self) -> Vec<String> {
        match self {
            Self::Host(host) => vec![host.clone()],
            Self::InputList(path) => vec!["-iL".to_string(), path.display().to_string()],
        }
    }

    /// Short identifier used in artifact names: the host itself, or the input
    /// list's file name.
    pub fn label(&self) -> String {
        match self {
            Self::Host(host) => host.clone(),
            Self::InputList(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

impl std::fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host(host) => f.write_str(host),
            Self::InputList(path) => write!(f, "targets from {}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_args() {
        let t = ScanTarget::host("10.10.11.5").unwrap();
        assert_eq!(t.to_args(), vec!["10.10.11.5"]);
        assert_eq!(t.label(), "10.10.11.5");
    }

    #[test]
    fn test_host_is_trimmed() {
        let t = ScanTarget::host("  scanme.nmap.org\n").unwrap();
        assert_eq!(t, ScanTarget::Host("scanme.nmap.org".into()));
    }

    #[test]
    fn test_empty_host_rejected() {
        assert!(matches!(ScanTarget::host("   "), Err(GenmapError::InvalidTarget(_))));
    }

    #[test]
    fn test_flag_like_host_rejected() {
        assert!(ScanTarget::host("--script=evil").is_err());
    }

    #[test]
    fn test_host_with_space_rejected() {
        assert!(ScanTarget::host("10.0.0.1 10.0.0.2").is_err());
    }

    #[test]
    fn test_cidr_accepted() {
        assert!(ScanTarget::host("192.168.1.0/24").is_ok());
    }

    #[test]
    fn test_input_list_args_and_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.txt");
        std::fs::write(&path, "10.0.0.1\n10.0.0.2\n").unwrap();
        let t = ScanTarget::input_list(&path).unwrap();
        assert_eq!(t.to_args(), vec!["-iL".to_string(), path.display().to_string()]);
        assert_eq!(t.label(), "hosts.txt");
    }

    #[test]
    fn test_missing_input_list_rejected() {
        let err = ScanTarget::input_list(Path::new("/nonexistent/genmap/hosts.txt")).unwrap_err();
        assert!(matches!(err, GenmapError::InvalidTarget(_)));
    }
}
