use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::pipeline::state::{EmptyPortPolicy, FailurePolicy};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GenmapConfig {
    pub scan: Option<ScanConfig>,
    pub elevation: Option<ElevationConfig>,
    pub output: Option<OutputConfig>,
    pub knowledge: Option<KnowledgeConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScanConfig {
    /// Scanner binary, looked up on PATH unless absolute.
    pub nmap_path: Option<String>,
    pub phase_timeout_secs: Option<u64>,
    pub on_failure: Option<FailurePolicy>,
    pub empty_ports: Option<EmptyPortPolicy>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ElevationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub program: Option<String>,
    /// Literal password or `$VAR` reference.
    pub password: Option<String>,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self { enabled: true, program: None, password: None }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OutputConfig {
    pub directory: Option<PathBuf>,
    pub color: Option<bool>,
    /// Also write a markdown summary of the run.
    pub report: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct KnowledgeConfig {
    /// Directory of `*.yaml` advisory overlays.
    pub directory: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl GenmapConfig {
    pub fn scan(&self) -> ScanConfig {
        self.scan.clone().unwrap_or_default()
    }

    pub fn elevation(&self) -> ElevationConfig {
        self.elevation.clone().unwrap_or_default()
    }

    pub fn output(&self) -> OutputConfig {
        self.output.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genmap_config_default() {
        let config = GenmapConfig::default();
        assert!(config.scan.is_none());
        assert!(config.elevation().enabled);
        assert!(config.output().directory.is_none());
    }

    #[test]
    fn test_full_config_deserialize() {
        let yaml = r#"
scan:
  nmap_path: /usr/bin/nmap
  phase_timeout_secs: 3600
  on_failure: continue
  empty_ports: all-ports
elevation:
  enabled: true
  program: doas
  password: $GENMAP_SUDO
output:
  directory: ./scans
  color: false
knowledge:
  directory: ./advisories
"#;
        let config: GenmapConfig = serde_yaml::from_str(yaml).unwrap();
        let scan = config.scan();
        assert_eq!(scan.phase_timeout_secs, Some(3600));
        assert_eq!(scan.on_failure, Some(FailurePolicy::Continue));
        assert_eq!(scan.empty_ports, Some(EmptyPortPolicy::AllPorts));
        assert_eq!(config.elevation().program.as_deref(), Some("doas"));
        assert_eq!(config.output().color, Some(false));
        assert_eq!(
            config.knowledge.unwrap().directory,
            Some(PathBuf::from("./advisories"))
        );
    }

    #[test]
    fn test_elevation_enabled_defaults_true() {
        let config: GenmapConfig = serde_yaml::from_str("elevation:\n  program: sudo\n").unwrap();
        assert!(config.elevation().enabled);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result: Result<GenmapConfig, _> = serde_yaml::from_str("scan:\n  on_failure: retry\n");
        assert!(result.is_err());
    }
}
