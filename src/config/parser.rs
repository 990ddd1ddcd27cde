use std::path::Path;
use crate::errors::GenmapError;
use super::types::GenmapConfig;
use super::security::validate_security_patterns;
use super::schema::CONFIG_SCHEMA;
use tracing::warn;

const MAX_CONFIG_BYTES: u64 = 1_048_576;

pub async fn parse_config(path: &Path) -> Result<GenmapConfig, GenmapError> {
    if !path.exists() {
        return Err(GenmapError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(GenmapError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<GenmapConfig, GenmapError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    if yaml.is_null() {
        return Ok(GenmapConfig::default());
    }

    validate_security_patterns(&yaml)?;
    validate_schema(&yaml)?;

    let config: GenmapConfig = serde_yaml::from_value(yaml)?;
    validate_conflicts(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), GenmapError> {
    let json_value: serde_json::Value = serde_json::to_value(yaml)
        .map_err(|e| GenmapError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| GenmapError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        // Advisory only: typed deserialization is the authority
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Detect semantic conflicts in the parsed configuration.
fn validate_conflicts(config: &GenmapConfig) -> Result<(), GenmapError> {
    if let Some(scan) = &config.scan {
        if scan.phase_timeout_secs == Some(0) {
            return Err(GenmapError::Config(
                "scan.phase_timeout_secs must be at least 1 (omit it for no limit)".into(),
            ));
        }
        if scan.nmap_path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(GenmapError::Config("scan.nmap_path is empty".into()));
        }
    }

    if let Some(elevation) = &config.elevation {
        if elevation.program.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(GenmapError::Config("elevation.program is empty".into()));
        }
        if !elevation.enabled && elevation.password.is_some() {
            warn!("elevation.password is set but elevation is disabled; it will be ignored");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ElevationConfig, ScanConfig};

    #[test]
    fn test_zero_timeout_rejected() {
        let config = GenmapConfig {
            scan: Some(ScanConfig { phase_timeout_secs: Some(0), ..Default::default() }),
            ..Default::default()
        };
        assert!(validate_conflicts(&config).is_err());
    }

    #[test]
    fn test_empty_program_rejected() {
        let config = GenmapConfig {
            elevation: Some(ElevationConfig { program: Some(" ".into()), ..Default::default() }),
            ..Default::default()
        };
        assert!(validate_conflicts(&config).is_err());
    }

    #[test]
    fn test_validate_conflicts_empty_config() {
        assert!(validate_conflicts(&GenmapConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = parse_config_str("").unwrap();
        assert!(config.scan.is_none());
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        assert!(matches!(parse_config_str("scan: [unclosed"), Err(GenmapError::Yaml(_))));
    }

    #[tokio::test]
    async fn test_parse_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genmap.yaml");
        std::fs::write(&path, "scan:\n  on_failure: continue\noutput:\n  directory: ./out\n").unwrap();
        let config = parse_config(&path).await.unwrap();
        assert!(config.output().directory.is_some());
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let err = parse_config(Path::new("/nonexistent/genmap.yaml")).await.unwrap_err();
        assert!(matches!(err, GenmapError::Config(_)));
    }
}
