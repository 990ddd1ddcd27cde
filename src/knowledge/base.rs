use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use crate::errors::GenmapError;
use tracing::{debug, info};

const BUILTIN_ADVISORIES: &str = include_str!("../../knowledge/ports.yaml");

#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryDefinition {
    pub port: u16,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvisoryFile {
    pub advisories: Vec<AdvisoryDefinition>,
}

/// Port-number → advisory table. Built once at startup and read-only after.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: HashMap<u16, String>,
}

impl KnowledgeBase {
    /// The advisory table shipped with genmap.
    pub fn builtin() -> Result<Self, GenmapError> {
        Self::from_yaml(BUILTIN_ADVISORIES)
    }

    pub fn from_yaml(content: &str) -> Result<Self, GenmapError> {
        let mut kb = Self::default();
        kb.apply(content, "inline")?;
        Ok(kb)
    }

    /// Built-in table, then every `*.yaml` file in `overlay_dir` (sorted by
    /// name) layered on top. Later files replace earlier entries for the same
    /// port.
    pub fn load(overlay_dir: Option<&Path>) -> Result<Self, GenmapError> {
        let mut kb = Self::builtin()?;

        let Some(dir) = overlay_dir else {
            return Ok(kb);
        };
        if !dir.is_dir() {
            return Err(GenmapError::KnowledgeBase(format!(
                "knowledge directory not found: {}",
                dir.display()
            )));
        }

        let pattern = dir.join("*.yaml");
        let pattern_str = pattern.to_string_lossy();
        let mut paths = Vec::new();
        for entry in glob::glob(&pattern_str)
            .map_err(|e| GenmapError::KnowledgeBase(format!("Invalid glob pattern: {}", e)))?
        {
            paths.push(entry.map_err(|e| GenmapError::KnowledgeBase(format!("Glob error: {}", e)))?);
        }
        paths.sort();

        for path in paths {
            let content = std::fs::read_to_string(&path)?;
            let added = kb.apply(&content, &path.display().to_string())?;
            info!(path = %path.display(), advisories = added, "Loaded knowledge overlay");
        }

        Ok(kb)
    }

    fn apply(&mut self, content: &str, origin: &str) -> Result<usize, GenmapError> {
        let file: AdvisoryFile = serde_yaml::from_str(content)
            .map_err(|e| GenmapError::KnowledgeBase(format!("{}: {}", origin, e)))?;

        let mut seen = std::collections::HashSet::new();
        for def in &file.advisories {
            if def.port == 0 {
                return Err(GenmapError::KnowledgeBase(format!(
                    "{}: port 0 is not a valid advisory key",
                    origin
                )));
            }
            if def.text.trim().is_empty() {
                return Err(GenmapError::KnowledgeBase(format!(
                    "{}: advisory for port {} is empty",
                    origin, def.port
                )));
            }
            if !seen.insert(def.port) {
                return Err(GenmapError::KnowledgeBase(format!(
                    "{}: port {} is listed twice",
                    origin, def.port
                )));
            }
        }

        for def in file.advisories.iter() {
            if self.entries.insert(def.port, def.text.clone()).is_some() {
                debug!(port = def.port, origin, "Advisory overridden");
            }
        }
        Ok(file.advisories.len())
    }

    pub fn advisory(&self, port: u16) -> Option<&str> {
        self.entries.get(&port).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_loads() {
        let kb = KnowledgeBase::builtin().unwrap();
        assert_eq!(kb.len(), 52);
        assert!(kb.advisory(445).unwrap().contains("EternalBlue"));
        assert!(kb.advisory(80).unwrap().starts_with("HTTP detected."));
        assert!(kb.advisory(31337).is_none());
    }

    #[test]
    fn test_port_zero_rejected() {
        let err = KnowledgeBase::from_yaml("advisories:\n  - port: 0\n    text: nope\n").unwrap_err();
        assert!(matches!(err, GenmapError::KnowledgeBase(_)));
    }

    #[test]
    fn test_out_of_range_port_rejected() {
        assert!(KnowledgeBase::from_yaml("advisories:\n  - port: 70000\n    text: nope\n").is_err());
    }

    #[test]
    fn test_duplicate_port_in_one_file_rejected() {
        let yaml = "advisories:\n  - port: 22\n    text: a\n  - port: 22\n    text: b\n";
        assert!(KnowledgeBase::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(KnowledgeBase::from_yaml("advisories:\n  - port: 22\n    text: '  '\n").is_err());
    }

    #[test]
    fn test_overlay_overrides_and_extends() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("custom.yaml"),
            "advisories:\n  - port: 22\n    text: Custom SSH advice\n  - port: 10000\n    text: Webmin detected.\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let kb = KnowledgeBase::load(Some(dir.path())).unwrap();
        assert_eq!(kb.advisory(22), Some("Custom SSH advice"));
        assert_eq!(kb.advisory(10000), Some("Webmin detected."));
        assert_eq!(kb.len(), 53);
    }

    #[test]
    fn test_missing_overlay_dir_is_error() {
        let err = KnowledgeBase::load(Some(Path::new("/nonexistent/genmap/knowledge"))).unwrap_err();
        assert!(matches!(err, GenmapError::KnowledgeBase(_)));
    }
}
