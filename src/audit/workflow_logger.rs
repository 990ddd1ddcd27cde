use std::path::{Path, PathBuf};
use chrono::Local;
use tokio::io::AsyncWriteExt;
use crate::errors::GenmapError;

/// Plain-text, append-only record of phase transitions for one or more runs.
pub struct WorkflowLogger {
    path: PathBuf,
}

impl WorkflowLogger {
    pub fn new(base_dir: &Path) -> Self {
        Self { path: base_dir.join("genmap-workflow.log") }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the run header. Earlier runs in the same file are kept.
    pub async fn initialize(&self, run_id: &str, target: &str) -> Result<(), GenmapError> {
        let header = format!(
            "\n# genMAP run {}\n# Target: {}\n# Started: {}\n",
            run_id,
            target,
            Local::now().to_rfc3339()
        );
        self.append(&header).await
    }

    pub async fn log_event(&self, message: &str) -> Result<(), GenmapError> {
        let line = format!("[{}] {}\n", Local::now().format("%H:%M:%S"), message);
        self.append(&line).await
    }

    async fn append(&self, text: &str) -> Result<(), GenmapError> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true).append(true).open(&self.path).await?;
        file.write_all(text.as_bytes()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_appends_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let logger = WorkflowLogger::new(dir.path());
        logger.initialize("run-1", "10.0.0.1").await.unwrap();
        logger.log_event("TCP Scan started").await.unwrap();
        logger.initialize("run-2", "10.0.0.2").await.unwrap();

        let content = std::fs::read_to_string(logger.path()).unwrap();
        assert!(content.contains("# genMAP run run-1"));
        assert!(content.contains("] TCP Scan started"));
        assert!(content.contains("# Target: 10.0.0.2"));
    }
}
