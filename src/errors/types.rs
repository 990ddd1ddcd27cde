use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenmapError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Process timed out: {0}")]
    ProcessTimeout(String),

    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    #[error("Tool failed with exit status {status}: {detail}")]
    ToolFailed { status: i32, detail: String },

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
