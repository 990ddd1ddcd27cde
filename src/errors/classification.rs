use super::types::GenmapError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    /// Whether a phase failing with this error may be skipped over when the
    /// pipeline runs with the `continue` failure policy.
    pub degradable: bool,
}

impl GenmapError {
    /// Classify this error to determine its type and whether the pipeline may
    /// continue past the phase that produced it.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Phase-local failures: later phases may still produce output
            GenmapError::ProcessTimeout(_) => ErrorClassification {
                error_type: "ProcessTimeoutError",
                degradable: true,
            },
            GenmapError::MalformedOutput(_) => ErrorClassification {
                error_type: "MalformedOutputError",
                degradable: true,
            },
            GenmapError::ToolFailed { .. } => ErrorClassification {
                error_type: "ToolFailedError",
                degradable: true,
            },

            // Every later phase would hit the same wall
            GenmapError::ToolNotFound(_) => ErrorClassification {
                error_type: "ToolNotFoundError",
                degradable: false,
            },
            GenmapError::PermissionDenied(_) => ErrorClassification {
                error_type: "PermissionDeniedError",
                degradable: false,
            },
            GenmapError::Cancelled(_) => ErrorClassification {
                error_type: "CancelledError",
                degradable: false,
            },
            GenmapError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                degradable: false,
            },
            GenmapError::InvalidTarget(_) => ErrorClassification {
                error_type: "InvalidTargetError",
                degradable: false,
            },
            GenmapError::KnowledgeBase(_) => ErrorClassification {
                error_type: "KnowledgeBaseError",
                degradable: false,
            },
            GenmapError::Io(_) => ErrorClassification {
                error_type: "IoError",
                degradable: false,
            },
            GenmapError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                degradable: false,
            },
            GenmapError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                degradable: false,
            },
            GenmapError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                degradable: false,
            },
        }
    }

    /// Process exit code reported by the binary for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenmapError::Config(_) => 2,
            GenmapError::ToolNotFound(_) => 3,
            GenmapError::PermissionDenied(_) => 4,
            GenmapError::InvalidTarget(_) => 5,
            GenmapError::ProcessTimeout(_) => 6,
            GenmapError::MalformedOutput(_) => 7,
            GenmapError::KnowledgeBase(_) => 8,
            GenmapError::Cancelled(_) => 130,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_degradable() {
        let err = GenmapError::ProcessTimeout("tcp phase exceeded 60s".into());
        let class = err.classify();
        assert!(class.degradable);
        assert_eq!(class.error_type, "ProcessTimeoutError");
    }

    #[test]
    fn test_tool_not_found_not_degradable() {
        let err = GenmapError::ToolNotFound("nmap".into());
        let class = err.classify();
        assert!(!class.degradable);
        assert_eq!(class.error_type, "ToolNotFoundError");
    }

    #[test]
    fn test_permission_denied_not_degradable() {
        let err = GenmapError::PermissionDenied("sudo rejected the password".into());
        assert!(!err.classify().degradable);
    }

    #[test]
    fn test_malformed_output_degradable() {
        let err = GenmapError::MalformedOutput("no nmap banner".into());
        assert!(err.classify().degradable);
    }

    #[test]
    fn test_tool_failed_degradable() {
        let err = GenmapError::ToolFailed { status: 1, detail: "boom".into() };
        assert!(err.classify().degradable);
        assert_eq!(err.classify().error_type, "ToolFailedError");
    }

    #[test]
    fn test_cancelled_not_degradable() {
        let err = GenmapError::Cancelled("ctrl-c".into());
        assert!(!err.classify().degradable);
    }

    #[test]
    fn test_exit_codes_are_distinct_for_taxonomy() {
        let codes = [
            GenmapError::ToolNotFound(String::new()).exit_code(),
            GenmapError::PermissionDenied(String::new()).exit_code(),
            GenmapError::ProcessTimeout(String::new()).exit_code(),
            GenmapError::MalformedOutput(String::new()).exit_code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn test_config_exit_code() {
        assert_eq!(GenmapError::Config("bad".into()).exit_code(), 2);
        assert_eq!(GenmapError::Internal("x".into()).exit_code(), 1);
    }
}
