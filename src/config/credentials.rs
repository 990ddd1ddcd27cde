use tracing::debug;

/// An elevation password. `Debug` never prints the value so the secret cannot
/// leak through structured logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// Resolve a credential value. If the value starts with '$', treat it as an
/// environment variable reference and resolve from the environment.
pub fn resolve_credential(value: &str) -> String {
    if let Some(var_name) = value.strip_prefix('$') {
        match std::env::var(var_name) {
            Ok(resolved) => {
                debug!(var = %var_name, "Resolved credential from environment");
                resolved
            }
            Err(_) => {
                debug!(var = %var_name, "Environment variable not set, using literal");
                value.to_string()
            }
        }
    } else {
        value.to_string()
    }
}

/// Redact sensitive values in a string. Replaces every occurrence of a secret
/// with [REDACTED].
pub fn redact_credentials(text: &str, secrets: &[&str]) -> String {
    let mut result = text.to_string();
    for secret in secrets {
        if !secret.is_empty() && secret.len() >= 4 {
            result = result.replace(secret, "[REDACTED]");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_credential_literal() {
        assert_eq!(resolve_credential("hunter22"), "hunter22");
    }

    #[test]
    fn test_resolve_credential_env_var() {
        std::env::set_var("TEST_GENMAP_SUDO", "secret123");
        assert_eq!(resolve_credential("$TEST_GENMAP_SUDO"), "secret123");
        std::env::remove_var("TEST_GENMAP_SUDO");
    }

    #[test]
    fn test_resolve_credential_missing_env_var() {
        let result = resolve_credential("$NONEXISTENT_GENMAP_VAR");
        assert_eq!(result, "$NONEXISTENT_GENMAP_VAR");
    }

    #[test]
    fn test_redact_credentials() {
        let text = "[sudo] password attempt with S3cret123 failed";
        let redacted = redact_credentials(text, &["S3cret123"]);
        assert!(redacted.contains("[REDACTED]"));
        assert!(!redacted.contains("S3cret123"));
    }

    #[test]
    fn test_redact_credentials_short_secret_ignored() {
        let text = "80/tcp open http";
        let redacted = redact_credentials(text, &["tcp"]);
        assert_eq!(redacted, text);
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::new("hunter22");
        assert_eq!(format!("{:?}", secret), "Secret([REDACTED])");
        assert_eq!(secret.expose(), "hunter22");
    }
}
