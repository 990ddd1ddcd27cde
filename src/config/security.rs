use crate::errors::GenmapError;

/// Config values end up as argv entries or paths; none of them should look
/// like shell syntax.
const DANGEROUS_PATTERNS: &[&str] = &[
    ";",
    "|",
    "&&",
    "`",
    "$(",
    ">",
    "<",
    "\n",
];

/// Keys whose values are opaque secrets and are never pattern-checked.
const SECRET_KEYS: &[&str] = &["password"];

pub fn validate_security_patterns(value: &serde_yaml::Value) -> Result<(), GenmapError> {
    check_value(value, &[])?;
    Ok(())
}

fn check_value(value: &serde_yaml::Value, path: &[String]) -> Result<(), GenmapError> {
    match value {
        serde_yaml::Value::String(s) => {
            if path.last().is_some_and(|k| SECRET_KEYS.contains(&k.as_str())) {
                return Ok(());
            }
            for pattern in DANGEROUS_PATTERNS {
                if s.contains(pattern) {
                    let path_str = if path.is_empty() { "root".to_string() } else { path.join(".") };
                    return Err(GenmapError::Config(format!(
                        "Dangerous pattern '{}' found at config path: {}",
                        pattern.escape_default(),
                        path_str
                    )));
                }
            }
            Ok(())
        }
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let key = k.as_str().unwrap_or("unknown").to_string();
                let mut new_path = path.to_vec();
                new_path.push(key);
                check_value(v, &new_path)?;
            }
            Ok(())
        }
        serde_yaml::Value::Sequence(seq) => {
            for (i, v) in seq.iter().enumerate() {
                let mut new_path = path.to_vec();
                new_path.push(format!("[{}]", i));
                check_value(v, &new_path)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> serde_yaml::Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_safe_config_passes() {
        let value = yaml("scan:\n  nmap_path: /usr/local/bin/nmap\n  phase_timeout_secs: 600");
        assert!(validate_security_patterns(&value).is_ok());
    }

    #[test]
    fn test_command_chaining_blocked() {
        let value = yaml("scan:\n  nmap_path: 'nmap; rm -rf /'");
        let err = validate_security_patterns(&value).unwrap_err();
        assert!(err.to_string().contains("scan.nmap_path"));
    }

    #[test]
    fn test_substitution_blocked() {
        assert!(validate_security_patterns(&yaml("elevation:\n  program: '$(id)'")).is_err());
        assert!(validate_security_patterns(&yaml("elevation:\n  program: '`id`'")).is_err());
    }

    #[test]
    fn test_password_value_is_not_checked() {
        let value = yaml("elevation:\n  password: 'p|a;s>s'");
        assert!(validate_security_patterns(&value).is_ok());
    }

    #[test]
    fn test_numeric_values_pass() {
        assert!(validate_security_patterns(&yaml("scan:\n  phase_timeout_secs: 10")).is_ok());
    }
}
