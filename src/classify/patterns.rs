use regex::Regex;
use std::sync::LazyLock;

pub static OPEN_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)/(tcp|udp)\s+open").unwrap());

pub static OS_EXPLICIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(OS details|Running): (.+)").unwrap());

pub static OS_GUESSED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Running \(JUST GUESSING\): (.+)").unwrap());

pub static OS_CPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CPE: (cpe:/o:[a-z]+:[a-z_]+)").unwrap());

pub static SERVICE_INFO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Service Info: .+|http-server-header: .+|http-title: .+|OS CPE: .+)").unwrap()
});

pub static CVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"CVE-\d{4}-\d+").unwrap());

pub static AD_INDICATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Active Directory|Domain Controller|Kerberos|SMB|LDAP|FQDN|NTLM").unwrap()
});

/// General-information buckets, reported in this order. All matching is
/// case-insensitive.
pub static GENERAL_INFO: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("File Exposure", r"index of /|directory listing|filetype|file"),
        ("Credentials", r"password|username|credentials|hash|login|admin"),
        ("Sensitive Files", r"robots\.txt|sitemap\.xml|exposed|backup|config|db|\.pem|\.key"),
        ("Internal IPs", r"\d+\.\d+\.\d+\.\d+"),
        ("Web Tech", r"PHP|WordPress|Drupal|Joomla|Apache|Tomcat|Node\.js"),
        ("Miscellaneous", r"Public Key|Certificate|TLS|SSL|DNS|Docker|Kubernetes"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(&format!("(?i){}", pattern)).unwrap()))
    .collect()
});

/// Spans highlighted when echoing raw scan output to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    OpenPort,
    ServiceInfo,
    OsDetails,
    Vulnerability,
    Directory,
}

pub static HIGHLIGHTS: LazyLock<Vec<(Highlight, Regex)>> = LazyLock::new(|| {
    [
        (Highlight::OpenPort, r"\d+/(?:tcp|udp)\s+open"),
        (Highlight::ServiceInfo, r"(?:Service Info|http-server-header|http-title): .+"),
        (Highlight::OsDetails, r"(?:OS details|Running(?: \(JUST GUESSING\))?|OS CPE): .+"),
        (Highlight::Vulnerability, r"CVE-\d{4}-\d+|potentially vulnerable|exploit|vuln"),
        (Highlight::Directory, r"Active Directory|Domain Controller|Kerberos|SMB|LDAP|FQDN|NTLM"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).unwrap()))
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        LazyLock::force(&OPEN_PORT);
        LazyLock::force(&OS_EXPLICIT);
        LazyLock::force(&OS_GUESSED);
        LazyLock::force(&OS_CPE);
        LazyLock::force(&SERVICE_INFO);
        LazyLock::force(&CVE);
        LazyLock::force(&AD_INDICATOR);
        assert_eq!(GENERAL_INFO.len(), 6);
        assert_eq!(HIGHLIGHTS.len(), 5);
    }

    #[test]
    fn test_explicit_does_not_match_guess_line() {
        assert!(!OS_EXPLICIT.is_match("Running (JUST GUESSING): Linux 4.X (90%)"));
    }

    #[test]
    fn test_sensitive_files_dot_is_literal() {
        let (_, re) = &GENERAL_INFO[2];
        assert!(re.is_match("/robots.txt"));
        assert!(!re.is_match("robotsXtxt"));
    }
}
