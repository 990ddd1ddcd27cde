//! Turns raw nmap text into a [`FindingSet`].
//!
//! Every extraction runs independently over the whole text rather than line by
//! line, so a match such as `22/tcp\nopen` may straddle a line break.

pub mod patterns;

use crate::models::finding::{ConfidenceTier, FindingSet, GeneralInfo, OpenPort, OsGuess, Protocol};
use patterns::*;

pub fn classify(raw: &str) -> FindingSet {
    FindingSet {
        open_ports: dedup(extract_open_ports(raw)),
        os_guess: extract_os_guess(raw),
        service_info: extract_service_info(raw),
        ad_indicators: unique_matches(&AD_INDICATOR, raw),
        cves: unique_matches(&CVE, raw),
        general_info: extract_general_info(raw),
    }
}

/// Every `<port>/<proto> open` occurrence in order, duplicates included.
/// Port numbers outside 1-65535 are dropped.
pub fn extract_open_ports(raw: &str) -> Vec<OpenPort> {
    OPEN_PORT
        .captures_iter(raw)
        .filter_map(|cap| {
            let port = cap[1].parse::<u16>().ok().filter(|p| *p != 0)?;
            let protocol = match &cap[2] {
                "tcp" => Protocol::Tcp,
                _ => Protocol::Udp,
            };
            Some(OpenPort::new(port, protocol))
        })
        .collect()
}

/// Highest-precedence OS fingerprint available in the text.
pub fn extract_os_guess(raw: &str) -> OsGuess {
    if let Some(cap) = OS_EXPLICIT.captures(raw) {
        return OsGuess { text: clean(&cap[2]), tier: ConfidenceTier::Explicit };
    }
    if let Some(cap) = OS_GUESSED.captures(raw) {
        return OsGuess { text: clean(&cap[1]), tier: ConfidenceTier::Guessed };
    }
    if let Some(cap) = OS_CPE.captures(raw) {
        return OsGuess { text: clean(&cap[1]), tier: ConfidenceTier::CpeDerived };
    }
    OsGuess::unknown()
}

pub fn extract_service_info(raw: &str) -> Vec<String> {
    let mut out = Vec::new();
    for m in SERVICE_INFO.find_iter(raw) {
        push_unique(&mut out, clean(m.as_str()));
    }
    out
}

/// One entry per category, in declaration order, empty when nothing matched.
pub fn extract_general_info(raw: &str) -> Vec<GeneralInfo> {
    GENERAL_INFO
        .iter()
        .map(|(category, re)| GeneralInfo {
            category: category.to_string(),
            matches: unique_matches(re, raw),
        })
        .collect()
}

fn unique_matches(re: &regex::Regex, raw: &str) -> Vec<String> {
    let mut out = Vec::new();
    for m in re.find_iter(raw) {
        push_unique(&mut out, m.as_str().to_string());
    }
    out
}

fn dedup(ports: Vec<OpenPort>) -> Vec<OpenPort> {
    let mut out = Vec::with_capacity(ports.len());
    for port in ports {
        push_unique(&mut out, port);
    }
    out
}

fn push_unique<T: PartialEq>(into: &mut Vec<T>, item: T) {
    if !into.contains(&item) {
        into.push(item);
    }
}

fn clean(s: &str) -> String {
    s.trim_end_matches('\r').trim().to_string()
}
