use serde::{Deserialize, Serialize};

/// Transport protocol an open port was reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenPort {
    pub port: u16,
    pub protocol: Protocol,
}

impl OpenPort {
    pub fn new(port: u16, protocol: Protocol) -> Self {
        Self { port, protocol }
    }
}

impl std::fmt::Display for OpenPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}

/// How much trust the scanner placed in an OS fingerprint, ordered from most
/// to least certain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfidenceTier {
    Explicit,
    Guessed,
    CpeDerived,
    Unknown,
}

impl ConfidenceTier {
    /// Lower values take precedence. Explicit = 0 .. Unknown = 3.
    pub fn rank(&self) -> u8 {
        match self {
            ConfidenceTier::Explicit => 0,
            ConfidenceTier::Guessed => 1,
            ConfidenceTier::CpeDerived => 2,
            ConfidenceTier::Unknown => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsGuess {
    pub text: String,
    pub tier: ConfidenceTier,
}

impl OsGuess {
    pub fn unknown() -> Self {
        Self { text: "Unknown OS".to_string(), tier: ConfidenceTier::Unknown }
    }

    /// Text as shown to the operator; guesses carry a prefix so they are not
    /// mistaken for a confirmed fingerprint.
    pub fn display_text(&self) -> String {
        match self.tier {
            ConfidenceTier::Guessed => format!("Guessed: {}", self.text),
            _ => self.text.clone(),
        }
    }
}

impl Default for OsGuess {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Matches for one general-information category. Categories with no matches
/// are kept with an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralInfo {
    pub category: String,
    pub matches: Vec<String>,
}

impl GeneralInfo {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// `"<category>: a, b"` or `None` when nothing matched.
    pub fn summary(&self) -> Option<String> {
        if self.matches.is_empty() {
            None
        } else {
            Some(format!("{}: {}", self.category, self.matches.join(", ")))
        }
    }
}

/// Everything classified out of one phase's raw output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingSet {
    pub open_ports: Vec<OpenPort>,
    pub os_guess: OsGuess,
    pub service_info: Vec<String>,
    pub ad_indicators: Vec<String>,
    pub cves: Vec<String>,
    pub general_info: Vec<GeneralInfo>,
}

impl FindingSet {
    pub fn ports_for(&self, protocol: Protocol) -> impl Iterator<Item = u16> + '_ {
        self.open_ports
            .iter()
            .filter(move |p| p.protocol == protocol)
            .map(|p| p.port)
    }

    /// Comma-separated TCP port list in discovery order, e.g. `"22,80"`.
    pub fn tcp_port_list(&self) -> String {
        self.ports_for(Protocol::Tcp)
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn general_info_summaries(&self) -> Vec<String> {
        self.general_info.iter().filter_map(GeneralInfo::summary).collect()
    }

    pub fn total_findings(&self) -> usize {
        self.open_ports.len()
            + self.service_info.len()
            + self.ad_indicators.len()
            + self.cves.len()
            + self.general_info.iter().map(|g| g.matches.len()).sum::<usize>()
    }

    /// Fold `other` into `self`, keeping first-encounter order and set
    /// semantics. The OS guess with the higher-precedence tier wins; on a tie
    /// the existing one is kept.
    pub fn merge(&mut self, other: &FindingSet) {
        extend_unique(&mut self.open_ports, &other.open_ports);
        extend_unique(&mut self.service_info, &other.service_info);
        extend_unique(&mut self.ad_indicators, &other.ad_indicators);
        extend_unique(&mut self.cves, &other.cves);

        if other.os_guess.tier.rank() < self.os_guess.tier.rank() {
            self.os_guess = other.os_guess.clone();
        }

        for incoming in &other.general_info {
            match self.general_info.iter_mut().find(|g| g.category == incoming.category) {
                Some(existing) => extend_unique(&mut existing.matches, &incoming.matches),
                None => self.general_info.push(incoming.clone()),
            }
        }
    }
}

fn extend_unique<T: PartialEq + Clone>(into: &mut Vec<T>, from: &[T]) {
    for item in from {
        if !into.contains(item) {
            into.push(item.clone());
        }
    }
}
