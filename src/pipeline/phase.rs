use serde::{Deserialize, Serialize};

/// One nmap invocation with a fixed purpose. Phases always run in declaration
/// order: Tcp, then Udp, then Vuln.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    Tcp,
    Udp,
    Vuln,
}

pub struct PhaseDefinition {
    pub phase: ScanPhase,
    pub display_name: &'static str,
    pub description: &'static str,
    pub flags: &'static [&'static str],
}

pub static PHASES: &[PhaseDefinition] = &[
    PhaseDefinition {
        phase: ScanPhase::Tcp,
        display_name: "TCP Scan",
        description: "SYN scan of all 65535 ports with OS, version and default-script detection",
        flags: &["-sS", "-p-", "-T4", "-O", "-sV", "-sC"],
    },
    PhaseDefinition {
        phase: ScanPhase::Udp,
        display_name: "UDP Scan",
        description: "UDP scan of the 200 most common ports",
        flags: &["-sU", "--top-ports", "200", "-T4"],
    },
    PhaseDefinition {
        phase: ScanPhase::Vuln,
        display_name: "Vulnerability Scan",
        description: "Version detection plus vulnerability scripts against the TCP ports found earlier",
        flags: &["-sV", "--script=vuln,vulners,http-enum,smb-enum-shares,rdp-enum-encryption"],
    },
];

impl ScanPhase {
    pub const ALL: [ScanPhase; 3] = [ScanPhase::Tcp, ScanPhase::Udp, ScanPhase::Vuln];

    pub fn definition(&self) -> &'static PhaseDefinition {
        match self {
            ScanPhase::Tcp => &PHASES[0],
            ScanPhase::Udp => &PHASES[1],
            ScanPhase::Vuln => &PHASES[2],
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.definition().display_name
    }

    /// Tag used in artifact file names.
    pub fn tag(&self) -> &'static str {
        match self {
            ScanPhase::Tcp => "tcp",
            ScanPhase::Udp => "udp",
            ScanPhase::Vuln => "vuln",
        }
    }

    /// nmap arguments for this phase, excluding the target. `ports` is the
    /// Vuln phase's `-p` value and is ignored by the other phases.
    pub fn arguments(&self, ports: &str) -> Vec<String> {
        let mut args: Vec<String> = self.definition().flags.iter().map(|f| f.to_string()).collect();
        if *self == ScanPhase::Vuln {
            args.push("-p".to_string());
            args.push(ports.to_string());
        }
        args
    }
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_flags_exact() {
        assert_eq!(ScanPhase::Tcp.arguments("ignored"), vec!["-sS", "-p-", "-T4", "-O", "-sV", "-sC"]);
    }

    #[test]
    fn test_udp_flags_exact() {
        assert_eq!(ScanPhase::Udp.arguments(""), vec!["-sU", "--top-ports", "200", "-T4"]);
    }

    #[test]
    fn test_vuln_flags_carry_ports() {
        assert_eq!(
            ScanPhase::Vuln.arguments("22,80"),
            vec![
                "-sV",
                "--script=vuln,vulners,http-enum,smb-enum-shares,rdp-enum-encryption",
                "-p",
                "22,80",
            ]
        );
    }

    #[test]
    fn test_phase_order() {
        assert!(ScanPhase::Tcp < ScanPhase::Udp && ScanPhase::Udp < ScanPhase::Vuln);
    }

    #[test]
    fn test_definitions_match_phase() {
        for phase in ScanPhase::ALL {
            assert_eq!(phase.definition().phase, phase);
        }
    }
}
