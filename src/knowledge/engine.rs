use std::sync::Arc;
use crate::models::finding::{FindingSet, OpenPort};
use crate::models::recommendation::{RecommendationEntry, RecommendationSource};
use super::base::KnowledgeBase;

const EXPLOIT_DB_SEARCH: &str = "https://www.exploit-db.com/search?cve=";

pub fn exploit_db_url(cve: &str) -> String {
    format!("{}{}", EXPLOIT_DB_SEARCH, cve)
}

/// Maps findings to manual next steps. Port advisories come first, then CVE
/// advisories, each in the order the findings were discovered.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    kb: Arc<KnowledgeBase>,
}

impl RecommendationEngine {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    pub fn recommend(&self, open_ports: &[OpenPort], cves: &[String]) -> Vec<RecommendationEntry> {
        let port_entries = open_ports.iter().filter_map(|open| {
            self.kb.advisory(open.port).map(|text| RecommendationEntry {
                source: RecommendationSource::Port { port: open.port, protocol: open.protocol },
                text: text.to_string(),
                reference_url: None,
            })
        });

        let cve_entries = cves.iter().map(|cve| {
            let url = exploit_db_url(cve);
            RecommendationEntry {
                source: RecommendationSource::Cve { id: cve.clone() },
                text: format!("Possible exploit available for `{}`. Check ExploitDB: {}", cve, url),
                reference_url: Some(url),
            }
        });

        port_entries.chain(cve_entries).collect()
    }

    pub fn recommend_for(&self, findings: &FindingSet) -> Vec<RecommendationEntry> {
        self.recommend(&findings.open_ports, &findings.cves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::finding::Protocol;

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(Arc::new(KnowledgeBase::builtin().unwrap()))
    }

    #[test]
    fn test_ports_in_discovery_order_before_cves() {
        let ports = vec![OpenPort::new(80, Protocol::Tcp), OpenPort::new(445, Protocol::Tcp)];
        let cves = vec!["CVE-2017-0144".to_string()];
        let recs = engine().recommend(&ports, &cves);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].text.starts_with("HTTP detected."));
        assert!(recs[1].text.starts_with("SMB detected. Test for EternalBlue"));
        assert_eq!(recs[2].source, RecommendationSource::Cve { id: "CVE-2017-0144".into() });
    }

    #[test]
    fn test_discovery_order_not_numeric_order() {
        let ports = vec![OpenPort::new(445, Protocol::Tcp), OpenPort::new(21, Protocol::Tcp)];
        let recs = engine().recommend(&ports, &[]);
        assert!(recs[0].text.starts_with("SMB"));
        assert!(recs[1].text.starts_with("FTP"));
    }

    #[test]
    fn test_unknown_port_yields_nothing() {
        let ports = vec![OpenPort::new(31337, Protocol::Tcp)];
        assert!(engine().recommend(&ports, &[]).is_empty());
    }

    #[test]
    fn test_cve_advisory_text_and_url() {
        let recs = engine().recommend(&[], &["CVE-2021-44228".to_string()]);
        assert_eq!(
            recs[0].text,
            "Possible exploit available for `CVE-2021-44228`. Check ExploitDB: https://www.exploit-db.com/search?cve=CVE-2021-44228"
        );
        assert_eq!(
            recs[0].reference_url.as_deref(),
            Some("https://www.exploit-db.com/search?cve=CVE-2021-44228")
        );
        assert!(!recs[0].is_port_based());
    }

    #[test]
    fn test_udp_ports_get_advisories() {
        let ports = vec![OpenPort::new(161, Protocol::Udp)];
        let recs = engine().recommend(&ports, &[]);
        assert_eq!(
            recs[0].source,
            RecommendationSource::Port { port: 161, protocol: Protocol::Udp }
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert!(engine().recommend(&[], &[]).is_empty());
    }
}
