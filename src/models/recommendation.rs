use serde::{Deserialize, Serialize};
use super::finding::Protocol;

/// Where an advisory came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RecommendationSource {
    Port { port: u16, protocol: Protocol },
    Cve { id: String },
}

/// A manual next step suggested for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub source: RecommendationSource,
    pub text: String,
    pub reference_url: Option<String>,
}

impl RecommendationEntry {
    pub fn is_port_based(&self) -> bool {
        matches!(self.source, RecommendationSource::Port { .. })
    }
}
