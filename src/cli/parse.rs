use std::sync::Arc;
use crate::classify::classify;
use crate::cli::commands::ParseArgs;
use crate::errors::GenmapError;
use crate::knowledge::{KnowledgeBase, RecommendationEngine};
use crate::pipeline::phase::ScanPhase;
use crate::ui::renderer::{render_findings, render_recommendations};
use serde_json::json;
use tracing::info;

/// Classify an archived scan file offline.
pub async fn handle_parse(args: ParseArgs) -> Result<(), GenmapError> {
    let bytes = tokio::fs::read(&args.file).await?;
    let raw = String::from_utf8_lossy(&bytes);
    let findings = classify(&raw);

    let kb = Arc::new(KnowledgeBase::load(args.knowledge.as_deref())?);
    let recommendations = RecommendationEngine::new(kb).recommend_for(&findings);
    info!(
        file = %args.file.display(),
        findings = findings.total_findings(),
        recommendations = recommendations.len(),
        "Parsed scan output"
    );

    if args.json {
        let doc = json!({ "findings": findings, "recommendations": recommendations });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    print!("{}", render_findings(phase_from_name(&args.file), &findings));
    print!("{}", render_recommendations(&recommendations));
    Ok(())
}

/// Artifacts are named `genMAP_<tag>_scan_...`; anything else is shown as TCP.
fn phase_from_name(path: &std::path::Path) -> ScanPhase {
    let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
    ScanPhase::ALL
        .iter()
        .copied()
        .find(|p| name.starts_with(&format!("genMAP_{}_", p.tag())))
        .unwrap_or(ScanPhase::Tcp)
}
