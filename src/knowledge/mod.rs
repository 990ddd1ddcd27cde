pub mod base;
pub mod engine;

pub use base::KnowledgeBase;
pub use engine::RecommendationEngine;
