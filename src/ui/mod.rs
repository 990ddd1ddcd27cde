pub mod banner;
pub mod events;
pub mod progress;
pub mod renderer;

pub use events::PipelineEvent;
