pub mod workflow_logger;
pub mod utils;

pub use workflow_logger::WorkflowLogger;
