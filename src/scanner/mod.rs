pub mod target;
pub mod invoker;
pub mod diagnostics;

pub use target::ScanTarget;
pub use invoker::{NmapInvoker, ToolInvoker, ToolSettings};
