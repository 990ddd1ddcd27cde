pub mod finding;
pub mod scan_result;
pub mod recommendation;

pub use finding::*;
pub use scan_result::*;
pub use recommendation::*;
