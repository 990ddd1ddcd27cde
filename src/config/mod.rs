pub mod credentials;
pub mod parser;
pub mod schema;
pub mod types;
pub mod security;

pub use types::*;
pub use parser::parse_config;
