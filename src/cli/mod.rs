pub mod commands;
pub mod parse;
pub mod prompt;
pub mod scan;

pub use commands::{Cli, Commands};
