pub mod audit;
pub mod classify;
pub mod cli;
pub mod config;
pub mod errors;
pub mod knowledge;
pub mod models;
pub mod pipeline;
pub mod reporting;
pub mod scanner;
pub mod ui;
pub mod utils;
