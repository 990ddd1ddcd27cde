pub mod types;
pub mod classification;

pub use types::GenmapError;
pub use classification::ErrorClassification;
