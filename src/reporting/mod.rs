pub mod archiver;
pub mod formatter;

pub use archiver::ResultArchiver;
