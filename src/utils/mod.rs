pub mod config;
pub mod error;

pub use config::ExtractorConfig;
pub use error::IdScanError;
