/// Author and engineer contact details from environment variables
pub mod contacts;

/// Database configuration and connection management
pub mod database;

/// Export configuration loading from config.toml
pub mod export;

pub use export::{CompanyConfig, ExportConfig};
