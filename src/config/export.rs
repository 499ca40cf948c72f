//! Export configuration loading from config.toml
//!
//! Category ids that drive the spreadsheet projections and the company
//! details printed in the report header live here. They are passed into the
//! export functions explicitly instead of being read from the environment at
//! the point of use.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Raw shape of config.toml
#[derive(Debug, Deserialize)]
struct ConfigFile {
    export: ExportSection,
    #[serde(default)]
    company: CompanyConfig,
}

#[derive(Debug, Deserialize)]
struct ExportSection {
    work_category_id: i64,
    stock_category_id: i64,
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("export")
}

/// Settings consumed by the export functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Category whose primitives are labour; drives the salary sheet
    pub work_category_id: i64,
    /// Category of stocked consumables, left out of the materials sheet
    pub stock_category_id: i64,
    /// Directory where rendered files are written
    pub output_dir: PathBuf,
    /// Company details for the document header
    pub company: CompanyConfig,
}

/// Company details printed in the document header
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct CompanyConfig {
    /// Brand line shown in the middle header cell
    #[serde(default)]
    pub brand: String,
    /// Postal address, one line per entry
    #[serde(default)]
    pub address_lines: Vec<String>,
    /// Web sites listed above the author's contacts
    #[serde(default)]
    pub websites: Vec<String>,
}

/// Parses export configuration from TOML text.
///
/// # Errors
/// Returns an error if the TOML syntax is invalid or the `[export]` table is
/// missing a category id.
pub fn parse_config(contents: &str) -> Result<ExportConfig> {
    let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    Ok(ExportConfig {
        work_category_id: file.export.work_category_id,
        stock_category_id: file.export.stock_category_id,
        output_dir: file.export.output_dir,
        company: file.company,
    })
}

/// Loads export configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or fails to parse.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ExportConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Loading export configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads export configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<ExportConfig> {
    load_config("config.toml")
}
