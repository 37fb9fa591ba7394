//! Loading [`LoaderOptions`] from configuration files

use crate::error::{Result, TaggedFileError};
use crate::io::fs::read_to_string;
use crate::loader::LoaderOptions;
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            _ => Err(TaggedFileError::invalid_options(format!(
                "unsupported config file {}, expected .json, .yaml or .yml",
                path.display()
            ))),
        }
    }
}

/// Parse options from `content`
pub fn parse_options(content: &str, format: ConfigFormat) -> Result<LoaderOptions> {
    let options = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
    };
    Ok(options)
}

/// Read options from a `.json`, `.yaml` or `.yml` file
pub fn load_options(path: &Path) -> Result<LoaderOptions> {
    let format = ConfigFormat::from_path(path)?;
    let content = read_to_string(path)?;
    log::debug!("loading options from {}", path.display());
    parse_options(&content, format)
}
