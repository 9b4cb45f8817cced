//! Optional `md2epub.toml` configuration.
//!
//! Supplies defaults that apply when the corresponding command line flag is
//! not given (author, language) and lists the fonts to embed for particular
//! languages. Command line flags always win over the file.

use crate::sinks::{FontConfig, MetadataConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "md2epub.toml";

/// Complete configuration for md2epub.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Configuration {
    pub metadata: MetadataConfig,
    pub fonts: Vec<FontConfig>,
}

impl Configuration {
    /// Load the configuration.
    ///
    /// An explicitly named file must exist and parse. Without one, the default
    /// file in the working directory is used when present, otherwise the
    /// built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Configuration> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::load_from(&path)
                } else {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Configuration::default())
                }
            }
        }
    }

    /// Load and parse a specific config file.
    ///
    /// Relative font paths are resolved against the directory holding the file.
    pub fn load_from(path: &Path) -> Result<Configuration> {
        log::info!("Loading configuration from {}", path.display());
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
        let mut config: Configuration = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML in {}", path.display()))?;

        let base = path.parent().unwrap_or(Path::new(""));
        for font in &mut config.fonts {
            if font.path.is_relative() {
                font.path = base.join(&font.path);
            }
        }

        Ok(config)
    }
}
