use std::fs;
use std::path::Path;

use crate::error::{PixReportError, Result};

use super::{Config, validation};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "pix-report.toml";

/// Trait for loading configuration from various sources.
pub trait ConfigLoader {
    /// Load configuration from the default location, falling back to
    /// built-in defaults when no file exists.
    ///
    /// # Errors
    /// Returns an error if an existing config file cannot be read, parsed
    /// or validated.
    fn load(&self) -> Result<Config>;

    /// Load configuration from a specific path.
    ///
    /// # Errors
    /// Returns an error if the file is missing, unreadable, unparseable or
    /// semantically invalid.
    fn load_from_path(&self, path: &Path) -> Result<Config>;
}

#[derive(Debug, Default)]
pub struct FileConfigLoader;

impl FileConfigLoader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load(&self) -> Result<Config> {
        let path = Path::new(CONFIG_FILENAME);
        if path.exists() {
            self.load_from_path(path)
        } else {
            Ok(Config::default())
        }
    }

    fn load_from_path(&self, path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(PixReportError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
