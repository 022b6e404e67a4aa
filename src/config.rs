//! Configuration types for dbview.
//!
//! This module provides configuration structs for loading and validating
//! viewer settings from `dbview.toml`. It includes:
//!
//! - [`Config`] - Root configuration struct
//! - [`ViewerConfig`] - Paging settings
//! - [`ExportConfig`] - Naming of exported images
//!
//! Every field has a default, so an absent or empty file is a valid
//! configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// dbview.toml configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
        }
    }
}

fn default_page_size() -> usize {
    constants::DEFAULT_PAGE_SIZE
}

fn default_suffix() -> String {
    constants::EXPORT_SUFFIX.to_string()
}

impl Config {
    /// Load configuration from dbview.toml.
    ///
    /// The current directory is searched first, then the user config
    /// directory (`~/.config/dbview/dbview.toml` on Linux). If neither file
    /// exists, the default configuration is used.
    ///
    /// # Errors
    ///
    /// Returns an error if a dbview.toml is found but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        match Self::locate() {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// First existing dbview.toml in the search order.
    pub fn locate() -> Option<PathBuf> {
        let local = PathBuf::from(constants::CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join(constants::APP_DIR_NAME).join(constants::CONFIG_FILE))
            .filter(|path| path.exists())
    }

    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - Fields have invalid types
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `viewer.page_size` is 0
    /// - `export.suffix` is empty or contains a path separator
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.viewer.page_size == 0 {
            errors.push(format!(
                "viewer.page_size cannot be 0 (default: {})",
                constants::DEFAULT_PAGE_SIZE
            ));
        } else if self.viewer.page_size > constants::LARGE_PAGE_SIZE {
            warnings.push(format!(
                "viewer.page_size {} is very high (> {})\n  \
                 Large pages are held in memory at once",
                self.viewer.page_size,
                constants::LARGE_PAGE_SIZE
            ));
        }

        if self.export.suffix.is_empty() {
            errors.push(
                "export.suffix cannot be empty; the export would overwrite the source name"
                    .to_string(),
            );
        } else if self.export.suffix.contains(['/', '\\']) {
            errors.push(format!(
                "export.suffix cannot contain a path separator (got: '{}')",
                self.export.suffix
            ));
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.viewer.page_size, 100);
        assert_eq!(config.export.suffix, "_updated");
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[viewer]
page_size = 25

[export]
suffix = ".edited"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.viewer.page_size, 25);
        assert_eq!(config.export.suffix, ".edited");
    }

    #[test]
    fn test_validate_default_config() {
        let result = Config::default().validate().unwrap();
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_validate_page_size_zero() {
        let mut config = Config::default();
        config.viewer.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_large_page_size_warns() {
        let mut config = Config::default();
        config.viewer.page_size = 50_000;
        let result = config.validate().unwrap();
        assert!(result.has_warnings());
    }

    #[test]
    fn test_validate_suffix() {
        let mut config = Config::default();
        config.export.suffix = String::new();
        assert!(config.validate().is_err());

        config.export.suffix = "/evil".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let config: Config = toml::from_str("[viewer]\nlegacy_option = true\n").unwrap();
        assert_eq!(config.viewer.page_size, 100);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("dbview.toml");
        fs::write(&path, "[export]\nsuffix = \"_v2\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.export.suffix, "_v2");
        assert_eq!(config.viewer.page_size, 100);
    }

    #[test]
    fn test_load_from_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(Config::load_from(tmp.path().join("nope.toml")).is_err());
    }
}
