//! Bootstrap configuration resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument / environment variable (merged by the binary's
//!    argument parser)
//! 2. TOML config file
//! 3. OS-dependent compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5780;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Fully resolved bootstrap settings
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapConfig {
    pub database_path: PathBuf,
    pub port: u16,
    pub log_level: String,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load from an explicit path (must exist) or the platform default path
    /// (optional). Returns `None` when no file applies.
    pub fn load(explicit_path: Option<&Path>) -> Result<Option<Self>> {
        let path = match explicit_path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(None),
            },
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        Self::parse(&content).map(Some)
    }
}

/// Merge argument values, TOML values and defaults
pub fn resolve_bootstrap(
    cli_database: Option<PathBuf>,
    cli_port: Option<u16>,
    toml_config: Option<&TomlConfig>,
) -> BootstrapConfig {
    let database_path = cli_database
        .or_else(|| toml_config.and_then(|c| c.database_path.clone()))
        .unwrap_or_else(default_database_path);

    let port = cli_port
        .or_else(|| toml_config.and_then(|c| c.port))
        .unwrap_or(DEFAULT_PORT);

    let log_level = toml_config
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(default_log_level);

    BootstrapConfig {
        database_path,
        port,
        log_level,
    }
}

/// `~/.config/playbill/config.toml` (platform equivalent)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("playbill").join("config.toml"))
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("playbill"))
        .unwrap_or_else(|| PathBuf::from("./playbill_data"))
        .join("playbill.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_values_take_priority() {
        let toml_config = TomlConfig {
            database_path: Some(PathBuf::from("/srv/toml.db")),
            port: Some(6000),
            logging: LoggingConfig::default(),
        };

        let resolved = resolve_bootstrap(
            Some(PathBuf::from("/srv/cli.db")),
            Some(7000),
            Some(&toml_config),
        );

        assert_eq!(resolved.database_path, PathBuf::from("/srv/cli.db"));
        assert_eq!(resolved.port, 7000);
    }

    #[test]
    fn test_toml_values_fill_missing_arguments() {
        let toml_config = TomlConfig::parse(
            r#"
            database_path = "/srv/toml.db"
            port = 6000

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        let resolved = resolve_bootstrap(None, None, Some(&toml_config));

        assert_eq!(resolved.database_path, PathBuf::from("/srv/toml.db"));
        assert_eq!(resolved.port, 6000);
        assert_eq!(resolved.log_level, "debug");
    }

    #[test]
    fn test_defaults_without_any_source() {
        let resolved = resolve_bootstrap(None, None, None);

        assert_eq!(resolved.port, DEFAULT_PORT);
        assert_eq!(resolved.log_level, "info");
        assert!(resolved.database_path.ends_with("playbill.db"));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = TomlConfig::parse("port = \"not a number\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "port = 5999\n").unwrap();

        let loaded = TomlConfig::load(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.port, Some(5999));
        assert_eq!(loaded.logging.level, "info");

        let missing = TomlConfig::load(Some(&temp_dir.path().join("absent.toml")));
        assert!(matches!(missing, Err(Error::Config(_))));
    }
}
