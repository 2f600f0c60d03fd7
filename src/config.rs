use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Default maximum size of a file read for raw-filesystem text search (10 MB).
pub const DEFAULT_MAX_TEXT_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Engine settings, usually loaded from a `docquery.toml` file.
///
/// ```toml
/// cache_version_sets = true
/// max_text_bytes = 1048576
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Memoize changed-path sets per commit for the duration of one report run.
    pub cache_version_sets: bool,
    /// Files larger than this never match raw-filesystem text or word searches.
    pub max_text_bytes: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_version_sets: false,
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
        }
    }
}

impl EngineConfig {
    /// Parse settings from TOML. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on invalid TOML or unknown keys.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    /// Read and parse a TOML settings file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on I/O or parse failure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert!(!config.cache_version_sets);
        assert_eq!(config.max_text_bytes, DEFAULT_MAX_TEXT_BYTES);
    }

    #[test]
    fn empty_input_uses_defaults() {
        assert_eq!(
            EngineConfig::from_toml_str("").unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn parse_all_keys() {
        let config =
            EngineConfig::from_toml_str("cache_version_sets = true\nmax_text_bytes = 2048\n")
                .unwrap();
        assert!(config.cache_version_sets);
        assert_eq!(config.max_text_bytes, 2048);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = EngineConfig::from_toml_str("cache = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = EngineConfig::from_toml_str("max_text_bytes = \"big\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cache_version_sets = true").unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert!(config.cache_version_sets);
        assert_eq!(config.max_text_bytes, DEFAULT_MAX_TEXT_BYTES);
    }

    #[test]
    fn load_missing_file() {
        let err = EngineConfig::load("/definitely/not/here/docquery.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
