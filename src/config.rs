//! Configuration for the parser and the script-length policy (`msl.toml`)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_MAX_DEPTH: usize = 100;
pub const DEFAULT_MAX_SCRIPT_LENGTH: usize = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Deepest allowed nesting of parenthesised groups
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Limits applied before a script reaches the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum script length in characters
    #[serde(default = "default_max_script_length")]
    pub max_script_length: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_script_length() -> usize {
    DEFAULT_MAX_SCRIPT_LENGTH
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_script_length: DEFAULT_MAX_SCRIPT_LENGTH,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}

impl LimitsConfig {
    /// Whether a script of this text fits the length limit.
    pub fn allows(&self, script: &str) -> bool {
        script.chars().count() <= self.max_script_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.parser.max_depth, 100);
        assert_eq!(config.limits.max_script_length, 10_000);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str("[parser]\nmax_depth = 8\n").unwrap();
        assert_eq!(config.parser.max_depth, 8);
        assert_eq!(config.limits.max_script_length, DEFAULT_MAX_SCRIPT_LENGTH);
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_toml_str("[parser]\nmax_depth = \"deep\"\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/definitely/not/here/msl.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_limits_allows() {
        let limits = LimitsConfig {
            max_script_length: 3,
        };
        assert!(limits.allows("a,b"));
        assert!(!limits.allows("a,b,c"));
    }
}
