//! Engine configuration
//!
//! Options can be set programmatically with the `with_*` builders or loaded
//! from a TOML file:
//!
//! ```toml
//! [resolution]
//! validate_names = true
//!
//! [genome]
//! name = "toy"
//! chromosomes = [ { name = "chr1", size = 1000 }, { name = "chr2", size = 500 } ]
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::genome::{Chromosome, Genome};

/// Errors that can occur when loading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration of a view tree
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Genome assembly for `locus` channels
    pub genome: Option<Genome>,

    /// Check scale name uniqueness after each resolution pass
    pub validate_names: bool,

    /// Print the resolution report to stderr after building
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            genome: None,
            validate_names: true,
            debug: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    resolution: Option<TomlResolution>,
    genome: Option<TomlGenome>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlResolution {
    validate_names: Option<bool>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlGenome {
    name: String,
    chromosomes: Vec<Chromosome>,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let defaults = Self::default();

        Ok(EngineConfig {
            genome: parsed
                .genome
                .map(|g| Genome::new(g.name, g.chromosomes)),
            validate_names: parsed
                .resolution
                .and_then(|r| r.validate_names)
                .unwrap_or(defaults.validate_names),
            debug: defaults.debug,
        })
    }

    /// Set the genome assembly
    pub fn with_genome(mut self, genome: Genome) -> Self {
        self.genome = Some(genome);
        self
    }

    /// Enable or disable the scale name uniqueness check
    pub fn with_validate_names(mut self, validate: bool) -> Self {
        self.validate_names = validate;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.validate_names);
        assert!(config.genome.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_validate_names(false)
            .with_debug(true);
        assert!(!config.validate_names);
        assert!(config.debug);
    }

    #[test]
    fn test_from_str() {
        let config = EngineConfig::from_str(
            r#"
            [resolution]
            validate_names = false

            [genome]
            name = "toy"
            chromosomes = [ { name = "chr1", size = 1000 }, { name = "chr2", size = 500 } ]
            "#,
        )
        .unwrap();
        assert!(!config.validate_names);
        let genome = config.genome.unwrap();
        assert_eq!(genome.name, "toy");
        assert_eq!(genome.total_size(), 1500);
    }

    #[test]
    fn test_empty_config_keeps_defaults() {
        let config = EngineConfig::from_str("").unwrap();
        assert!(config.validate_names);
    }

    #[test]
    fn test_invalid_toml() {
        let err = EngineConfig::from_str("[resolution\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
