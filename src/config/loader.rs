//! Configuration loader
//!
//! Loads and validates YAML generation configs.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use super::GenerationConfig;

/// Environment variable naming a default config file
pub const CONFIG_ENV_VAR: &str = "TPCM_SYNTH_CONFIG";

pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Loader for `TPCM_SYNTH_CONFIG`, or built-in defaults when it is unset
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the config file (or defaults) and validate it
    pub fn load(&self) -> Result<GenerationConfig> {
        match &self.path {
            Some(path) => load_config(path),
            None => {
                let config = GenerationConfig::default();
                config.validate().context("Default configuration is invalid")?;
                Ok(config)
            }
        }
    }
}

/// Read, parse and validate one YAML config file
pub fn load_config(path: impl AsRef<Path>) -> Result<GenerationConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config: GenerationConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    info!(
        "Loaded generation config from {} ({} interfaces, {} components)",
        path.display(),
        config.interface_count,
        config.component_count
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_yaml(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_partial_file_over_defaults() {
        let file = write_yaml("componentCount: 4\nrandomSeed: 11\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.component_count, 4);
        assert_eq!(config.random_seed, Some(11));
        assert_eq!(config.interface_count, 5);
    }

    #[test]
    fn invalid_bounds_reported_with_path() {
        let file = write_yaml("minRequiredPerComponent: 3\nmaxRequiredPerComponent: 1\n");
        let err = load_config(file.path()).unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("Invalid configuration"), "{chain}");
        assert!(chain.contains("requiredPerComponent"), "{chain}");
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let file = write_yaml("interfaceCount: [oops\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }

    #[test]
    fn loader_with_path_reads_that_file() {
        let file = write_yaml("componentCount: 4\n");
        let loader = ConfigLoader::new(file.path());
        assert_eq!(loader.path(), Some(file.path()));
        assert_eq!(loader.load().unwrap().component_count, 4);
    }

    #[test]
    fn loader_without_path_yields_defaults() {
        let loader = ConfigLoader { path: None };
        assert_eq!(loader.load().unwrap(), GenerationConfig::default());
    }
}
