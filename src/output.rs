//! Model output
//!
//! A run's files only become visible once complete: each file is written to a temp file
//! in the destination directory and renamed into place. A run that fails or is
//! cancelled midway leaves nothing behind under the final name.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::model::ModelStats;

pub const MODEL_EXTENSION: &str = "tpcm";
pub const METADATA_SUFFIX: &str = "metadata.json";

/// Sidecar describing one generated model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    pub name: String,
    pub seed: u64,
    pub generated_at: DateTime<Utc>,
    /// SHA-256 of the model text, lowercase hex
    pub sha256: String,
    pub stats: ModelStats,
    pub config: GenerationConfig,
}

impl ModelMetadata {
    pub fn new(
        name: impl Into<String>,
        seed: u64,
        text: &str,
        stats: ModelStats,
        config: &GenerationConfig,
    ) -> Self {
        // The recorded config reproduces this model on its own
        let mut config = config.clone();
        config.random_seed = Some(seed);
        Self {
            name: name.into(),
            seed,
            generated_at: Utc::now(),
            sha256: fingerprint(text),
            stats,
            config,
        }
    }
}

/// Paths of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenModel {
    pub model: PathBuf,
    pub metadata: PathBuf,
}

pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn model_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, MODEL_EXTENSION))
}

pub fn metadata_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, METADATA_SUFFIX))
}

/// Write `bytes` to `path` via a sibling temp file and an atomic rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    file.write_all(bytes)
        .with_context(|| format!("Failed to write temp file for {}", path.display()))?;
    file.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync temp file for {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("Failed to move output into {}", path.display()))?;
    Ok(())
}

/// Write the model text and its metadata sidecar into `dir`.
///
/// The model lands first; the sidecar only appears once the model is in place.
pub fn write_model(dir: &Path, text: &str, metadata: &ModelMetadata) -> Result<WrittenModel> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let model = model_path(dir, &metadata.name);
    write_atomic(&model, text.as_bytes())?;

    let json = serde_json::to_string_pretty(metadata).context("Failed to encode metadata")?;
    let sidecar = metadata_path(dir, &metadata.name);
    write_atomic(&sidecar, json.as_bytes())?;

    debug!("Wrote {} and {}", model.display(), sidecar.display());
    Ok(WrittenModel {
        model,
        metadata: sidecar,
    })
}

pub fn read_metadata(path: &Path) -> Result<ModelMetadata> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fingerprint_is_sha256_hex() {
        assert_eq!(
            fingerprint("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tpcm");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn model_and_sidecar_written_together() {
        let dir = tempfile::tempdir().unwrap();
        let config = GenerationConfig::default();
        let metadata = ModelMetadata::new("m_0001", 5, "text", ModelStats::default(), &config);
        let written = write_model(&dir.path().join("nested"), "text", &metadata).unwrap();

        assert_eq!(std::fs::read_to_string(&written.model).unwrap(), "text");
        assert!(written.model.ends_with("m_0001.tpcm"));
        let parsed = read_metadata(&written.metadata).unwrap();
        assert_eq!(parsed, metadata);
    }

    #[test]
    fn recorded_config_carries_the_run_seed() {
        let config = GenerationConfig {
            random_seed: Some(1_000),
            ..Default::default()
        };
        let metadata = ModelMetadata::new("m_0003", 1_003, "text", ModelStats::default(), &config);
        assert_eq!(metadata.config.random_seed, Some(1_003));
        assert_eq!(config.random_seed, Some(1_000));
    }

    #[test]
    fn missing_directory_parent_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("out.tpcm");
        assert!(write_atomic(&path, b"x").is_err());
        assert!(!path.exists());
    }
}
