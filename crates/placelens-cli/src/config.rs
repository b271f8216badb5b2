//! CLI configuration

use placelens_extract::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "placelens.yaml";

/// placelens configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Pipeline tunables
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// External gazetteer; the embedded one is used when absent
    #[serde(default)]
    pub gazetteer: Option<PathBuf>,

    /// OCR confidence for inputs that do not carry one
    #[serde(default = "default_confidence")]
    pub default_confidence: f32,
}

impl CliConfig {
    /// Load configuration from file and CLI overrides.
    ///
    /// An explicitly requested file must exist; the default path is optional.
    pub fn load(cli: &crate::Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            None => Self::default(),
        };

        // Apply CLI overrides
        if let Some(gazetteer) = &cli.gazetteer {
            config.gazetteer = Some(gazetteer.clone());
        }

        if let Some(confidence) = cli.confidence {
            config.default_confidence = confidence;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.default_confidence) {
            anyhow::bail!(
                "default_confidence must be within [0, 1], got {}",
                self.default_confidence
            );
        }
        self.extractor.validate()?;
        Ok(())
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            gazetteer: None,
            default_confidence: default_confidence(),
        }
    }
}

fn default_confidence() -> f32 {
    0.8
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.default_confidence, 0.8);
        assert!(config.gazetteer.is_none());
        assert_eq!(config.extractor, ExtractorConfig::default());
    }

    #[test]
    fn test_load_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("placelens.yaml");
        std::fs::write(
            &path,
            "default_confidence: 0.6\nextractor:\n  max_per_bucket: 3\ngazetteer: places.yaml\n",
        )
        .unwrap();

        let cli = crate::Cli::parse_from([
            "placelens",
            "--config",
            path.to_str().unwrap(),
            "--confidence",
            "0.9",
            "shot.txt",
        ]);
        let config = CliConfig::load(&cli).unwrap();

        assert_eq!(config.default_confidence, 0.9);
        assert_eq!(config.extractor.max_per_bucket, 3);
        assert_eq!(config.gazetteer, Some(PathBuf::from("places.yaml")));
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let cli = crate::Cli::parse_from(["placelens", "--config", "/nonexistent/placelens.yaml"]);
        assert!(CliConfig::load(&cli).is_err());
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("placelens.yaml");
        std::fs::write(&path, "default_confidence: 1.5\n").unwrap();

        let cli = crate::Cli::parse_from(["placelens", "--config", path.to_str().unwrap()]);
        assert!(CliConfig::load(&cli).is_err());
    }
}
