//! Configuration for the extraction pipeline

use placelens_core::{Category, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for [`HierarchicalExtractor`](crate::HierarchicalExtractor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum entries kept per bucket after sorting
    #[serde(default = "default_max_per_bucket")]
    pub max_per_bucket: usize,

    /// Minimum confidence per bucket
    #[serde(default)]
    pub thresholds: CategoryThresholds,

    /// Shortest phrase kept by the segmenter (characters)
    #[serde(default = "default_min_phrase_chars")]
    pub min_phrase_chars: usize,

    /// Longest phrase kept by the segmenter (characters)
    #[serde(default = "default_max_phrase_chars")]
    pub max_phrase_chars: usize,

    /// Inputs longer than this are rejected by the classification rules
    #[serde(default = "default_max_phrase_bytes")]
    pub max_phrase_bytes: usize,

    /// Noise filter vocabulary extensions
    #[serde(default)]
    pub noise: NoiseConfig,
}

impl ExtractorConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Reject settings the pipeline cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_per_bucket == 0 {
            return Err(Error::config("max_per_bucket must be at least 1"));
        }
        if self.min_phrase_chars > self.max_phrase_chars {
            return Err(Error::config(format!(
                "min_phrase_chars ({}) exceeds max_phrase_chars ({})",
                self.min_phrase_chars, self.max_phrase_chars
            )));
        }
        for category in Category::ALL {
            let threshold = self.thresholds.for_category(category);
            if !(0.0..=1.0).contains(&threshold) {
                return Err(Error::config(format!(
                    "threshold for {} must be within [0, 1], got {}",
                    category, threshold
                )));
            }
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_per_bucket: default_max_per_bucket(),
            thresholds: CategoryThresholds::default(),
            min_phrase_chars: default_min_phrase_chars(),
            max_phrase_chars: default_max_phrase_chars(),
            max_phrase_bytes: default_max_phrase_bytes(),
            noise: NoiseConfig::default(),
        }
    }
}

/// Per-bucket minimum confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryThresholds {
    #[serde(default = "default_business_threshold")]
    pub business: f32,
    #[serde(default = "default_address_threshold")]
    pub address: f32,
    #[serde(default = "default_area_threshold")]
    pub area: f32,
    #[serde(default = "default_landmark_threshold")]
    pub landmark: f32,
    #[serde(default = "default_other_threshold")]
    pub other: f32,
}

impl CategoryThresholds {
    pub fn for_category(&self, category: Category) -> f32 {
        match category {
            Category::Business => self.business,
            Category::Address => self.address,
            Category::Area => self.area,
            Category::Landmark => self.landmark,
            Category::Other => self.other,
        }
    }
}

impl Default for CategoryThresholds {
    fn default() -> Self {
        Self {
            business: default_business_threshold(),
            address: default_address_threshold(),
            area: default_area_threshold(),
            landmark: default_landmark_threshold(),
            other: default_other_threshold(),
        }
    }
}

/// Additional noise vocabulary, appended to the built-in lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Extra UI-chrome words matched as whole phrases
    #[serde(default)]
    pub ui_terms: Vec<String>,

    /// Extra UI-chrome fragments matched anywhere in a phrase
    #[serde(default)]
    pub ui_fragments: Vec<String>,

    /// Extra OCR garbage tokens
    #[serde(default)]
    pub garbage_tokens: Vec<String>,
}

fn default_max_per_bucket() -> usize {
    10
}

fn default_min_phrase_chars() -> usize {
    3
}

fn default_max_phrase_chars() -> usize {
    80
}

fn default_max_phrase_bytes() -> usize {
    16 * 1024
}

fn default_business_threshold() -> f32 {
    0.6
}

fn default_address_threshold() -> f32 {
    0.5
}

fn default_area_threshold() -> f32 {
    0.4
}

fn default_landmark_threshold() -> f32 {
    0.4
}

fn default_other_threshold() -> f32 {
    0.3
}
