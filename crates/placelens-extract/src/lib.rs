//! placelens Extract
//!
//! Turns OCR transcripts of screenshots into classified, confidence-scored
//! place entities.
//!
//! The pipeline runs leaves first:
//! - Noise filter: drops UI chrome and recognition garbage, repairs look-alikes
//! - Entity registry: read-only gazetteer of known businesses, addresses, areas
//! - Phrase segmenter: splits a transcript on structural delimiters
//! - Phrase classifier: ordered first-match-wins rule cascade
//! - Confidence refiner: ordered, named multiplicative adjustments
//! - Hierarchical extractor: orchestrates the above into category buckets
//!
//! Everything is synchronous and pure per transcript; batches fan out over
//! tokio's blocking pool.

pub mod aggregate;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod extractor;
pub mod noise;
pub mod refiner;
pub mod registry;
pub mod segment;
pub mod signals;

pub use aggregate::merge_results;
pub use batch::{extract_batch, BatchExtraction};
pub use classifier::{ClassificationRule, PhraseClassifier};
pub use config::{CategoryThresholds, ExtractorConfig, NoiseConfig};
pub use extractor::{describe_metrics, HierarchicalExtractor, TranscriptAnalysis};
pub use noise::NoiseFilter;
pub use refiner::{Adjustment, ConfidenceRefiner};
pub use registry::{EntityRegistry, Gazetteer, SharedRegistry};
pub use segment::{normalize_transcript, PhraseSegmenter};
pub use signals::{ContactInfo, ContentType, Language, Rating, SignalExtractor, TranscriptSignals};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{ClassificationRule, PhraseClassifier};
    pub use crate::config::ExtractorConfig;
    pub use crate::extractor::HierarchicalExtractor;
    pub use crate::refiner::{Adjustment, ConfidenceRefiner};
    pub use crate::registry::{EntityRegistry, SharedRegistry};
    pub use placelens_core::prelude::*;
}
