//! Hierarchical extraction pipeline
//!
//! Runs one transcript through normalization, a whole-text gazetteer pass,
//! segmentation, noise filtering, classification and refinement, then ranks
//! the survivors into category buckets.

use crate::classifier::PhraseClassifier;
use crate::config::ExtractorConfig;
use crate::noise::NoiseFilter;
use crate::refiner::ConfidenceRefiner;
use crate::registry::{EntityRegistry, SharedRegistry};
use crate::segment::{normalize_transcript, PhraseSegmenter};
use crate::signals::{SignalExtractor, TranscriptSignals};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use placelens_core::{
    normalize_key, Category, Classification, ExtractionResult, Result, Transcript,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extraction plus transcript-level signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptAnalysis {
    pub extraction: ExtractionResult,
    pub signals: TranscriptSignals,
}

/// Register metric descriptions
pub fn describe_metrics() {
    describe_counter!(
        "placelens_transcripts_total",
        "Transcripts run through the extraction pipeline"
    );
    describe_counter!(
        "placelens_phrases_total",
        "Phrases seen by the extractor, by outcome"
    );
    describe_histogram!(
        "placelens_extraction_latency_us",
        "Time to extract one transcript, in microseconds"
    );
}

/// Orchestrates the extraction pipeline.
///
/// Built once per process (or per worker) and shared; every call to
/// [`extract`](Self::extract) is independent and never fails.
#[derive(Clone)]
pub struct HierarchicalExtractor {
    registry: SharedRegistry,
    filter: Arc<NoiseFilter>,
    segmenter: PhraseSegmenter,
    classifier: PhraseClassifier,
    refiner: ConfidenceRefiner,
    signals: Arc<SignalExtractor>,
    config: ExtractorConfig,
}

impl HierarchicalExtractor {
    /// Build the standard pipeline around `registry`
    pub fn new(registry: SharedRegistry, config: ExtractorConfig) -> Result<Self> {
        config.validate()?;
        let classifier = PhraseClassifier::new(registry.clone(), config.max_phrase_bytes)?;
        let refiner = ConfidenceRefiner::new(registry.clone())?;
        Self::from_parts(registry, classifier, refiner, config)
    }

    /// Standard pipeline over the embedded gazetteer with default settings
    pub fn builtin() -> Result<Self> {
        Self::new(EntityRegistry::builtin()?.shared(), ExtractorConfig::default())
    }

    /// Assemble a pipeline from a custom cascade and refiner
    pub fn from_parts(
        registry: SharedRegistry,
        classifier: PhraseClassifier,
        refiner: ConfidenceRefiner,
        config: ExtractorConfig,
    ) -> Result<Self> {
        config.validate()?;
        let filter = NoiseFilter::with_config(&config.noise)?;
        let segmenter = PhraseSegmenter::new(config.min_phrase_chars, config.max_phrase_chars);

        info!(
            "Extractor initialized: {} rules, {} refinement steps, {} known entities",
            classifier.rule_names().len(),
            refiner.step_names().len(),
            registry.len()
        );

        Ok(Self {
            registry,
            filter: Arc::new(filter),
            segmenter,
            classifier,
            refiner,
            signals: Arc::new(SignalExtractor::new()?),
            config,
        })
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract place entities from one transcript
    pub fn extract(&self, transcript: &Transcript) -> ExtractionResult {
        let start = Instant::now();
        counter!("placelens_transcripts_total").increment(1);

        let result = self.run(transcript.text(), transcript.ocr_confidence());

        histogram!("placelens_extraction_latency_us").record(start.elapsed().as_micros() as f64);
        debug!(
            entities = result.len(),
            latency_us = start.elapsed().as_micros() as u64,
            "Transcript extracted"
        );
        result
    }

    /// Convenience wrapper over [`extract`](Self::extract)
    pub fn extract_text(&self, text: &str, ocr_confidence: f32) -> ExtractionResult {
        self.extract(&Transcript::new(text, ocr_confidence))
    }

    /// Extraction plus contact, rating, content-type and language signals
    pub fn analyze(&self, transcript: &Transcript) -> TranscriptAnalysis {
        TranscriptAnalysis {
            extraction: self.extract(transcript),
            signals: self.signals.extract(&normalize_transcript(transcript.text())),
        }
    }

    fn run(&self, raw: &str, ocr_confidence: f32) -> ExtractionResult {
        let cleaned = normalize_transcript(raw);
        if cleaned.is_empty() {
            return ExtractionResult::empty();
        }

        let mut classifications = Vec::new();

        // Whole-text pass: keeps gazetteer names that segmentation would split.
        let captured = match self.classifier.classify(&cleaned, ocr_confidence) {
            Ok(c) if c.is_known() => {
                debug!(text = %c.text, "Whole-transcript gazetteer match");
                let key = normalize_key(&c.text);
                classifications.push(c);
                Some(key)
            }
            Ok(_) => None,
            Err(e) => {
                warn!("Whole-transcript classification failed: {}", e);
                None
            }
        };

        for phrase in self.segmenter.segment(&cleaned) {
            if self.is_noise(&phrase.text) {
                debug!(index = phrase.index, text = %phrase.text, "Dropped noise phrase");
                counter!("placelens_phrases_total", "outcome" => "noise").increment(1);
                continue;
            }

            let text = self
                .filter
                .clean_artifacts(&self.filter.strip_ui_noise(&phrase.text));
            if text.chars().count() < self.config.min_phrase_chars || self.is_noise(&text) {
                debug!(index = phrase.index, text = %text, "Phrase reduced to noise");
                counter!("placelens_phrases_total", "outcome" => "noise").increment(1);
                continue;
            }

            let classification = match self.classifier.classify(&text, ocr_confidence) {
                Ok(c) => c,
                Err(e) => {
                    warn!(index = phrase.index, "Excluding phrase: {}", e);
                    counter!("placelens_phrases_total", "outcome" => "failed").increment(1);
                    continue;
                }
            };

            if classification.is_known()
                && captured.as_deref() == Some(normalize_key(&classification.text).as_str())
            {
                counter!("placelens_phrases_total", "outcome" => "duplicate").increment(1);
                continue;
            }

            counter!("placelens_phrases_total", "outcome" => "kept").increment(1);
            classifications.push(classification);
        }

        let refined = classifications
            .into_iter()
            .map(|c| self.refiner.refine(c));

        self.rank(refined)
    }

    /// Noise gate. A phrase that is exactly a gazetteer name always passes.
    fn is_noise(&self, text: &str) -> bool {
        if !self.filter.is_noise(text) {
            return false;
        }
        let trimmed = text.trim();
        !self
            .registry
            .find(trimmed)
            .is_some_and(|m| m.span == (0, trimmed.len()))
    }

    /// Bucket, sort, deduplicate, truncate and threshold
    fn rank(&self, classifications: impl Iterator<Item = Classification>) -> ExtractionResult {
        let mut buckets: BTreeMap<Category, Vec<Classification>> =
            Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
        for c in classifications {
            buckets.entry(c.category).or_default().push(c);
        }

        let ranked = buckets.into_iter().map(|(category, mut entries)| {
            entries.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

            let mut seen = HashSet::new();
            entries.retain(|c| seen.insert(normalize_key(&c.text)));
            entries.truncate(self.config.max_per_bucket);

            let threshold = self.config.thresholds.for_category(category);
            entries.retain(|c| c.exceeds_threshold(threshold));
            (category, entries)
        });

        ExtractionResult::from_buckets(ranked)
    }
}

impl std::fmt::Debug for HierarchicalExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchicalExtractor")
            .field("registry", &self.registry)
            .field("rules", &self.classifier.rule_names())
            .field("steps", &self.refiner.step_names())
            .field("config", &self.config)
            .finish()
    }
}
