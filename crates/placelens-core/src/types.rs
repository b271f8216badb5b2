//! Core types for placelens

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Clamp a confidence into [0, 1]; NaN collapses to 0.
pub fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Key used for case-insensitive deduplication: lowercased, whitespace collapsed.
pub fn normalize_key(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Raw OCR output for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Raw OCR text
    text: String,

    /// Engine-reported confidence (0.0-1.0)
    ocr_confidence: f32,
}

impl Transcript {
    /// Create a new transcript, clamping the engine confidence
    pub fn new(text: impl Into<String>, ocr_confidence: f32) -> Self {
        Self {
            text: text.into(),
            ocr_confidence: clamp_confidence(ocr_confidence),
        }
    }

    /// The raw OCR text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Engine confidence, always within [0, 1] even for deserialized input
    pub fn ocr_confidence(&self) -> f32 {
        clamp_confidence(self.ocr_confidence)
    }

    /// Whether the transcript carries no text at all
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A delimiter-bounded substring of a cleaned transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    /// Whitespace-collapsed phrase text
    pub text: String,

    /// Position of the phrase among the transcript's segments
    pub index: usize,
}

impl Phrase {
    pub fn new(text: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            index,
        }
    }
}

/// Output bucket for a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Business,
    Address,
    Area,
    Landmark,
    Other,
}

impl Category {
    /// All categories in bucket order
    pub const ALL: [Category; 5] = [
        Category::Business,
        Category::Address,
        Category::Area,
        Category::Landmark,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Address => "address",
            Self::Area => "area",
            Self::Landmark => "landmark",
            Self::Other => "other",
        }
    }

    /// Merge priority when deduplicating across buckets (lower wins).
    ///
    /// Area and landmark share a tier.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Business => 0,
            Self::Address => 1,
            Self::Area | Self::Landmark => 2,
            Self::Other => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subtype {
    /// Matched a gazetteer entry
    Known,
    /// House number followed by a street-type suffix
    StreetAddress,
    /// Capitalized run ending in a venue keyword
    PatternBusiness,
    /// Contains a landmark or travel keyword
    Landmark,
    /// Curated named-place shape (neighborhoods, districts)
    NamedLocation,
    /// Contains a known city or district name
    GeographicArea,
    Unclassified,
}

impl Subtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Known => "known",
            Self::StreetAddress => "street_address",
            Self::PatternBusiness => "pattern_business",
            Self::Landmark => "landmark",
            Self::NamedLocation => "named_location",
            Self::GeographicArea => "geographic_area",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A curated gazetteer entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownEntity {
    /// Canonical display name
    pub name: String,

    /// Case-insensitive regex patterns that identify the entity
    pub patterns: Vec<String>,

    /// Known street address, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Category tag (business or address)
    pub category: Category,

    /// Multiplier applied to the OCR confidence on a match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_factor: Option<f32>,
}

/// Reference to the gazetteer entry a classification matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<&KnownEntity> for EntityRef {
    fn from(entity: &KnownEntity) -> Self {
        Self {
            name: entity.name.clone(),
            address: entity.address.clone(),
        }
    }
}

/// Result of classifying one phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Extracted text
    pub text: String,

    /// Output bucket
    pub category: Category,

    /// Rule that produced the classification
    pub subtype: Subtype,

    /// Confidence score (0.0-1.0)
    pub confidence: f32,

    /// Gazetteer entry, for known matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_entity: Option<EntityRef>,
}

impl Classification {
    /// Create a new classification; confidence is clamped
    pub fn new(
        text: impl Into<String>,
        category: Category,
        subtype: Subtype,
        confidence: f32,
    ) -> Self {
        Self {
            text: text.into(),
            category,
            subtype,
            confidence: clamp_confidence(confidence),
            matched_entity: None,
        }
    }

    /// Attach the gazetteer entry this classification came from
    pub fn with_entity(mut self, entity: EntityRef) -> Self {
        self.matched_entity = Some(entity);
        self
    }

    /// Replace the confidence, keeping it within [0, 1]
    pub fn set_confidence(&mut self, confidence: f32) {
        self.confidence = clamp_confidence(confidence);
    }

    pub fn is_known(&self) -> bool {
        self.subtype == Subtype::Known
    }

    /// Check if confidence meets a threshold
    pub fn exceeds_threshold(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

/// Flattened record handed to the enrichment and geocoding layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub text: String,
    pub category: Category,
    pub subtype: Subtype,
    pub confidence: f32,
}

impl From<&Classification> for PlaceCandidate {
    fn from(c: &Classification) -> Self {
        Self {
            text: c.text.clone(),
            category: c.category,
            subtype: c.subtype,
            confidence: c.confidence,
        }
    }
}

/// Category-grouped output of one extraction run
///
/// Every category is always present; each bucket is confidence-descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    buckets: BTreeMap<Category, Vec<Classification>>,
}

impl ExtractionResult {
    /// Create a result with five empty buckets
    pub fn empty() -> Self {
        Self {
            buckets: Category::ALL.iter().map(|c| (*c, Vec::new())).collect(),
        }
    }

    /// Build a result from already-ranked buckets.
    ///
    /// Each bucket is re-sorted, so the ordering invariant holds
    /// regardless of the caller.
    pub fn from_buckets(
        buckets: impl IntoIterator<Item = (Category, Vec<Classification>)>,
    ) -> Self {
        let mut result = Self::empty();
        for (category, mut entries) in buckets {
            entries.retain(|c| c.category == category);
            entries.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
            result.buckets.insert(category, entries);
        }
        result
    }

    /// Entries of one bucket
    pub fn get(&self, category: Category) -> &[Classification] {
        self.buckets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate buckets in category order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Classification])> {
        self.buckets.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Total number of classifications across buckets
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deduplicated candidate list for this result alone
    pub fn candidates(&self) -> Vec<PlaceCandidate> {
        Self::merge_candidates(std::slice::from_ref(self))
    }

    /// Merge the results of several transcripts into one candidate list.
    ///
    /// Candidates are ordered by category priority, then confidence
    /// descending; the first occurrence of each normalized text wins.
    pub fn merge_candidates(results: &[ExtractionResult]) -> Vec<PlaceCandidate> {
        let mut all: Vec<PlaceCandidate> = results
            .iter()
            .flat_map(|r| r.buckets.values().flatten())
            .map(PlaceCandidate::from)
            .collect();

        all.sort_by(|a, b| {
            a.category
                .priority()
                .cmp(&b.category.priority())
                .then_with(|| b.confidence.total_cmp(&a.confidence))
        });

        let mut seen = HashSet::new();
        all.retain(|c| seen.insert(normalize_key(&c.text)));
        all
    }
}

impl Default for ExtractionResult {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, category: Category, confidence: f32) -> Classification {
        Classification::new(text, category, Subtype::Unclassified, confidence)
    }

    #[test]
    fn test_confidence_clamped() {
        let clamped = |c| Classification::new("x", Category::Other, Subtype::Unclassified, c);
        assert_eq!(clamped(1.7).confidence, 1.0);
        assert_eq!(clamped(-0.2).confidence, 0.0);
        assert_eq!(Transcript::new("t", f32::NAN).ocr_confidence(), 0.0);

        let raw: Transcript =
            serde_json::from_str(r#"{"text": "a", "ocr_confidence": 3.0}"#).unwrap();
        assert_eq!(raw.ocr_confidence(), 1.0);
    }

    #[test]
    fn test_empty_result_has_all_buckets() {
        let result = ExtractionResult::empty();
        assert!(result.is_empty());
        assert_eq!(result.iter().count(), 5);

        let json = serde_json::to_value(&result).unwrap();
        for category in Category::ALL {
            assert!(json["buckets"][category.as_str()].as_array().unwrap().is_empty());
        }
    }

    #[test]
    fn test_from_buckets_sorts_and_partitions() {
        let result = ExtractionResult::from_buckets(vec![(
            Category::Area,
            vec![
                entry("Oakland", Category::Area, 0.5),
                entry("Berkeley", Category::Area, 0.9),
                entry("stray", Category::Other, 0.9),
            ],
        )]);

        let area = result.get(Category::Area);
        assert_eq!(area.len(), 2);
        assert_eq!(area[0].text, "Berkeley");
        assert!(result.get(Category::Other).is_empty());
    }

    #[test]
    fn test_merge_candidates_priority_and_dedup() {
        let first = ExtractionResult::from_buckets(vec![
            (Category::Other, vec![entry("acme bread", Category::Other, 0.9)]),
            (Category::Landmark, vec![entry("Tilden Park", Category::Landmark, 0.5)]),
        ]);
        let second = ExtractionResult::from_buckets(vec![
            (Category::Business, vec![entry("Acme  Bread", Category::Business, 0.7)]),
            (Category::Area, vec![entry("Berkeley", Category::Area, 0.8)]),
        ]);

        let merged = ExtractionResult::merge_candidates(&[first, second]);
        let texts: Vec<_> = merged.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Acme  Bread", "Berkeley", "Tilden Park"]);
        assert_eq!(merged[0].category, Category::Business);
    }

    #[test]
    fn test_category_priority_tiers() {
        assert!(Category::Business.priority() < Category::Address.priority());
        assert_eq!(Category::Area.priority(), Category::Landmark.priority());
        assert!(Category::Landmark.priority() < Category::Other.priority());
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Dave's   Hot\tChicken "), "dave's hot chicken");
    }
}
