//! Phrase classification as an ordered rule cascade
//!
//! Each rule either claims a phrase or passes. The first rule that claims it
//! decides category, subtype and base confidence; later rules are never
//! consulted, so ties are resolved purely by rule order.

use crate::registry::SharedRegistry;
use placelens_core::{Category, Classification, EntityRef, Error, Result, Subtype};
use regex::Regex;
use std::sync::Arc;

/// Cap on confidence for a gazetteer match
pub const KNOWN_CONFIDENCE_CAP: f32 = 0.95;

pub(crate) const STREET_SUFFIXES: &str = "Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Way|Place|Pl|Court|Ct|Parkway|Pkwy|Highway|Hwy|Plaza|Terrace|Ter|Circle|Cir|Square|Sq";

const VENUE_KEYWORDS: &str = "Restaurant|Cafe|Café|Coffee|Bar|Grill|Bistro|Deli|Pizza|Pizzeria|Sushi|Bakery|Market|Store|Shop|Eatery|Kitchen|House|Chicken|Thai|BBQ|Burgers?|Noodles?|Ramen|Tea|Diner|Pub|Brewery|Taqueria|Creamery";

pub(crate) const LANDMARK_PATTERN: &str = r"(?i)\b(?:national park|visitor center|trailhead|park|trail|station|temple|shrine|museum|plaza|center|centre|mall|square|beach|lake|bridge|tower|lodge|airport|pier|gardens?|zoo|stadium|cathedral|church|castle|monument|falls|canyon|harbou?r|lighthouse|observatory|library)\b|(?:购物中心|地铁站|火车站|公园|广场|大厦|中心|商城|机场|博物馆|寺)";

const NAMED_LOCATION_PATTERNS: &[&str] = &[
    r"\b(?:Downtown|Uptown|Midtown|Old Town|Chinatown|Japantown|Koreatown|Little Italy)(?:\s+[A-Z][a-z]+)?\b",
    r"\b(?:North|South|East|West)\s+[A-Z][a-z]{3,}\b",
    r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?\s+(?:Heights|Hills|Valley|Village|District|Quarter|County|Township|Neighborhood)\b",
    r"\p{Han}{2,8}(?:街道|社区|市|区|县|镇|村)",
];

/// One step of the classification cascade
pub trait ClassificationRule: Send + Sync {
    /// Rule name, used in logs and errors
    fn name(&self) -> &str;

    /// Claim `text` with a classification, or return `None` to pass
    fn apply(&self, text: &str, ocr_confidence: f32) -> Result<Option<Classification>>;
}

/// Gazetteer lookup; always the first rule
pub struct KnownEntityRule {
    registry: SharedRegistry,
}

impl KnownEntityRule {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }
}

impl ClassificationRule for KnownEntityRule {
    fn name(&self) -> &str {
        "known_entity"
    }

    fn apply(&self, text: &str, ocr_confidence: f32) -> Result<Option<Classification>> {
        Ok(self.registry.find(text).map(|hit| {
            let confidence = (ocr_confidence * hit.confidence_factor).min(KNOWN_CONFIDENCE_CAP);
            Classification::new(&hit.entity.name, hit.category, Subtype::Known, confidence)
                .with_entity(EntityRef::from(hit.entity))
        }))
    }
}

/// House number followed by a street-type suffix
pub struct StreetAddressRule {
    patterns: Vec<Regex>,
}

impl StreetAddressRule {
    pub fn new() -> Result<Self> {
        let latin = format!(
            r"\b\d{{1,5}}[A-Za-z]?\s+(?:[A-Za-z0-9][\w'.\-]*\s+){{1,4}}(?i:{})\b\.?",
            STREET_SUFFIXES
        );
        Ok(Self {
            patterns: vec![
                compile(&latin)?,
                compile(r"\p{Han}{1,12}(?:大道|路|街|巷|道)\d{1,5}号")?,
            ],
        })
    }
}

impl ClassificationRule for StreetAddressRule {
    fn name(&self) -> &str {
        "street_address"
    }

    fn apply(&self, text: &str, ocr_confidence: f32) -> Result<Option<Classification>> {
        Ok(first_match(&self.patterns, text).map(|m| {
            Classification::new(
                m,
                Category::Address,
                Subtype::StreetAddress,
                (ocr_confidence * 1.1).min(0.8),
            )
        }))
    }
}

/// Capitalized run ending in a cuisine or venue keyword
pub struct PatternBusinessRule {
    pattern: Regex,
}

impl PatternBusinessRule {
    pub fn new() -> Result<Self> {
        let pattern = format!(
            r"\b[A-Z][\w'’&.\-]*(?:\s+(?:&\s+)?[A-Z][\w'’&.\-]*)*\s+(?:{})\b",
            VENUE_KEYWORDS
        );
        Ok(Self {
            pattern: compile(&pattern)?,
        })
    }
}

impl ClassificationRule for PatternBusinessRule {
    fn name(&self) -> &str {
        "pattern_business"
    }

    fn apply(&self, text: &str, ocr_confidence: f32) -> Result<Option<Classification>> {
        Ok(self.pattern.find(text).map(|m| {
            Classification::new(
                m.as_str().trim(),
                Category::Business,
                Subtype::PatternBusiness,
                ocr_confidence.min(0.7),
            )
        }))
    }
}

/// Landmark and travel keywords
pub struct LandmarkRule {
    pattern: Regex,
}

impl LandmarkRule {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: compile(LANDMARK_PATTERN)?,
        })
    }
}

impl ClassificationRule for LandmarkRule {
    fn name(&self) -> &str {
        "landmark"
    }

    fn apply(&self, text: &str, ocr_confidence: f32) -> Result<Option<Classification>> {
        if !self.pattern.is_match(text) {
            return Ok(None);
        }
        Ok(Some(Classification::new(
            text.trim(),
            Category::Landmark,
            Subtype::Landmark,
            ocr_confidence.min(0.75),
        )))
    }
}

/// Neighborhood and district shapes
pub struct NamedLocationRule {
    patterns: Vec<Regex>,
}

impl NamedLocationRule {
    pub fn new() -> Result<Self> {
        Ok(Self {
            patterns: NAMED_LOCATION_PATTERNS
                .iter()
                .map(|p| compile(p))
                .collect::<Result<_>>()?,
        })
    }
}

impl ClassificationRule for NamedLocationRule {
    fn name(&self) -> &str {
        "named_location"
    }

    fn apply(&self, text: &str, ocr_confidence: f32) -> Result<Option<Classification>> {
        Ok(first_match(&self.patterns, text).map(|m| {
            Classification::new(
                m,
                Category::Area,
                Subtype::NamedLocation,
                (ocr_confidence * 0.95).min(0.7),
            )
        }))
    }
}

/// Contains a gazetteer city or district name
pub struct GeographicAreaRule {
    registry: SharedRegistry,
}

impl GeographicAreaRule {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }
}

impl ClassificationRule for GeographicAreaRule {
    fn name(&self) -> &str {
        "geographic_area"
    }

    fn apply(&self, text: &str, ocr_confidence: f32) -> Result<Option<Classification>> {
        Ok(self.registry.find_area(text).map(|area| {
            Classification::new(
                area,
                Category::Area,
                Subtype::GeographicArea,
                ocr_confidence * 0.9,
            )
        }))
    }
}

/// Ordered rule cascade with an `other` fallback
#[derive(Clone)]
pub struct PhraseClassifier {
    rules: Vec<Arc<dyn ClassificationRule>>,
    max_phrase_bytes: usize,
}

impl PhraseClassifier {
    /// The standard cascade: known entity, street address, pattern business,
    /// landmark, named location, geographic area
    pub fn new(registry: SharedRegistry, max_phrase_bytes: usize) -> Result<Self> {
        Ok(Self::empty(max_phrase_bytes)
            .with_rule(Arc::new(KnownEntityRule::new(Arc::clone(&registry))))
            .with_rule(Arc::new(StreetAddressRule::new()?))
            .with_rule(Arc::new(PatternBusinessRule::new()?))
            .with_rule(Arc::new(LandmarkRule::new()?))
            .with_rule(Arc::new(NamedLocationRule::new()?))
            .with_rule(Arc::new(GeographicAreaRule::new(registry))))
    }

    /// A cascade with no rules; everything falls through to `other`
    pub fn empty(max_phrase_bytes: usize) -> Self {
        Self {
            rules: Vec::new(),
            max_phrase_bytes,
        }
    }

    /// Append a rule at the end of the cascade
    pub fn with_rule(mut self, rule: Arc<dyn ClassificationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rule names in evaluation order
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Classify one phrase; the first claiming rule wins
    pub fn classify(&self, text: &str, ocr_confidence: f32) -> Result<Classification> {
        if text.len() > self.max_phrase_bytes {
            return Err(Error::pattern(
                "cascade",
                format!(
                    "input of {} bytes exceeds limit of {}",
                    text.len(),
                    self.max_phrase_bytes
                ),
            ));
        }

        for rule in &self.rules {
            if let Some(classification) = rule.apply(text, ocr_confidence)? {
                return Ok(classification);
            }
        }

        Ok(Classification::new(
            text.trim(),
            Category::Other,
            Subtype::Unclassified,
            ocr_confidence * 0.5,
        ))
    }
}

fn first_match<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| m.as_str().trim())
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::config(format!("Failed to compile rule pattern '{}': {}", pattern, e)))
}
