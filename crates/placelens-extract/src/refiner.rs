//! Confidence refinement
//!
//! A refiner is an ordered list of named adjustment steps. Each step looks at
//! a classification and returns a multiplier; the multipliers are applied in
//! order to the base confidence and the product is clamped to [0, 1] once, at
//! the end. Keeping the steps separate makes every heuristic testable on its
//! own and lets [`ConfidenceRefiner::explain`] show where a score came from.

use crate::classifier::{LANDMARK_PATTERN, STREET_SUFFIXES};
use crate::registry::SharedRegistry;
use placelens_core::{clamp_confidence, Category, Classification, Error, Result};
use regex::Regex;
use std::sync::Arc;

const CONTEXT_KEYWORDS: &str = r"(?i)\b(?:restaurant|cafe|café|coffee|bar|grill|kitchen|bakery|deli|bistro|diner|eatery|pizza|sushi|market|shop|store|street|avenue|road|boulevard|drive|lane|way|ave|st|rd|blvd)\b";

/// One named confidence adjustment
pub trait Adjustment: Send + Sync {
    /// Step name shown in [`ConfidenceRefiner::explain`]
    fn name(&self) -> &'static str;

    /// Multiplier for this classification
    fn factor(&self, classification: &Classification) -> f32;
}

/// Per-category weight
pub struct CategoryWeight;

impl Adjustment for CategoryWeight {
    fn name(&self) -> &'static str {
        "category_weight"
    }

    fn factor(&self, classification: &Classification) -> f32 {
        match classification.category {
            Category::Business => 1.2,
            Category::Address => 1.1,
            Category::Area | Category::Landmark => 1.0,
            Category::Other => 0.6,
        }
    }
}

/// Bonus for gazetteer matches
pub struct SubtypeBonus;

impl Adjustment for SubtypeBonus {
    fn name(&self) -> &'static str {
        "subtype_bonus"
    }

    fn factor(&self, classification: &Classification) -> f32 {
        if !classification.is_known() {
            return 1.0;
        }
        match classification.category {
            Category::Business => 1.3,
            Category::Address => 1.2,
            _ => 1.0,
        }
    }
}

/// Names are short; very short or very long text rarely is one
pub struct LengthFitness;

impl Adjustment for LengthFitness {
    fn name(&self) -> &'static str {
        "length_fitness"
    }

    fn factor(&self, classification: &Classification) -> f32 {
        match classification.text.chars().count() {
            0..=2 => 0.6,
            5..=35 => 1.1,
            61.. => 0.8,
            _ => 1.0,
        }
    }
}

/// Bonus when a business or street keyword is present
pub struct ContextKeyword {
    pattern: Regex,
}

impl ContextKeyword {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: compile(CONTEXT_KEYWORDS)?,
        })
    }
}

impl Adjustment for ContextKeyword {
    fn name(&self) -> &'static str {
        "context_keyword"
    }

    fn factor(&self, classification: &Classification) -> f32 {
        if self.pattern.is_match(&classification.text) {
            1.1
        } else {
            1.0
        }
    }
}

/// Penalty for all-caps fragments with nothing place-like in them.
///
/// Gazetteer matches are exempt: their text is the canonical name.
pub struct NoiseShape {
    registry: SharedRegistry,
    geographic: Vec<Regex>,
}

impl NoiseShape {
    pub fn new(registry: SharedRegistry) -> Result<Self> {
        Ok(Self {
            registry,
            geographic: vec![
                compile(&format!(r"(?i)\b(?:{})\b", STREET_SUFFIXES))?,
                compile(LANDMARK_PATTERN)?,
            ],
        })
    }

    fn has_geographic_token(&self, text: &str) -> bool {
        self.registry.mentions_area(text) || self.geographic.iter().any(|re| re.is_match(text))
    }
}

impl Adjustment for NoiseShape {
    fn name(&self) -> &'static str {
        "noise_shape"
    }

    fn factor(&self, classification: &Classification) -> f32 {
        if classification.matched_entity.is_some() {
            return 1.0;
        }
        let text = &classification.text;
        if is_all_caps(text) && !self.has_geographic_token(text) {
            0.4
        } else {
            1.0
        }
    }
}

/// At least two uppercase letters and no lowercase ones
fn is_all_caps(text: &str) -> bool {
    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    upper >= 2 && !text.chars().any(|c| c.is_lowercase())
}

/// Ordered adjustment steps applied to every classification
#[derive(Clone)]
pub struct ConfidenceRefiner {
    steps: Vec<Arc<dyn Adjustment>>,
}

impl ConfidenceRefiner {
    /// The standard steps: category weight, subtype bonus, length fitness,
    /// context keyword, noise shape
    pub fn new(registry: SharedRegistry) -> Result<Self> {
        Ok(Self::empty()
            .with_step(Arc::new(CategoryWeight))
            .with_step(Arc::new(SubtypeBonus))
            .with_step(Arc::new(LengthFitness))
            .with_step(Arc::new(ContextKeyword::new()?))
            .with_step(Arc::new(NoiseShape::new(registry)?)))
    }

    /// A refiner that only clamps
    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step
    pub fn with_step(mut self, step: Arc<dyn Adjustment>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Apply every step and clamp the result
    pub fn refine(&self, mut classification: Classification) -> Classification {
        let raw = self
            .steps
            .iter()
            .fold(classification.confidence, |acc, step| {
                acc * step.factor(&classification)
            });
        classification.set_confidence(raw);
        classification
    }

    /// Running confidence after each step, starting from the base value and
    /// ending with the clamped result
    pub fn explain(&self, classification: &Classification) -> Vec<(&'static str, f32)> {
        let mut trail = Vec::with_capacity(self.steps.len() + 2);
        let mut value = classification.confidence;
        trail.push(("base", value));
        for step in &self.steps {
            value *= step.factor(classification);
            trail.push((step.name(), value));
        }
        trail.push(("clamped", clamp_confidence(value)));
        trail
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::config(format!("Failed to compile refiner pattern: {}", e)))
}
