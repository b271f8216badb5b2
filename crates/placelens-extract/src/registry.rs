//! Gazetteer of known entities and areas
//!
//! The registry is built once per process from a [`Gazetteer`] (the embedded
//! default or an external YAML file) and is read-only afterwards. Every
//! pattern is compiled at construction, so a bad entry fails fast instead of
//! surfacing per request.

use aho_corasick::{AhoCorasick, MatchKind};
use placelens_core::{Category, Error, KnownEntity, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const BUILTIN_GAZETTEER: &str = include_str!("../data/gazetteer.yaml");

/// Default multiplier on OCR confidence for a known business
pub const BUSINESS_CONFIDENCE_FACTOR: f32 = 1.3;

/// Default multiplier on OCR confidence for a known address
pub const ADDRESS_CONFIDENCE_FACTOR: f32 = 1.2;

/// Registry shared read-only across workers
pub type SharedRegistry = Arc<EntityRegistry>;

/// Loadable list of known entities and area names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gazetteer {
    #[serde(default)]
    pub entities: Vec<KnownEntity>,

    /// City and district names matched by substring
    #[serde(default)]
    pub areas: Vec<String>,
}

impl Gazetteer {
    /// The gazetteer embedded in the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_GAZETTEER)
    }

    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}

/// One compiled gazetteer pattern
struct EntityPattern {
    entity: usize,
    source: String,
    regex: Regex,
    category: Category,
    confidence_factor: f32,
}

/// (pattern, category, confidence factor) view of a registry entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternEntry<'a> {
    pub pattern: &'a str,
    pub category: Category,
    pub confidence_factor: f32,
}

/// A registry hit inside some text
#[derive(Debug, Clone, Copy)]
pub struct RegistryMatch<'a> {
    pub entity: &'a KnownEntity,
    pub category: Category,
    pub confidence_factor: f32,
    /// Byte span of the match in the searched text
    pub span: (usize, usize),
}

/// Read-only gazetteer with compiled matchers
pub struct EntityRegistry {
    entities: Vec<KnownEntity>,
    patterns: Vec<EntityPattern>,
    areas: Vec<String>,
    area_matcher: AhoCorasick,
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("entities", &self.entities.len())
            .field("patterns", &self.patterns.len())
            .field("areas", &self.areas.len())
            .finish()
    }
}

impl EntityRegistry {
    /// Build the registry from the embedded gazetteer
    pub fn builtin() -> Result<Self> {
        Self::from_gazetteer(Gazetteer::builtin()?)
    }

    /// Build the registry from a YAML gazetteer
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_gazetteer(Gazetteer::from_yaml(yaml)?)
    }

    /// Build the registry from a gazetteer file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let gazetteer = Gazetteer::from_file(path).map_err(|e| {
            Error::config(format!("Failed to load gazetteer {}: {}", path.display(), e))
        })?;
        Self::from_gazetteer(gazetteer)
    }

    /// Compile every pattern of a gazetteer.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if:
    /// - An entity is tagged with a category other than business or address
    /// - An entity has no patterns, or a pattern fails to compile
    /// - The area matcher cannot be built
    pub fn from_gazetteer(gazetteer: Gazetteer) -> Result<Self> {
        let Gazetteer { entities, areas } = gazetteer;
        let mut patterns = Vec::new();

        // Businesses are matched before addresses.
        for category in [Category::Business, Category::Address] {
            for (idx, entity) in entities.iter().enumerate() {
                if entity.category != category {
                    continue;
                }
                if entity.patterns.is_empty() {
                    return Err(Error::config(format!(
                        "Known entity '{}' has no patterns",
                        entity.name
                    )));
                }

                let confidence_factor = entity.confidence_factor.unwrap_or(match category {
                    Category::Business => BUSINESS_CONFIDENCE_FACTOR,
                    _ => ADDRESS_CONFIDENCE_FACTOR,
                });

                for source in &entity.patterns {
                    let regex = RegexBuilder::new(source)
                        .case_insensitive(true)
                        .build()
                        .map_err(|e| {
                            Error::config(format!(
                                "Pattern '{}' for '{}' failed to compile: {}",
                                source, entity.name, e
                            ))
                        })?;

                    patterns.push(EntityPattern {
                        entity: idx,
                        source: source.clone(),
                        regex,
                        category,
                        confidence_factor,
                    });
                }
            }
        }

        if let Some(entity) = entities
            .iter()
            .find(|e| !matches!(e.category, Category::Business | Category::Address))
        {
            return Err(Error::config(format!(
                "Known entity '{}' has category '{}'; only business and address are supported",
                entity.name, entity.category
            )));
        }

        let areas: Vec<String> = areas
            .into_iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        let area_matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&areas)
            .map_err(|e| Error::config(format!("Failed to build area matcher: {}", e)))?;

        info!(
            "Entity registry initialized with {} entities, {} patterns, {} areas",
            entities.len(),
            patterns.len(),
            areas.len()
        );

        Ok(Self {
            entities,
            patterns,
            areas,
            area_matcher,
        })
    }

    /// Wrap into a shareable handle
    pub fn shared(self) -> SharedRegistry {
        Arc::new(self)
    }

    /// All known entities in gazetteer order
    pub fn entities(&self) -> &[KnownEntity] {
        &self.entities
    }

    /// Area names in gazetteer order
    pub fn areas(&self) -> &[String] {
        &self.areas
    }

    /// Number of known entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Look up an entity by canonical name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&KnownEntity> {
        self.entities
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Iterate (pattern, category, confidence factor), businesses first
    pub fn patterns(&self) -> impl Iterator<Item = PatternEntry<'_>> {
        self.patterns.iter().map(|p| PatternEntry {
            pattern: &p.source,
            category: p.category,
            confidence_factor: p.confidence_factor,
        })
    }

    /// First registry hit in `text`, in registry order
    pub fn find(&self, text: &str) -> Option<RegistryMatch<'_>> {
        self.patterns.iter().find_map(|p| {
            p.regex.find(text).map(|m| RegistryMatch {
                entity: &self.entities[p.entity],
                category: p.category,
                confidence_factor: p.confidence_factor,
                span: (m.start(), m.end()),
            })
        })
    }

    /// Leftmost-longest area name contained in `text`, as written there
    pub fn find_area<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.area_matcher
            .find(text)
            .map(|m| &text[m.start()..m.end()])
    }

    /// Whether `text` mentions any known area
    pub fn mentions_area(&self, text: &str) -> bool {
        self.area_matcher.is_match(text)
    }
}
