//! placelens Core
//!
//! Data model and error types shared across placelens components.
//!
//! This crate provides:
//! - Transcript and phrase types produced per request
//! - The five output categories and their classification subtypes
//! - Classification and extraction-result containers with their invariants
//!   (clamped confidence, confidence-descending buckets)
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    clamp_confidence, normalize_key, Category, Classification, EntityRef, ExtractionResult,
    KnownEntity, Phrase, PlaceCandidate, Subtype, Transcript,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        Category, Classification, ExtractionResult, PlaceCandidate, Subtype, Transcript,
    };
}
