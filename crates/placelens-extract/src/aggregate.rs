//! Cross-transcript candidate aggregation
//!
//! Several screenshots of the same place produce overlapping results. They
//! are folded into one candidate list: one entry per normalized text, the
//! entry kept being the one in the highest-priority category (business, then
//! address, then area/landmark, then other) and, within a tier, the most
//! confident. Full ties keep the first one seen.

use placelens_core::{ExtractionResult, PlaceCandidate};
use tracing::debug;

/// Merge several extraction results into one deduplicated candidate list
pub fn merge_results(results: &[ExtractionResult]) -> Vec<PlaceCandidate> {
    let total: usize = results.iter().map(ExtractionResult::len).sum();
    let merged = ExtractionResult::merge_candidates(results);
    debug!(
        transcripts = results.len(),
        candidates = merged.len(),
        duplicates = total - merged.len(),
        "Merged extraction results"
    );
    merged
}
