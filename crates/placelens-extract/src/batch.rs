//! Batch extraction over many transcripts
//!
//! Each transcript gets its own run on tokio's blocking pool; the pipeline is
//! CPU-bound and shares nothing mutable, so runs are fully independent.
//! Results are combined only after every run has finished.

use crate::aggregate::merge_results;
use crate::extractor::HierarchicalExtractor;
use futures::future::join_all;
use placelens_core::{ExtractionResult, PlaceCandidate, Transcript};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Per-transcript results plus the merged candidate list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchExtraction {
    /// One result per input transcript, in input order
    pub results: Vec<ExtractionResult>,

    /// Deduplicated candidates across all results
    pub candidates: Vec<PlaceCandidate>,

    /// Wall-clock time for the whole batch
    pub total_latency_us: u64,
}

/// Extract every transcript in parallel.
///
/// A worker that panics is logged and contributes an empty result; the rest
/// of the batch is unaffected.
pub async fn extract_batch(
    extractor: Arc<HierarchicalExtractor>,
    transcripts: Vec<Transcript>,
) -> BatchExtraction {
    let start = Instant::now();
    let count = transcripts.len();

    let handles: Vec<_> = transcripts
        .into_iter()
        .map(|transcript| {
            let extractor = Arc::clone(&extractor);
            tokio::task::spawn_blocking(move || extractor.extract(&transcript))
        })
        .collect();

    let results: Vec<ExtractionResult> = join_all(handles)
        .await
        .into_iter()
        .enumerate()
        .map(|(index, joined)| {
            joined.unwrap_or_else(|e| {
                warn!(index, "Extraction worker failed: {}", e);
                ExtractionResult::empty()
            })
        })
        .collect();

    let candidates = merge_results(&results);
    let total_latency_us = start.elapsed().as_micros() as u64;

    info!(
        transcripts = count,
        candidates = candidates.len(),
        latency_us = total_latency_us,
        "Batch extraction complete"
    );

    BatchExtraction {
        results,
        candidates,
        total_latency_us,
    }
}
