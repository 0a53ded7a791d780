use std::collections::BTreeMap;

use crate::types::{RetrievedChunk, SourceId};

/// Candidates fetched per wanted result before the per-source cap is applied.
pub const OVERSAMPLE_FACTOR: usize = 2;

/// Walks `candidates` in rank order, accepting a chunk only while its source
/// has fewer than `max_per_source` accepted chunks. Stops at `desired_k`.
///
/// Accepted chunks keep their relative order. A short result is returned
/// as-is.
pub fn diversify(candidates: Vec<RetrievedChunk>, desired_k: usize, max_per_source: usize) -> Vec<RetrievedChunk> {
    let mut accepted_per_source: BTreeMap<SourceId, usize> = BTreeMap::new();
    let mut selected = Vec::with_capacity(desired_k.min(candidates.len()));

    for candidate in candidates {
        if selected.len() >= desired_k {
            break;
        }
        let accepted = accepted_per_source
            .entry(candidate.source_id().clone())
            .or_insert(0);
        if *accepted < max_per_source {
            *accepted += 1;
            selected.push(candidate);
        }
    }

    selected
}
