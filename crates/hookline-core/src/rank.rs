//! Ordering and truncation of candidate hooks

use crate::segment::Hook;
use std::cmp::Ordering;

/// Sort hooks by descending confidence (earlier start wins ties) and keep
/// the best `top_k`. Pure sort-and-slice, no side effects.
pub fn rank(mut hooks: Vec<Hook>, top_k: usize) -> Vec<Hook> {
    hooks.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
            .then(
                a.start_time
                    .partial_cmp(&b.start_time)
                    .unwrap_or(Ordering::Equal),
            )
    });
    hooks.truncate(top_k);
    hooks
}
