//! Score-based row selection
//!
//! The engine itself is order-agnostic. Callers usually keep only the
//! best-scored rows before building matrices; this is that step.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::debug;

/// Row cap applied to similarity requests when the caller gives none
pub const DEFAULT_SIMILARITY_LIMIT: usize = 30;

/// Which rows survive, after sorting by score descending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    /// Keep at most this many rows; `None` keeps everything after `offset`
    pub limit: Option<usize>,
    /// Skip this many top-scored rows first
    pub offset: usize,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_SIMILARITY_LIMIT),
            offset: 0,
        }
    }
}

impl Selection {
    /// Every row, best score first
    pub fn all() -> Self {
        Self {
            limit: None,
            offset: 0,
        }
    }

    pub fn top(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// Row indices ordered by score descending, then offset and limit applied.
///
/// The sort is stable, so equal scores keep their input order. NaN scores
/// sort after every real score.
pub fn select_top(scores: &[f32], selection: &Selection) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by_key(|&i| Reverse(score_key(scores[i])));

    let remaining = order.into_iter().skip(selection.offset);
    let selected: Vec<usize> = match selection.limit {
        Some(limit) => remaining.take(limit).collect(),
        None => remaining.collect(),
    };

    if selected.len() < scores.len() {
        debug!(total = scores.len(), kept = selected.len(), "selection truncated rows");
    }
    selected
}

#[inline]
fn score_key(score: f32) -> OrderedFloat<f32> {
    if score.is_nan() {
        OrderedFloat(f32::NEG_INFINITY)
    } else {
        OrderedFloat(score)
    }
}
