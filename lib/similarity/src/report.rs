//! Similarity report for one batch
//!
//! Expands the semantic bits, keeps the selected rows, and builds one
//! agreement matrix for the semantic family plus one per hash family the
//! batch carries.

use crate::engine::{SimilarityEngine, SimilarityMatrix};
use crate::selection::{select_top, Selection};
use evidx_codec::bits::expand_rows;
use evidx_codec::{HashFamily, RawBatch};
use evidx_core::{CancelToken, Error, Matrix, Result};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityReport {
    /// Rows kept after selection
    pub num: usize,
    /// Input row index of every kept row, best score first
    pub indices: Vec<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
    pub scores: Vec<f32>,
    #[serde(rename = "simi-semantic")]
    pub semantic: SimilarityMatrix,
    #[serde(rename = "simi-grammar", skip_serializing_if = "Option::is_none")]
    pub grammar: Option<SimilarityMatrix>,
    #[serde(rename = "simi-duplicate", skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<SimilarityMatrix>,
    #[serde(rename = "simi-biblio", skip_serializing_if = "Option::is_none")]
    pub biblio: Option<SimilarityMatrix>,
}

impl SimilarityReport {
    pub fn compute(
        raw: &RawBatch,
        selection: &Selection,
        engine: &SimilarityEngine,
        cancel: Option<&CancelToken>,
    ) -> Result<Self> {
        let rows = raw.len();
        if raw.score.len() != rows {
            return Err(Error::ShapeMismatch {
                context: "score row count".to_string(),
                expected: rows,
                actual: raw.score.len(),
            });
        }
        if !raw.ids.is_empty() && raw.ids.len() != rows {
            return Err(Error::ShapeMismatch {
                context: "ids row count".to_string(),
                expected: rows,
                actual: raw.ids.len(),
            });
        }

        // validate everything before any kernel runs
        let packed = Matrix::<i8>::from_i64_rows(&raw.semantic, None).map_err(|e| e.within("semantic"))?;
        let mut hashes = Vec::with_capacity(HashFamily::ALL.len());
        for family in HashFamily::ALL {
            hashes.push(raw.hash_matrix(family)?);
        }

        let indices = select_top(&raw.score, selection);
        debug!(rows, kept = indices.len(), "building similarity report");

        let bits = expand_rows(&packed.select_rows(&indices)?)?;
        let semantic = engine.run(&bits, cancel)?;

        let mut matrices = Vec::with_capacity(hashes.len());
        for hash in hashes {
            let matrix = match hash {
                Some(m) => Some(engine.run(&m.select_rows(&indices)?, cancel)?),
                None => None,
            };
            matrices.push(matrix);
        }
        let mut matrices = matrices.into_iter();

        Ok(Self {
            num: indices.len(),
            ids: if raw.ids.is_empty() {
                Vec::new()
            } else {
                indices.iter().map(|&i| raw.ids[i].clone()).collect()
            },
            scores: indices.iter().map(|&i| raw.score[i]).collect(),
            indices,
            semantic,
            grammar: matrices.next().flatten(),
            duplicate: matrices.next().flatten(),
            biblio: matrices.next().flatten(),
        })
    }

    pub fn hash_matrix(&self, family: HashFamily) -> Option<&SimilarityMatrix> {
        match family {
            HashFamily::Grammar => self.grammar.as_ref(),
            HashFamily::Duplicate => self.duplicate.as_ref(),
            HashFamily::Biblio => self.biblio.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> RawBatch {
        RawBatch {
            ids: vec!["x".into(), "y".into(), "z".into()],
            semantic: vec![vec![-1], vec![0], vec![-1]],
            grammar: Some(vec![vec![1, 2], vec![1, 3], vec![4, 5]]),
            score: vec![0.2, 0.9, 0.5],
            ..RawBatch::default()
        }
    }

    #[test]
    fn test_report_orders_by_score() {
        let report =
            SimilarityReport::compute(&batch(), &Selection::all(), &SimilarityEngine::default(), None).unwrap();

        assert_eq!(report.num, 3);
        assert_eq!(report.indices, vec![1, 2, 0]);
        assert_eq!(report.ids, vec!["y", "z", "x"]);
        assert_eq!(report.scores, vec![0.9, 0.5, 0.2]);

        // rows are now [0x00], [0xFF], [0xFF]
        assert_eq!(
            report.semantic.to_rows(),
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 1.0], vec![0.0, 1.0, 1.0]]
        );

        let grammar = report.hash_matrix(HashFamily::Grammar).unwrap();
        // [1,3] vs [4,5] vs [1,2]
        assert_eq!(grammar.get(0, 2), 0.5);
        assert_eq!(grammar.get(0, 1), 0.0);
        assert!(report.duplicate.is_none());
    }

    #[test]
    fn test_limit_truncates_before_kernel() {
        let report =
            SimilarityReport::compute(&batch(), &Selection::top(2), &SimilarityEngine::default(), None).unwrap();
        assert_eq!(report.num, 2);
        assert_eq!(report.semantic.len(), 2);
        assert_eq!(report.grammar.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_scores_rejected() {
        let mut raw = batch();
        raw.score.pop();
        let err = SimilarityReport::compute(&raw, &Selection::all(), &SimilarityEngine::default(), None)
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_hash_row_count_checked() {
        let mut raw = batch();
        raw.grammar.as_mut().unwrap().pop();
        assert!(SimilarityReport::compute(&raw, &Selection::all(), &SimilarityEngine::default(), None).is_err());
    }

    #[test]
    fn test_empty_batch() {
        let report = SimilarityReport::compute(
            &RawBatch::default(),
            &Selection::default(),
            &SimilarityEngine::default(),
            None,
        )
        .unwrap();
        assert_eq!(report.num, 0);
        assert!(report.semantic.is_empty());
    }

    #[test]
    fn test_json_keys() {
        let report =
            SimilarityReport::compute(&batch(), &Selection::all(), &SimilarityEngine::default(), None).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("simi-semantic").is_some());
        assert!(json.get("simi-grammar").is_some());
        assert!(json.get("simi-biblio").is_none());
        assert_eq!(json["num"], 3);
    }
}
