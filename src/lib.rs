//! # evidx
//!
//! Decoders and a pairwise similarity engine for quantized per-sentence
//! linguistic features.
//!
//! Upstream, every sentence is stored as twelve small integer feature arrays
//! plus three hash sets. evidx turns those back into float feature vectors
//! and into N x N agreement matrices for ranking and deduplication.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! evidx decode --input batch.json --mode dense
//! evidx similarity --input batch.json --limit 30
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use evidx::prelude::*;
//!
//! let raw = evidx::load_batch("batch.json").unwrap();
//!
//! let batch = FeatureBatch::from_raw(&raw).unwrap();
//! let decoded = FeatureAssembler::new(DecodeMode::Dense).assemble(&batch).unwrap();
//!
//! let engine = SimilarityEngine::default();
//! let report = SimilarityReport::compute(&raw, &Selection::default(), &engine, None).unwrap();
//! println!("{} rows, {} kept", decoded.as_dense().unwrap().rows(), report.num);
//! ```
//!
//! ## Crate Structure
//!
//! - [`evidx-core`](https://docs.rs/evidx-core) - Errors, typed matrices, SIMD equality kernels, cancellation
//! - [`evidx-codec`](https://docs.rs/evidx-codec) - Per-family decoders and the feature vector assembler
//! - [`evidx-similarity`](https://docs.rs/evidx-similarity) - Similarity engine, row selection, reports

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Re-export core types
pub use evidx_core::{CancelToken, Comparable, Element, ElementType, Error, Matrix, Result};

// Re-export codec
pub use evidx_codec::{
    DecodeMode, DecodedFeatures, DenseFeatures, FamilySpan, FeatureArray, FeatureAssembler, FeatureBatch,
    FeatureFamily, HashFamily, InputWidths, KeyedFeatures, RawBatch, Transform,
};

// Re-export similarity
pub use evidx_similarity::{
    select_top, similarity_matrix, EngineConfig, Selection, SimilarityEngine, SimilarityMatrix, SimilarityReport,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AppConfig, CancelToken, DecodeMode, DecodedFeatures, EngineConfig, Error, FeatureAssembler, FeatureBatch,
        FeatureFamily, HashFamily, Matrix, RawBatch, Result, Selection, SimilarityEngine, SimilarityReport,
    };
}

/// Per-family decoders
pub mod decode {
    pub use evidx_codec::bits::{expand_bits, expand_rows, unpack_byte};
    pub use evidx_codec::logscale::log_compress;
    pub use evidx_codec::ratio::{divide_by_first, divide_by_sum};
    pub use evidx_codec::scaled::{scaled_float, scaled_floats};
}

/// Settings shared by every command, usually read from `--config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub selection: Selection,
    pub mode: DecodeMode,
    /// Column counts used when a batch has zero rows
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widths: Option<InputWidths>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()
    }
}

/// Read an [`AppConfig`] from a JSON file
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<AppConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: AppConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Read a [`RawBatch`] from a JSON file
pub fn load_batch(path: impl AsRef<Path>) -> anyhow::Result<RawBatch> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).with_context(|| format!("reading batch {}", path.display()))?;
    let batch: RawBatch = serde_json::from_str(&text).with_context(|| format!("parsing batch {}", path.display()))?;
    tracing::debug!(rows = batch.len(), path = %path.display(), "batch loaded");
    Ok(batch)
}
