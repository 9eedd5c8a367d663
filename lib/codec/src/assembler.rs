//! Feature Vector Assembler
//!
//! Turns a [`FeatureBatch`] into either one dense float matrix (every
//! family decoded and concatenated in table order) or a keyed map of the
//! raw typed arrays, for clients that apply their own normalization.

use crate::batch::{FeatureArray, FeatureBatch};
use crate::family::FeatureFamily;
use evidx_core::{Error, Matrix, Result};
use rayon::prelude::*;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Decode and concatenate into one float vector per row
    #[default]
    Dense,
    /// Raw typed arrays keyed by family name
    Keyed,
}

impl FromStr for DecodeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dense" => Ok(DecodeMode::Dense),
            "keyed" => Ok(DecodeMode::Keyed),
            other => Err(Error::InvalidConfig(format!("unknown decode mode '{other}'"))),
        }
    }
}

/// Where one family's decoded values sit inside a dense row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FamilySpan {
    pub family: FeatureFamily,
    pub offset: usize,
    pub width: usize,
}

/// Dense Mode output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DenseFeatures {
    pub layout: Vec<FamilySpan>,
    pub features: Matrix<f32>,
}

impl DenseFeatures {
    #[inline]
    pub fn rows(&self) -> usize {
        self.features.rows()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.features.cols()
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        self.features.row(i)
    }

    pub fn span(&self, family: FeatureFamily) -> Option<&FamilySpan> {
        self.layout.iter().find(|s| s.family == family)
    }

    /// The decoded values of one family in row `i`
    pub fn family_slice(&self, i: usize, family: FeatureFamily) -> Option<&[f32]> {
        let span = self.span(family)?;
        Some(&self.row(i)[span.offset..span.offset + span.width])
    }
}

/// Keyed Mode output, serialized as `{ "<family>": [[...], ...], ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedFeatures {
    entries: Vec<(FeatureFamily, FeatureArray)>,
}

impl KeyedFeatures {
    pub fn get(&self, family: FeatureFamily) -> Option<&FeatureArray> {
        self.entries.iter().find(|(f, _)| *f == family).map(|(_, a)| a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureFamily, &FeatureArray)> + '_ {
        self.entries.iter().map(|(f, a)| (*f, a))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for KeyedFeatures {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (family, array) in &self.entries {
            map.serialize_entry(family.name(), array)?;
        }
        map.end()
    }
}

/// Result of one assembly call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DecodedFeatures {
    Dense(DenseFeatures),
    Keyed(KeyedFeatures),
}

impl DecodedFeatures {
    pub fn mode(&self) -> DecodeMode {
        match self {
            DecodedFeatures::Dense(_) => DecodeMode::Dense,
            DecodedFeatures::Keyed(_) => DecodeMode::Keyed,
        }
    }

    pub fn as_dense(&self) -> Option<&DenseFeatures> {
        match self {
            DecodedFeatures::Dense(d) => Some(d),
            DecodedFeatures::Keyed(_) => None,
        }
    }

    pub fn as_keyed(&self) -> Option<&KeyedFeatures> {
        match self {
            DecodedFeatures::Keyed(k) => Some(k),
            DecodedFeatures::Dense(_) => None,
        }
    }
}

/// Decodes feature batches in the configured mode
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureAssembler {
    mode: DecodeMode,
}

impl FeatureAssembler {
    pub fn new(mode: DecodeMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    pub fn assemble(&self, batch: &FeatureBatch) -> Result<DecodedFeatures> {
        match self.mode {
            DecodeMode::Dense => Self::dense(batch).map(DecodedFeatures::Dense),
            DecodeMode::Keyed => Ok(DecodedFeatures::Keyed(Self::keyed(batch))),
        }
    }

    /// Per-family offsets and widths of the dense vector
    pub fn layout(batch: &FeatureBatch) -> Result<Vec<FamilySpan>> {
        let mut offset = 0;
        let mut layout = Vec::with_capacity(FeatureFamily::ALL.len());
        for (family, array) in batch.iter() {
            // a zero-row family without a declared width decodes to nothing
            let width = if batch.is_empty() && array.cols() == 0 {
                0
            } else {
                family
                    .transform()
                    .output_width(array.cols())
                    .map_err(|e| e.within(family))?
            };
            layout.push(FamilySpan { family, offset, width });
            offset += width;
        }
        Ok(layout)
    }

    /// Decode every family of every row into one float32 matrix.
    ///
    /// Rows are decoded in parallel; the first failing row aborts the call
    /// and no partial matrix is returned.
    pub fn dense(batch: &FeatureBatch) -> Result<DenseFeatures> {
        let layout = Self::layout(batch)?;
        let width = layout.last().map_or(0, |s| s.offset + s.width);
        let rows = batch.rows();

        let mut data = vec![0.0f32; rows * width];
        if width > 0 {
            data.par_chunks_mut(width)
                .enumerate()
                .try_for_each(|(i, out)| {
                    for span in &layout {
                        let window = &mut out[span.offset..span.offset + span.width];
                        decode_row(batch.get(span.family), span.family, i, window)?;
                    }
                    Ok::<(), Error>(())
                })?;
        }

        debug!(rows, width, "assembled dense features");
        Ok(DenseFeatures {
            layout,
            features: Matrix::new(data, rows, width)?,
        })
    }

    /// Raw typed arrays in table order, no transform applied
    pub fn keyed(batch: &FeatureBatch) -> KeyedFeatures {
        debug!(rows = batch.rows(), "assembled keyed features");
        KeyedFeatures {
            entries: batch.iter().map(|(f, a)| (f, a.clone())).collect(),
        }
    }
}

fn decode_row(array: &FeatureArray, family: FeatureFamily, i: usize, out: &mut [f32]) -> Result<()> {
    let transform = family.transform();
    let decoded = match array {
        FeatureArray::Int8(m) => transform.apply(m.row(i), out),
        FeatureArray::Int16(m) => transform.apply(m.row(i), out),
        FeatureArray::Int32(m) => transform.apply(m.row(i), out),
    };
    decoded.map_err(|e| e.within(format_args!("{family} row {i}")))
}
