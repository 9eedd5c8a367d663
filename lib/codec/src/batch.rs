//! Raw and typed feature batches
//!
//! A [`RawBatch`] is what the storage layer hands over: one list of wide
//! integer rows per family, plus optional hash arrays and a score per row.
//! [`FeatureBatch`] is the validated, typed form the assembler works on.

use crate::family::{FeatureFamily, HashFamily};
use evidx_core::{ElementType, Error, Matrix, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-supplied rows, keyed by family name (upstream column names are
/// accepted as aliases). Missing families deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBatch {
    /// External row ids, optional
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,

    #[serde(default, alias = "feats1")]
    pub semantic: Vec<Vec<i64>>,
    #[serde(default, alias = "feats2")]
    pub pos: Vec<Vec<i64>>,
    #[serde(default, alias = "feats3")]
    pub morphfeats: Vec<Vec<i64>>,
    #[serde(default, alias = "feats4")]
    pub syntax: Vec<Vec<i64>>,
    #[serde(default, alias = "feats5")]
    pub phonetic: Vec<Vec<i64>>,
    #[serde(default, alias = "feats6")]
    pub charfreq: Vec<Vec<i64>>,
    #[serde(default, alias = "feats7")]
    pub bigramfreq: Vec<Vec<i64>>,
    #[serde(default, alias = "feats8")]
    pub wordfreq: Vec<Vec<i64>>,
    #[serde(default, alias = "feats9")]
    pub morphamb: Vec<Vec<i64>>,
    #[serde(default, alias = "feats12")]
    pub txtlen: Vec<Vec<i64>>,
    #[serde(default, alias = "feats13")]
    pub dialect: Vec<Vec<i64>>,
    #[serde(default, alias = "feats14")]
    pub emoji: Vec<Vec<i64>>,

    #[serde(default, alias = "hashes15", skip_serializing_if = "Option::is_none")]
    pub grammar: Option<Vec<Vec<i64>>>,
    #[serde(default, alias = "hashes16", skip_serializing_if = "Option::is_none")]
    pub duplicate: Option<Vec<Vec<i64>>>,
    #[serde(default, alias = "hashes18", skip_serializing_if = "Option::is_none")]
    pub biblio: Option<Vec<Vec<i64>>>,

    #[serde(default)]
    pub score: Vec<f32>,
}

impl RawBatch {
    /// Number of rows, taken from the semantic family
    #[inline]
    pub fn len(&self) -> usize {
        self.semantic.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.semantic.is_empty()
    }

    pub fn family(&self, family: FeatureFamily) -> &[Vec<i64>] {
        match family {
            FeatureFamily::Semantic => &self.semantic,
            FeatureFamily::Pos => &self.pos,
            FeatureFamily::MorphFeats => &self.morphfeats,
            FeatureFamily::Syntax => &self.syntax,
            FeatureFamily::Phonetic => &self.phonetic,
            FeatureFamily::CharFreq => &self.charfreq,
            FeatureFamily::BigramFreq => &self.bigramfreq,
            FeatureFamily::WordFreq => &self.wordfreq,
            FeatureFamily::MorphAmb => &self.morphamb,
            FeatureFamily::TxtLen => &self.txtlen,
            FeatureFamily::Dialect => &self.dialect,
            FeatureFamily::Emoji => &self.emoji,
        }
    }

    pub fn hashes(&self, hash: HashFamily) -> Option<&[Vec<i64>]> {
        match hash {
            HashFamily::Grammar => self.grammar.as_deref(),
            HashFamily::Duplicate => self.duplicate.as_deref(),
            HashFamily::Biblio => self.biblio.as_deref(),
        }
    }

    /// Typed int32 matrix for a hash family, if the batch carries it
    pub fn hash_matrix(&self, hash: HashFamily) -> Result<Option<Matrix<i32>>> {
        let Some(rows) = self.hashes(hash) else {
            return Ok(None);
        };
        check_row_count(hash.name(), self.len(), rows.len())?;
        Matrix::from_i64_rows(rows, None)
            .map(Some)
            .map_err(|e| e.within(hash))
    }
}

/// Raw family values cast to the family's declared width
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureArray {
    Int8(Matrix<i8>),
    Int16(Matrix<i16>),
    Int32(Matrix<i32>),
}

impl FeatureArray {
    /// Checked conversion; `cols` pins the width (needed for empty batches).
    pub fn from_i64_rows(element: ElementType, rows: &[Vec<i64>], cols: Option<usize>) -> Result<Self> {
        Ok(match element {
            ElementType::Int8 => FeatureArray::Int8(Matrix::from_i64_rows(rows, cols)?),
            ElementType::Int16 => FeatureArray::Int16(Matrix::from_i64_rows(rows, cols)?),
            ElementType::Int32 => FeatureArray::Int32(Matrix::from_i64_rows(rows, cols)?),
        })
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            FeatureArray::Int8(_) => ElementType::Int8,
            FeatureArray::Int16(_) => ElementType::Int16,
            FeatureArray::Int32(_) => ElementType::Int32,
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            FeatureArray::Int8(m) => m.rows(),
            FeatureArray::Int16(m) => m.rows(),
            FeatureArray::Int32(m) => m.rows(),
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            FeatureArray::Int8(m) => m.cols(),
            FeatureArray::Int16(m) => m.cols(),
            FeatureArray::Int32(m) => m.cols(),
        }
    }

    pub fn as_int8(&self) -> Option<&Matrix<i8>> {
        match self {
            FeatureArray::Int8(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_int16(&self) -> Option<&Matrix<i16>> {
        match self {
            FeatureArray::Int16(m) => Some(m),
            _ => None,
        }
    }
}

impl From<Matrix<i8>> for FeatureArray {
    fn from(m: Matrix<i8>) -> Self {
        FeatureArray::Int8(m)
    }
}

impl From<Matrix<i16>> for FeatureArray {
    fn from(m: Matrix<i16>) -> Self {
        FeatureArray::Int16(m)
    }
}

/// Expected input width per family
///
/// Optional. When present, every family's width is checked against it and
/// zero-row batches still produce the full dense width.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputWidths(BTreeMap<FeatureFamily, usize>);

impl InputWidths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, family: FeatureFamily, cols: usize) -> Self {
        self.0.insert(family, cols);
        self
    }

    pub fn get(&self, family: FeatureFamily) -> Option<usize> {
        self.0.get(&family).copied()
    }
}

/// Validated batch: all twelve families, declared element types, one row count
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBatch {
    arrays: Vec<FeatureArray>,
    rows: usize,
}

impl FeatureBatch {
    pub fn from_raw(raw: &RawBatch) -> Result<Self> {
        Self::from_raw_with_widths(raw, None)
    }

    pub fn from_raw_with_widths(raw: &RawBatch, widths: Option<&InputWidths>) -> Result<Self> {
        let rows = raw.len();
        let mut arrays = Vec::with_capacity(FeatureFamily::ALL.len());
        for family in FeatureFamily::ALL {
            let values = raw.family(family);
            check_row_count(family.name(), rows, values.len())?;
            let cols = widths.and_then(|w| w.get(family));
            let array = FeatureArray::from_i64_rows(family.element_type(), values, cols)
                .map_err(|e| e.within(family))?;
            arrays.push(array);
        }
        tracing::trace!(rows, "validated raw feature batch");
        Ok(Self { arrays, rows })
    }

    /// Build from already typed arrays; each family must appear exactly once.
    pub fn from_arrays(arrays: Vec<(FeatureFamily, FeatureArray)>) -> Result<Self> {
        let mut slots: Vec<Option<FeatureArray>> = vec![None; FeatureFamily::ALL.len()];
        for (family, array) in arrays {
            if array.element_type() != family.element_type() {
                return Err(Error::ElementTypeMismatch {
                    context: family.to_string(),
                    expected: family.element_type(),
                    actual: array.element_type(),
                });
            }
            if slots[family.index()].replace(array).is_some() {
                return Err(Error::InvalidConfig(format!("feature family '{family}' given twice")));
            }
        }

        let mut typed = Vec::with_capacity(slots.len());
        for (family, slot) in FeatureFamily::ALL.into_iter().zip(slots) {
            let array = slot.ok_or_else(|| {
                Error::InvalidConfig(format!("feature family '{family}' missing"))
            })?;
            typed.push(array);
        }

        let rows = typed[0].rows();
        for (family, array) in FeatureFamily::ALL.into_iter().zip(&typed) {
            check_row_count(family.name(), rows, array.rows())?;
        }
        Ok(Self { arrays: typed, rows })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[inline]
    pub fn get(&self, family: FeatureFamily) -> &FeatureArray {
        &self.arrays[family.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureFamily, &FeatureArray)> + '_ {
        FeatureFamily::ALL.into_iter().zip(self.arrays.iter())
    }
}

fn check_row_count(name: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::ShapeMismatch {
            context: format!("{name} row count"),
            expected,
            actual,
        });
    }
    Ok(())
}
