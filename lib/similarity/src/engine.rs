//! Similarity Engine
//!
//! For a row-aligned matrix `X` of N rows, builds the N x N matrix
//! `Y[i][j] = mean(X[i] == X[j])` with a unit diagonal. Only the upper
//! triangle is computed; each value is mirrored. Row blocks run on the
//! rayon pool once N reaches the configured threshold, and the optional
//! cancel token is checked between blocks.

use evidx_core::simd::agreement;
use evidx_core::{CancelToken, Comparable, Error, Matrix, Result};
use rayon::prelude::*;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde::Deserialize;
use tracing::{debug, trace};

/// Kernel execution settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Row count at which the kernel switches to the rayon pool
    pub parallel_threshold: usize,
    /// Rows per block between cancellation checks
    pub block_rows: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 64,
            block_rows: 256,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.block_rows == 0 {
            return Err(Error::InvalidConfig("block_rows must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Symmetric N x N agreement matrix with a unit diagonal
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f32>,
}

impl SimilarityMatrix {
    /// Identity matrix: every row agrees fully with itself
    pub fn identity(n: usize) -> Self {
        let mut data = vec![0.0f32; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self { n, data }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[i * self.n + j]
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        (0..self.n).map(|i| self.row(i).to_vec()).collect()
    }

    #[inline]
    fn set_pair(&mut self, i: usize, j: usize, value: f32) {
        self.data[i * self.n + j] = value;
        self.data[j * self.n + i] = value;
    }
}

impl Serialize for SimilarityMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.n))?;
        for i in 0..self.n {
            seq.serialize_element(self.row(i))?;
        }
        seq.end()
    }
}

/// Computes agreement matrices with a fixed execution strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityEngine {
    config: EngineConfig,
}

impl SimilarityEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Agreement matrix of `x` in one pass, without cancellation checks.
    pub fn compute<T: Comparable>(&self, x: &Matrix<T>) -> SimilarityMatrix {
        let n = x.rows();
        let mut out = SimilarityMatrix::identity(n);
        if n >= 2 {
            debug!(rows = n, width = x.cols(), parallel = self.is_parallel(n), "computing similarity matrix");
            self.fill_rows(x, &mut out, 0, n - 1);
        }
        out
    }

    pub fn compute_with_cancel<T: Comparable>(
        &self,
        x: &Matrix<T>,
        cancel: &CancelToken,
    ) -> Result<SimilarityMatrix> {
        self.run(x, Some(cancel))
    }

    /// Stack plain rows first; ragged rows are a shape error.
    pub fn compute_rows<T: Comparable, R: AsRef<[T]>>(&self, rows: &[R]) -> Result<SimilarityMatrix> {
        let x = Matrix::from_rows(rows)?;
        Ok(self.compute(&x))
    }

    /// Block-wise kernel; `cancel` is checked before every block.
    pub(crate) fn run<T: Comparable>(
        &self,
        x: &Matrix<T>,
        cancel: Option<&CancelToken>,
    ) -> Result<SimilarityMatrix> {
        match cancel {
            Some(token) => self.run_blocks(x, |_| token.check()),
            None => Ok(self.compute(x)),
        }
    }

    /// Fills the matrix block by block, calling `check` with the first row
    /// of each block before it runs.
    fn run_blocks<T: Comparable>(
        &self,
        x: &Matrix<T>,
        mut check: impl FnMut(usize) -> Result<()>,
    ) -> Result<SimilarityMatrix> {
        let n = x.rows();
        let mut out = SimilarityMatrix::identity(n);
        if n < 2 {
            return Ok(out);
        }

        let block = self.config.block_rows.max(1);
        debug!(rows = n, width = x.cols(), parallel = self.is_parallel(n), block, "computing similarity matrix");

        // the last row has nothing above the diagonal
        let mut start = 0;
        while start < n - 1 {
            if let Err(e) = check(start) {
                debug!(row = start, "similarity kernel interrupted");
                return Err(e);
            }
            let end = (start + block).min(n - 1);
            self.fill_rows(x, &mut out, start, end);
            trace!(start, end, "similarity block done");
            start = end;
        }

        Ok(out)
    }

    #[inline]
    fn is_parallel(&self, n: usize) -> bool {
        n >= self.config.parallel_threshold
    }

    /// Upper-triangle values for rows `start..end`, mirrored into `out`
    fn fill_rows<T: Comparable>(&self, x: &Matrix<T>, out: &mut SimilarityMatrix, start: usize, end: usize) {
        let upper: Vec<Vec<f32>> = if self.is_parallel(x.rows()) {
            (start..end).into_par_iter().map(|i| upper_row(x, i)).collect()
        } else {
            (start..end).map(|i| upper_row(x, i)).collect()
        };

        for (i, values) in (start..end).zip(upper) {
            for (offset, value) in values.into_iter().enumerate() {
                out.set_pair(i, i + 1 + offset, value);
            }
        }
    }
}

/// Agreement of row `i` with every later row
#[inline]
fn upper_row<T: Comparable>(x: &Matrix<T>, i: usize) -> Vec<f32> {
    let a = x.row(i);
    ((i + 1)..x.rows()).map(|j| agreement(a, x.row(j))).collect()
}

/// Agreement matrix with the default engine settings
pub fn similarity_matrix<T: Comparable>(x: &Matrix<T>) -> SimilarityMatrix {
    SimilarityEngine::default().compute(x)
}
