//! # evidx Similarity
//!
//! Pairwise agreement matrices over decoded sentence features.
//!
//! ## Features
//!
//! - **Similarity Engine**: `Y[i][j] = mean(X[i] == X[j])` over bits or hash
//!   slots, upper triangle only, SIMD equality counting, rayon over row blocks
//! - **Cancellation**: optional token checked between row blocks
//! - **Selection**: keep the top-scored rows before the O(N^2) kernel
//! - **Report**: semantic + grammar/duplicate/biblio matrices for a batch
//!
//! ## Example
//!
//! ```rust
//! use evidx_codec::bits::expand_rows;
//! use evidx_core::Matrix;
//! use evidx_similarity::similarity_matrix;
//!
//! let packed = Matrix::from_rows(&[vec![-1i8], vec![0], vec![-1]]).unwrap();
//! let bits = expand_rows(&packed).unwrap();
//! let y = similarity_matrix(&bits);
//! assert_eq!(
//!     y.to_rows(),
//!     vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 0.0], vec![1.0, 0.0, 1.0]]
//! );
//! ```
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  RawBatch   │────>│  Selection  │────>│   Engine    │
//! │ (scores,    │     │ (top-K by   │     │ (N x N per  │
//! │  families)  │     │  score)     │     │  family)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```

pub mod engine;
pub mod report;
pub mod selection;

pub use engine::{similarity_matrix, EngineConfig, SimilarityEngine, SimilarityMatrix};
pub use report::SimilarityReport;
pub use selection::{select_top, Selection, DEFAULT_SIMILARITY_LIMIT};
