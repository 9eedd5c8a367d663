//! # evidx Core
//!
//! Core building blocks shared by the feature codec and the similarity
//! engine:
//!
//! - [`Matrix`] - row-major matrix with a fixed row width
//! - [`Element`] / [`ElementType`] - the int8/int16/int32 storage widths
//!   feature families are declared with
//! - [`Comparable`] - equality counting with SIMD fast paths
//! - [`CancelToken`] - cooperative cancellation with an optional deadline
//! - [`Error`] - the error taxonomy used across the workspace
//!
//! ## Example
//!
//! ```rust
//! use evidx_core::{Matrix, simd::agreement};
//!
//! let hashes = Matrix::<i32>::from_i64_rows(&[vec![7, 8, 9], vec![7, 0, 9]], None).unwrap();
//! let score = agreement(hashes.row(0), hashes.row(1));
//! assert!((score - 2.0 / 3.0).abs() < 1e-6);
//! ```

pub mod cancel;
pub mod element;
pub mod error;
pub mod matrix;

/// SIMD-optimized equality counting
///
/// Runtime-dispatched kernels:
/// - AVX2 / SSE2 on x86 and x86_64
/// - NEON on ARM64/Apple Silicon
pub mod simd;

pub use cancel::CancelToken;
pub use element::{Element, ElementType};
pub use error::{Error, Result};
pub use matrix::Matrix;
pub use simd::Comparable;
