//! # evidx Codec
//!
//! Decoders for the compact, quantized feature encodings stored per
//! sentence example.
//!
//! ## Features
//!
//! - **Bit Expander**: packed semantic hashes to bit vectors
//! - **Ratio Normalizer**: counts to fractions (first-column or row-sum divisor)
//! - **Log Compressor**: `ln(x + 1)` for sequence lengths
//! - **Scaled-Float Mapper**: quantized detector scores back to [0, 1]
//! - **Assembler**: dense float vectors or keyed raw arrays for a whole batch
//!
//! ## Example
//!
//! ```rust
//! use evidx_codec::{bits::expand_bits, ratio::{divide_by_first, divide_by_sum}};
//!
//! assert_eq!(expand_bits(&[-1]), vec![true; 8]);
//! assert_eq!(divide_by_first(&[0i8, 5, 10]).unwrap(), vec![5.0, 10.0]);
//! assert_eq!(divide_by_sum(&[1i8, 1, 2]), vec![0.25, 0.25, 0.5]);
//! ```
//!
//! ## Family table
//!
//! ```text
//! family       type   transform          width
//! semantic     int8   bit expand         8k
//! pos          int8   divide by first    k-1
//! morphfeats   int8   divide by first    k-1
//! syntax       int8   divide by sum      k
//! phonetic     int16  divide by first    k-1
//! charfreq     int16  divide by first    k-1
//! bigramfreq   int16  divide by first    k-1
//! wordfreq     int8   divide by first    k-1
//! morphamb     int8   divide by first    k-1
//! txtlen       int16  log compress       k
//! dialect      int8   scaled float       k
//! emoji        int8   divide by first    k-1
//! ```

pub mod assembler;
pub mod batch;
pub mod bits;
pub mod family;
pub mod logscale;
pub mod ratio;
pub mod scaled;
pub mod transform;

pub use assembler::{DecodeMode, DecodedFeatures, DenseFeatures, FamilySpan, FeatureAssembler, KeyedFeatures};
pub use batch::{FeatureArray, FeatureBatch, InputWidths, RawBatch};
pub use family::{FeatureFamily, HashFamily};
pub use transform::Transform;
