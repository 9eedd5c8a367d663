//! Fixed-width integer element types used by the feature encodings.
//!
//! Upstream stores every feature family as a list of small signed integers
//! whose width is fixed per family. Narrowing from the wide integers a
//! caller hands over is always checked; nothing wraps silently.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared storage width of a feature or hash family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Int8,
    Int16,
    Int32,
}

impl ElementType {
    #[inline]
    pub fn bits(self) -> u32 {
        match self {
            ElementType::Int8 => 8,
            ElementType::Int16 => 16,
            ElementType::Int32 => 32,
        }
    }

    #[inline]
    pub fn min_value(self) -> i64 {
        match self {
            ElementType::Int8 => i8::MIN as i64,
            ElementType::Int16 => i16::MIN as i64,
            ElementType::Int32 => i32::MIN as i64,
        }
    }

    #[inline]
    pub fn max_value(self) -> i64 {
        match self {
            ElementType::Int8 => i8::MAX as i64,
            ElementType::Int16 => i16::MAX as i64,
            ElementType::Int32 => i32::MAX as i64,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Int8 => "int8",
            ElementType::Int16 => "int16",
            ElementType::Int32 => "int32",
        };
        f.write_str(name)
    }
}

/// A signed integer type a family can be declared with
pub trait Element:
    Copy + PartialEq + fmt::Debug + Default + Send + Sync + Serialize + 'static
{
    const TYPE: ElementType;

    /// Checked narrowing; `None` when `value` does not fit.
    fn from_i64(value: i64) -> Option<Self>;

    fn to_i64(self) -> i64;

    #[inline]
    fn to_f64(self) -> f64 {
        self.to_i64() as f64
    }
}

impl Element for i8 {
    const TYPE: ElementType = ElementType::Int8;

    #[inline]
    fn from_i64(value: i64) -> Option<Self> {
        i8::try_from(value).ok()
    }

    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }
}

impl Element for i16 {
    const TYPE: ElementType = ElementType::Int16;

    #[inline]
    fn from_i64(value: i64) -> Option<Self> {
        i16::try_from(value).ok()
    }

    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }
}

impl Element for i32 {
    const TYPE: ElementType = ElementType::Int32;

    #[inline]
    fn from_i64(value: i64) -> Option<Self> {
        i32::try_from(value).ok()
    }

    #[inline]
    fn to_i64(self) -> i64 {
        self as i64
    }
}
