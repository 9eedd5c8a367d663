//! Scaled-Float Mapper
//!
//! Classifier confidences (e.g. language detector scores) are quantized
//! into one signed byte each. Decoding maps the byte range onto [0, 1] with
//! the orientation reversed: -128 decodes to 1.0, 127 to 0.0.
//!
//! Saturation only applies to wide callers of [`scaled_float`]. Batch input
//! for the dialect family is narrowed to int8 first, so a value such as 200
//! is a `Domain` error there and never reaches the clamp.

use crate::ratio::check_width;
use evidx_core::{Element, Result};

/// Decode one quantized score. Values outside the byte range saturate.
#[inline]
pub fn scaled_float(value: i64) -> f32 {
    let v = value.clamp(-128, 127) as f64;
    (1.0 - (v + 128.0) / 255.0) as f32
}

pub fn scaled_floats<T: Element>(row: &[T]) -> Vec<f32> {
    row.iter().map(|v| scaled_float(v.to_i64())).collect()
}

pub fn scaled_floats_into<T: Element>(row: &[T], out: &mut [f32]) -> Result<()> {
    check_width("scaled float", row.len(), out.len())?;
    for (slot, value) in out.iter_mut().zip(row) {
        *slot = scaled_float(value.to_i64());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_ends() {
        assert_eq!(scaled_float(-128), 1.0);
        assert_eq!(scaled_float(127), 0.0);
        assert!((scaled_float(126) - 1.0 / 255.0).abs() < 1e-7);
    }

    #[test]
    fn test_out_of_range_saturates() {
        assert_eq!(scaled_float(200), scaled_float(127));
        assert_eq!(scaled_float(-1000), scaled_float(-128));
    }

    #[test]
    fn test_reversed_orientation() {
        let out = scaled_floats(&[-128i8, -1, 0, 127]);
        assert!(out.windows(2).all(|w| w[0] > w[1]));
        assert!(out.iter().all(|x| (0.0..=1.0).contains(x)));
    }

    #[test]
    fn test_into_checks_width() {
        let mut out = [0.0f32; 1];
        assert!(scaled_floats_into(&[0i8, 1], &mut out).is_err());
    }
}
