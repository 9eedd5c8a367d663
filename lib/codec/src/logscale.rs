//! Log Compressor: `ln(x + 1)` for length-like counts.

use crate::ratio::check_width;
use evidx_core::{Element, Error, Result};

/// Elementwise `ln(x + 1)`. Negative counts are rejected.
pub fn log_compress<T: Element>(row: &[T]) -> Result<Vec<f32>> {
    let mut out = vec![0.0; row.len()];
    log_compress_into(row, &mut out)?;
    Ok(out)
}

pub fn log_compress_into<T: Element>(row: &[T], out: &mut [f32]) -> Result<()> {
    check_width("log compress", row.len(), out.len())?;

    for (index, (slot, value)) in out.iter_mut().zip(row).enumerate() {
        let value = value.to_i64();
        if value < 0 {
            return Err(Error::Domain {
                context: "log compress of a negative count".to_string(),
                index,
                value,
            });
        }
        *slot = (value as f64).ln_1p() as f32;
    }
    Ok(())
}
