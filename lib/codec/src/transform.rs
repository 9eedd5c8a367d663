use crate::bits::write_byte_bits;
use crate::logscale::log_compress_into;
use crate::ratio::{check_width, divide_by_first_into, divide_by_sum_into};
use crate::scaled::scaled_floats_into;
use evidx_core::{Element, ElementType, Error, Result};
use serde::{Deserialize, Serialize};

/// Decoding policy applied to every row of a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Packed bytes to bits, 8x width
    BitExpand,
    /// Columns 1.. over column 0, width - 1
    DivideByFirst,
    /// Every column over the row sum, same width
    DivideBySum,
    /// `ln(x + 1)`, same width
    LogCompress,
    /// Reversed byte-to-unit-interval mapping, same width
    ScaledFloat,
}

impl Transform {
    /// Decoded width for an input row of `cols` elements
    pub fn output_width(self, cols: usize) -> Result<usize> {
        match self {
            Transform::BitExpand => Ok(cols * 8),
            Transform::DivideByFirst => cols.checked_sub(1).ok_or_else(|| Error::ShapeMismatch {
                context: "divide by first column needs a denominator column".to_string(),
                expected: 1,
                actual: 0,
            }),
            Transform::DivideBySum | Transform::LogCompress | Transform::ScaledFloat => Ok(cols),
        }
    }

    /// Decode one row into `out`, which must be exactly `output_width` long.
    pub fn apply<T: Element>(self, row: &[T], out: &mut [f32]) -> Result<()> {
        match self {
            Transform::BitExpand => {
                if T::TYPE != ElementType::Int8 {
                    return Err(Error::ElementTypeMismatch {
                        context: "bit expansion".to_string(),
                        expected: ElementType::Int8,
                        actual: T::TYPE,
                    });
                }
                check_width("bit expansion", row.len() * 8, out.len())?;
                for (byte, window) in row.iter().zip(out.chunks_exact_mut(8)) {
                    // two's complement byte read as unsigned
                    write_byte_bits(byte.to_i64() as u8, window);
                }
                Ok(())
            }
            Transform::DivideByFirst => divide_by_first_into(row, out),
            Transform::DivideBySum => divide_by_sum_into(row, out),
            Transform::LogCompress => log_compress_into(row, out),
            Transform::ScaledFloat => scaled_floats_into(row, out),
        }
    }
}
