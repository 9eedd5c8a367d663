//! Ratio Normalizer
//!
//! Count vectors are stored as raw integers. Two policies turn them into
//! fractions: divide by the first column (which holds the total the other
//! columns were counted against), or divide by the row sum. Both clamp the
//! denominator to at least 1.

use evidx_core::{Element, Error, Result};

/// `row[1..] / max(row[0], 1)`; output width is `row.len() - 1`.
pub fn divide_by_first<T: Element>(row: &[T]) -> Result<Vec<f32>> {
    let mut out = vec![0.0; row.len().saturating_sub(1)];
    divide_by_first_into(row, &mut out)?;
    Ok(out)
}

pub fn divide_by_first_into<T: Element>(row: &[T], out: &mut [f32]) -> Result<()> {
    let Some((first, rest)) = row.split_first() else {
        return Err(Error::ShapeMismatch {
            context: "divide by first column needs a denominator column".to_string(),
            expected: 1,
            actual: 0,
        });
    };
    check_width("divide by first column", rest.len(), out.len())?;

    let denom = first.to_i64().max(1) as f64;
    for (slot, value) in out.iter_mut().zip(rest) {
        *slot = (value.to_f64() / denom) as f32;
    }
    Ok(())
}

/// `row / max(sum(row), 1)`; output width equals input width.
pub fn divide_by_sum<T: Element>(row: &[T]) -> Vec<f32> {
    let denom = sum_denominator(row);
    row.iter().map(|v| (v.to_f64() / denom) as f32).collect()
}

pub fn divide_by_sum_into<T: Element>(row: &[T], out: &mut [f32]) -> Result<()> {
    check_width("divide by row sum", row.len(), out.len())?;

    let denom = sum_denominator(row);
    for (slot, value) in out.iter_mut().zip(row) {
        *slot = (value.to_f64() / denom) as f32;
    }
    Ok(())
}

// summed in i64 so int8 rows cannot overflow
#[inline]
fn sum_denominator<T: Element>(row: &[T]) -> f64 {
    row.iter().map(|v| v.to_i64()).sum::<i64>().max(1) as f64
}

#[inline]
pub(crate) fn check_width(context: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::ShapeMismatch {
            context: format!("{context} output"),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_column_zero_clamps_to_one() {
        assert_eq!(divide_by_first(&[0i8, 5, 10]).unwrap(), vec![5.0, 10.0]);
    }

    #[test]
    fn test_first_column_divides() {
        assert_eq!(divide_by_first(&[4i16, 1, 2, 4]).unwrap(), vec![0.25, 0.5, 1.0]);
    }

    #[test]
    fn test_negative_first_column_clamps_to_one() {
        assert_eq!(divide_by_first(&[-3i8, 2]).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_first_column_only() {
        assert!(divide_by_first(&[7i8]).unwrap().is_empty());
    }

    #[test]
    fn test_empty_row_has_no_denominator() {
        assert!(matches!(
            divide_by_first::<i8>(&[]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_divide_by_sum() {
        let out = divide_by_sum(&[1i8, 1, 2]);
        assert_eq!(out, vec![0.25, 0.25, 0.5]);
        assert!((out.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_divide_by_sum_all_zero() {
        assert_eq!(divide_by_sum(&[0i8, 0, 0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_divide_by_sum_no_int8_overflow() {
        let row = [100i8, 100, 100, 100];
        assert_eq!(divide_by_sum(&row), vec![0.25; 4]);
    }

    #[test]
    fn test_output_width_checked() {
        let mut out = [0.0f32; 3];
        assert!(divide_by_first_into(&[1i8, 2], &mut out).is_err());
        assert!(divide_by_sum_into(&[1i8, 2], &mut out).is_err());
    }
}
