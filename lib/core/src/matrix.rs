use crate::{Element, Error, Result};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A dense row-major matrix with a fixed row width
///
/// Every row has exactly `cols` elements. A matrix with zero rows still
/// remembers its width, so downstream widths stay independent of N.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Copy> Matrix<T> {
    pub fn new(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        let expected = rows * cols;
        if data.len() != expected {
            return Err(Error::ShapeMismatch {
                context: format!("{rows}x{cols} matrix buffer"),
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Zero-row matrix of the given width
    #[inline]
    #[must_use]
    pub fn empty(cols: usize) -> Self {
        Self {
            data: Vec::new(),
            rows: 0,
            cols,
        }
    }

    #[must_use]
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Stack rows, taking the width from the first one.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        Self::from_rows_exact(rows, cols)
    }

    /// Stack rows that must all have exactly `cols` elements.
    pub fn from_rows_exact<R: AsRef<[T]>>(rows: &[R], cols: usize) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::ShapeMismatch {
                    context: format!("row {i} width"),
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Row `i`. Panics when `i >= rows()`, like slice indexing.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        assert!(i < self.rows, "row {i} out of bounds for {} rows", self.rows);
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.row(i)[j]
    }

    pub fn iter_rows(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// Gather rows by index, in the order given (repeats allowed).
    pub fn select_rows(&self, indices: &[usize]) -> Result<Self> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            if i >= self.rows {
                return Err(Error::ShapeMismatch {
                    context: "row index".to_string(),
                    expected: self.rows,
                    actual: i,
                });
            }
            data.extend_from_slice(self.row(i));
        }
        Ok(Self {
            data,
            rows: indices.len(),
            cols: self.cols,
        })
    }

    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.iter_rows().map(<[T]>::to_vec).collect()
    }

    /// Elementwise map, keeping the shape
    #[must_use]
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Matrix<U> {
        Matrix {
            data: self.data.iter().map(|&x| f(x)).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl<T: Element> Matrix<T> {
    /// Build a typed matrix from wide caller integers.
    ///
    /// Every value is narrowed with a range check; ragged rows and
    /// out-of-range values both fail before anything is returned.
    pub fn from_i64_rows(rows: &[Vec<i64>], cols: Option<usize>) -> Result<Self> {
        let cols = cols.unwrap_or_else(|| rows.first().map_or(0, Vec::len));
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::ShapeMismatch {
                    context: format!("row {i} width"),
                    expected: cols,
                    actual: row.len(),
                });
            }
            for (j, &value) in row.iter().enumerate() {
                let narrowed = T::from_i64(value).ok_or_else(|| Error::Domain {
                    context: format!("row {i} as {}", T::TYPE),
                    index: j,
                    value,
                })?;
                data.push(narrowed);
            }
        }
        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }
}

impl<T: Copy + Serialize> Serialize for Matrix<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows))?;
        for row in self.iter_rows() {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_shape() {
        let m = Matrix::from_rows(&[vec![1i8, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.row(1), &[4, 5, 6]);
        assert_eq!(m.get(0, 2), 3);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Matrix::from_rows(&[vec![1i8, 2], vec![3]]).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn test_empty_keeps_width() {
        let m: Matrix<f32> = Matrix::empty(7);
        assert!(m.is_empty());
        assert_eq!(m.cols(), 7);
        assert_eq!(m.iter_rows().count(), 0);
    }

    #[test]
    fn test_from_i64_rows_checks_range() {
        let ok = Matrix::<i8>::from_i64_rows(&[vec![-128, 127]], None).unwrap();
        assert_eq!(ok.row(0), &[-128, 127]);

        let err = Matrix::<i8>::from_i64_rows(&[vec![0, 200]], None).unwrap_err();
        assert!(matches!(err, Error::Domain { index: 1, value: 200, .. }));
    }

    #[test]
    fn test_from_i64_rows_with_declared_width() {
        let m = Matrix::<i16>::from_i64_rows(&[], Some(4)).unwrap();
        assert_eq!(m.rows(), 0);
        assert_eq!(m.cols(), 4);

        assert!(Matrix::<i16>::from_i64_rows(&[vec![1, 2]], Some(4)).is_err());
    }

    #[test]
    fn test_select_rows() {
        let m = Matrix::from_rows(&[vec![1i32], vec![2], vec![3]]).unwrap();
        let picked = m.select_rows(&[2, 0]).unwrap();
        assert_eq!(picked.to_rows(), vec![vec![3], vec![1]]);
        assert!(m.select_rows(&[3]).is_err());
    }

    #[test]
    fn test_zero_width_rows() {
        let m = Matrix::<bool>::new(Vec::new(), 3, 0).unwrap();
        assert_eq!(m.iter_rows().count(), 3);
        assert!(m.row(2).is_empty());
    }

    #[test]
    fn test_serializes_as_nested_rows() {
        let m = Matrix::from_rows(&[vec![1i16, 2], vec![3, 4]]).unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "[[1,2],[3,4]]");
    }
}
