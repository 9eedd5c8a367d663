//! Bit Expander
//!
//! Packed semantic hashes arrive as signed bytes. Each byte is read as
//! unsigned and expanded to eight bits, most significant bit first.

use evidx_core::{Matrix, Result};

/// The eight bits of `byte`, most significant first
#[inline]
pub fn unpack_byte(byte: u8) -> [bool; 8] {
    let mut bits = [false; 8];
    for (k, bit) in bits.iter_mut().enumerate() {
        *bit = (byte >> (7 - k)) & 1 == 1;
    }
    bits
}

/// Expand a row of packed bytes; output length is `8 * bytes.len()`.
pub fn expand_bits(bytes: &[i8]) -> Vec<bool> {
    let mut out = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        out.extend_from_slice(&unpack_byte(byte as u8));
    }
    out
}

/// Expand every row of a packed matrix into a boolean matrix
pub fn expand_rows(packed: &Matrix<i8>) -> Result<Matrix<bool>> {
    let cols = packed.cols() * 8;
    let data: Vec<bool> = packed
        .as_slice()
        .iter()
        .flat_map(|&byte| unpack_byte(byte as u8))
        .collect();
    Matrix::new(data, packed.rows(), cols)
}

/// Write the bits of `byte` as 0.0/1.0 into an 8-slot window
#[inline]
pub(crate) fn write_byte_bits(byte: u8, out: &mut [f32]) {
    for (slot, bit) in out.iter_mut().zip(unpack_byte(byte)) {
        *slot = if bit { 1.0 } else { 0.0 };
    }
}
