//! Dense byte matrix over `GF(2^8)`
//!
//! Backed by a contiguous row-major `Vec<u8>` rather than a jagged
//! `Vec<Vec<u8>>`, for cache locality on the hot inner loop that both
//! encoding and recovery run through.

use super::gf;
use crate::error::{Error, Result};

/// A dense `rows x cols` matrix of `GF(2^8)` elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl Matrix {
    /// Zero-filled `rows x cols` matrix. Fails if either dimension is `0`.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::BadDimensions { rows, cols });
        }
        Ok(Matrix {
            rows,
            cols,
            data: vec![0u8; rows * cols],
        })
    }

    /// A Vandermonde matrix: element `(i, j)` is `i^j`. Column `0` is
    /// always `1` (including row `0`, by the `0^0 = 1` convention), which
    /// `gf::exp_pow` does not give directly since it treats a zero base
    /// as always yielding `0`; column `0` is special-cased here instead
    /// of patching that short-circuit in the shared field helper. Fails
    /// if either dimension is `0`.
    pub fn vandermonde(rows: usize, cols: usize) -> Result<Self> {
        let mut m = Matrix::new(rows, cols)?;
        for i in 0..rows {
            for j in 0..cols {
                let value = if j == 0 {
                    1
                } else {
                    gf::exp_pow(i as u8, j as u32)
                };
                m.set(i, j, value);
            }
        }
        Ok(m)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.cols + col] = value;
    }

    fn row_slice(&self, row: usize) -> &[u8] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Half-open window `[r0, r1) x [c0, c1)`. Fails if the window falls
    /// outside the parent matrix.
    pub fn submatrix(&self, r0: usize, c0: usize, r1: usize, c1: usize) -> Result<Matrix> {
        if r1 > self.rows || c1 > self.cols || r0 >= r1 || c0 >= c1 {
            return Err(Error::SubMatrixOutOfBounds {
                r0,
                c0,
                r1,
                c1,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let mut out = Matrix::new(r1 - r0, c1 - c0)?;
        for i in r0..r1 {
            for j in c0..c1 {
                out.set(i - r0, j - c0, self.get(i, j));
            }
        }
        Ok(out)
    }

    /// Sub-matrix built by selecting an arbitrary (possibly non-contiguous,
    /// possibly reordered) set of rows, keeping every column.
    pub fn select_rows(&self, rows: &[usize]) -> Matrix {
        let mut out = Matrix::new(rows.len(), self.cols).expect("non-zero dims by construction");
        for (out_row, &src_row) in rows.iter().enumerate() {
            out.data[out_row * self.cols..(out_row + 1) * self.cols]
                .copy_from_slice(self.row_slice(src_row));
        }
        out
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.cols {
            self.data.swap(a * self.cols + col, b * self.cols + col);
        }
    }

    /// Swaps two columns in place. Used by [`crate::ec::encoding::checksum_matrix`]
    /// to bring a non-zero pivot into position during column elimination.
    pub fn swap_columns(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for row in 0..self.rows {
            let ia = row * self.cols + a;
            let ib = row * self.cols + b;
            self.data.swap(ia, ib);
        }
    }

    /// Standard row x column product in `GF(2^8)`. Fails if
    /// `self.cols != rhs.rows`.
    pub fn multiply(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(Error::ShapeMismatch {
                lhs_rows: self.rows,
                lhs_cols: self.cols,
                rhs_rows: rhs.rows,
                rhs_cols: rhs.cols,
            });
        }
        let mut out = Matrix::new(self.rows, rhs.cols)?;
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a == 0 {
                    continue;
                }
                for j in 0..rhs.cols {
                    let product = gf::mul(a, rhs.get(k, j));
                    let acc = out.get(i, j);
                    out.set(i, j, gf::add(acc, product));
                }
            }
        }
        Ok(out)
    }

    /// Multiplies this matrix by a "shard vector": `shards[k]` is an
    /// equal-length byte string for each `k` in `[0, self.cols)`. Output
    /// row `i` is the byte-wise XOR of `mul(self[i][k], shards[k])` over
    /// `k`. This is how one matrix application encodes (or decodes) an
    /// entire file in a single pass instead of per-byte.
    pub fn multiply_shards(&self, shards: &[Vec<u8>]) -> Result<Vec<Vec<u8>>> {
        if shards.len() != self.cols {
            return Err(Error::ShapeMismatch {
                lhs_rows: self.rows,
                lhs_cols: self.cols,
                rhs_rows: shards.len(),
                rhs_cols: 1,
            });
        }
        let shard_len = shards.first().map(Vec::len).unwrap_or(0);

        let mut out = vec![vec![0u8; shard_len]; self.rows];
        for i in 0..self.rows {
            for k in 0..self.cols {
                let coeff = self.get(i, k);
                if coeff == 0 {
                    continue;
                }
                let src = &shards[k];
                let dst = &mut out[i];
                for (d, &s) in dst.iter_mut().zip(src.iter()) {
                    *d = gf::add(*d, gf::mul(coeff, s));
                }
            }
        }
        Ok(out)
    }

    /// Gauss-Jordan elimination in `GF(2^8)` on the augmented `[self | I]`
    /// matrix, returning the right half. Fails with
    /// [`Error::SingularMatrix`] when a pivot column has no non-zero
    /// entry in or below the current row.
    pub fn invert(&self) -> Result<Matrix> {
        if self.rows != self.cols {
            return Err(Error::ShapeMismatch {
                lhs_rows: self.rows,
                lhs_cols: self.cols,
                rhs_rows: self.cols,
                rhs_cols: self.cols,
            });
        }
        let n = self.rows;

        // augmented = [self | I], width 2n
        let mut aug = Matrix::new(n, 2 * n)?;
        for i in 0..n {
            for j in 0..n {
                aug.set(i, j, self.get(i, j));
            }
            aug.set(i, n + i, 1);
        }

        for col in 0..n {
            if aug.get(col, col) == 0 {
                let pivot_row = (col + 1..n).find(|&r| aug.get(r, col) != 0);
                match pivot_row {
                    Some(r) => aug.swap_rows(col, r),
                    None => return Err(Error::SingularMatrix { col }),
                }
            }

            let pivot = aug.get(col, col);
            let pivot_inv = gf::inv(pivot);
            for j in 0..2 * n {
                let v = aug.get(col, j);
                aug.set(col, j, gf::mul(v, pivot_inv));
            }

            for row in 0..n {
                if row == col {
                    continue;
                }
                let factor = aug.get(row, col);
                if factor == 0 {
                    continue;
                }
                for j in 0..2 * n {
                    let sub = gf::mul(factor, aug.get(col, j));
                    let v = aug.get(row, j);
                    aug.set(row, j, gf::add(v, sub));
                }
            }
        }

        aug.submatrix(0, n, n, 2 * n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(Matrix::new(0, 3).is_err());
        assert!(Matrix::new(3, 0).is_err());
    }

    #[test]
    fn vandermonde_first_row_is_one_zero_zero() {
        let v = Matrix::vandermonde(4, 3).unwrap();
        assert_eq!(v.get(0, 0), 1);
        assert_eq!(v.get(0, 1), 0);
        assert_eq!(v.get(0, 2), 0);
    }

    #[test]
    fn submatrix_out_of_bounds_fails() {
        let m = Matrix::new(3, 3).unwrap();
        assert!(m.submatrix(0, 0, 4, 3).is_err());
        assert!(m.submatrix(2, 0, 1, 3).is_err());
    }

    #[test]
    fn multiply_shape_mismatch_fails() {
        let a = Matrix::new(2, 3).unwrap();
        let b = Matrix::new(2, 2).unwrap();
        assert!(a.multiply(&b).is_err());
    }

    #[test]
    fn multiply_identity_is_noop() {
        let mut id = Matrix::new(3, 3).unwrap();
        for i in 0..3 {
            id.set(i, i, 1);
        }
        let v = Matrix::vandermonde(3, 3).unwrap();
        let product = id.multiply(&v).unwrap();
        assert_eq!(product, v);
    }

    #[test]
    fn invert_identity_is_identity() {
        let mut id = Matrix::new(3, 3).unwrap();
        for i in 0..3 {
            id.set(i, i, 1);
        }
        let inv = id.invert().unwrap();
        assert_eq!(inv, id);
    }

    #[test]
    fn invert_roundtrips() {
        let v = Matrix::vandermonde(4, 4).unwrap();
        let inv = v.invert().unwrap();
        let product = v.multiply(&inv).unwrap();
        let mut id = Matrix::new(4, 4).unwrap();
        for i in 0..4 {
            id.set(i, i, 1);
        }
        assert_eq!(product, id);
    }

    #[test]
    fn invert_singular_fails() {
        // two identical rows is singular
        let mut m = Matrix::new(2, 2).unwrap();
        m.set(0, 0, 1);
        m.set(0, 1, 2);
        m.set(1, 0, 1);
        m.set(1, 1, 2);
        assert!(m.invert().is_err());
    }

    #[test]
    fn multiply_shards_broadcasts_across_bytes() {
        let mut m = Matrix::new(1, 2).unwrap();
        m.set(0, 0, 1);
        m.set(0, 1, 1);
        let shards = vec![vec![1u8, 2, 3], vec![4u8, 5, 6]];
        let out = m.multiply_shards(&shards).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0], vec![1 ^ 4, 2 ^ 5, 3 ^ 6]);
    }

    #[test]
    fn select_rows_picks_requested_rows_in_order() {
        let v = Matrix::vandermonde(5, 3).unwrap();
        let chosen = v.select_rows(&[3, 0, 4]);
        assert_eq!(chosen.rows(), 3);
        for j in 0..3 {
            assert_eq!(chosen.get(0, j), v.get(3, j));
            assert_eq!(chosen.get(1, j), v.get(0, j));
            assert_eq!(chosen.get(2, j), v.get(4, j));
        }
    }
}
