//! Encoding matrix construction
//!
//! Builds the systematic `(d+c) x d` encoding matrix `E` whose top `d`
//! rows are the identity and whose bottom `c` rows are parity
//! coefficients, such that any `d` of the `d+c` rows form an invertible
//! `d x d` sub-matrix (the MDS property).

use super::gf;
use super::matrix::Matrix;
use crate::error::Result;

/// General-case checksum matrix for `d` data shards and `c` parity
/// shards. Has the property that the first `d` rows are the identity
/// matrix and it remains invertible if any `c` rows are removed.
///
/// Builds a Vandermonde matrix, then runs column-wise Gauss-Jordan
/// elimination on it directly until the top `d x d` block is the
/// identity: for each pivot column `i`, swap in a column with a
/// non-zero entry at row `i` if needed, normalize that column, then
/// cancel it out of every other column in `[0, d)`.
pub fn checksum_matrix(d: usize, c: usize) -> Result<Matrix> {
    let mut m = Matrix::vandermonde(d + c, d)?;

    for i in 0..d {
        if m.get(i, i) == 0 {
            for j in i + 1..d {
                if m.get(i, j) != 0 {
                    m.swap_columns(i, j);
                    break;
                }
            }
        }

        let pivot_inv = gf::inv(m.get(i, i));
        for row in 0..d + c {
            let v = m.get(row, i);
            m.set(row, i, gf::mul(v, pivot_inv));
        }

        for j in 0..d {
            if j == i || m.get(i, j) == 0 {
                continue;
            }
            let factor = m.get(i, j);
            for row in 0..d + c {
                let pivot_col_val = m.get(row, i);
                let v = m.get(row, j);
                m.set(row, j, gf::add(v, gf::mul(pivot_col_val, factor)));
            }
        }
    }

    Ok(m)
}

/// Same contract as [`checksum_matrix`], built by inverting the top
/// `d x d` block of the Vandermonde matrix instead of running column
/// elimination directly. Column operations on a Vandermonde matrix
/// correspond to right-multiplication by an invertible matrix, and the
/// choice that makes the top block the identity is exactly that block's
/// inverse. Kept alongside [`checksum_matrix`] as an independently
/// derived cross-check; tests assert the two agree for the same `(d, c)`.
pub fn checksum_matrix_with_inv(d: usize, c: usize) -> Result<Matrix> {
    let v = Matrix::vandermonde(d + c, d)?;
    let top = v.submatrix(0, 0, d, d)?;
    let transform = top.invert()?;
    v.multiply(&transform)
}

/// The classic Linux RAID-6 `(8 x 6)` checksum matrix for `d=6, c=2`:
///
/// ```text
/// 1  0  0  0  0  0
/// 0  1  0  0  0  0
/// 0  0  1  0  0  0
/// 0  0  0  1  0  0
/// 0  0  0  0  1  0
/// 0  0  0  0  0  1
/// 1  1  1  1  1  1    <- P parity row
/// 32 16 8  4  2  1    <- Q parity row
/// ```
pub fn checksum_matrix_classic() -> Result<Matrix> {
    let d = 6;
    let c = 2;
    let mut m = Matrix::new(d + c, d)?;

    for i in 0..d {
        m.set(i, i, 1);
    }
    for j in 0..d {
        m.set(d, j, 1);
    }
    for j in 0..d {
        m.set(d + 1, j, gf::exp_pow(2, (d - 1 - j) as u32));
    }

    Ok(m)
}
