//! GF(2^8) field arithmetic
//!
//! Every byte is an element of the field with 256 elements, reduced by
//! the standard Reed-Solomon polynomial `x^8 + x^4 + x^3 + x^2 + 1`
//! (`0x1D`) with primitive element `2`. Addition is `XOR`; multiplication,
//! division, inversion and exponentiation go through 256-entry `log`/`exp`
//! tables built once and shared process-wide, so the hot encode/decode
//! loop never branches or shifts.

use once_cell::sync::Lazy;

/// Reducing polynomial for this field, `x^8 + x^4 + x^3 + x^2 + 1`.
const POLY: u16 = 0x1D;

/// Precomputed `exp`/`log` tables, built once on first use.
static TABLES: Lazy<Tables> = Lazy::new(Tables::build);

struct Tables {
    /// `exp[i] = 2^i` in the field, for `i` in `0..256`. `exp[255]` wraps
    /// back to `exp[0]` so that `(log[a] + log[b]) % 255` never needs an
    /// extra bounds check.
    exp: [u8; 256],
    /// `log[x]` is the `i` such that `exp[i] == x`, for `x` in `1..256`.
    /// `log[0]` is unused (zero has no logarithm) and left as `0`.
    log: [u8; 256],
}

impl Tables {
    fn build() -> Self {
        let mut exp = [0u8; 256];
        let mut log = [0u8; 256];

        let mut x: u8 = 1;
        for i in 0..255usize {
            exp[i] = x;
            log[x as usize] = i as u8;
            x = mul_slow(x, 2);
        }
        exp[255] = exp[0];

        Tables { exp, log }
    }
}

/// Peasant multiplication in `GF(2^8)`, used only to bootstrap the
/// `exp`/`log` tables; the public `mul` below never calls this.
fn mul_slow(a: u8, mut b: u8) -> u8 {
    let mut result: u16 = 0;
    let mut a = a as u16;
    while b != 0 {
        if b & 1 != 0 {
            result ^= a;
        }
        let carry = a & 0x80 != 0;
        a <<= 1;
        if carry {
            a ^= POLY;
        }
        a &= 0xFF;
        b >>= 1;
    }
    result as u8
}

/// `a + b` in `GF(2^8)`. Addition (and subtraction) is `XOR`.
#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// `a * b` in `GF(2^8)` via the log/exp tables.
#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = &*TABLES;
    let sum = t.log[a as usize] as u16 + t.log[b as usize] as u16;
    t.exp[(sum % 255) as usize]
}

/// `a / b` in `GF(2^8)`. Fails with [`crate::error::Error::DivisionByZero`]
/// when `b == 0`.
pub fn div(a: u8, b: u8) -> crate::error::Result<u8> {
    if b == 0 {
        return Err(crate::error::Error::DivisionByZero);
    }
    if a == 0 {
        return Ok(0);
    }
    let t = &*TABLES;
    let la = t.log[a as usize] as i32;
    let lb = t.log[b as usize] as i32;
    Ok(t.exp[((la - lb + 255) % 255) as usize])
}

/// Multiplicative inverse of `a` in `GF(2^8)`. `inv(0) == 0` by convention
/// (zero has no inverse, but callers rely on this short-circuit rather
/// than a fallible signature).
#[inline]
pub fn inv(a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let t = &*TABLES;
    t.exp[(255 - t.log[a as usize] as u16) as usize]
}

/// `base^k` in `GF(2^8)`. `exp_pow(0, k) == 0` for any `k` (including
/// `k == 0`); this is the `0^0 = 1` convention's short-circuit and is
/// used deliberately by [`crate::ec::matrix::Matrix::vandermonde`] to
/// produce `[1, 0, 0, ...]` as its first row.
#[inline]
pub fn exp_pow(base: u8, k: u32) -> u8 {
    if base == 0 {
        return 0;
    }
    let t = &*TABLES;
    let product = (t.log[base as usize] as u64) * (k as u64);
    t.exp[(product % 255) as usize]
}
