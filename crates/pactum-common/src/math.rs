//! Fixed-point integer arithmetic
//!
//! All protocol ratios are integers scaled by a power-of-ten denominator
//! (1e4 for loan-to-value, 1e38 for credit-per-collateral-unit). Products of
//! two u128 operands do not fit the native width, so `mul_div_floor` carries
//! the intermediate as a 256-bit (hi, lo) pair and divides with restoring
//! long division. Division always rounds toward zero.

use crate::error::ArithmeticError;

/// floor(a * b / d) with a 256-bit intermediate product.
///
/// Errors with `DivisionByZero` when `d == 0` and `Overflow` when the
/// quotient does not fit u128. Multiply-before-divide is deliberate: dividing
/// either operand first would lose up to `d - 1` units of precision.
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Result<u128, ArithmeticError> {
    if d == 0 {
        return Err(ArithmeticError::DivisionByZero);
    }

    let (hi, lo) = full_mul(a, b);
    if hi == 0 {
        return Ok(lo / d);
    }
    // quotient = (hi * 2^128 + lo) / d >= 2^128 iff hi >= d
    if hi >= d {
        return Err(ArithmeticError::Overflow);
    }
    Ok(div_rem_256_by_128(hi, lo, d).0)
}

/// Checked u128 multiplication surfacing the protocol overflow error
pub fn checked_mul(a: u128, b: u128) -> Result<u128, ArithmeticError> {
    a.checked_mul(b).ok_or(ArithmeticError::Overflow)
}

/// Checked u128 addition surfacing the protocol overflow error
pub fn checked_add(a: u128, b: u128) -> Result<u128, ArithmeticError> {
    a.checked_add(b).ok_or(ArithmeticError::Overflow)
}

/// Full 256-bit product of two u128 values as (hi, lo)
fn full_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = (1u128 << 64) - 1;

    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    // mid collects the three 64-bit-shifted partial products; it cannot
    // overflow because each term is < 2^64 after masking/shifting
    let mid = (ll >> 64) + (lh & MASK) + (hl & MASK);

    let lo = (mid << 64) | (ll & MASK);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}

/// Restoring long division of a 256-bit dividend by a 128-bit divisor.
///
/// Caller guarantees `hi < d`, so the quotient fits u128.
fn div_rem_256_by_128(hi: u128, lo: u128, d: u128) -> (u128, u128) {
    debug_assert!(hi < d);

    let mut rem = hi;
    let mut quotient = 0u128;

    for i in (0..128).rev() {
        // rem may exceed 2^127; track the shifted-out bit explicitly
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);

        // with the carry bit set the true remainder is rem + 2^128 > d;
        // wrapping_sub yields the correct reduced value in both cases
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quotient |= 1 << i;
        }
    }

    (quotient, rem)
}
