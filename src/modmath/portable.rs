//! Kernel backend using only 64-bit words and 32×32→64 partial products.
//!
//! Slower than [`super::wide`] but independent of compiler `u128` lowering
//! and of hardware carry flags. Results are identical.

use super::{EPSILON, MOD_P};

const LO32: u64 = 0xFFFF_FFFF;

/// Full 64×64→128 product as (hi, lo).
#[inline]
fn mul_wide(x: u64, y: u64) -> (u64, u64) {
    let (x0, x1) = (x & LO32, x >> 32);
    let (y0, y1) = (y & LO32, y >> 32);

    let p00 = x0 * y0;
    let p01 = x0 * y1;
    let p10 = x1 * y0;
    let p11 = x1 * y1;

    let mid = (p00 >> 32) + (p01 & LO32) + (p10 & LO32);
    let lo = (p00 & LO32) | (mid << 32);
    let hi = p11 + (p01 >> 32) + (p10 >> 32) + (mid >> 32);
    (hi, lo)
}

/// 64-bit square; the two cross products are equal.
#[inline]
fn sqr_wide(x: u64) -> (u64, u64) {
    let (x0, x1) = (x & LO32, x >> 32);

    let p00 = x0 * x0;
    let p01 = x0 * x1;
    let p11 = x1 * x1;

    let mid = (p00 >> 32) + 2 * (p01 & LO32);
    let lo = (p00 & LO32) | (mid << 32);
    let hi = p11 + 2 * (p01 >> 32) + (mid >> 32);
    (hi, lo)
}

/// Reduce `hi·2^64 + lo` into [0, P).
#[inline]
pub fn mod_reduce(hi: u64, lo: u64) -> u64 {
    let hi_hi = hi >> 32;
    let hi_lo = hi & LO32;

    // lo − hh (mod P); both operands are already below 2^64 so one
    // conditional correction keeps the value in [0, P)
    let lo = if lo >= MOD_P { lo - MOD_P } else { lo };
    let t0 = mod_sub(lo, hi_hi);

    // hl·ε < P, so a modular add finishes the job
    mod_add(t0, hi_lo * EPSILON)
}

#[inline]
pub fn mod_add(x: u64, y: u64) -> u64 {
    let room = MOD_P - y;
    if x >= room {
        x - room
    } else {
        x + y
    }
}

#[inline]
pub fn mod_sub(x: u64, y: u64) -> u64 {
    if x >= y {
        x - y
    } else {
        x + (MOD_P - y)
    }
}

#[inline]
pub fn mod_mul(x: u64, y: u64) -> u64 {
    let (hi, lo) = mul_wide(x, y);
    mod_reduce(hi, lo)
}

#[inline]
pub fn mod_sqr(x: u64) -> u64 {
    let (hi, lo) = sqr_wide(x);
    mod_reduce(hi, lo)
}

/// Add `carry` to `x`, keep the low `width` bits and leave the rest in `carry`.
#[inline]
pub fn mod_adc(x: u64, width: u8, carry: &mut u64) -> u64 {
    debug_assert!(width < 64);
    let lo = (x & LO32) + (*carry & LO32);
    let hi = (x >> 32) + (*carry >> 32) + (lo >> 32);
    let sum = (hi << 32) | (lo & LO32);
    let overflow = hi >> 32;

    if width == 0 {
        debug_assert_eq!(overflow, 0, "carry out of a zero-width digit");
        *carry = sum;
        return 0;
    }
    *carry = (sum >> width) | (overflow << (64 - width));
    sum & ((1u64 << width) - 1)
}
