//! Kernel backend built on native 128-bit products and carry flags.

use super::{EPSILON, MOD_P};

/// Reduce `hi·2^64 + lo` into [0, P).
#[inline]
pub fn mod_reduce(hi: u64, lo: u64) -> u64 {
    let hi_hi = hi >> 32;
    let hi_lo = hi & EPSILON;

    // lo − hh; a borrow of 2^64 is worth −ε
    let (mut t0, borrow) = lo.overflowing_sub(hi_hi);
    if borrow {
        t0 = t0.wrapping_sub(EPSILON);
    }

    // + hl·ε; a carry of 2^64 is worth +ε
    let t1 = hi_lo * EPSILON;
    let (mut t2, carry) = t0.overflowing_add(t1);
    if carry {
        t2 = t2.wrapping_add(EPSILON);
    }

    if t2 >= MOD_P {
        t2 - MOD_P
    } else {
        t2
    }
}

#[inline]
pub fn mod_add(x: u64, y: u64) -> u64 {
    let (mut s, carry) = x.overflowing_add(y);
    if carry {
        s = s.wrapping_add(EPSILON);
    }
    if s >= MOD_P {
        s - MOD_P
    } else {
        s
    }
}

#[inline]
pub fn mod_sub(x: u64, y: u64) -> u64 {
    let (d, borrow) = x.overflowing_sub(y);
    if borrow {
        d.wrapping_sub(EPSILON)
    } else {
        d
    }
}

#[inline]
pub fn mod_mul(x: u64, y: u64) -> u64 {
    let p = x as u128 * y as u128;
    mod_reduce((p >> 64) as u64, p as u64)
}

#[inline]
pub fn mod_sqr(x: u64) -> u64 {
    mod_mul(x, x)
}

/// Add `carry` to `x`, keep the low `width` bits and leave the rest in `carry`.
#[inline]
pub fn mod_adc(x: u64, width: u8, carry: &mut u64) -> u64 {
    debug_assert!(width < 64);
    let t = x as u128 + *carry as u128;
    *carry = (t >> width) as u64;
    (t as u64) & ((1u64 << width) - 1)
}
