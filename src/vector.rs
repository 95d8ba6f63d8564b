//! Elementwise field operations over limb arrays.
//!
//! Used by the engine to enter and leave the weighted domain and to square
//! in the frequency domain. Length mismatches are caller bugs and panic.

use crate::modmath::{mod_mul, mod_sqr};

/// x[i] = x[i]·y[i] mod P.
#[inline]
pub fn mod_vector_mul(x: &mut [u64], y: &[u64]) {
    assert_eq!(x.len(), y.len(), "vector length mismatch");
    for (a, &b) in x.iter_mut().zip(y) {
        *a = mod_mul(*a, b);
    }
}

/// x[i] = x[i]² mod P.
#[inline]
pub fn mod_vector_sqr(x: &mut [u64]) {
    for a in x.iter_mut() {
        *a = mod_sqr(*a);
    }
}
