//! # Verify — Arbitrary-Precision Reference
//!
//! A direct Lucas–Lehmer recurrence on GMP integers (via `rug`), plus
//! conversions between the engine's mixed-radix limbs and `Integer`.
//!
//! The reference squares full q-bit numbers with GMP, so it is practical only
//! for small and moderate exponents. It is the ground truth the NTT engine is
//! checked against: `--verify` on the command line and the property tests.
//! `--verify` compares whole states, not just the low words, so a state whose
//! low 64 bits happen to vanish is still checked exactly.
//!
//! ## Reduction mod 2^q − 1
//!
//! `x mod (2^q − 1)` needs no division: with x = hi·2^q + lo,
//! x ≡ hi + lo. Folding twice brings any product of two reduced values back
//! below 2^q, and one conditional subtract makes it canonical.

use rug::Integer;

/// 2^q − 1.
pub fn mersenne_number(exponent: u64) -> Integer {
    (Integer::from(1) << exponent as u32) - 1u32
}

/// Reduce a non-negative x mod 2^q − 1 by folding.
fn reduce_mersenne(x: &mut Integer, exponent: u32, m: &Integer) {
    while x.significant_bits() > exponent {
        let hi = Integer::from(&*x >> exponent);
        x.keep_bits_mut(exponent);
        *x += hi;
    }
    if *x == *m {
        *x = Integer::new();
    }
}

/// s_k mod 2^q − 1 in [0, 2^q − 1), where s_0 = 4 and s_{k+1} = s_k² − 2.
///
/// `iterations == 0` means the full test of q − 2 steps, the same rule the
/// engine uses.
pub fn reference_state(exponent: u64, iterations: u64) -> Integer {
    let iterations = if iterations == 0 {
        exponent.saturating_sub(2)
    } else {
        iterations
    };
    let q = exponent as u32;
    let m = mersenne_number(exponent);
    let mut s = Integer::from(4) % &m;
    for _ in 0..iterations {
        s.square_mut();
        reduce_mersenne(&mut s, q, &m);
        // s ≥ 0 after reduction; borrow 2 from the modulus when it is small
        if s < 2u32 {
            s += &m;
        }
        s -= 2u32;
    }
    s
}

/// Low 64 bits of [`reference_state`].
pub fn reference_residue(exponent: u64, iterations: u64) -> u64 {
    reference_state(exponent, iterations).to_u64_wrapping()
}

/// Decode little-endian mixed-radix limbs into an integer.
pub fn limbs_to_integer(limbs: &[u64], widths: &[u8]) -> Integer {
    assert_eq!(limbs.len(), widths.len(), "limb/width length mismatch");
    let mut value = Integer::new();
    for (&limb, &width) in limbs.iter().zip(widths).rev() {
        value <<= width as u32;
        value += limb;
    }
    value
}

/// Encode a non-negative integer below 2^Σwidths as mixed-radix limbs.
pub fn integer_to_limbs(value: &Integer, widths: &[u8]) -> Vec<u64> {
    let mut rest = value.clone();
    widths
        .iter()
        .map(|&width| {
            let limb = Integer::from(rest.keep_bits_ref(width as u32));
            rest >>= width as u32;
            limb.to_u64_wrapping()
        })
        .collect()
}
