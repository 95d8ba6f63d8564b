//! # Modmath — Arithmetic in the NTT Prime Field
//!
//! Every transform butterfly, weight and pointwise square in the engine is a
//! multiplication mod the fixed prime
//!
//! ```text
//! P = 2^64 − 2^32 + 1 = 0xFFFF_FFFF_0000_0001
//! ```
//!
//! P sits just under 2^64, so one field element holds a convolution output of
//! up to 63 bits exactly; the table builder bounds digit widths so that no
//! squared-and-summed digit reaches P.
//!
//! ## Why this prime
//!
//! P − 1 = 2^32 · 3 · 5 · 17 · 257 · 65537. Because 192·2^26 = 3·2^32 divides
//! P − 1, the field contains an n-th root of unity for every power-of-two
//! transform length up to 2^26 and, with generator g = 7, an n-th root of two:
//! `7^(5(P−1)/(192n))`. Those two roots are all the IBDWT needs.
//!
//! ## Algorithm: Special-Form Reduction
//!
//! With ε = 2^32 − 1 we have 2^64 ≡ ε and 2^96 ≡ −1 (mod P). A 128-bit product
//! `hi·2^64 + lo` with `hi = hh·2^32 + hl` therefore reduces as
//!
//! ```text
//! hi·2^64 + lo ≡ lo − hh + hl·ε   (mod P)
//! ```
//!
//! which costs one subtract, one 32×32 multiply, one add and two conditional
//! corrections. No division is ever performed.
//!
//! ## Backends
//!
//! - [`wide`]: native `u128` products and overflowing adds (mul/adc on
//!   x86-64 and aarch64). The default.
//! - [`portable`]: 32×32→64 partial products with explicit carries, enabled by
//!   the `portable` cargo feature.
//!
//! Both are always compiled; the feature only picks which one is re-exported
//! as the kernel, so the pair can be tested against each other.

pub mod portable;
pub mod wide;

#[cfg(feature = "portable")]
pub use portable::{mod_adc, mod_add, mod_mul, mod_reduce, mod_sqr, mod_sub};
#[cfg(not(feature = "portable"))]
pub use wide::{mod_adc, mod_add, mod_mul, mod_reduce, mod_sqr, mod_sub};

/// The field modulus P = 2^64 − 2^32 + 1.
pub const MOD_P: u64 = 0xFFFF_FFFF_0000_0001;

/// 2^64 mod P = 2^32 − 1.
pub const EPSILON: u64 = 0xFFFF_FFFF;

/// A primitive root of P, used to derive roots of unity and roots of two.
pub const GENERATOR: u64 = 7;

/// Largest supported transform length, as a power of two.
pub const MAX_LOG_N: u8 = 26;

/// Name of the kernel backend compiled into this build.
pub fn backend_name() -> &'static str {
    if cfg!(feature = "portable") {
        "portable"
    } else {
        "wide"
    }
}

/// x^e mod P by right-to-left binary exponentiation.
pub fn mod_pow(x: u64, mut e: u64) -> u64 {
    let mut result = 1;
    let mut base = x;
    while e > 0 {
        if e & 1 == 1 {
            result = mod_mul(result, base);
        }
        e >>= 1;
        if e > 0 {
            base = mod_sqr(base);
        }
    }
    result
}

/// Multiplicative inverse via Fermat's little theorem: x^(P−2).
/// Returns None if x ≡ 0 (mod P).
pub fn mod_inv(x: u64) -> Option<u64> {
    if x % MOD_P == 0 {
        return None;
    }
    Some(mod_pow(x, MOD_P - 2))
}

/// Primitive 2^log_n-th root of unity, 7^((P−1)/2^log_n).
pub fn root_of_unity(log_n: u8) -> u64 {
    debug_assert!(log_n <= 32, "P has no 2^{}-th root of unity", log_n);
    mod_pow(GENERATOR, (MOD_P - 1) >> log_n)
}

/// A 2^log_n-th root of two, 7^(5(P−1)/(192·2^log_n)).
pub fn root_of_two(log_n: u8) -> u64 {
    debug_assert!(log_n <= MAX_LOG_N);
    mod_pow(GENERATOR, (MOD_P - 1) / 192 / (1u64 << log_n) * 5)
}
