//! # Tables — Digit Widths and IBDWT Weights
//!
//! Maps an exponent q onto n = 2^log_n limbs of balanced width and computes
//! the per-limb weights that turn a length-n cyclic convolution into
//! multiplication mod 2^q − 1.
//!
//! ## Digit Layout
//!
//! Limb i starts at bit ⌈q·i/n⌉, so its width is
//!
//! ```text
//! w_i = ⌈q(i+1)/n⌉ − ⌈q·i/n⌉ ∈ {⌊q/n⌋, ⌊q/n⌋ + 1}
//! ```
//!
//! and the widths sum to exactly q.
//!
//! ## Weights
//!
//! Crandall–Fagin: weighting limb i by 2^(⌈qi/n⌉ − qi/n) makes the wrapped
//! terms of a cyclic convolution land with the factor 2^q ≡ 1. In the field
//! that is a power of an n-th root of two:
//!
//! ```text
//! weight[i]   = root2^(n − (q·i mod n))          (1 when q·i ≡ 0 mod n)
//! unweight[i] = (n · weight[i])^−1
//! ```
//!
//! The 1/n in `unweight` finishes the unscaled inverse transform for free.
//!
//! ## Overflow Guard
//!
//! A convolution output is a sum of n products of digits below 2^(w+1), each
//! doubled at most once by the weighting, so it stays below
//! 2^(2w + 3 + log_n). Requiring `2w + log_n < 61` keeps it within 2^63 < P.
//! Sizes that fail the guard are rejected, and the caller tries the next size.

use tracing::debug;

use crate::error::MersenneError;
use crate::modmath::{mod_inv, mod_mul, mod_pow, root_of_two, MAX_LOG_N};

/// Largest value of `2·width + log_n` accepted, exclusive.
pub const WIDTH_GUARD_BITS: u64 = 61;

#[derive(Debug, Clone)]
pub struct DigitTables {
    pub exponent: u64,
    pub log_n: u8,
    pub n: usize,
    /// Primitive n-th root of two.
    pub root2: u64,
    /// Bits in a small digit, ⌊q/n⌋. Large digits have one more.
    pub small_width: u8,
    pub digit_widths: Vec<u8>,
    pub weight: Vec<u64>,
    pub unweight: Vec<u64>,
}

impl DigitTables {
    /// Build tables for 2^exponent − 1 at transform length 2^log_n.
    pub fn build(log_n: u8, exponent: u64) -> Result<Self, MersenneError> {
        if exponent < 2 {
            return Err(MersenneError::ExponentTooSmall { exponent });
        }
        if log_n > MAX_LOG_N {
            return Err(MersenneError::InvalidTransformSize {
                log_n,
                max_log_n: MAX_LOG_N,
            });
        }

        let n = 1usize << log_n;
        let n64 = n as u64;
        let width = exponent / n64;

        // Digits up to width + 1 bits must survive one convolution
        if width.saturating_mul(2) + log_n as u64 >= WIDTH_GUARD_BITS {
            return Err(MersenneError::DigitWidthOverflow { log_n, width });
        }

        let root2 = root_of_two(log_n);
        if mod_pow(root2, n64) != 2 {
            return Err(MersenneError::RootOfTwoMismatch { log_n });
        }

        let mut digit_widths = vec![0u8; n];
        let mut weight = vec![0u64; n];
        let mut unweight = vec![0u64; n];

        weight[0] = 1;
        unweight[0] = mod_inv(n64).ok_or(MersenneError::ZeroWeight { log_n, index: 0 })?;

        let mut old_addr = 0u64;
        for i in 0..=n64 {
            let t = exponent
                .checked_mul(i)
                .ok_or(MersenneError::AddressOverflow { log_n, index: i })?;
            let r = t % n64;
            let mut addr = t / n64;
            if r >> 32 != 0 {
                return Err(MersenneError::AddressOverflow { log_n, index: i });
            }
            if r != 0 {
                addr += 1;
            }
            if addr >> 32 != 0 {
                return Err(MersenneError::AddressOverflow { log_n, index: i });
            }

            if i > 0 {
                let digit_width = addr - old_addr;
                if digit_width != width && digit_width != width + 1 {
                    return Err(MersenneError::InconsistentDigitWidth {
                        log_n,
                        index: i - 1,
                        digit_width,
                    });
                }
                digit_widths[(i - 1) as usize] = digit_width as u8;

                if i < n64 {
                    let idx = i as usize;
                    weight[idx] = if r == 0 { 1 } else { mod_pow(root2, n64 - r) };
                    unweight[idx] = mod_inv(mod_mul(weight[idx], n64))
                        .ok_or(MersenneError::ZeroWeight { log_n, index: i })?;
                }
            }
            old_addr = addr;
        }

        debug!(exponent, log_n, width, "digit tables built");

        Ok(DigitTables {
            exponent,
            log_n,
            n,
            root2,
            small_width: width as u8,
            digit_widths,
            weight,
            unweight,
        })
    }
}
