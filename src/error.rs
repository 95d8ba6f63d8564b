//! Errors from table construction, engine setup and verification.
//!
//! Setup failures at one transform size are retryable: the caller moves on to
//! the next size. Everything else means no meaningful residue can be produced
//! and the run must stop.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MersenneError {
    /// Digits of `width + 1` bits could overflow P after one convolution.
    DigitWidthOverflow { log_n: u8, width: u64 },
    /// A digit address or remainder does not fit in 32 bits.
    AddressOverflow { log_n: u8, index: u64 },
    /// A digit width fell outside {width, width + 1}.
    InconsistentDigitWidth { log_n: u8, index: u64, digit_width: u64 },
    /// root2^n ≠ 2: the modulus or generator constant is wrong.
    RootOfTwoMismatch { log_n: u8 },
    /// A DWT weight reduced to zero and has no inverse.
    ZeroWeight { log_n: u8, index: u64 },
    /// Lucas–Lehmer is only defined for exponents of at least 2.
    ExponentTooSmall { exponent: u64 },
    /// No supported transform size can host the exponent.
    ExponentTooLarge { exponent: u64, max_log_n: u8 },
    /// A forced transform size is outside the supported range.
    InvalidTransformSize { log_n: u8, max_log_n: u8 },
    /// The NTT residue disagrees with the arbitrary-precision reference.
    ResidueMismatch { exponent: u64, iterations: u64, residue: u64, expected: u64 },
}

impl MersenneError {
    /// True when a larger transform size may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MersenneError::DigitWidthOverflow { .. }
                | MersenneError::AddressOverflow { .. }
                | MersenneError::InconsistentDigitWidth { .. }
        )
    }
}

impl fmt::Display for MersenneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MersenneError::DigitWidthOverflow { log_n, width } => write!(
                f,
                "fft size 2**{} insufficient: {}-bit digits would overflow the convolution",
                log_n, width
            ),
            MersenneError::AddressOverflow { log_n, index } => write!(
                f,
                "fft size 2**{}: digit address for limb {} exceeds 32 bits",
                log_n, index
            ),
            MersenneError::InconsistentDigitWidth {
                log_n,
                index,
                digit_width,
            } => write!(
                f,
                "fft size 2**{}: limb {} has unbalanced width {}",
                log_n, index, digit_width
            ),
            MersenneError::RootOfTwoMismatch { log_n } => {
                write!(f, "root of 2 is wrong for fft size 2**{}", log_n)
            }
            MersenneError::ZeroWeight { log_n, index } => write!(
                f,
                "fft size 2**{}: weight for limb {} is not invertible",
                log_n, index
            ),
            MersenneError::ExponentTooSmall { exponent } => {
                write!(f, "exponent {} too small, need at least 2", exponent)
            }
            MersenneError::ExponentTooLarge {
                exponent,
                max_log_n,
            } => write!(
                f,
                "exponent {} too big for fft sizes up to 2**{}",
                exponent, max_log_n
            ),
            MersenneError::InvalidTransformSize { log_n, max_log_n } => write!(
                f,
                "fft size 2**{} not supported, maximum is 2**{}",
                log_n, max_log_n
            ),
            MersenneError::ResidueMismatch {
                exponent,
                iterations,
                residue,
                expected,
            } => write!(
                f,
                "residue mismatch for 2**{}-1 after {} iterations: got 0x{:016X}, reference 0x{:016X}",
                exponent, iterations, residue, expected
            ),
        }
    }
}

impl std::error::Error for MersenneError {}
