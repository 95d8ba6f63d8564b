//! # Mersenne — Lucas–Lehmer Engine
//!
//! Tests 2^q − 1 for primality with the recurrence
//!
//! ```text
//! s_0 = 4,   s_{k+1} = s_k² − 2  (mod 2^q − 1)
//! ```
//!
//! 2^q − 1 is prime iff s_{q−2} ≡ 0. The state s lives in n mixed-radix limbs
//! (see [`crate::tables`]); each step squares it with an IBDWT over the NTT
//! field, so the modular reduction by 2^q − 1 is free.
//!
//! ## One Step
//!
//! 1. weight the limbs
//! 2. forward transform
//! 3. square pointwise
//! 4. inverse transform
//! 5. unweight, which also divides by n
//! 6. carry each limb into the next; a carry out of the top limb is worth
//!    2^q ≡ 1 and re-enters at limb 0
//! 7. subtract 2 with borrow, wrapping the same way
//!
//! After step 5 every limb is an exact integer below 2^63 (the table builder's
//! guard), so carries never lose precision.
//!
//! ## Carry Primitives
//!
//! `add64` ripples a full 64-bit carry with [`mod_adc`] and drops to the cheaper
//! `add32` ripple as soon as the carry is below 2^⌊q/n⌋, where each further
//! limb usually costs a single compare. `sub32` is the borrowing counterpart.
//! All three assume limbs are within their widths on entry and restore that
//! on exit. A carry or borrow out of the top limb re-enters at limb 0.

use rug::ops::RemRounding;
use rug::Integer;
use serde::Serialize;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::error::MersenneError;
use crate::fft::{Fft, FftKind, Transform};
use crate::modmath::{mod_adc, MAX_LOG_N};
use crate::progress::Progress;
use crate::tables::DigitTables;
use crate::vector::{mod_vector_mul, mod_vector_sqr};
use crate::verify::{integer_to_limbs, limbs_to_integer, mersenne_number, reference_state};

/// Lucas–Lehmer state and tables for one exponent.
pub struct Mersenne {
    tables: DigitTables,
    /// 2^small_width: carries below this take the 32-bit path.
    small_digit_max: u64,
    x: Vec<u64>,
    fft: Transform,
}

impl Mersenne {
    /// Set up for 2^exponent − 1 at transform length 2^log_n.
    ///
    /// A retryable error means this size cannot host the exponent; see
    /// [`MersenneError::is_retryable`].
    pub fn initialise(log_n: u8, exponent: u64) -> Result<Self, MersenneError> {
        let tables = DigitTables::build(log_n, exponent)?;
        let fft = Transform::new(log_n);
        let n = tables.n;
        Ok(Mersenne {
            small_digit_max: 1u64 << tables.small_width,
            tables,
            x: vec![0; n],
            fft,
        })
    }

    /// Set up at the smallest transform length that can host the exponent.
    pub fn auto_initialise(exponent: u64) -> Result<Self, MersenneError> {
        for log_n in 0..=MAX_LOG_N {
            match Self::initialise(log_n, exponent) {
                Ok(m) => {
                    info!(
                        exponent,
                        log_n,
                        fft = %m.fft_kind(),
                        small_width = m.tables.small_width,
                        "transform size selected"
                    );
                    return Ok(m);
                }
                Err(e) if e.is_retryable() => {
                    debug!(exponent, log_n, reason = %e, "transform size rejected");
                }
                Err(e) => return Err(e),
            }
        }
        Err(MersenneError::ExponentTooLarge {
            exponent,
            max_log_n: MAX_LOG_N,
        })
    }

    pub fn exponent(&self) -> u64 {
        self.tables.exponent
    }

    pub fn log_n(&self) -> u8 {
        self.tables.log_n
    }

    /// Number of limbs.
    pub fn n(&self) -> usize {
        self.tables.n
    }

    pub fn fft_kind(&self) -> FftKind {
        self.fft.kind()
    }

    pub fn digit_widths(&self) -> &[u8] {
        &self.tables.digit_widths
    }

    pub fn limbs(&self) -> &[u64] {
        &self.x
    }

    /// The state as an integer in [0, 2^q − 1].
    pub fn value(&self) -> Integer {
        limbs_to_integer(&self.x, &self.tables.digit_widths)
    }

    /// Replace the state with `value` mod 2^q − 1.
    pub fn load(&mut self, value: &Integer) {
        let m = mersenne_number(self.exponent());
        let reduced = Integer::from(value.rem_euc(&m));
        self.x = integer_to_limbs(&reduced, &self.tables.digit_widths);
    }

    /// Add c at limb `start`, rippling the carry upward.
    ///
    /// Usually the carry out of the first limb is 1 and each further limb
    /// costs one compare. Limbs narrower than c (forced oversized transforms
    /// give widths of 0 or 1) pass the excess on.
    pub fn add32(&mut self, c: u32, start: usize) {
        let n = self.tables.n;
        let widths = &self.tables.digit_widths;
        let mut c = c as u64;
        let mut i = start;
        while c != 0 {
            while i < n {
                let width = widths[i];
                let t = self.x[i] + c;
                if t < 1u64 << width {
                    self.x[i] = t;
                    return;
                }
                self.x[i] = t & ((1u64 << width) - 1);
                c = t >> width;
                i += 1;
            }
            // carried out of the top limb: 2^q ≡ 1
            i = 0;
        }
    }

    /// Subtract c from limb 0, rippling the borrow upward.
    pub fn sub32(&mut self, c: u32) {
        let n = self.tables.n;
        let widths = &self.tables.digit_widths;
        let mut c = c as u64;
        while c != 0 {
            for i in 0..n {
                if self.x[i] >= c {
                    self.x[i] -= c;
                    return;
                }
                let width = widths[i];
                let deficit = c - self.x[i];
                let borrow = (deficit + (1u64 << width) - 1) >> width;
                self.x[i] = (borrow << width) - deficit;
                c = borrow;
            }
        }
    }

    /// Add a 64-bit carry at limb 0.
    pub fn add64(&mut self, mut c: u64) {
        let n = self.tables.n;
        while c != 0 {
            for i in 0..n {
                self.x[i] = mod_adc(self.x[i], self.tables.digit_widths[i], &mut c);
                if c < self.small_digit_max {
                    if c != 0 {
                        self.add32(c as u32, i + 1);
                    }
                    return;
                }
            }
        }
    }

    /// One Lucas–Lehmer step: x = x² − 2 mod 2^q − 1.
    pub fn mul(&mut self) {
        mod_vector_mul(&mut self.x, &self.tables.weight);
        self.fft.fft(&mut self.x);
        mod_vector_sqr(&mut self.x);
        self.fft.inv_fft(&mut self.x);
        mod_vector_mul(&mut self.x, &self.tables.unweight);

        let mut c = 0u64;
        for (limb, &width) in self.x.iter_mut().zip(&self.tables.digit_widths) {
            *limb = mod_adc(*limb, width, &mut c);
        }
        if c != 0 {
            self.add64(c);
        }

        self.sub32(2);
    }

    /// Bottom 64 bits of the carried state.
    ///
    /// A zero word is only reported after confirming every limb is zero, so a
    /// composite whose low bits happen to vanish is not mistaken for a prime.
    pub fn residue(&self) -> u64 {
        let widths = &self.tables.digit_widths;
        let mut r = 0u64;
        let mut bit = 0u32;
        for (&limb, &width) in self.x.iter().zip(widths) {
            if bit >= 64 {
                break;
            }
            r |= limb << bit;
            bit += width as u32;
        }
        if r != 0 {
            return r;
        }
        self.x.iter().fold(0, |acc, &limb| acc | limb)
    }

    /// Reset the state to the Lucas–Lehmer seed 4.
    pub fn seed(&mut self) {
        self.x.iter_mut().for_each(|limb| *limb = 0);
        // through add32 so a first limb narrower than 3 bits still carries
        self.add32(4, 0);
    }

    /// Seed and run; `iterations == 0` runs the full q − 2 steps.
    /// Returns the number of steps performed.
    pub fn run(&mut self, iterations: u64) -> u64 {
        self.run_with_progress(iterations, None)
    }

    pub fn run_with_progress(&mut self, iterations: u64, progress: Option<&Progress>) -> u64 {
        let iterations = self.resolve_iterations(iterations);
        if let Some(p) = progress {
            p.begin(&format!("M{}", self.exponent()), iterations);
        }
        self.seed();
        for i in 0..iterations {
            self.mul();
            if let Some(p) = progress {
                p.completed.store(i + 1, Ordering::Relaxed);
            }
        }
        iterations
    }

    /// Set up as configured: the forced transform size, or the smallest one
    /// that can host the exponent.
    pub fn for_config(exponent: u64, config: &RunConfig) -> Result<Self, MersenneError> {
        config.validate()?;
        match config.log_n {
            Some(log_n) => Mersenne::initialise(log_n, exponent),
            None => Mersenne::auto_initialise(exponent),
        }
    }

    /// Seed, run the configured number of squarings and report. With
    /// `config.verify` the final state must equal the GMP reference.
    pub fn test(
        &mut self,
        config: &RunConfig,
        progress: Option<&Progress>,
    ) -> Result<TestReport, MersenneError> {
        let exponent = self.exponent();
        let start = Instant::now();
        let iterations = self.run_with_progress(config.iterations, progress);
        let residue = self.residue();
        let elapsed_secs = start.elapsed().as_secs_f64();

        // an exponent of 2 has no squarings, and M2 = 3 is prime
        let full_test = config.iterations == 0 || iterations == exponent.saturating_sub(2);
        let is_prime = full_test.then_some(exponent == 2 || residue == 0);

        if config.verify {
            self.confirm_state(iterations, &reference_state(exponent, iterations))?;
            info!(exponent, iterations, "state matches GMP reference");
        }

        Ok(TestReport {
            exponent,
            log_n: self.log_n(),
            fft: self.fft_kind(),
            iterations,
            full_test,
            residue,
            residue_hex: format_residue(residue),
            is_prime,
            verified: config.verify,
            elapsed_secs,
        })
    }

    /// Compare the whole state, reduced mod 2^q − 1, with `expected`.
    fn confirm_state(&self, iterations: u64, expected: &Integer) -> Result<(), MersenneError> {
        let modulus = mersenne_number(self.exponent());
        let state = Integer::from((&self.value()).rem_euc(&modulus));
        if state == *expected {
            return Ok(());
        }
        Err(MersenneError::ResidueMismatch {
            exponent: self.exponent(),
            iterations,
            residue: self.residue(),
            expected: expected.to_u64_wrapping(),
        })
    }

    /// Map the "0 means full test" convention onto a step count.
    pub fn resolve_iterations(&self, iterations: u64) -> u64 {
        if iterations == 0 {
            self.exponent().saturating_sub(2)
        } else {
            iterations
        }
    }
}

/// Outcome of one test, as printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub exponent: u64,
    pub log_n: u8,
    pub fft: FftKind,
    pub iterations: u64,
    /// True when the run covered all q − 2 steps.
    pub full_test: bool,
    pub residue: u64,
    pub residue_hex: String,
    /// Only known for full tests.
    pub is_prime: Option<bool>,
    /// Whether the residue was cross-checked against the GMP reference.
    pub verified: bool,
    pub elapsed_secs: f64,
}

/// `0x` followed by 16 uppercase hex digits.
pub fn format_residue(residue: u64) -> String {
    format!("0x{:016X}", residue)
}

/// Initialise, run and report a test of 2^exponent − 1.
pub fn test_exponent(
    exponent: u64,
    config: &RunConfig,
    progress: Option<&Progress>,
) -> Result<TestReport, MersenneError> {
    Mersenne::for_config(exponent, config)?.test(config, progress)
}
