//! # FFT — Number-Theoretic Transforms over the Field
//!
//! The engine squares a big integer by transforming its weighted limbs,
//! squaring pointwise and transforming back. This module provides that
//! transform as three interchangeable strategies behind one [`Fft`] trait.
//!
//! ## Contract
//!
//! Every strategy computes the natural-order DFT
//!
//! ```text
//! X[k] = Σ_j x[j]·ω^(jk),   ω = 7^((P−1)/n)
//! ```
//!
//! and its inverse with ω^−1. The inverse is **not** scaled by 1/n:
//! `inv_fft(fft(v)) == n·v`. The 1/n is folded into the engine's unweight
//! table, saving a full pass per iteration.
//!
//! Because all three produce identical output for the same input, the weight
//! tables never depend on which strategy was chosen.
//!
//! ## Strategy Selection
//!
//! | log₂ n      | strategy      | shape                                    |
//! |-------------|---------------|------------------------------------------|
//! | ≤ 10        | [`FftUnrolled`] | radix-2 DIT, hand-unrolled 2/4/8 kernels |
//! | > 10, even  | [`FftFourStep`] | Bailey four-step on a √n × √n matrix     |
//! | > 10, odd   | [`FftFastish`]  | radix-4 DIF + radix-2 tail, bit reversal |
//!
//! Small transforms fit in cache and gain most from removing loop overhead.
//! Large ones are bound by memory traffic: four-step keeps each pass inside
//! rows of √n elements, and when n is an odd power of two the radix-4
//! DIF halves the number of passes over memory instead.
//!
//! ## References
//!
//! - D.H. Bailey, "FFTs in External or Hierarchical Memory", J. Supercomputing
//!   4(1), 1990 (four-step).
//! - R. Crandall, B. Fagin, "Discrete Weighted Transforms and Large-Integer
//!   Arithmetic", Mathematics of Computation 62(205), 1994.

mod fastish;
mod four_step;
mod unrolled;

pub use fastish::FftFastish;
pub use four_step::FftFourStep;
pub use unrolled::FftUnrolled;

use crate::modmath::{mod_inv, mod_mul, root_of_unity};
use serde::Serialize;
use std::fmt;

/// Largest log₂ n handled by [`FftUnrolled`] under automatic selection.
pub const UNROLLED_MAX_LOG_N: u8 = 10;

/// In-place forward and inverse transforms of a fixed length.
pub trait Fft: Send + Sync {
    /// log₂ of the transform length.
    fn log_n(&self) -> u8;

    /// Transform length.
    fn size(&self) -> usize {
        1 << self.log_n()
    }

    fn fft(&self, x: &mut [u64]);

    /// Inverse transform, scaled by n.
    fn inv_fft(&self, x: &mut [u64]);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FftKind {
    Unrolled,
    FourStep,
    Fastish,
}

impl FftKind {
    /// Pick the strategy for a transform of length 2^log_n.
    pub fn for_log_n(log_n: u8) -> Self {
        if log_n <= UNROLLED_MAX_LOG_N {
            FftKind::Unrolled
        } else if log_n % 2 == 0 {
            FftKind::FourStep
        } else {
            FftKind::Fastish
        }
    }
}

impl fmt::Display for FftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FftKind::Unrolled => "unrolled",
            FftKind::FourStep => "four-step",
            FftKind::Fastish => "fastish",
        })
    }
}

/// The strategy chosen for one engine, fixed for its lifetime.
pub enum Transform {
    Unrolled(FftUnrolled),
    FourStep(FftFourStep),
    Fastish(FftFastish),
}

impl Transform {
    pub fn new(log_n: u8) -> Self {
        match FftKind::for_log_n(log_n) {
            FftKind::Unrolled => Transform::Unrolled(FftUnrolled::new(log_n)),
            FftKind::FourStep => Transform::FourStep(FftFourStep::new(log_n)),
            FftKind::Fastish => Transform::Fastish(FftFastish::new(log_n)),
        }
    }

    pub fn kind(&self) -> FftKind {
        match self {
            Transform::Unrolled(_) => FftKind::Unrolled,
            Transform::FourStep(_) => FftKind::FourStep,
            Transform::Fastish(_) => FftKind::Fastish,
        }
    }
}

impl Fft for Transform {
    fn log_n(&self) -> u8 {
        match self {
            Transform::Unrolled(t) => t.log_n(),
            Transform::FourStep(t) => t.log_n(),
            Transform::Fastish(t) => t.log_n(),
        }
    }

    #[inline]
    fn fft(&self, x: &mut [u64]) {
        match self {
            Transform::Unrolled(t) => t.fft(x),
            Transform::FourStep(t) => t.fft(x),
            Transform::Fastish(t) => t.fft(x),
        }
    }

    #[inline]
    fn inv_fft(&self, x: &mut [u64]) {
        match self {
            Transform::Unrolled(t) => t.inv_fft(x),
            Transform::FourStep(t) => t.inv_fft(x),
            Transform::Fastish(t) => t.inv_fft(x),
        }
    }
}

/// Primitive 2^log_n-th root of unity for each direction: (ω, ω^−1).
pub(crate) fn roots_for(log_n: u8) -> (u64, u64) {
    let w = root_of_unity(log_n);
    let w_inv = mod_inv(w).expect("root of unity is nonzero");
    (w, w_inv)
}

/// [1, w, w², …, w^(len−1)].
pub(crate) fn root_powers(w: u64, len: usize) -> Vec<u64> {
    let mut powers = Vec::with_capacity(len);
    let mut acc = 1;
    for _ in 0..len {
        powers.push(acc);
        acc = mod_mul(acc, w);
    }
    powers
}

/// Permute x (length 2^log_n) into bit-reversed index order.
pub(crate) fn bit_reverse_permute(x: &mut [u64], log_n: u8) {
    if log_n == 0 {
        return;
    }
    let shift = usize::BITS - log_n as u32;
    for i in 0..x.len() {
        let j = i.reverse_bits() >> shift;
        if i < j {
            x.swap(i, j);
        }
    }
}

/// Transpose a row-major side × side matrix in place, tile by tile.
pub(crate) fn transpose_square(x: &mut [u64], side: usize) {
    const TILE: usize = 32;
    debug_assert_eq!(x.len(), side * side);
    for bi in (0..side).step_by(TILE) {
        for bj in (bi..side).step_by(TILE) {
            for i in bi..(bi + TILE).min(side) {
                let start = if bi == bj { i + 1 } else { bj };
                for j in start..(bj + TILE).min(side) {
                    x.swap(i * side + j, j * side + i);
                }
            }
        }
    }
}
