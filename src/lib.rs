//! Lucas–Lehmer primality testing of Mersenne numbers 2^q − 1.
//!
//! Squarings mod 2^q − 1 run as an irrational-base discrete weighted
//! transform (IBDWT) over the prime field P = 2^64 − 2^32 + 1, so no floating
//! point and no explicit reduction by the Mersenne modulus is involved.
//!
//! Layers, leaves first: [`modmath`] field kernel, [`vector`] elementwise ops,
//! [`fft`] transforms, [`tables`] digit widths and weights, [`mersenne`]
//! engine. [`verify`] holds a GMP reference used for cross-checking.

pub mod config;
pub mod error;
pub mod fft;
pub mod mersenne;
pub mod modmath;
pub mod progress;
pub mod tables;
pub mod vector;
pub mod verify;

pub use config::RunConfig;
pub use error::MersenneError;
pub use mersenne::{format_residue, test_exponent, Mersenne, TestReport};
