//! Radix-4 decimation-in-frequency transform, used for odd log₂n where the
//! four-step split into equal halves does not exist.
//!
//! Each radix-4 pass fuses two Gentleman–Sande radix-2 stages, so memory is
//! swept ⌈log₂n / 2⌉ times instead of log₂n. An odd stage count leaves one
//! twiddle-free radix-2 pass at the end. DIF leaves the output bit-reversed;
//! a final permutation restores natural order.

use super::{bit_reverse_permute, root_powers, roots_for, Fft};
use crate::modmath::{mod_add, mod_mul, mod_sub};

pub struct FftFastish {
    log_n: u8,
    n: usize,
    /// ω^j for j < n/2.
    roots: Vec<u64>,
    /// ω^−j for j < n/2.
    inv_roots: Vec<u64>,
}

impl FftFastish {
    pub fn new(log_n: u8) -> Self {
        let n = 1usize << log_n;
        let (w, w_inv) = roots_for(log_n);
        FftFastish {
            log_n,
            n,
            roots: root_powers(w, n / 2),
            inv_roots: root_powers(w_inv, n / 2),
        }
    }

    fn transform(&self, x: &mut [u64], roots: &[u64]) {
        assert_eq!(x.len(), self.n, "transform length mismatch");
        let mut m = self.n;
        while m >= 4 {
            self.radix4_pass(x, roots, m);
            m /= 4;
        }
        if m == 2 {
            for pair in x.chunks_exact_mut(2) {
                let (u, v) = (pair[0], pair[1]);
                pair[0] = mod_add(u, v);
                pair[1] = mod_sub(u, v);
            }
        }
        bit_reverse_permute(x, self.log_n);
    }

    /// Stages for block sizes m and m/2 in one sweep.
    fn radix4_pass(&self, x: &mut [u64], roots: &[u64], m: usize) {
        let q = m / 4;
        let stride = self.n / m;
        for block in x.chunks_exact_mut(m) {
            for j in 0..q {
                let w1 = roots[j * stride];
                let w2 = roots[(j + q) * stride];
                let w3 = roots[2 * j * stride];

                let a0 = block[j];
                let a1 = block[j + q];
                let a2 = block[j + 2 * q];
                let a3 = block[j + 3 * q];

                // block size m
                let y0 = mod_add(a0, a2);
                let y2 = mod_mul(mod_sub(a0, a2), w1);
                let y1 = mod_add(a1, a3);
                let y3 = mod_mul(mod_sub(a1, a3), w2);

                // block size m/2
                block[j] = mod_add(y0, y1);
                block[j + q] = mod_mul(mod_sub(y0, y1), w3);
                block[j + 2 * q] = mod_add(y2, y3);
                block[j + 3 * q] = mod_mul(mod_sub(y2, y3), w3);
            }
        }
    }
}

impl Fft for FftFastish {
    fn log_n(&self) -> u8 {
        self.log_n
    }

    fn fft(&self, x: &mut [u64]) {
        self.transform(x, &self.roots);
    }

    fn inv_fft(&self, x: &mut [u64]) {
        self.transform(x, &self.inv_roots);
    }
}
