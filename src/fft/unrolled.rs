//! Radix-2 decimation-in-time transform with hand-unrolled small kernels.
//!
//! Input is permuted into bit-reversed order, every block of 8 goes through
//! a straight-line 8-point kernel (the first three DIT stages), and the
//! remaining log₂n − 3 stages run from a twiddle table. Sizes up to 8 never
//! touch the generic loop.

use super::{bit_reverse_permute, root_powers, roots_for, Fft};
use crate::modmath::{mod_add, mod_inv, mod_mul, mod_sub, root_of_unity};

/// Roots for one direction of the transform.
struct Twiddles {
    /// ω^j for j < n/2.
    roots: Vec<u64>,
    /// Primitive 4th root.
    w4: u64,
    /// [1, ω₈, ω₈², ω₈³].
    w8: [u64; 4],
}

impl Twiddles {
    fn new(w: u64, n: usize, w8: u64) -> Self {
        let w8_pows = [1, w8, mod_mul(w8, w8), mod_mul(mod_mul(w8, w8), w8)];
        Twiddles {
            roots: root_powers(w, n / 2),
            w4: w8_pows[2],
            w8: w8_pows,
        }
    }
}

pub struct FftUnrolled {
    log_n: u8,
    n: usize,
    forward: Twiddles,
    inverse: Twiddles,
}

impl FftUnrolled {
    /// Build for length 2^log_n. Any size works; automatic selection only
    /// picks this strategy up to 2^10.
    pub fn new(log_n: u8) -> Self {
        let n = 1usize << log_n;
        let (w, w_inv) = roots_for(log_n);
        let w8 = root_of_unity(3);
        let w8_inv = mod_inv(w8).expect("root of unity is nonzero");
        FftUnrolled {
            log_n,
            n,
            forward: Twiddles::new(w, n, w8),
            inverse: Twiddles::new(w_inv, n, w8_inv),
        }
    }

    fn transform(&self, x: &mut [u64], tw: &Twiddles) {
        assert_eq!(x.len(), self.n, "transform length mismatch");
        match self.log_n {
            0 => {}
            1 => dit2(x),
            2 => {
                bit_reverse_permute(x, 2);
                dit4(x, tw.w4);
            }
            _ => {
                bit_reverse_permute(x, self.log_n);
                for block in x.chunks_exact_mut(8) {
                    dit8(block, &tw.w8);
                }
                let mut half = 8;
                while half < self.n {
                    let m = half * 2;
                    let stride = self.n / m;
                    for block in x.chunks_exact_mut(m) {
                        let (lo, hi) = block.split_at_mut(half);
                        for j in 0..half {
                            let u = lo[j];
                            let v = mod_mul(hi[j], tw.roots[j * stride]);
                            lo[j] = mod_add(u, v);
                            hi[j] = mod_sub(u, v);
                        }
                    }
                    half = m;
                }
            }
        }
    }
}

impl Fft for FftUnrolled {
    fn log_n(&self) -> u8 {
        self.log_n
    }

    fn fft(&self, x: &mut [u64]) {
        self.transform(x, &self.forward);
    }

    fn inv_fft(&self, x: &mut [u64]) {
        self.transform(x, &self.inverse);
    }
}

#[inline(always)]
fn dit2(x: &mut [u64]) {
    let (a, b) = (x[0], x[1]);
    x[0] = mod_add(a, b);
    x[1] = mod_sub(a, b);
}

/// 4-point DFT of bit-reversed input [a0, a2, a1, a3], natural-order output.
#[inline(always)]
fn dit4(x: &mut [u64], w4: u64) {
    let s0 = mod_add(x[0], x[1]);
    let d0 = mod_sub(x[0], x[1]);
    let s1 = mod_add(x[2], x[3]);
    let d1 = mod_mul(mod_sub(x[2], x[3]), w4);
    x[0] = mod_add(s0, s1);
    x[1] = mod_add(d0, d1);
    x[2] = mod_sub(s0, s1);
    x[3] = mod_sub(d0, d1);
}

/// 8-point DFT of bit-reversed input, natural-order output.
#[inline(always)]
fn dit8(x: &mut [u64], w8: &[u64; 4]) {
    dit4(&mut x[0..4], w8[2]);
    dit4(&mut x[4..8], w8[2]);

    let e0 = x[0];
    let t0 = x[4];
    x[0] = mod_add(e0, t0);
    x[4] = mod_sub(e0, t0);

    let e1 = x[1];
    let t1 = mod_mul(x[5], w8[1]);
    x[1] = mod_add(e1, t1);
    x[5] = mod_sub(e1, t1);

    let e2 = x[2];
    let t2 = mod_mul(x[6], w8[2]);
    x[2] = mod_add(e2, t2);
    x[6] = mod_sub(e2, t2);

    let e3 = x[3];
    let t3 = mod_mul(x[7], w8[3]);
    x[3] = mod_add(e3, t3);
    x[7] = mod_sub(e3, t3);
}
