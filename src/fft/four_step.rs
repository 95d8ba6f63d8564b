//! Bailey's four-step transform for even log₂n.
//!
//! The vector is viewed as a √n × √n row-major matrix, x[j1·√n + j2]. With
//! one extra transpose up front so that every pass walks contiguous rows:
//!
//! 1. transpose, so row j2 holds the column x[·, j2]
//! 2. length-√n transform of each row, then scale element k1 of row j2 by ω^(j2·k1)
//! 3. transpose
//! 4. length-√n transform of each row
//! 5. transpose back into natural output order
//!
//! Rows are independent within a pass, so passes run on the rayon pool.

use rayon::prelude::*;

use super::{root_powers, roots_for, transpose_square, Fft, FftUnrolled};
use crate::modmath::mod_mul;

pub struct FftFourStep {
    log_n: u8,
    n: usize,
    side: usize,
    rows: FftUnrolled,
    /// ω^j2 for each row j2, forward.
    row_steps: Vec<u64>,
    /// ω^−j2 for each row j2, inverse.
    inv_row_steps: Vec<u64>,
}

#[derive(Clone, Copy)]
enum Direction {
    Forward,
    Inverse,
}

impl FftFourStep {
    pub fn new(log_n: u8) -> Self {
        assert!(log_n % 2 == 0, "four-step needs an even log_n, got {}", log_n);
        let side = 1usize << (log_n / 2);
        let (w, w_inv) = roots_for(log_n);
        FftFourStep {
            log_n,
            n: side * side,
            side,
            rows: FftUnrolled::new(log_n / 2),
            row_steps: root_powers(w, side),
            inv_row_steps: root_powers(w_inv, side),
        }
    }

    fn transform(&self, x: &mut [u64], dir: Direction) {
        assert_eq!(x.len(), self.n, "transform length mismatch");
        transpose_square(x, self.side);
        self.row_pass(x, dir, true);
        transpose_square(x, self.side);
        self.row_pass(x, dir, false);
        transpose_square(x, self.side);
    }

    fn row_pass(&self, x: &mut [u64], dir: Direction, twiddle: bool) {
        let steps = match dir {
            Direction::Forward => &self.row_steps,
            Direction::Inverse => &self.inv_row_steps,
        };
        x.par_chunks_mut(self.side)
            .enumerate()
            .for_each(|(r, row)| {
                match dir {
                    Direction::Forward => self.rows.fft(row),
                    Direction::Inverse => self.rows.inv_fft(row),
                }
                if twiddle && r > 0 {
                    let step = steps[r];
                    let mut w = step;
                    for v in row.iter_mut().skip(1) {
                        *v = mod_mul(*v, w);
                        w = mod_mul(w, step);
                    }
                }
            });
    }
}

impl Fft for FftFourStep {
    fn log_n(&self) -> u8 {
        self.log_n
    }

    fn fft(&self, x: &mut [u64]) {
        self.transform(x, Direction::Forward);
    }

    fn inv_fft(&self, x: &mut [u64]) {
        self.transform(x, Direction::Inverse);
    }
}
