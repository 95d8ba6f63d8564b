//! Property-based tests for the field kernel, transforms, tables and carry
//! primitives.
//!
//! Every property is checked against an independent computation: `rug`
//! (GMP) for field and big-integer arithmetic, or the other kernel backend.
//!
//! # How to run
//!
//! ```bash
//! cargo test --test property_tests
//!
//! # More cases per property (default is 256):
//! PROPTEST_CASES=10000 cargo test --test property_tests
//! ```
//!
//! Properties are named `prop_<function>_<invariant>`.

use mersenne::fft::{Fft, FftFastish, FftFourStep, FftUnrolled};
use mersenne::modmath::{
    self, mod_add, mod_adc, mod_inv, mod_mul, mod_pow, mod_reduce, mod_sqr, mod_sub, portable,
    wide, MOD_P,
};
use mersenne::tables::DigitTables;
use mersenne::vector::{mod_vector_mul, mod_vector_sqr};
use mersenne::verify::mersenne_number;
use mersenne::Mersenne;
use proptest::prelude::*;
use rug::ops::RemRounding;
use rug::Integer;

fn big_mod(v: Integer) -> u64 {
    Integer::from((&v).rem_euc(&Integer::from(MOD_P)))
        .to_u64()
        .unwrap_or(u64::MAX)
}

fn field_element() -> impl Strategy<Value = u64> {
    prop_oneof![
        0..MOD_P,
        Just(0u64),
        Just(1u64),
        Just(MOD_P - 1),
        Just(MOD_P - 2),
        Just(0xFFFF_FFFFu64),
        Just(0x1_0000_0000u64),
    ]
}

// == Field Kernel ==============================================================
// The kernel is the only place reduction by P happens. Both backends must
// agree with GMP on every input in [0, P).
// ==============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10_000))]

    /// inv(x)·x ≡ 1 for every non-zero field element.
    #[test]
    fn prop_mod_inv_roundtrip(x in 1u64..MOD_P) {
        let inv = mod_inv(x).unwrap();
        prop_assert_eq!(mod_mul(x, inv), 1, "x = {:#x}, inv = {:#x}", x, inv);
    }
}

proptest! {
    #[test]
    fn prop_mod_mul_matches_big_int(x in field_element(), y in field_element()) {
        let expected = big_mod(Integer::from(x) * y);
        prop_assert_eq!(wide::mod_mul(x, y), expected);
        prop_assert_eq!(portable::mod_mul(x, y), expected);
        prop_assert_eq!(mod_sqr(x), big_mod(Integer::from(x) * x));
    }

    #[test]
    fn prop_mod_add_sub_match_big_int(x in field_element(), y in field_element()) {
        prop_assert_eq!(mod_add(x, y), big_mod(Integer::from(x) + y));
        prop_assert_eq!(mod_sub(x, y), big_mod(Integer::from(x) - y));
        prop_assert_eq!(portable::mod_add(x, y), wide::mod_add(x, y));
        prop_assert_eq!(portable::mod_sub(x, y), wide::mod_sub(x, y));
    }

    /// Reduction accepts any 128-bit value, not just products of reduced inputs.
    #[test]
    fn prop_mod_reduce_any_128_bit(hi in any::<u64>(), lo in any::<u64>()) {
        let expected = big_mod((Integer::from(hi) << 64u32) + lo);
        prop_assert_eq!(mod_reduce(hi, lo), expected);
        prop_assert_eq!(portable::mod_reduce(hi, lo), wide::mod_reduce(hi, lo));
    }

    #[test]
    fn prop_mod_pow_matches_big_int(x in field_element(), e in any::<u64>()) {
        let expected = Integer::from(x)
            .pow_mod(&Integer::from(e), &Integer::from(MOD_P))
            .map(|v| v.to_u64().unwrap_or(u64::MAX))
            .unwrap_or(u64::MAX);
        prop_assert_eq!(mod_pow(x, e), expected);
    }

    /// adc splits x + carry at `width` bits, for both backends.
    #[test]
    fn prop_mod_adc_splits_sum(width in 0u8..40, x_bits in any::<u64>(), carry in 0u64..(1 << 63)) {
        let x = x_bits & ((1u64 << width) - 1);
        let mut c_wide = carry;
        let mut c_portable = carry;
        let low = wide::mod_adc(x, width, &mut c_wide);
        let low_p = portable::mod_adc(x, width, &mut c_portable);
        let sum = x as u128 + carry as u128;
        prop_assert_eq!(low as u128 + ((c_wide as u128) << width), sum);
        prop_assert!(width == 0 || low < 1u64 << width);
        prop_assert_eq!((low, c_wide), (low_p, c_portable));
        let mut c = carry;
        prop_assert_eq!(mod_adc(x, width, &mut c), low);
    }
}

// == Vector Ops ================================================================

proptest! {
    #[test]
    fn prop_vector_ops_are_elementwise(
        pairs in proptest::collection::vec((field_element(), field_element()), 0..64),
    ) {
        let (mut x, y): (Vec<u64>, Vec<u64>) = pairs.into_iter().unzip();
        let orig = x.clone();
        mod_vector_mul(&mut x, &y);
        for i in 0..x.len() {
            prop_assert_eq!(x[i], mod_mul(orig[i], y[i]));
        }
        let mut s = orig.clone();
        mod_vector_sqr(&mut s);
        for i in 0..s.len() {
            prop_assert_eq!(s[i], mod_sqr(orig[i]));
        }
    }
}

// == Transforms ================================================================
// Each strategy round-trips at a size where automatic selection picks it:
// inv_fft(fft(v)) == n·v.
// ==============================================================================

fn assert_round_trip(t: &dyn Fft, v: &[u64]) -> Result<(), TestCaseError> {
    let n = t.size() as u64;
    let mut x = v.to_vec();
    t.fft(&mut x);
    t.inv_fft(&mut x);
    for (i, (&got, &orig)) in x.iter().zip(v).enumerate() {
        prop_assert_eq!(got, mod_mul(orig, n), "index {}", i);
    }
    Ok(())
}

fn random_vector(log_n: u8) -> impl Strategy<Value = Vec<u64>> {
    proptest::collection::vec(0..MOD_P, 1usize << log_n)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_unrolled_round_trip(log_n in 0u8..=10, seed in any::<u64>()) {
        let n = 1usize << log_n;
        let v: Vec<u64> = (0..n as u64)
            .map(|i| mod_mul(seed % MOD_P, i + 1))
            .collect();
        assert_round_trip(&FftUnrolled::new(log_n), &v)?;
    }

    #[test]
    fn prop_fastish_round_trip(v in random_vector(11)) {
        assert_round_trip(&FftFastish::new(11), &v)?;
    }

    #[test]
    fn prop_four_step_round_trip(v in random_vector(12)) {
        assert_round_trip(&FftFourStep::new(12), &v)?;
    }

    /// The convolution theorem: pointwise products of transforms give the
    /// cyclic convolution, for a strategy chosen at random.
    #[test]
    fn prop_transform_convolves(
        a in proptest::collection::vec(0u64..1 << 20, 64),
        b in proptest::collection::vec(0u64..1 << 20, 64),
        which in 0usize..3,
    ) {
        let t: Box<dyn Fft> = match which {
            0 => Box::new(FftUnrolled::new(6)),
            1 => Box::new(FftFourStep::new(6)),
            _ => Box::new(FftFastish::new(6)),
        };
        let mut fa = a.clone();
        let mut fb = b.clone();
        t.fft(&mut fa);
        t.fft(&mut fb);
        mod_vector_mul(&mut fa, &fb);
        t.inv_fft(&mut fa);

        for k in 0..64 {
            let mut sum = 0u64;
            for j in 0..64 {
                sum = mod_add(sum, mod_mul(a[j], b[(64 + k - j) % 64]));
            }
            prop_assert_eq!(fa[k], mod_mul(sum, 64), "k = {}", k);
        }
    }
}

// == Tables ====================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Widths sum to q and stay balanced for every accepted (log_n, q).
    #[test]
    fn prop_digit_widths_sum_to_exponent(log_n in 0u8..=14, q in 2u64..200_000) {
        if let Ok(t) = DigitTables::build(log_n, q) {
            let total: u64 = t.digit_widths.iter().map(|&w| w as u64).sum();
            prop_assert_eq!(total, q);
            let w = t.small_width;
            prop_assert!(t.digit_widths.iter().all(|&d| d == w || d == w + 1));
            prop_assert_eq!(mod_pow(t.root2, t.n as u64), 2);
        }
    }

    /// weight then unweight leaves v/n, i.e. n·(v·weight·unweight) == v.
    #[test]
    fn prop_weight_unweight_round_trip(log_n in 0u8..=10, q in 2u64..100_000, seed in any::<u64>()) {
        if let Ok(t) = DigitTables::build(log_n, q) {
            let v: Vec<u64> = (0..t.n as u64).map(|i| mod_mul(seed % MOD_P, i + 3)).collect();
            let mut x = v.clone();
            mod_vector_mul(&mut x, &t.weight);
            mod_vector_mul(&mut x, &t.unweight);
            for i in 0..t.n {
                prop_assert_eq!(mod_mul(x[i], t.n as u64), v[i]);
            }
        }
    }
}

#[test]
fn root_of_two_for_every_size() {
    for log_n in 0..=modmath::MAX_LOG_N {
        assert_eq!(mod_pow(modmath::root_of_two(log_n), 1u64 << log_n), 2, "log_n={}", log_n);
    }
}

// == Carry Primitives ==========================================================
// add32/add64/sub32 must keep the value congruent mod 2^q − 1 and leave every
// limb inside its width.
// ==============================================================================

fn limbs_valid(m: &Mersenne) -> bool {
    m.limbs()
        .iter()
        .zip(m.digit_widths())
        .all(|(&limb, &width)| limb < 1u64 << width)
}

fn reduced(v: Integer, q: u64) -> Integer {
    Integer::from((&v).rem_euc(&mersenne_number(q)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_add64_matches_big_int(
        log_n in 2u8..=6,
        q in prop::sample::select(vec![89u64, 107, 127, 521, 607]),
        start_bits in proptest::collection::vec(any::<u64>(), 10),
        c in any::<u64>(),
    ) {
        let Ok(mut m) = Mersenne::initialise(log_n, q) else { return Ok(()) };
        let mut v = Integer::new();
        for word in &start_bits {
            v = (v << 64u32) + *word;
        }
        let v = reduced(v, q);
        m.load(&v);
        m.add64(c);
        prop_assert!(limbs_valid(&m));
        prop_assert_eq!(reduced(m.value(), q), reduced(v + c, q));
    }

    #[test]
    fn prop_add32_sub32_match_big_int(
        log_n in 2u8..=9,
        q in prop::sample::select(vec![89u64, 127, 521]),
        start_bits in proptest::collection::vec(any::<u64>(), 9),
        c in 0u32..64,
        start_frac in 0.0f64..1.0,
    ) {
        let Ok(mut m) = Mersenne::initialise(log_n, q) else { return Ok(()) };
        let mut v = Integer::new();
        for word in &start_bits {
            v = (v << 64u32) + *word;
        }
        let v = reduced(v, q);
        let start = ((m.n() as f64 * start_frac) as usize).min(m.n() - 1);
        let offset: u32 = m.digit_widths()[..start].iter().map(|&w| w as u32).sum();

        m.load(&v);
        m.add32(c, start);
        prop_assert!(limbs_valid(&m));
        let added = reduced(Integer::from(&v) + (Integer::from(c) << offset), q);
        prop_assert_eq!(reduced(m.value(), q), added.clone());

        m.sub32(c);
        prop_assert!(limbs_valid(&m));
        prop_assert_eq!(reduced(m.value(), q), reduced(added - c, q));
    }

    /// One squaring step is x² − 2 mod 2^q − 1 on random states.
    #[test]
    fn prop_mul_is_square_minus_two(
        log_n in 3u8..=7,
        start_bits in proptest::collection::vec(any::<u64>(), 2),
    ) {
        let q = 127;
        let mut m = Mersenne::initialise(log_n, q).unwrap();
        let v = reduced((Integer::from(start_bits[0]) << 64u32) + start_bits[1], q);
        m.load(&v);
        m.mul();
        prop_assert!(limbs_valid(&m));
        prop_assert_eq!(reduced(m.value(), q), reduced(Integer::from(&v * &v) - 2u32, q));
    }
}
