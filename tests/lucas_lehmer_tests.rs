//! End-to-end Lucas–Lehmer runs on known Mersenne primes and composites,
//! across all three transform strategies.
//!
//! Exponents up to a few thousand finish in well under a second each; the
//! largest here (q = 2203) is the slowest.

use mersenne::fft::FftKind;
use mersenne::verify::reference_residue;
use mersenne::{test_exponent, Mersenne, MersenneError, RunConfig};

fn full_residue(q: u64) -> u64 {
    let mut m = Mersenne::auto_initialise(q).unwrap();
    m.run(0);
    m.residue()
}

#[test]
fn known_mersenne_primes() {
    for &q in &[3u64, 5, 7, 13, 17, 19, 31, 61, 89, 107, 127, 521, 607, 1279, 2203] {
        assert_eq!(full_residue(q), 0, "M{} should be prime", q);
    }
}

#[test]
fn known_composites_have_known_residues() {
    assert_eq!(full_residue(11), 0x6C8);
    assert_eq!(full_residue(23), 0x5D32F7);
    assert_eq!(full_residue(29), 0x1B57CB0B);
    assert_eq!(full_residue(101), 0xD0DD748DD7817436);
}

#[test]
fn prime_exponent_composites_are_rejected() {
    for &q in &[37u64, 41, 43, 47, 53, 59, 67, 71, 73, 79, 83, 97, 101, 103, 109, 113] {
        assert_ne!(full_residue(q), 0, "M{} should be composite", q);
    }
}

#[test]
fn partial_run_matches_reference() {
    let mut m = Mersenne::auto_initialise(1000).unwrap();
    m.run(10);
    assert_eq!(m.residue(), 0xD63496C75B54CC05);

    let mut m = Mersenne::auto_initialise(4423).unwrap();
    m.run(50);
    assert_eq!(m.residue(), reference_residue(4423, 50));
}

#[test]
fn m127_on_fastish_size() {
    let mut m = Mersenne::initialise(11, 127).unwrap();
    assert_eq!(m.fft_kind(), FftKind::Fastish);
    assert_eq!(m.run(0), 125);
    assert_eq!(m.residue(), 0);
}

#[test]
fn m127_on_four_step_size() {
    let mut m = Mersenne::initialise(12, 127).unwrap();
    assert_eq!(m.fft_kind(), FftKind::FourStep);
    assert_eq!(m.run(0), 125);
    assert_eq!(m.residue(), 0);
}

#[test]
fn large_strategies_agree_with_reference_on_wide_digits() {
    // q large enough that both strategies carry multi-bit digits
    let q = 44497;
    let expected = reference_residue(q, 5);
    for log_n in [11u8, 12, 13] {
        let mut m = Mersenne::initialise(log_n, q).unwrap();
        m.run(5);
        assert_eq!(m.residue(), expected, "log_n={} ({})", log_n, m.fft_kind());
    }
}

#[test]
fn m44497_auto_size_is_four_step_or_fastish() {
    let m = Mersenne::auto_initialise(44497).unwrap();
    assert!(m.log_n() > 10);
    assert_ne!(m.fft_kind(), FftKind::Unrolled);
}

#[test]
fn test_exponent_with_verification() {
    let config = RunConfig {
        verify: true,
        ..RunConfig::default()
    };
    let report = test_exponent(521, &config, None).unwrap();
    assert_eq!(report.iterations, 519);
    assert_eq!(report.is_prime, Some(true));
    assert!(report.verified);

    let report = test_exponent(523, &config, None).unwrap();
    assert_eq!(report.is_prime, Some(false));
    assert_ne!(report.residue, 0);
}

#[test]
fn test_exponent_rejects_impossible_forced_size() {
    let config = RunConfig {
        log_n: Some(4),
        ..RunConfig::default()
    };
    let e = test_exponent(44497, &config, None).unwrap_err();
    assert!(matches!(e, MersenneError::DigitWidthOverflow { log_n: 4, .. }));
}

#[test]
fn report_serializes_to_json() {
    let config = RunConfig {
        iterations: 9,
        ..RunConfig::default()
    };
    let report = test_exponent(11, &config, None).unwrap();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["exponent"], 11);
    assert_eq!(json["residue_hex"], "0x00000000000006C8");
    assert_eq!(json["fft"], "unrolled");
    assert_eq!(json["full_test"], true);
    assert_eq!(json["is_prime"], false);
}
