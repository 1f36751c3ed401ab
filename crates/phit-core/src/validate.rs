//! Statistical validation of generator and router output.
//!
//! Pure analysis functions over caller-supplied words or counts. Each check
//! returns pass/fail plus the underlying statistic; nothing here mutates
//! pool, PRNG, or router state, and a failing result is a diagnostic signal
//! for the caller, never an error.
//!
//! Thresholds follow the classical two-sided 99.9% z bound (3.29) for the
//! bit-level tests and the p = 0.01 chi-squared critical values for the
//! distribution tests; p-values come from `statrs`.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::function::erf::erfc;
use std::io::Write;

use crate::mix::mix32;
use crate::prng::PhitPrng;
use crate::sampler::Sampler;
use crate::timer::now_ns;
use crate::workload::{AluChain, Workload};

/// Two-sided z threshold at the 99.9% level.
const Z_THRESHOLD: f64 = 3.29;

/// Chi-squared critical value for 255 degrees of freedom at p = 0.01.
const BYTE_CHI2_CRITICAL: f64 = 310.0;

/// Result of a single statistical check.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    /// Check name.
    pub name: String,
    /// Whether the check passed its documented threshold.
    pub passed: bool,
    /// Tail probability of the statistic under the null, where defined.
    pub p_value: Option<f64>,
    /// The underlying statistic (z-score or chi-squared).
    pub statistic: f64,
    /// Human-readable detail line.
    pub details: String,
}

impl TestResult {
    fn insufficient(name: &str, needed: usize, got: usize) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            p_value: None,
            statistic: 0.0,
            details: format!("insufficient data: need {needed} words, got {got}"),
        }
    }
}

/// Per-bit-position entropy analysis of 64-bit output words.
#[derive(Debug, Clone, Serialize)]
pub struct BitEntropy {
    /// Shannon entropy of each bit position (0 = LSB).
    pub per_bit: Vec<f64>,
    /// Total entropy out of 64 bits.
    pub total_bits: f64,
    /// Weakest bit position.
    pub weakest_bit: usize,
    /// Entropy of the weakest bit.
    pub weakest_entropy: f64,
    /// Strongest bit position.
    pub strongest_bit: usize,
    /// Entropy of the strongest bit.
    pub strongest_entropy: f64,
    /// Whether total entropy reached 60 of 64 bits.
    pub passed: bool,
}

// ---------------------------------------------------------------------------
// Bit-level tests
// ---------------------------------------------------------------------------

/// Monobit test: fraction of set bits across all words vs 0.5.
pub fn monobit(words: &[u64]) -> TestResult {
    let name = "monobit";
    if words.len() < 16 {
        return TestResult::insufficient(name, 16, words.len());
    }
    let total_bits = words.len() as f64 * 64.0;
    let ones: u64 = words.iter().map(|w| w.count_ones() as u64).sum();
    let ratio = ones as f64 / total_bits;
    let z = (ratio - 0.5).abs() / (0.25 / total_bits).sqrt();
    let p = erfc(z / 2.0_f64.sqrt());
    TestResult {
        name: name.to_string(),
        passed: z < Z_THRESHOLD,
        p_value: Some(p),
        statistic: z,
        details: format!("{ones} ones in {total_bits:.0} bits ({:.4})", ratio),
    }
}

/// Runs test: bit-level run transitions vs the expectation for the observed
/// bit bias, using the standard runs-test variance.
pub fn runs(words: &[u64]) -> TestResult {
    let name = "runs";
    if words.len() < 16 {
        return TestResult::insufficient(name, 16, words.len());
    }
    let n = words.len() as f64 * 64.0;
    let mut runs_count: u64 = 1;
    let mut ones: u64 = 0;
    let mut prev_bit = words[0] & 1;
    let mut first = true;
    for &w in words {
        for b in 0..64 {
            let bit = (w >> b) & 1;
            ones += bit;
            if !first && bit != prev_bit {
                runs_count += 1;
            }
            prev_bit = bit;
            first = false;
        }
    }

    let pi = ones as f64 / n;
    let product = n * pi * (1.0 - pi);
    let expected = 1.0 + 2.0 * product;
    let variance = 2.0 * product * (2.0 * product - 1.0) / (n - 1.0);
    if variance < 1e-10 {
        return TestResult {
            name: name.to_string(),
            passed: false,
            p_value: Some(0.0),
            statistic: 0.0,
            details: "zero variance: bits are constant".to_string(),
        };
    }
    let z = (runs_count as f64 - expected).abs() / variance.sqrt();
    let p = erfc(z / 2.0_f64.sqrt());
    TestResult {
        name: name.to_string(),
        passed: z < Z_THRESHOLD,
        p_value: Some(p),
        statistic: z,
        details: format!("{runs_count} runs, expected {expected:.0}"),
    }
}

/// Per-bit-position Shannon entropy over the word stream.
pub fn bit_entropy(words: &[u64]) -> BitEntropy {
    let n = words.len() as f64;
    let mut ones = [0u64; 64];
    for &w in words {
        for (b, count) in ones.iter_mut().enumerate() {
            *count += (w >> b) & 1;
        }
    }

    let mut per_bit = Vec::with_capacity(64);
    let mut total = 0.0;
    let mut weakest = (0usize, f64::INFINITY);
    let mut strongest = (0usize, f64::NEG_INFINITY);
    for (b, &c) in ones.iter().enumerate() {
        let p1 = if n > 0.0 { c as f64 / n } else { 0.0 };
        let p0 = 1.0 - p1;
        let h = if p0 > 1e-10 && p1 > 1e-10 {
            -(p0 * p0.log2() + p1 * p1.log2())
        } else {
            0.0
        };
        if h < weakest.1 {
            weakest = (b, h);
        }
        if h > strongest.1 {
            strongest = (b, h);
        }
        per_bit.push(h);
        total += h;
    }

    BitEntropy {
        per_bit,
        total_bits: total,
        weakest_bit: weakest.0,
        weakest_entropy: weakest.1,
        strongest_bit: strongest.0,
        strongest_entropy: strongest.1,
        passed: total >= 60.0,
    }
}

// ---------------------------------------------------------------------------
// Distribution tests
// ---------------------------------------------------------------------------

/// Chi-squared goodness-of-fit of byte frequencies against uniform over 256
/// buckets (df = 255, critical 310 at p = 0.01).
pub fn byte_distribution(words: &[u64]) -> TestResult {
    let name = "byte_distribution";
    // Want an expected count of at least ~5 per bucket.
    if words.len() < 160 {
        return TestResult::insufficient(name, 160, words.len());
    }
    let mut hist = [0u64; 256];
    for &w in words {
        for byte in w.to_le_bytes() {
            hist[byte as usize] += 1;
        }
    }
    let total = words.len() as f64 * 8.0;
    let expected = total / 256.0;
    let chi2: f64 = hist
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum();
    let p = ChiSquared::new(255.0).expect("valid df").sf(chi2);
    TestResult {
        name: name.to_string(),
        passed: chi2 < BYTE_CHI2_CRITICAL,
        p_value: Some(p),
        statistic: chi2,
        details: format!("{total:.0} bytes, expected {expected:.1} per bucket"),
    }
}

/// Chi-squared of routing slot occupancy against the uniform expectation.
///
/// The critical value is approximated as `df + 2*sqrt(df)` for
/// `df = slots - 1`, matching the calibration verification procedure.
pub fn routing_uniformity(counts: &[u64]) -> TestResult {
    let name = "routing_uniformity";
    let k = counts.len();
    let total: u64 = counts.iter().sum();
    if k < 2 || total == 0 {
        return TestResult {
            name: name.to_string(),
            passed: false,
            p_value: None,
            statistic: 0.0,
            details: format!("need >= 2 slots with draws, got {k} slots / {total} draws"),
        };
    }
    let expected = total as f64 / k as f64;
    let chi2: f64 = counts
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum();
    let df = (k - 1) as f64;
    let critical = df + 2.0 * df.sqrt();
    let p = ChiSquared::new(df).expect("valid df").sf(chi2);
    TestResult {
        name: name.to_string(),
        passed: chi2 < critical,
        p_value: Some(p),
        statistic: chi2,
        details: format!("{total} draws over {k} slots, critical {critical:.2}"),
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Shannon entropy in bits of an empirical count histogram.
///
/// This is the phit metric: applied to a raw-delta histogram it gives the
/// extractable information of one sample under its observed distribution.
pub fn shannon_entropy_of_counts(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    let mut h = 0.0;
    for &c in counts {
        if c > 0 {
            let p = c as f64 / n;
            h -= p * p.log2();
        }
    }
    h
}

/// zlib level-9 compression ratio of a byte stream. Ratios near (or above)
/// 1.0 mean no exploitable structure; low ratios mean redundancy.
pub fn compression_ratio(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::best());
    if enc.write_all(data).is_err() {
        return 0.0;
    }
    match enc.finish() {
        Ok(c) => c.len() as f64 / data.len() as f64,
        Err(_) => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Self-test
// ---------------------------------------------------------------------------

/// One-shot self-test with generous thresholds.
///
/// Fails if hash determinism breaks, if two consecutive PRNG outputs are
/// equal, if the monobit ratio over 64,000 bits falls outside [0.45, 0.55],
/// if quick-route chi-squared over 8 buckets / 10,000 draws exceeds 30.0, or
/// if the timer fails to advance across a workload call.
pub fn selftest() -> bool {
    // Hash determinism.
    if mix32(42) != mix32(42) || mix32(42) == mix32(43) {
        return false;
    }

    // Consecutive PRNG outputs must differ.
    let mut rng = PhitPrng::new();
    if rng.next_u64() == rng.next_u64() {
        return false;
    }

    // Monobit over 1000 words.
    let words: Vec<u64> = (0..1000).map(|_| rng.next_u64()).collect();
    let ones: u64 = words.iter().map(|w| w.count_ones() as u64).sum();
    let ratio = ones as f64 / (1000.0 * 64.0);
    if !(0.45..=0.55).contains(&ratio) {
        return false;
    }

    // Quick-route uniformity, 8 buckets, 10k draws, generous bound.
    let mut sampler = Sampler::new();
    let mut buckets = [0u64; 8];
    for _ in 0..10_000 {
        buckets[sampler.route(8)] += 1;
    }
    let expected = 10_000.0 / 8.0;
    let chi2: f64 = buckets
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum();
    if chi2 > 30.0 {
        return false;
    }

    // Timer advances across a workload call.
    let mut workload = AluChain::default();
    let t1 = now_ns();
    workload.run();
    let t2 = now_ns();
    t2 > t1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mix::mix64;

    /// Deterministic high-quality word stream (splitmix64 over a golden-ratio
    /// counter).
    fn reference_words(n: usize, seed: u64) -> Vec<u64> {
        (0..n as u64)
            .map(|i| mix64(seed.wrapping_add((i + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15))))
            .collect()
    }

    #[test]
    fn monobit_passes_on_reference_stream() {
        let r = monobit(&reference_words(10_000, 0xDEAD_BEEF));
        assert!(r.passed, "{}: z={}", r.details, r.statistic);
    }

    #[test]
    fn monobit_fails_on_constant_stream() {
        let r = monobit(&vec![0u64; 1000]);
        assert!(!r.passed);
        let r = monobit(&vec![u64::MAX; 1000]);
        assert!(!r.passed);
    }

    #[test]
    fn monobit_rejects_short_input() {
        let r = monobit(&[1, 2, 3]);
        assert!(!r.passed);
        assert!(r.p_value.is_none());
    }

    #[test]
    fn runs_passes_on_reference_stream() {
        let r = runs(&reference_words(10_000, 0xDEAD_BEEF));
        assert!(r.passed, "{}: z={}", r.details, r.statistic);
    }

    #[test]
    fn runs_fails_on_alternating_bits() {
        // 0xAAAA... has perfect bit balance but twice the expected
        // transitions.
        let r = runs(&vec![0xAAAA_AAAA_AAAA_AAAAu64; 1000]);
        assert!(!r.passed);
    }

    #[test]
    fn runs_reports_zero_variance_on_constant_bits() {
        let r = runs(&vec![0u64; 1000]);
        assert!(!r.passed);
        assert_eq!(r.p_value, Some(0.0));
    }

    #[test]
    fn byte_distribution_passes_on_reference_stream() {
        let r = byte_distribution(&reference_words(25_000, 0xDEAD_BEEF));
        assert!(r.passed, "{}: chi2={}", r.details, r.statistic);
    }

    #[test]
    fn byte_distribution_fails_on_single_value() {
        let r = byte_distribution(&vec![0x4242_4242_4242_4242u64; 1000]);
        assert!(!r.passed);
        assert!(r.statistic > BYTE_CHI2_CRITICAL);
    }

    #[test]
    fn bit_entropy_high_on_reference_stream() {
        let be = bit_entropy(&reference_words(10_000, 0xDEAD_BEEF));
        assert!(be.passed, "total {}", be.total_bits);
        assert!(be.total_bits > 63.0);
        assert!(be.weakest_entropy > 0.99);
    }

    #[test]
    fn bit_entropy_flags_stuck_bit() {
        // Clear bit 7 in an otherwise good stream.
        let words: Vec<u64> = reference_words(10_000, 1)
            .into_iter()
            .map(|w| w & !(1 << 7))
            .collect();
        let be = bit_entropy(&words);
        assert_eq!(be.weakest_bit, 7);
        assert_eq!(be.weakest_entropy, 0.0);
        assert!(be.total_bits < 64.0);
    }

    #[test]
    fn bit_entropy_empty_input() {
        let be = bit_entropy(&[]);
        assert_eq!(be.total_bits, 0.0);
        assert!(!be.passed);
    }

    #[test]
    fn routing_uniformity_passes_exact_uniform() {
        let r = routing_uniformity(&[1250u64; 8]);
        assert!(r.passed);
        assert_eq!(r.statistic, 0.0);
    }

    #[test]
    fn routing_uniformity_fails_collapsed() {
        let mut counts = [0u64; 8];
        counts[0] = 10_000;
        let r = routing_uniformity(&counts);
        assert!(!r.passed);
    }

    #[test]
    fn routing_uniformity_rejects_degenerate_input() {
        assert!(!routing_uniformity(&[]).passed);
        assert!(!routing_uniformity(&[100]).passed);
        assert!(!routing_uniformity(&[0, 0, 0]).passed);
    }

    #[test]
    fn shannon_entropy_of_counts_known_values() {
        assert_eq!(shannon_entropy_of_counts(&[]), 0.0);
        assert_eq!(shannon_entropy_of_counts(&[100]), 0.0);
        let h = shannon_entropy_of_counts(&[50, 50]);
        assert!((h - 1.0).abs() < 1e-12);
        let h = shannon_entropy_of_counts(&[25, 25, 25, 25]);
        assert!((h - 2.0).abs() < 1e-12);
    }

    #[test]
    fn compression_ratio_separates_structure_from_noise() {
        let structured = vec![7u8; 4096];
        let noisy: Vec<u8> = reference_words(512, 99)
            .iter()
            .flat_map(|w| w.to_le_bytes())
            .collect();
        assert!(compression_ratio(&structured) < 0.05);
        assert!(compression_ratio(&noisy) > 0.9);
        assert_eq!(compression_ratio(&[]), 0.0);
    }

    #[test]
    fn results_serialize_to_json() {
        let r = monobit(&reference_words(100, 5));
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"name\":\"monobit\""));
        let be = bit_entropy(&reference_words(100, 5));
        let json = serde_json::to_string(&be).unwrap();
        assert!(json.contains("\"total_bits\""));
    }

    #[test]
    fn validator_agrees_with_independent_generator() {
        // Sanity-check thresholds against a known-good generator.
        use rand::{RngCore, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED);
        let words: Vec<u64> = (0..10_000).map(|_| rng.next_u64()).collect();
        assert!(monobit(&words).passed);
        assert!(runs(&words).passed);
        let r = byte_distribution(&words);
        // Fixed stream, so assert the distribution is not wildly off
        // rather than re-rolling the exact 1% critical value.
        assert!(r.p_value.unwrap() > 1e-6, "chi2={}", r.statistic);
    }

    #[test]
    fn selftest_passes_on_this_machine() {
        assert!(selftest());
    }
}
