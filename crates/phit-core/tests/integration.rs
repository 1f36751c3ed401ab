//! Integration tests for phit-core.
//!
//! These tests drive the full pipeline on live timing jitter:
//! sampler → pool → PRNG, and sampler → calibration → routing. Uniformity
//! properties with tight bounds are certified by the deterministic unit
//! tests; here the assertions are the structural and generous-threshold
//! kind that hold on any host with a working monotonic clock.

use phit_core::{
    CalibrationTable, MAX_DELTA, PhitPrng, Sampler, selftest,
    validate::{bit_entropy, byte_distribution, monobit, runs},
};

#[test]
fn selftest_passes() {
    assert!(selftest(), "self-test failed on this host");
}

#[test]
fn prng_end_to_end_scenario() {
    let mut rng = PhitPrng::new();

    for _ in 0..10 {
        let v = rng.next_f64();
        assert!((0.0..1.0).contains(&v), "next_f64 out of range: {v}");
    }

    let mut buf = [0u8; 32];
    rng.fill(&mut buf);
    assert!(buf.iter().any(|&b| b != 0));
}

#[test]
fn prng_outputs_are_pairwise_distinct_in_sequence() {
    let mut rng = PhitPrng::new();
    let mut prev = rng.next_u64();
    for _ in 0..100_000 {
        let next = rng.next_u64();
        assert_ne!(next, prev, "adjacent PRNG outputs collided");
        prev = next;
    }
}

#[test]
fn prng_output_passes_generous_quality_battery() {
    // 16k words ≈ one million generated bits.
    let mut rng = PhitPrng::new();
    let words: Vec<u64> = (0..16_000).map(|_| rng.next_u64()).collect();

    let m = monobit(&words);
    assert!(m.passed, "monobit: {} (z={})", m.details, m.statistic);

    let r = runs(&words);
    assert!(r.passed, "runs: {} (z={})", r.details, r.statistic);

    let b = byte_distribution(&words);
    // Live stream: require "not wildly nonuniform" rather than the exact
    // 1% critical value.
    assert!(
        b.p_value.unwrap() > 1e-6,
        "byte distribution far from uniform: chi2={}",
        b.statistic
    );

    let e = bit_entropy(&words);
    assert!(
        e.total_bits > 60.0,
        "per-bit entropy too low: {:.2}/64 (weakest bit {})",
        e.total_bits,
        e.weakest_bit
    );
}

#[test]
fn calibrate_then_route_scenario() {
    let mut sampler = Sampler::new();
    let table = CalibrationTable::calibrate(&mut sampler, 4, 50_000).expect("calibration");

    assert_eq!(table.num_slots(), 4);
    assert_eq!(table.sample_count(), 50_000);

    // Route fresh deltas; occupancy must be a valid partition and the
    // frozen table must answer identically on repeat lookups.
    let mut counts = [0u64; 4];
    let mut probes = Vec::new();
    for _ in 0..10_000 {
        let d = sampler.timed_delta();
        let slot = table.route(d);
        assert!(slot < 4);
        counts[slot] += 1;
        probes.push((d, slot));
    }
    assert_eq!(counts.iter().sum::<u64>(), 10_000);
    for (d, slot) in probes {
        assert_eq!(table.route(d), slot);
    }

    // Monotone over the whole domain.
    let mut prev = 0;
    for d in 0..MAX_DELTA as u64 {
        let s = table.route(d);
        assert!(s >= prev);
        prev = s;
    }
}

#[test]
fn recalibration_builds_an_independent_table() {
    let mut sampler = Sampler::new();
    let first = CalibrationTable::calibrate(&mut sampler, 8, 10_000).expect("calibration");
    let second = CalibrationTable::calibrate(&mut sampler, 8, 10_000).expect("recalibration");

    // Both frozen tables stay usable side by side.
    for d in [0u64, 50, 125, 500, 5_000] {
        assert!(first.route(d) < 8);
        assert!(second.route(d) < 8);
    }
    assert_eq!(first.sample_count(), 10_000);
    assert_eq!(second.sample_count(), 10_000);
}

#[test]
fn independent_instances_per_thread() {
    // The concurrency contract: no shared state, one instance per thread.
    let handles: Vec<_> = (0..4)
        .map(|_| {
            std::thread::spawn(|| {
                let mut sampler = Sampler::new();
                let table =
                    CalibrationTable::calibrate(&mut sampler, 4, 2_000).expect("calibration");
                let mut rng = PhitPrng::new();
                let mut acc = 0u64;
                for _ in 0..100 {
                    acc ^= rng.next_u64();
                    let _ = table.route(sampler.timed_delta());
                }
                acc
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }
}
