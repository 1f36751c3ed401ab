use phit_core::CalibrationTable;
use phit_core::validate::routing_uniformity;

pub fn run(slots: usize, calibrate: usize, draws: usize, workload: &str, json: bool) {
    let mut sampler = super::make_sampler(workload);

    if !json {
        println!("Calibrating {slots} slots with {calibrate} samples...");
    }
    let table = match CalibrationTable::calibrate(&mut sampler, slots, calibrate) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("calibration failed: {e}");
            std::process::exit(2);
        }
    };
    let summary = table.summary();

    let mut counts = vec![0u64; slots];
    for _ in 0..draws {
        counts[table.route(sampler.timed_delta())] += 1;
    }
    let verdict = routing_uniformity(&counts);

    if json {
        let report = serde_json::json!({
            "calibration": summary,
            "draws": draws,
            "slot_counts": counts,
            "uniformity": verdict,
        });
        println!("{}", serde_json::to_string_pretty(&report).expect("serializable report"));
        return;
    }

    println!(
        "Calibrated: {} distinct deltas, dominant share {:.1}%, {:.2} phits/sample",
        summary.distinct_deltas,
        100.0 * summary.dominant_share,
        summary.delta_entropy_bits
    );
    if summary.overflow_samples > 0 {
        println!(
            "  warning: {} samples clamped from above the delta domain",
            summary.overflow_samples
        );
    }

    let expected = table.expected_per_slot(draws as u64);
    println!("\n  {:>4} | {:>8} | {:>6} | ", "Slot", "Count", "%");
    for (slot, &c) in counts.iter().enumerate() {
        let pct = 100.0 * c as f64 / draws as f64;
        println!(
            "  {slot:>4} | {c:>8} | {pct:>5.1}% | {}",
            super::bar(c, expected, 20)
        );
    }

    println!(
        "\n  Chi²: {:.1} (critical {:.1})",
        verdict.statistic,
        (slots as f64 - 1.0) + 2.0 * (slots as f64 - 1.0).sqrt()
    );
    println!(
        "  Result: {}",
        if verdict.passed { "UNIFORM" } else { "NOT UNIFORM" }
    );
}
