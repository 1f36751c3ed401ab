use phit_core::MAX_DELTA;
use phit_core::validate::shannon_entropy_of_counts;

pub fn run(count: usize, compound: u32, deltas: usize, workload: &str) {
    let mut sampler = super::make_sampler(workload);

    if compound > 1 {
        println!("Compound samples ({compound} reads each):");
    } else {
        println!("Samples:");
    }
    for i in 0..count {
        let s = if compound > 1 {
            sampler.sample_compound(compound)
        } else {
            sampler.sample()
        };
        println!("  {i:2}: 0x{s:08X}");
    }

    if deltas == 0 {
        return;
    }

    // Characterize the raw delta distribution the router would see.
    let mut hist = vec![0u64; MAX_DELTA];
    let mut overflow = 0u64;
    let mut min = u64::MAX;
    let mut max = 0u64;
    let mut sum = 0u64;
    let samples: Vec<u64> = (0..deltas).map(|_| sampler.timed_delta()).collect();
    for &d in &samples {
        min = min.min(d);
        max = max.max(d);
        sum += d;
        if (d as usize) < MAX_DELTA {
            hist[d as usize] += 1;
        } else {
            overflow += 1;
        }
    }
    let mean = sum as f64 / deltas as f64;
    let var = samples
        .iter()
        .map(|&d| {
            let diff = d as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / deltas as f64;

    let distinct = hist.iter().filter(|&&c| c > 0).count();
    let entropy = shannon_entropy_of_counts(&hist);

    println!("\nDelta distribution ({deltas} draws, workload: {workload}):");
    println!("  mean:      {mean:.1} ns");
    println!("  std:       {:.1} ns", var.sqrt());
    println!("  min/max:   {min} / {max} ns");
    println!("  distinct:  {distinct} values");
    println!("  overflow:  {overflow} (>= {MAX_DELTA} ns)");
    println!("  phits:     {entropy:.2} bits per raw sample");

    // Top delta values by mass.
    let mut top: Vec<(usize, u64)> = hist
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, c)| c > 0)
        .collect();
    top.sort_by(|a, b| b.1.cmp(&a.1));

    println!("\n  {:>6} | {:>8} | {:>6} | ", "Delta", "Count", "%");
    for &(d, c) in top.iter().take(10) {
        let pct = 100.0 * c as f64 / deltas as f64;
        println!(
            "  {d:>6} | {c:>8} | {pct:>5.1}% | {}",
            super::bar(c, deltas as f64 / 10.0, 20)
        );
    }
}
