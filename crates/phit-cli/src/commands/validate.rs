use phit_core::PhitPrng;
use phit_core::validate::{bit_entropy, byte_distribution, compression_ratio, monobit, runs};

pub fn run(words: usize, json: bool) {
    let mut rng = PhitPrng::new();
    let data: Vec<u64> = (0..words).map(|_| rng.next_u64()).collect();
    let bytes: Vec<u8> = data.iter().flat_map(|w| w.to_le_bytes()).collect();

    let results = [monobit(&data), runs(&data), byte_distribution(&data)];
    let entropy = bit_entropy(&data);
    let ratio = compression_ratio(&bytes);

    if json {
        let report = serde_json::json!({
            "words": words,
            "tests": results,
            "bit_entropy": entropy,
            "compression_ratio": ratio,
        });
        println!("{}", serde_json::to_string_pretty(&report).expect("serializable report"));
        return;
    }

    println!("Statistical battery over {words} generated words:\n");
    println!("  {:<20} {:>6} {:>10} {:>10}", "Test", "Pass", "Statistic", "p-value");
    println!("  {}", "-".repeat(50));
    for r in &results {
        println!(
            "  {:<20} {:>6} {:>10.3} {:>10}",
            r.name,
            if r.passed { "ok" } else { "FAIL" },
            r.statistic,
            r.p_value.map_or("-".to_string(), |p| format!("{p:.4}")),
        );
    }

    println!(
        "\n  Per-bit entropy: {:.2}/64 bits ({})",
        entropy.total_bits,
        if entropy.passed { "ok" } else { "LOW" }
    );
    println!(
        "    weakest bit [{}] = {:.6}, strongest bit [{}] = {:.6}",
        entropy.weakest_bit,
        entropy.weakest_entropy,
        entropy.strongest_bit,
        entropy.strongest_entropy
    );
    println!("  Compression ratio: {ratio:.4} (no structure if ~1.0)");
}
