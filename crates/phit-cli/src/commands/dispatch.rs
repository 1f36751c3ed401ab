use phit_core::Sampler;
use phit_core::validate::routing_uniformity;

/// Lock-free dispatch scenario: every worker thread owns an independent
/// sampler and claims the tasks the phase routes to its own id. No shared
/// counters or locks; the "round-robin state" is the clock phase itself.
pub fn run(workers: usize, tasks: usize) {
    if workers == 0 {
        eprintln!("dispatch requires at least one worker");
        std::process::exit(2);
    }

    println!("Dispatching {tasks} tasks per loop across {workers} phase-routed workers...\n");

    let mut done = vec![0u64; workers];
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                s.spawn(move || {
                    let mut sampler = Sampler::new();
                    let mut claimed = 0u64;
                    let mut acc = 0u64;
                    for i in 0..tasks {
                        if sampler.route(workers) == id {
                            acc ^= (i as u64).wrapping_mul(2654435761).wrapping_add(1);
                            claimed += 1;
                        }
                    }
                    std::hint::black_box(acc);
                    claimed
                })
            })
            .collect();
        for (id, handle) in handles.into_iter().enumerate() {
            done[id] = handle.join().expect("worker thread panicked");
        }
    });

    // Each worker drew its own routes, so per-worker claims approximate
    // tasks/workers.
    let expected = tasks as f64 / workers as f64;
    println!("  {:>6} | {:>8} | ", "Worker", "Claimed");
    for (id, &c) in done.iter().enumerate() {
        println!("  {id:>6} | {c:>8} | {}", super::bar(c, expected, 20));
    }

    let verdict = routing_uniformity(&done);
    println!(
        "\n  Chi²: {:.1} — {}",
        verdict.statistic,
        if verdict.passed { "balanced" } else { "imbalanced" }
    );
}
