pub mod dispatch;
pub mod prng;
pub mod route;
pub mod sample;
pub mod validate;

use phit_core::{AluChain, BranchMaze, IoTouch, MemoryWalk, Sampler, Workload};

/// Build a sampler over the named workload strategy.
pub fn make_sampler(workload: &str) -> Sampler {
    Sampler::with_workload(make_workload(workload))
}

pub fn make_workload(workload: &str) -> Box<dyn Workload> {
    match workload {
        "memory" => Box::new(MemoryWalk::default()),
        "branch" => Box::new(BranchMaze::default()),
        "io" => Box::new(IoTouch::default()),
        _ => Box::new(AluChain::default()),
    }
}

/// Fixed-width `#` bar scaled so that the expected value renders at
/// `scale` characters.
pub fn bar(count: u64, expected: f64, scale: usize) -> String {
    let len = if expected > 0.0 {
        ((count as f64 / expected) * scale as f64) as usize
    } else {
        0
    };
    "#".repeat(len.min(scale * 2))
}
