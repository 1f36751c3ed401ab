//! # phit-core
//!
//! **The phase relationship between two asynchronous clocks is information.**
//!
//! `phit-core` extracts usable randomness and fair routing decisions from the
//! timing jitter between a CPU-bound workload and a free-running timer. The
//! jitter signal is noisy and heavily skewed; this crate turns it into three
//! usable products:
//!
//! - a raw **phit** (phase-bit) sample stream ([`Sampler`]),
//! - a whitened general-purpose random number stream ([`PhitPrng`]),
//! - a **CDF-calibrated router** that maps raw timing deltas onto N
//!   destination slots with near-uniform probability regardless of how
//!   skewed the raw distribution is ([`CalibrationTable`]).
//!
//! ## Quick Start
//!
//! ```no_run
//! use phit_core::{PhitPrng, Sampler, CalibrationTable};
//!
//! // Seeded random number stream
//! let mut rng = PhitPrng::new();
//! let word = rng.next_u64();
//! let unit = rng.next_f64(); // [0.0, 1.0)
//!
//! // Fair 8-way routing over a skewed timing distribution
//! let mut sampler = Sampler::new();
//! let table = CalibrationTable::calibrate(&mut sampler, 8, 200_000).unwrap();
//! let slot = table.route(sampler.timed_delta());
//! assert!(slot < 8);
//! ```
//!
//! ## Architecture
//!
//! Sampler → mix64 whitening → Entropy Pool → PRNG
//!
//! Sampler (raw deltas) → CDF Router
//!
//! The [`validate`] module is a read-only statistical battery (monobit, runs,
//! byte chi-squared, per-bit entropy, routing chi-squared) applied to both
//! streams to certify quality.
//!
//! ## Not a CSPRNG
//!
//! Nothing here is cryptographically secure. The PRNG demonstrates that
//! clock-phase jitter carries genuine entropy; it is not a substitute for
//! the OS random device.

pub mod mix;
pub mod pool;
pub mod prng;
pub mod router;
pub mod sampler;
pub mod timer;
pub mod validate;
pub mod workload;

pub use mix::{mix32, mix64};
pub use pool::{HARVESTS_PER_EXTRACT, PHITS_PER_FEED, POOL_LANES, PhitPool};
pub use prng::{PhitPrng, SEED_ROUNDS};
pub use router::{CalibrationError, CalibrationSummary, CalibrationTable, MAX_DELTA};
pub use sampler::Sampler;
pub use timer::now_ns;
pub use validate::{BitEntropy, TestResult, selftest};
pub use workload::{AluChain, BranchMaze, IoTouch, MemoryWalk, Workload};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
