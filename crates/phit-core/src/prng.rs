//! Phase-seeded pseudo-random number generator.
//!
//! A thin generator over one [`PhitPool`]. Construction performs the minimum
//! seeding workload before the instance exists, so output can never be read
//! from an unseeded generator.
//!
//! Not cryptographically secure; see the crate docs.

use crate::pool::PhitPool;
use crate::workload::Workload;

/// Harvest rounds performed at construction before output is trusted.
pub const SEED_ROUNDS: usize = 16;

/// Phase-jitter PRNG: one entropy pool plus a diagnostic output counter.
pub struct PhitPrng {
    pool: PhitPool,
    generated: u64,
}

impl PhitPrng {
    /// Construct and seed a generator over the default workload.
    pub fn new() -> Self {
        Self::with_pool(PhitPool::new())
    }

    /// Construct and seed a generator over a caller-chosen workload.
    pub fn with_workload(workload: Box<dyn Workload>) -> Self {
        Self::with_pool(PhitPool::with_workload(workload))
    }

    fn with_pool(mut pool: PhitPool) -> Self {
        for _ in 0..SEED_ROUNDS {
            pool.harvest();
        }
        Self { pool, generated: 0 }
    }

    /// Next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.generated += 1;
        self.pool.extract()
    }

    /// Next 32-bit value (top half of a 64-bit extraction).
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Next double in `[0.0, 1.0)`: top 53 bits scaled by 2^-53.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Next value in `[0, max)` by modulo reduction; returns 0 when `max`
    /// is 0.
    ///
    /// Modulo reduction is not perfectly uniform when `max` does not divide
    /// 2^64. The bias stays below 2^-32 for any `max` that fits in a `u32`;
    /// it is a known property of this generator, acceptable for its
    /// non-cryptographic purpose.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (self.next_u64() % max as u64) as u32
    }

    /// Fill a byte buffer from successive 64-bit extractions, truncating the
    /// final word when the length is not a multiple of 8.
    pub fn fill(&mut self, buf: &mut [u8]) {
        let mut chunks = buf.chunks_exact_mut(8);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.next_u64().to_le_bytes());
        }
        let tail = chunks.into_remainder();
        if !tail.is_empty() {
            let word = self.next_u64().to_le_bytes();
            tail.copy_from_slice(&word[..tail.len()]);
        }
    }

    /// Diagnostic: number of 64-bit values emitted so far. Not used in
    /// output derivation.
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Estimated phits consumed from the underlying pool.
    pub fn bits_collected(&self) -> u64 {
        self.pool.bits_collected()
    }
}

impl Default for PhitPrng {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{HARVESTS_PER_EXTRACT, PHITS_PER_FEED};

    #[test]
    fn construction_seeds_the_pool() {
        let rng = PhitPrng::new();
        // 16 seed harvests, two feeds each.
        assert_eq!(rng.bits_collected(), SEED_ROUNDS as u64 * 2 * PHITS_PER_FEED);
    }

    #[test]
    fn adjacent_outputs_differ() {
        let mut rng = PhitPrng::new();
        let mut prev = rng.next_u64();
        for _ in 0..1_000 {
            let next = rng.next_u64();
            assert_ne!(next, prev);
            prev = next;
        }
    }

    #[test]
    fn generated_counter_tracks_outputs() {
        let mut rng = PhitPrng::new();
        assert_eq!(rng.generated(), 0);
        let _ = rng.next_u64();
        let _ = rng.next_u32();
        let _ = rng.next_f64();
        assert_eq!(rng.generated(), 3);
    }

    #[test]
    fn doubles_are_in_unit_interval() {
        let mut rng = PhitPrng::new();
        for _ in 0..1_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "{v} out of [0,1)");
        }
    }

    #[test]
    fn range_respects_bound() {
        let mut rng = PhitPrng::new();
        for max in [1u32, 2, 3, 7, 100, 1 << 20] {
            for _ in 0..100 {
                assert!(rng.next_range(max) < max);
            }
        }
    }

    #[test]
    fn range_zero_returns_zero() {
        let mut rng = PhitPrng::new();
        assert_eq!(rng.next_range(0), 0);
    }

    #[test]
    fn fill_handles_all_lengths() {
        let mut rng = PhitPrng::new();
        for len in [0usize, 1, 7, 8, 9, 31, 32, 33] {
            let mut buf = vec![0u8; len];
            rng.fill(&mut buf);
            if len >= 8 {
                // A filled buffer of a word or more is all-zero only with
                // vanishing probability.
                assert!(buf.iter().any(|&b| b != 0), "len {len} stayed zero");
            }
        }
    }

    #[test]
    fn fill_consumes_words_per_eight_bytes() {
        let mut rng = PhitPrng::new();
        let mut buf = [0u8; 20];
        rng.fill(&mut buf);
        // 2 full words + 1 truncated word.
        assert_eq!(rng.generated(), 3);
    }

    #[test]
    fn extraction_cost_is_constant() {
        let mut rng = PhitPrng::new();
        let before = rng.bits_collected();
        let _ = rng.next_u64();
        let per_extract = 2 * PHITS_PER_FEED * HARVESTS_PER_EXTRACT as u64;
        assert_eq!(rng.bits_collected() - before, per_extract);
    }
}
