//! CDF-calibrated uniform routing.
//!
//! Raw timing deltas are not uniform: a handful of values usually carry
//! most of the probability mass, and one value alone can carry more than
//! half. Naive modulo routing over raw deltas is therefore biased. The
//! router instead learns the empirical distribution once (calibration),
//! builds a cumulative distribution function over the bounded delta domain,
//! and maps every possible delta to `floor(CDF(delta) * num_slots)`. Each
//! slot then receives approximately equal probability mass no matter how
//! skewed the raw distribution is.
//!
//! Calibration produces a frozen [`CalibrationTable`]; routing against it is
//! a stateless O(1) lookup, so independent callers need no shared counters
//! or locks. Recalibration means building a fresh table.

use serde::Serialize;
use thiserror::Error;

use crate::sampler::Sampler;
use crate::validate::shannon_entropy_of_counts;

/// Exclusive upper bound of the calibrated delta domain, in nanoseconds.
///
/// Deltas at or above this bound are clamped onto the last table index, both
/// during calibration (with accounting) and during routing.
pub const MAX_DELTA: usize = 2048;

/// Invalid calibration configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalibrationError {
    /// The slot count was zero.
    #[error("slot count must be at least 1")]
    ZeroSlots,
    /// The slot count exceeded the delta domain, so most slots could never
    /// receive mass.
    #[error("slot count {0} exceeds the delta domain ({MAX_DELTA})")]
    TooManySlots(usize),
    /// The calibration stream contained no samples.
    #[error("calibration requires at least one sample")]
    NoSamples,
}

/// Frozen calibration artifact: histogram, CDF, and slot map over
/// `[0, MAX_DELTA)`.
#[derive(Debug)]
pub struct CalibrationTable {
    num_slots: usize,
    sample_count: u64,
    overflow: u64,
    hist: Vec<u64>,
    cdf: Vec<f64>,
    slot_map: Vec<u16>,
}

/// Serializable calibration statistics.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationSummary {
    /// Destination slot count.
    pub num_slots: usize,
    /// Samples observed during calibration.
    pub sample_count: u64,
    /// Samples clamped from above the delta domain.
    pub overflow_samples: u64,
    /// Distinct delta values with non-zero mass.
    pub distinct_deltas: usize,
    /// Probability mass of the single most common delta.
    pub dominant_share: f64,
    /// Shannon entropy of the delta distribution in bits, the phit
    /// content of one raw sample.
    pub delta_entropy_bits: f64,
    /// Information consumed per routing decision: log2(num_slots).
    pub phits_per_route: f64,
}

impl CalibrationTable {
    /// Calibrate by drawing `samples` raw deltas from the sampler
    /// (workload-gated single reads, not compound).
    pub fn calibrate(
        sampler: &mut Sampler,
        num_slots: usize,
        samples: usize,
    ) -> Result<Self, CalibrationError> {
        Self::from_deltas(num_slots, (0..samples).map(|_| sampler.timed_delta()))
    }

    /// Build a table from any delta stream.
    ///
    /// The sampler-driven [`calibrate`](Self::calibrate) delegates here;
    /// recorded or synthetic delta traces can be calibrated the same way.
    pub fn from_deltas(
        num_slots: usize,
        deltas: impl IntoIterator<Item = u64>,
    ) -> Result<Self, CalibrationError> {
        if num_slots == 0 {
            return Err(CalibrationError::ZeroSlots);
        }
        if num_slots > MAX_DELTA {
            return Err(CalibrationError::TooManySlots(num_slots));
        }

        let mut hist = vec![0u64; MAX_DELTA];
        let mut sample_count = 0u64;
        let mut overflow = 0u64;
        for delta in deltas {
            sample_count += 1;
            let d = delta as usize;
            if d >= MAX_DELTA {
                overflow += 1;
                hist[MAX_DELTA - 1] += 1;
            } else {
                hist[d] += 1;
            }
        }
        if sample_count == 0 {
            return Err(CalibrationError::NoSamples);
        }
        if overflow > 0 {
            log::warn!(
                "calibration: {overflow}/{sample_count} deltas exceeded the \
                 {MAX_DELTA}ns domain and were clamped; the last slot will \
                 carry their mass"
            );
        }

        let mut cdf = vec![0.0f64; MAX_DELTA];
        let mut cumulative = 0.0;
        for (d, &count) in hist.iter().enumerate() {
            cumulative += count as f64 / sample_count as f64;
            cdf[d] = cumulative;
        }

        // slot(d) = floor(CDF(d) * K), clamped to K-1. Monotone because the
        // CDF is monotone.
        let slot_map: Vec<u16> = cdf
            .iter()
            .map(|&c| (((c * num_slots as f64) as usize).min(num_slots - 1)) as u16)
            .collect();

        Ok(Self {
            num_slots,
            sample_count,
            overflow,
            hist,
            cdf,
            slot_map,
        })
    }

    /// Route a raw delta to its destination slot in `[0, num_slots)`.
    ///
    /// Out-of-domain deltas clamp onto the last table index.
    #[inline]
    pub fn route(&self, delta: u64) -> usize {
        let d = (delta as usize).min(MAX_DELTA - 1);
        self.slot_map[d] as usize
    }

    /// Destination slot count.
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Samples observed during calibration.
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Calibration samples clamped from above the delta domain.
    ///
    /// A non-zero count means the last slot silently carries extra mass;
    /// the build already logged a warning.
    pub fn overflow_samples(&self) -> u64 {
        self.overflow
    }

    /// Distinct delta values with non-zero calibration mass.
    pub fn distinct_deltas(&self) -> usize {
        self.hist.iter().filter(|&&c| c > 0).count()
    }

    /// Expected per-slot count when routing `n` draws from the calibrated
    /// distribution.
    pub fn expected_per_slot(&self, n: u64) -> f64 {
        n as f64 / self.num_slots as f64
    }

    /// Empirical CDF value at a delta (clamped).
    pub fn cdf_at(&self, delta: u64) -> f64 {
        self.cdf[(delta as usize).min(MAX_DELTA - 1)]
    }

    /// Calibration statistics snapshot.
    pub fn summary(&self) -> CalibrationSummary {
        let dominant = self.hist.iter().copied().max().unwrap_or(0);
        CalibrationSummary {
            num_slots: self.num_slots,
            sample_count: self.sample_count,
            overflow_samples: self.overflow,
            distinct_deltas: self.distinct_deltas(),
            dominant_share: dominant as f64 / self.sample_count as f64,
            delta_entropy_bits: shannon_entropy_of_counts(&self.hist),
            phits_per_route: (self.num_slots as f64).log2(),
        }
    }
}
