//! Fixed-point half-life decay lookup table.
//!
//! All computation uses integer arithmetic only. The retention weight for an
//! elapsed duration is looked up in a precomputed table rather than evaluated
//! through transcendental exponentiation, so every implementation of the
//! protocol lands on identical staircase values.
//!
//! The default table covers `2^(-i/24)` for `i = 0..=24` (25 entries): one
//! bucket per 1/24th of the half-life, ending at the 50% retention floor.

use std::borrow::Cow;

use sluice_core::constants::{HALF_LIFE_SECS, HALF_WAD, WAD};
use sluice_core::error::ControlError;

/// Precomputed `2^(-i/24) * WAD` for `i = 0, 1, ..., 24`.
///
/// Values rounded to the nearest integer. Entry 0 is full retention, entry 24
/// is the half-life floor.
const HALF_LIFE_TABLE: [u128; 25] = [
    1_000_000_000_000_000_000, // 2^(-0/24)
    971_531_941_153_605_869,   // 2^(-1/24)
    943_874_312_681_693_497,   // 2^(-2/24)
    917_004_043_204_671_232,   // 2^(-3/24)
    890_898_718_140_339_305,   // 2^(-4/24)
    865_536_561_006_143_027,   // 2^(-5/24)
    840_896_415_253_714_543,   // 2^(-6/24)
    816_957_726_620_549_922,   // 2^(-7/24)
    793_700_525_984_099_737,   // 2^(-8/24)
    771_105_412_703_970_412,   // 2^(-9/24)
    749_153_538_438_340_749,   // 2^(-10/24)
    727_826_591_421_093_677,   // 2^(-11/24)
    707_106_781_186_547_524,   // 2^(-12/24)
    686_976_823_729_044_551,   // 2^(-13/24)
    667_419_927_085_017_182,   // 2^(-14/24)
    648_419_777_325_504_833,   // 2^(-15/24)
    629_960_524_947_436_582,   // 2^(-16/24)
    612_026_771_652_327_620,   // 2^(-17/24)
    594_603_557_501_360_533,   // 2^(-18/24)
    577_676_348_436_136_505,   // 2^(-19/24)
    561_231_024_154_686_491,   // 2^(-20/24)
    545_253_866_332_628_830,   // 2^(-21/24)
    529_731_547_179_647_632,   // 2^(-22/24)
    514_651_118_321_746_014,   // 2^(-23/24)
    500_000_000_000_000_000,   // 2^(-24/24)
];

/// An immutable decay-weight staircase over one half-life.
///
/// Maps elapsed seconds to the WAD-scaled fraction of an old value retained
/// in an EMA blend. Sample 0 is `WAD` (full retention); the final sample is
/// `WAD / 2`, the permanent floor for any `dt >= half_life`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecayTable {
    half_life: u64,
    samples: Cow<'static, [u128]>,
}

impl DecayTable {
    /// Build a table over `half_life` seconds from custom samples.
    ///
    /// Samples must start at `WAD`, end at `WAD / 2`, and never increase;
    /// `half_life` must cover at least one second per bucket so the
    /// zero-decay window is non-degenerate.
    pub fn new(
        half_life: u64,
        samples: impl Into<Cow<'static, [u128]>>,
    ) -> Result<Self, ControlError> {
        let samples = samples.into();
        if samples.len() < 2 {
            return Err(ControlError::InvalidDecayTable(
                "need at least two samples".into(),
            ));
        }
        if samples[0] != WAD {
            return Err(ControlError::InvalidDecayTable(
                "first sample must be full retention".into(),
            ));
        }
        if *samples.last().expect("non-empty") != HALF_WAD {
            return Err(ControlError::InvalidDecayTable(
                "last sample must be the 50% floor".into(),
            ));
        }
        if samples.windows(2).any(|w| w[1] > w[0]) {
            return Err(ControlError::InvalidDecayTable(
                "samples must be non-increasing".into(),
            ));
        }
        let max_idx = (samples.len() - 1) as u64;
        if half_life < max_idx {
            return Err(ControlError::InvalidDecayTable(format!(
                "half-life {half_life}s shorter than {max_idx} buckets"
            )));
        }
        Ok(Self { half_life, samples })
    }

    /// The default 25-entry table over a custom half-life.
    pub fn with_half_life(half_life: u64) -> Result<Self, ControlError> {
        Self::new(half_life, &HALF_LIFE_TABLE[..])
    }

    pub fn half_life(&self) -> u64 {
        self.half_life
    }

    /// Highest table index; buckets run `0..=max_decay_idx`.
    pub fn max_decay_idx(&self) -> u64 {
        (self.samples.len() - 1) as u64
    }

    /// Elapsed durations strictly below this threshold decay nothing: the
    /// discretized index cannot move for sub-resolution time.
    pub fn no_decay_window(&self) -> u64 {
        self.half_life / self.max_decay_idx()
    }

    /// Retention weight at a raw bucket index, clamped to the floor.
    pub fn decay_by_idx(&self, idx: u64) -> u128 {
        let i = (idx as usize).min(self.samples.len() - 1);
        self.samples[i]
    }

    /// WAD-scaled retention weight after `dt` elapsed seconds.
    ///
    /// Staircase approximation of `2^(-dt / half_life)`, clamped at the 50%
    /// floor for `dt >= half_life` so no single update can discount the prior
    /// value's contribution below half.
    pub fn decay_factor(&self, dt: u64) -> u128 {
        if dt >= self.half_life {
            return HALF_WAD;
        }
        // dt < half_life keeps the product within u128 for any u64 inputs.
        let idx = (dt as u128 * self.max_decay_idx() as u128 / self.half_life as u128) as u64;
        self.decay_by_idx(idx)
    }
}

impl Default for DecayTable {
    fn default() -> Self {
        Self::with_half_life(HALF_LIFE_SECS).expect("default table is valid")
    }
}
