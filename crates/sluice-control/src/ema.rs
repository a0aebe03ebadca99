//! Exponential moving average keyed to a [`DecayTable`].
//!
//! The EMA blends decayed history with the current observation:
//! `next = value * weight + current * (1 - weight)`, where `weight` is the
//! table lookup for the elapsed time since the last commit. The preview path
//! is pure and rounds identically to the committing path, so a preview
//! immediately followed by an update with the same observation commits the
//! previewed value.

use sluice_core::constants::{HALF_WAD, WAD};
use sluice_core::error::ControlError;
use sluice_core::types::{Ratio, Timestamp};

use crate::decay::DecayTable;

/// EMA state over one utilization signal.
///
/// Owned exclusively by a single allocation controller; created once at
/// initialization with the target utilization as seed and mutated only
/// through [`update`](Ema::update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ema {
    value: Ratio,
    last_update: Timestamp,
    table: DecayTable,
}

impl Ema {
    /// Seed the EMA. `seed` is normally the configured target utilization.
    pub fn new(seed: Ratio, table: DecayTable, now: Timestamp) -> Self {
        Self { value: seed, last_update: now, table }
    }

    pub fn value(&self) -> Ratio {
        self.value
    }

    pub fn last_update(&self) -> Timestamp {
        self.last_update
    }

    pub fn table(&self) -> &DecayTable {
        &self.table
    }

    /// Pure preview of the next EMA value: `(next, elapsed)`.
    ///
    /// Fails with [`ControlError::ClockRegression`] when `now` precedes the
    /// last commit; no state is touched either way.
    pub fn preview_current(
        &self,
        current: Ratio,
        now: Timestamp,
    ) -> Result<(Ratio, u64), ControlError> {
        let elapsed = now
            .checked_sub(self.last_update)
            .ok_or(ControlError::ClockRegression { last_update: self.last_update, now })?;
        let weight = self.table.decay_factor(elapsed);
        Ok((blend(self.value, current, weight)?, elapsed))
    }

    /// Commit the blend [`preview_current`](Ema::preview_current) computes.
    pub fn update(&mut self, current: Ratio, now: Timestamp) -> Result<Ratio, ControlError> {
        let (next, _elapsed) = self.preview_current(current, now)?;
        self.value = next;
        self.last_update = now;
        Ok(next)
    }
}

/// `old * weight + current * (WAD - weight)`, rounded half-up to the nearest
/// WAD unit. `weight` is in `[HALF_WAD, WAD]` by table construction.
fn blend(old: Ratio, current: Ratio, weight: u128) -> Result<Ratio, ControlError> {
    debug_assert!((HALF_WAD..=WAD).contains(&weight));
    let retained = old
        .checked_mul(weight)
        .ok_or(ControlError::ArithmeticOverflow)?;
    let admitted = current
        .checked_mul(WAD - weight)
        .ok_or(ControlError::ArithmeticOverflow)?;
    let sum = retained
        .checked_add(admitted)
        .and_then(|s| s.checked_add(WAD / 2))
        .ok_or(ControlError::ArithmeticOverflow)?;
    Ok(sum / WAD)
}
