//! Core value types and per-cycle distribution records.
//!
//! All monetary values are in drops (1 SLUSD = 10^8 drops) and use `u64` per
//! protocol convention; ratios and fractions are `u128` at [`WAD`] scale.

use serde::{Deserialize, Serialize};

use crate::constants::WAD;
use crate::error::ControlError;

/// Token amount in drops.
pub type Amount = u64;

/// Unix timestamp in seconds, supplied by the host ledger.
pub type Timestamp = u64;

/// Unsigned WAD-scaled ratio or fraction.
pub type Ratio = u128;

/// Signed WAD-scaled control quantity (errors, integrals, PI terms).
pub type SignedRatio = i128;

/// `amount * frac / WAD`, truncating. Checked against overflow.
///
/// For `frac <= WAD` the result never exceeds `amount`, so the cast back to
/// [`Amount`] cannot lose value.
pub fn apply_fraction(amount: Amount, frac: Ratio) -> Result<Amount, ControlError> {
    let scaled = (amount as u128)
        .checked_mul(frac)
        .ok_or(ControlError::ArithmeticOverflow)?
        / WAD;
    u64::try_from(scaled).map_err(|_| ControlError::ArithmeticOverflow)
}

/// WAD-scaled ratio `numerator / denominator`. Checked against overflow;
/// callers guard `denominator != 0`.
pub fn ratio_of(numerator: Amount, denominator: Amount) -> Result<Ratio, ControlError> {
    (numerator as u128)
        .checked_mul(WAD)
        .map(|n| n / denominator as u128)
        .ok_or(ControlError::ArithmeticOverflow)
}

/// Per-cycle record of the stability-pool split, emitted by the fee router.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct Drip {
    /// Interest routed into the stability pool this cycle.
    pub to_stability_pool: Amount,
    /// Interest forwarded to the global router.
    pub remaining: Amount,
}

/// Per-cycle record of the cross-venue split, emitted by the global router.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct GlobalDrip {
    /// Interest routed to the external liquidity venue.
    pub to_liquidity: Amount,
    /// Interest routed to the price-oracle funding reserve.
    pub to_oracle: Amount,
    /// Residual interest routed to the staking reward pool.
    pub to_staking: Amount,
}

/// The complete four-way split of one accrual cycle's interest.
///
/// Invariant: the four shares sum to `total` exactly. The last share is
/// always formed by subtraction, never by an independent multiply-divide, so
/// rounding can neither create nor destroy value.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct FeeSplit {
    pub total: Amount,
    pub to_stability_pool: Amount,
    pub to_liquidity: Amount,
    pub to_oracle: Amount,
    pub to_staking: Amount,
}

impl FeeSplit {
    /// Assemble the full split from the two routers' records.
    pub fn from_records(total: Amount, drip: Drip, global: GlobalDrip) -> Self {
        Self {
            total,
            to_stability_pool: drip.to_stability_pool,
            to_liquidity: global.to_liquidity,
            to_oracle: global.to_oracle,
            to_staking: global.to_staking,
        }
    }

    /// Whether the four shares account for `total` exactly.
    pub fn is_conserved(&self) -> bool {
        let sum = (self.to_stability_pool as u128)
            + (self.to_liquidity as u128)
            + (self.to_oracle as u128)
            + (self.to_staking as u128);
        sum == self.total as u128
    }
}
