//! Protocol constants. All monetary values in drops (1 SLUSD = 10^8 drops).
//!
//! Ratios, fractions, and controller gains use 18-decimal fixed point
//! ([`WAD`]); amounts stay `u64` with `u128` intermediates so products of an
//! amount and a WAD fraction never leave the representable range under
//! checked arithmetic.

/// Base units per whole stablecoin token.
pub const COIN: u64 = 100_000_000;

/// 18-decimal fixed-point unit: the scale of every ratio, fraction, and gain.
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Half of [`WAD`], the permanent decay-weight floor.
pub const HALF_WAD: u128 = WAD / 2;

/// EMA half-life for both utilization signals, in seconds (one week).
pub const HALF_LIFE_SECS: u64 = 604_800;

/// Target stability-pool utilization: deposits / entire system debt.
pub const TARGET_SP_UTIL: u128 = 400_000_000_000_000_000; // 0.40

/// Stability-pool controller bias: the allocation emitted at exactly
/// on-target utilization with an empty integral.
pub const SP_BIAS_FRAC: u128 = 400_000_000_000_000_000; // 0.40

pub const SP_MIN_ALLOCATION_FRAC: u128 = 50_000_000_000_000_000; // 0.05
pub const SP_MAX_ALLOCATION_FRAC: u128 = 900_000_000_000_000_000; // 0.90

/// Target external-liquidity utilization: liquidity reserve / entire system debt.
pub const TARGET_LP_UTIL: u128 = 300_000_000_000_000_000; // 0.30

pub const LP_BIAS_FRAC: u128 = 250_000_000_000_000_000; // 0.25
pub const LP_MIN_ALLOCATION_FRAC: u128 = 50_000_000_000_000_000; // 0.05
pub const LP_MAX_ALLOCATION_FRAC: u128 = 500_000_000_000_000_000; // 0.50

/// Proportional gain, WAD-scaled (1.0).
pub const KP: u128 = 1_000_000_000_000_000_000;

/// Integral gain per second of accumulated error, WAD-scaled (2e-7 / s).
pub const KI: u128 = 200_000_000_000;

/// Error magnitudes at or below this band contribute zero proportional output.
pub const ERROR_DEADBAND: u128 = 10_000_000_000_000_000; // 0.01

/// Minimum interval between liquidity-allocation recomputations, in seconds.
pub const DISTRIBUTION_FREQ_SECS: u64 = 86_400;

/// Oracle funding reserve is topped up toward this balance.
pub const ORACLE_TARGET_BALANCE: u64 = 1_000 * COIN;

/// Top-ups trigger only once the oracle balance falls below this floor.
pub const ORACLE_MIN_BALANCE: u64 = 250 * COIN;
