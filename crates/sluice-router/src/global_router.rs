//! Cross-venue fee router.
//!
//! Receives whatever the stability-pool router leaves of each drip, funds the
//! price-oracle reserve first, and splits the rest between the external
//! liquidity venue and staking. The liquidity controller's nominal request is
//! a fraction of the *whole* drip budget, so when the two routers' fractions
//! jointly pass 100% the request exceeds what is actually available; the
//! resulting `cap_reached` fact feeds the controller's anti-windup as an
//! external saturation hint.

use std::sync::Arc;

use sluice_core::constants::{DISTRIBUTION_FREQ_SECS, ORACLE_MIN_BALANCE, ORACLE_TARGET_BALANCE};
use sluice_core::error::{ControlError, RouterError};
use sluice_core::traits::{DebtLedger, LiquidityOracle, OracleFund};
use sluice_core::types::{
    apply_fraction, ratio_of, Amount, GlobalDrip, Ratio, SignedRatio, Timestamp,
};

use crate::allocation::{AllocationController, AllocationParams};

/// Liquidity-side control parameters plus oracle-funding and pacing knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalRouterParams {
    pub allocation: AllocationParams,
    /// Oracle top-ups fill toward this balance.
    pub oracle_target_balance: Amount,
    /// Top-ups trigger only below this floor.
    pub oracle_min_balance: Amount,
    /// Minimum seconds between allocation recomputations.
    pub distribution_freq: u64,
}

impl Default for GlobalRouterParams {
    fn default() -> Self {
        Self {
            allocation: AllocationParams::liquidity(),
            oracle_target_balance: ORACLE_TARGET_BALANCE,
            oracle_min_balance: ORACLE_MIN_BALANCE,
            distribution_freq: DISTRIBUTION_FREQ_SECS,
        }
    }
}

/// Routes the post-stability-pool remainder among oracle, liquidity venue,
/// and staking.
#[derive(Clone)]
pub struct GlobalFeeRouter {
    debt_ledger: Arc<dyn DebtLedger>,
    liquidity: Arc<dyn LiquidityOracle>,
    oracle_fund: Arc<dyn OracleFund>,
    controller: AllocationController,
    alloc_frac: Ratio,
    oracle_target_balance: Amount,
    oracle_min_balance: Amount,
    distribution_freq: u64,
    last_reallocation: Timestamp,
}

impl GlobalFeeRouter {
    pub fn new(
        debt_ledger: Arc<dyn DebtLedger>,
        liquidity: Arc<dyn LiquidityOracle>,
        oracle_fund: Arc<dyn OracleFund>,
        params: GlobalRouterParams,
        now: Timestamp,
    ) -> Result<Self, ControlError> {
        let alloc_frac = params.allocation.pi.bias;
        Ok(Self {
            debt_ledger,
            liquidity,
            oracle_fund,
            controller: AllocationController::new(&params.allocation, now)?,
            alloc_frac,
            oracle_target_balance: params.oracle_target_balance,
            oracle_min_balance: params.oracle_min_balance,
            distribution_freq: params.distribution_freq,
            last_reallocation: now,
        })
    }

    /// Spot liquidity utilization: `liquidity_reserve / debt`, with the EMA
    /// fallback on zero debt.
    pub fn current_value(&self) -> Result<Ratio, RouterError> {
        let debt = self.debt_ledger.entire_system_debt()?;
        if debt == 0 {
            return Ok(self.controller.ema().value());
        }
        let reserve = self.liquidity.liquidity_reserve()?;
        Ok(ratio_of(reserve, debt)?)
    }

    /// Oracle funding has top priority over the incoming amount.
    ///
    /// Once the reserve drops below its floor, top-ups fill toward the target
    /// balance; while it sits at or above the floor nothing is diverted.
    /// Returns `(to_oracle, available_for_liquidity_and_staking)`.
    pub fn split_oracle_and_remaining(
        &self,
        amount: Amount,
    ) -> Result<(Amount, Amount), RouterError> {
        let balance = self.oracle_fund.balance()?;
        let to_oracle = if balance < self.oracle_min_balance {
            amount.min(self.oracle_target_balance.saturating_sub(balance))
        } else {
            0
        };
        Ok((to_oracle, amount - to_oracle))
    }

    /// Observe utilization and recompute the fraction for the next cycle.
    ///
    /// No-op until `distribution_freq` has elapsed since the last
    /// recomputation: inside the window the stored fraction is reused
    /// unchanged.
    pub fn update_allocation(
        &mut self,
        cap_reached: bool,
        now: Timestamp,
    ) -> Result<(), RouterError> {
        if now < self.last_reallocation.saturating_add(self.distribution_freq) {
            return Ok(());
        }
        let value = self.current_value()?;
        self.alloc_frac = self.controller.update(value, now, cap_reached)?;
        self.last_reallocation = now;
        tracing::debug!(
            utilization = value,
            alloc_frac = self.alloc_frac,
            cap_reached,
            "liquidity allocation updated"
        );
        Ok(())
    }

    /// Split one cycle's remainder, then recompute for the next cycle.
    ///
    /// `total` is the whole drip this cycle (the shared budget the liquidity
    /// fraction is expressed against); `remaining` is what the stability-pool
    /// router left of it.
    pub fn allocate_fees(
        &mut self,
        total: Amount,
        remaining: Amount,
        now: Timestamp,
    ) -> Result<GlobalDrip, RouterError> {
        let (to_oracle, available) = self.split_oracle_and_remaining(remaining)?;
        let nominal = apply_fraction(total, self.alloc_frac)?;
        let to_liquidity = nominal.min(available);
        let cap_reached = nominal > available;
        let to_staking = available - to_liquidity;
        self.update_allocation(cap_reached, now)?;
        tracing::debug!(total, to_liquidity, to_oracle, to_staking, cap_reached, "global drip");
        Ok(GlobalDrip { to_liquidity, to_oracle, to_staking })
    }

    // --- audit views ---

    pub fn alloc_frac(&self) -> Ratio {
        self.alloc_frac
    }

    pub fn utilization_ema(&self) -> Ratio {
        self.controller.ema().value()
    }

    pub fn target_util(&self) -> Ratio {
        self.controller.target()
    }

    pub fn control_integral(&self) -> SignedRatio {
        self.controller.pi().integral()
    }

    pub fn control_prev_error(&self) -> SignedRatio {
        self.controller.pi().prev_error()
    }

    pub fn control_last_update(&self) -> Timestamp {
        self.controller.pi().last_update()
    }

    pub fn distribution_freq(&self) -> u64 {
        self.distribution_freq
    }

    pub fn oracle_target_balance(&self) -> Amount {
        self.oracle_target_balance
    }

    pub fn oracle_min_balance(&self) -> Amount {
        self.oracle_min_balance
    }
}
