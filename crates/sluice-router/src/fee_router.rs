//! Stability-pool fee router.
//!
//! Each accrual cycle splits the dripped interest between the stability pool
//! and the global router using the allocation fraction computed by the
//! *previous* cycle, then recomputes the fraction for the next one. The
//! one-cycle lag decouples the distributed amount from the observation that
//! distribution is about to influence.

use std::sync::Arc;

use sluice_core::error::{ControlError, RouterError};
use sluice_core::traits::{DebtLedger, StabilityPoolLedger};
use sluice_core::types::{apply_fraction, ratio_of, Amount, Drip, Ratio, SignedRatio, Timestamp};

use crate::allocation::{AllocationController, AllocationParams};

/// Routes accrued interest between the stability pool and the global router.
#[derive(Clone)]
pub struct FeeRouter {
    debt_ledger: Arc<dyn DebtLedger>,
    stability_pool: Arc<dyn StabilityPoolLedger>,
    controller: AllocationController,
    alloc_frac: Ratio,
}

impl FeeRouter {
    /// The initial fraction is the controller bias: the output at exactly
    /// on-target utilization with an empty integral.
    pub fn new(
        debt_ledger: Arc<dyn DebtLedger>,
        stability_pool: Arc<dyn StabilityPoolLedger>,
        params: AllocationParams,
        now: Timestamp,
    ) -> Result<Self, ControlError> {
        let alloc_frac = params.pi.bias;
        Ok(Self {
            debt_ledger,
            stability_pool,
            controller: AllocationController::new(&params, now)?,
            alloc_frac,
        })
    }

    /// Spot stability-pool utilization: `(deposits + pending) / debt`.
    ///
    /// With zero outstanding debt there is no meaningful ratio; the current
    /// EMA value is reported instead of dividing by zero.
    pub fn current_value(&self) -> Result<Ratio, RouterError> {
        let debt = self.debt_ledger.entire_system_debt()?;
        if debt == 0 {
            return Ok(self.controller.ema().value());
        }
        let deposits = self
            .stability_pool
            .total_deposits()?
            .checked_add(self.stability_pool.pending_deposits()?)
            .ok_or(ControlError::ArithmeticOverflow)?;
        Ok(ratio_of(deposits, debt)?)
    }

    /// Observe utilization and recompute the fraction for the next cycle.
    pub fn update_allocation(&mut self, now: Timestamp) -> Result<(), RouterError> {
        let value = self.current_value()?;
        self.alloc_frac = self.controller.update(value, now, false)?;
        tracing::debug!(
            utilization = value,
            alloc_frac = self.alloc_frac,
            "stability-pool allocation updated"
        );
        Ok(())
    }

    /// Split one cycle's interest with the previously computed fraction, then
    /// recompute for the next cycle.
    pub fn allocate_fees(&mut self, total: Amount, now: Timestamp) -> Result<Drip, RouterError> {
        let to_stability_pool = apply_fraction(total, self.alloc_frac)?;
        let remaining = total - to_stability_pool;
        self.update_allocation(now)?;
        tracing::debug!(total, to_stability_pool, remaining, "drip");
        Ok(Drip { to_stability_pool, remaining })
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
}
