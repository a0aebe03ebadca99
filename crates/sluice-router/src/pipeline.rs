//! One atomic fee-distribution cycle.
//!
//! The pipeline owns both routers behind a single mutex. A cycle runs
//! split-then-recompute on the stability-pool side, forwards the remainder to
//! the global side, and assembles the conservation-exact [`FeeSplit`]. Any
//! interleaved call while a cycle is in flight (including a collaborator
//! implementation calling back in) fails closed with
//! [`RouterError::ReentrancyRejected`]; any error mid-cycle restores both
//! routers to their pre-cycle state.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use sluice_core::error::RouterError;
use sluice_core::types::{Amount, FeeSplit, Ratio, SignedRatio, Timestamp};

use crate::fee_router::FeeRouter;
use crate::global_router::GlobalFeeRouter;

/// Snapshot of both controllers' observable state, for monitoring and audit.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineView {
    pub sp_alloc_frac: Ratio,
    pub sp_utilization_ema: Ratio,
    pub sp_control_integral: SignedRatio,
    pub sp_control_prev_error: SignedRatio,
    pub sp_control_last_update: Timestamp,
    pub lp_alloc_frac: Ratio,
    pub lp_utilization_ema: Ratio,
    pub lp_control_integral: SignedRatio,
    pub lp_control_prev_error: SignedRatio,
    pub lp_control_last_update: Timestamp,
}

#[derive(Clone)]
struct PipelineState {
    fee: FeeRouter,
    global: GlobalFeeRouter,
}

/// Serializes fee-distribution cycles against every observer.
pub struct DripPipeline {
    state: Mutex<PipelineState>,
}

impl DripPipeline {
    pub fn new(fee: FeeRouter, global: GlobalFeeRouter) -> Self {
        Self { state: Mutex::new(PipelineState { fee, global }) }
    }

    /// Run one full cycle over the dripped interest.
    ///
    /// Fully commits or fully aborts: on any error the pre-cycle router
    /// state is restored before the error propagates.
    pub fn drip(&self, total: Amount, now: Timestamp) -> Result<FeeSplit, RouterError> {
        let mut state = self.state.try_lock().ok_or(RouterError::ReentrancyRejected)?;
        let snapshot = state.clone();
        match Self::run_cycle(&mut state, total, now) {
            Ok(split) => {
                tracing::info!(
                    total = split.total,
                    to_stability_pool = split.to_stability_pool,
                    to_liquidity = split.to_liquidity,
                    to_oracle = split.to_oracle,
                    to_staking = split.to_staking,
                    "drip distributed"
                );
                Ok(split)
            }
            Err(e) => {
                *state = snapshot;
                Err(e)
            }
        }
    }

    fn run_cycle(
        state: &mut PipelineState,
        total: Amount,
        now: Timestamp,
    ) -> Result<FeeSplit, RouterError> {
        let drip = state.fee.allocate_fees(total, now)?;
        let global = state.global.allocate_fees(total, drip.remaining, now)?;
        let split = FeeSplit::from_records(total, drip, global);
        debug_assert!(split.is_conserved());
        Ok(split)
    }

    /// Observe both controllers. Rejected while a cycle is in flight so no
    /// reader ever sees a half-mutated state.
    pub fn view(&self) -> Result<PipelineView, RouterError> {
        let state = self.state.try_lock().ok_or(RouterError::ReentrancyRejected)?;
        Ok(PipelineView {
            sp_alloc_frac: state.fee.alloc_frac(),
            sp_utilization_ema: state.fee.utilization_ema(),
            sp_control_integral: state.fee.control_integral(),
            sp_control_prev_error: state.fee.control_prev_error(),
            sp_control_last_update: state.fee.control_last_update(),
            lp_alloc_frac: state.global.alloc_frac(),
            lp_utilization_ema: state.global.utilization_ema(),
            lp_control_integral: state.global.control_integral(),
            lp_control_prev_error: state.global.control_prev_error(),
            lp_control_last_update: state.global.control_last_update(),
        })
    }

    /// Recompute both allocations outside a distribution (operator path).
    pub fn update_allocations(&self, now: Timestamp) -> Result<(), RouterError> {
        let mut state = self.state.try_lock().ok_or(RouterError::ReentrancyRejected)?;
        let snapshot = state.clone();
        let result = state
            .fee
            .update_allocation(now)
            .and_then(|()| state.global.update_allocation(false, now));
        if result.is_err() {
            *state = snapshot;
        }
        result
    }
}
