//! Binds one utilization EMA to one PI controller.

use sluice_core::constants::{
    ERROR_DEADBAND, HALF_LIFE_SECS, KI, KP, LP_BIAS_FRAC, LP_MAX_ALLOCATION_FRAC,
    LP_MIN_ALLOCATION_FRAC, SP_BIAS_FRAC, SP_MAX_ALLOCATION_FRAC, SP_MIN_ALLOCATION_FRAC,
    TARGET_LP_UTIL, TARGET_SP_UTIL,
};
use sluice_core::error::ControlError;
use sluice_core::types::{Ratio, SignedRatio, Timestamp};
use sluice_control::{DecayTable, Ema, PiController, PiParams};

/// Target utilization, EMA half-life, and PI gains for one controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationParams {
    pub target_util: Ratio,
    pub half_life: u64,
    pub pi: PiParams,
}

impl AllocationParams {
    /// Deployed parameters for the stability-pool side.
    pub fn stability_pool() -> Self {
        Self {
            target_util: TARGET_SP_UTIL,
            half_life: HALF_LIFE_SECS,
            pi: PiParams {
                kp: KP,
                ki: KI,
                bias: SP_BIAS_FRAC,
                deadband: ERROR_DEADBAND,
                min: SP_MIN_ALLOCATION_FRAC,
                max: SP_MAX_ALLOCATION_FRAC,
            },
        }
    }

    /// Deployed parameters for the external-liquidity side.
    pub fn liquidity() -> Self {
        Self {
            target_util: TARGET_LP_UTIL,
            half_life: HALF_LIFE_SECS,
            pi: PiParams {
                kp: KP,
                ki: KI,
                bias: LP_BIAS_FRAC,
                deadband: ERROR_DEADBAND,
                min: LP_MIN_ALLOCATION_FRAC,
                max: LP_MAX_ALLOCATION_FRAC,
            },
        }
    }
}

/// One closed control loop: a smoothed utilization signal driving a bounded
/// allocation fraction.
///
/// The EMA and controller state are owned exclusively here; an update either
/// commits both or commits nothing.
#[derive(Debug, Clone)]
pub struct AllocationController {
    target: Ratio,
    ema: Ema,
    pi: PiController,
}

impl AllocationController {
    pub fn new(params: &AllocationParams, now: Timestamp) -> Result<Self, ControlError> {
        let table = DecayTable::with_half_life(params.half_life)?;
        Ok(Self {
            target: params.target_util,
            ema: Ema::new(params.target_util, table, now),
            pi: PiController::new(params.pi.clone(), now),
        })
    }

    pub fn target(&self) -> Ratio {
        self.target
    }

    pub fn ema(&self) -> &Ema {
        &self.ema
    }

    pub fn pi(&self) -> &PiController {
        &self.pi
    }

    /// Fold one utilization observation into the loop and return the new
    /// allocation fraction.
    ///
    /// The error fed to the controller is `target - ema_next`: over-utilized
    /// signals produce a negative error and pull the allocation down.
    pub fn update(
        &mut self,
        current: Ratio,
        now: Timestamp,
        saturation_hint: bool,
    ) -> Result<Ratio, ControlError> {
        let (ema_next, _elapsed) = self.ema.preview_current(current, now)?;
        let error = as_signed(self.target)?
            .checked_sub(as_signed(ema_next)?)
            .ok_or(ControlError::ArithmeticOverflow)?;

        // Run the PI step on a scratch copy so a failure commits neither the
        // EMA nor the controller.
        let mut pi = self.pi.clone();
        let output = pi.compute(error, now, saturation_hint)?;
        self.ema.update(current, now)?;
        self.pi = pi;
        Ok(output)
    }
}

fn as_signed(v: Ratio) -> Result<SignedRatio, ControlError> {
    i128::try_from(v).map_err(|_| ControlError::ArithmeticOverflow)
}
