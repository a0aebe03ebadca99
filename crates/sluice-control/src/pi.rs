//! Deadband PI control law with direction-aware anti-windup.
//!
//! The controller output is `bias + kp * error + ki * integral`, clamped to
//! `[min, max]`. Error magnitudes inside the deadband are zeroed outright
//! (hard zeroing, not a soft subtraction), so the proportional term cannot
//! chatter around the setpoint. The integral accumulates error-seconds, but
//! never while the output is pinned to a bound *and* the error would drive it
//! further into that same bound. The bound can be the controller's own clamp
//! or an externally hinted exhaustion of a shared budget.

use sluice_core::constants::WAD;
use sluice_core::error::ControlError;
use sluice_core::types::{Ratio, SignedRatio, Timestamp};

/// Gains and bounds for one PI controller. All WAD-scaled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiParams {
    /// Proportional gain.
    pub kp: Ratio,
    /// Integral gain per second of accumulated error.
    pub ki: Ratio,
    /// Output at zero error with an empty integral.
    pub bias: Ratio,
    /// Error magnitudes at or below this are zeroed.
    pub deadband: Ratio,
    /// Lower output clamp.
    pub min: Ratio,
    /// Upper output clamp.
    pub max: Ratio,
}

/// PI controller state. Owned exclusively by one allocation controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiController {
    params: PiParams,
    integral: SignedRatio,
    prev_error: SignedRatio,
    last_update: Timestamp,
}

/// Result of one pure control step, committed only on success.
struct PiStep {
    integral: SignedRatio,
    output: Ratio,
}

impl PiController {
    pub fn new(params: PiParams, now: Timestamp) -> Self {
        Self { params, integral: 0, prev_error: 0, last_update: now }
    }

    pub fn params(&self) -> &PiParams {
        &self.params
    }

    pub fn integral(&self) -> SignedRatio {
        self.integral
    }

    pub fn prev_error(&self) -> SignedRatio {
        self.prev_error
    }

    pub fn last_update(&self) -> Timestamp {
        self.last_update
    }

    /// Run one control step and commit it.
    ///
    /// `saturation_hint` marks the shared budget as already exhausted by a
    /// coupled controller; it counts as saturation at the upper wall even
    /// when this controller's own output is within bounds.
    ///
    /// `prev_error` and `last_update` advance on every successful call so
    /// elapsed-time tracking never stalls; the integral only accumulates per
    /// the anti-windup rule. On error nothing is committed.
    pub fn compute(
        &mut self,
        error: SignedRatio,
        now: Timestamp,
        saturation_hint: bool,
    ) -> Result<Ratio, ControlError> {
        let step = self.step(error, now, saturation_hint)?;
        self.integral = step.integral;
        self.prev_error = error;
        self.last_update = now;
        Ok(step.output)
    }

    /// The pure control law.
    fn step(
        &self,
        error: SignedRatio,
        now: Timestamp,
        saturation_hint: bool,
    ) -> Result<PiStep, ControlError> {
        let params = &self.params;
        let elapsed = now
            .checked_sub(self.last_update)
            .ok_or(ControlError::ClockRegression { last_update: self.last_update, now })?;

        let effective_error = if error.unsigned_abs() <= params.deadband { 0 } else { error };

        // Saturation is judged on the unclamped output with the current
        // integral, before any accumulation.
        let raw = self.raw_output(effective_error, self.integral)?;
        let min = as_signed(params.min)?;
        let max = as_signed(params.max)?;
        let saturated_high = saturation_hint || raw >= max;
        let saturated_low = raw <= min;

        let winds_further = (saturated_high && effective_error > 0)
            || (saturated_low && effective_error < 0);

        let integral = if winds_further {
            tracing::trace!(
                error,
                saturation_hint,
                "integral frozen: error drives output further into saturation"
            );
            self.integral
        } else {
            effective_error
                .checked_mul(elapsed as i128)
                .and_then(|d| self.integral.checked_add(d))
                .ok_or(ControlError::ArithmeticOverflow)?
        };

        let output = self.raw_output(effective_error, integral)?.clamp(min, max) as Ratio;
        Ok(PiStep { integral, output })
    }

    /// `bias + kp * error / WAD + ki * integral / WAD`, unclamped.
    fn raw_output(
        &self,
        effective_error: SignedRatio,
        integral: SignedRatio,
    ) -> Result<SignedRatio, ControlError> {
        let params = &self.params;
        let p = as_signed(params.kp)?
            .checked_mul(effective_error)
            .ok_or(ControlError::ArithmeticOverflow)?
            / WAD as i128;
        let i = as_signed(params.ki)?
            .checked_mul(integral)
            .ok_or(ControlError::ArithmeticOverflow)?
            / WAD as i128;
        as_signed(params.bias)?
            .checked_add(p)
            .and_then(|v| v.checked_add(i))
            .ok_or(ControlError::ArithmeticOverflow)
    }
}

fn as_signed(v: Ratio) -> Result<SignedRatio, ControlError> {
    i128::try_from(v).map_err(|_| ControlError::ArithmeticOverflow)
}
