//! Adversarial tests for the fee-allocation layer.
//!
//! These tests attack the distribution path from a hostile collaborator's
//! perspective and verify the fail-closed invariants:
//! - Re-entrant calls into the pipeline are rejected outright
//! - Any mid-cycle failure restores every observable state bit-for-bit
//! - Clocks and integrals cannot be inflated by call spam
//! - Arithmetic overflow aborts instead of wrapping

use std::sync::{Arc, OnceLock};

use sluice_core::constants::{COIN, ERROR_DEADBAND, HALF_LIFE_SECS, ORACLE_MIN_BALANCE,
    SP_MAX_ALLOCATION_FRAC, TARGET_LP_UTIL, TARGET_SP_UTIL};
use sluice_core::error::{ControlError, LedgerError, RouterError};
use sluice_core::traits::{DebtLedger, OracleFund};
use sluice_core::types::Amount;
use sluice_router::{AllocationParams, DripPipeline, FeeRouter, GlobalFeeRouter, GlobalRouterParams};
use sluice_tests::helpers::{pipeline_at, TestLedgers, T0};

const WEEK: u64 = HALF_LIFE_SECS;

fn steady_ledgers() -> Arc<TestLedgers> {
    let l = TestLedgers::shared();
    l.set_debt(2_000 * COIN);
    l.set_deposits(l.amount_for_util(TARGET_SP_UTIL));
    l.set_liquidity(l.amount_for_util(TARGET_LP_UTIL));
    l.set_oracle_balance(ORACLE_MIN_BALANCE);
    l
}

// ---------------------------------------------------------------------------
// Re-entrancy
// ---------------------------------------------------------------------------

/// A debt ledger that re-enters the pipeline on its first read.
struct ReentrantDebtLedger {
    inner: Arc<TestLedgers>,
    pipeline: OnceLock<Arc<DripPipeline>>,
    attempts: parking_lot::Mutex<u32>,
}

impl DebtLedger for ReentrantDebtLedger {
    fn entire_system_debt(&self) -> Result<Amount, LedgerError> {
        let mut attempts = self.attempts.lock();
        if *attempts == 0 {
            *attempts += 1;
            let p = self.pipeline.get().expect("wired");
            match p.drip(1, T0 + 1) {
                Err(RouterError::ReentrancyRejected) => {
                    return Err(LedgerError::Unavailable("re-entered drip".into()));
                }
                other => panic!("nested drip must fail closed, got {other:?}"),
            }
        }
        self.inner.entire_system_debt()
    }
}

#[test]
fn reentrant_drip_is_rejected_and_state_restored() {
    let l = steady_ledgers();
    let hostile = Arc::new(ReentrantDebtLedger {
        inner: l.clone(),
        pipeline: OnceLock::new(),
        attempts: parking_lot::Mutex::new(0),
    });

    let fee = FeeRouter::new(
        hostile.clone(),
        l.clone(),
        AllocationParams::stability_pool(),
        T0,
    )
    .unwrap();
    let global = GlobalFeeRouter::new(
        l.clone(),
        l.clone(),
        l.clone(),
        GlobalRouterParams::default(),
        T0,
    )
    .unwrap();
    let p = Arc::new(DripPipeline::new(fee, global));
    hostile.pipeline.set(p.clone()).ok().expect("wire once");

    let before = p.view().unwrap();
    let err = p.drip(100 * COIN, T0 + WEEK).unwrap_err();
    assert!(matches!(err, RouterError::Ledger(LedgerError::Unavailable(_))));
    assert_eq!(p.view().unwrap(), before);

    // The attack consumed its one shot; a clean retry commits.
    let split = p.drip(100 * COIN, T0 + WEEK).unwrap();
    assert!(split.is_conserved());
    assert_ne!(p.view().unwrap(), before);
}

/// An oracle fund that re-enters late in the cycle, after the stability-pool
/// router has already recomputed.
struct ReentrantOracleFund {
    pipeline: OnceLock<Arc<DripPipeline>>,
}

impl OracleFund for ReentrantOracleFund {
    fn balance(&self) -> Result<Amount, LedgerError> {
        let p = self.pipeline.get().expect("wired");
        // Both the distribution path and the views must fail closed.
        assert!(matches!(p.drip(1, T0 + 1), Err(RouterError::ReentrancyRejected)));
        assert!(matches!(p.view(), Err(RouterError::ReentrancyRejected)));
        Err(LedgerError::Unavailable("re-entered mid-cycle".into()))
    }
}

#[test]
fn late_cycle_reentry_rolls_back_the_earlier_router() {
    let l = steady_ledgers();
    let hostile = Arc::new(ReentrantOracleFund { pipeline: OnceLock::new() });

    let fee = FeeRouter::new(
        l.clone(),
        l.clone(),
        AllocationParams::stability_pool(),
        T0,
    )
    .unwrap();
    let global = GlobalFeeRouter::new(
        l.clone(),
        l.clone(),
        hostile.clone(),
        GlobalRouterParams::default(),
        T0,
    )
    .unwrap();
    let p = Arc::new(DripPipeline::new(fee, global));
    hostile.pipeline.set(p.clone()).ok().expect("wire once");

    // Shift deposits so the stability-pool recompute would move its fraction.
    l.set_deposits(l.amount_for_util(TARGET_SP_UTIL + 6 * ERROR_DEADBAND));

    let before = p.view().unwrap();
    let err = p.drip(100 * COIN, T0 + WEEK).unwrap_err();
    assert!(matches!(err, RouterError::Ledger(LedgerError::Unavailable(_))));

    // The fee router had already mutated before the oracle read failed; the
    // abort must have rolled it back too.
    assert_eq!(p.view().unwrap(), before);
}

// ---------------------------------------------------------------------------
// Abort-and-restore
// ---------------------------------------------------------------------------

#[test]
fn clock_regression_aborts_whole_cycle() {
    let l = steady_ledgers();
    let p = pipeline_at(&l, T0);

    p.drip(100 * COIN, T0 + WEEK).unwrap();
    let before = p.view().unwrap();

    let err = p.drip(100 * COIN, T0 + WEEK - 1).unwrap_err();
    assert!(matches!(
        err,
        RouterError::Control(ControlError::ClockRegression { .. })
    ));
    assert_eq!(p.view().unwrap(), before);

    // Time moving forward again is accepted.
    p.drip(100 * COIN, T0 + 2 * WEEK).unwrap();
    assert!(p.view().unwrap().sp_control_last_update > before.sp_control_last_update);
}

#[test]
fn ledger_outage_aborts_whole_cycle() {
    let l = steady_ledgers();
    let p = pipeline_at(&l, T0);
    let before = p.view().unwrap();

    l.set_unavailable(true);
    let err = p.drip(100 * COIN, T0 + WEEK).unwrap_err();
    assert!(matches!(err, RouterError::Ledger(LedgerError::Unavailable(_))));
    assert_eq!(p.view().unwrap(), before);

    l.set_unavailable(false);
    assert!(p.drip(100 * COIN, T0 + WEEK).is_ok());
}

#[test]
fn overflow_aborts_instead_of_wrapping() {
    let l = steady_ledgers();
    let p = pipeline_at(&l, T0);
    let before = p.view().unwrap();

    // An absurd utilization reading: the proportional product leaves i128.
    l.set_debt(1);
    l.set_deposits(u64::MAX);
    let err = p.drip(100 * COIN, T0 + WEEK).unwrap_err();
    assert!(matches!(
        err,
        RouterError::Control(ControlError::ArithmeticOverflow)
    ));
    assert_eq!(p.view().unwrap(), before);
}

// ---------------------------------------------------------------------------
// Spam and stale-clock attacks
// ---------------------------------------------------------------------------

#[test]
fn same_second_spam_grows_nothing() {
    let l = steady_ledgers();
    let p = pipeline_at(&l, T0);

    // Move the signal off target so there is a live error to exploit.
    l.set_deposits(l.amount_for_util(TARGET_SP_UTIL + 6 * ERROR_DEADBAND));
    p.drip(100 * COIN, T0 + WEEK).unwrap();
    let v1 = p.view().unwrap();

    // A burst of drips in the same second: elapsed time is zero, so the
    // integral and the EMA stay put no matter how many calls land.
    for _ in 0..20 {
        let split = p.drip(100 * COIN, T0 + WEEK).unwrap();
        assert!(split.is_conserved());
    }
    let v2 = p.view().unwrap();
    assert_eq!(v2.sp_control_integral, v1.sp_control_integral);
    assert_eq!(v2.sp_utilization_ema, v1.sp_utilization_ema);
}

#[test]
fn sub_resolution_spam_cannot_move_the_ema() {
    let l = steady_ledgers();
    let p = pipeline_at(&l, T0);
    let window = 25_200; // half-life / 24

    // Drain the pool, then hammer the pipeline inside the zero-decay window.
    // Every commit restarts the window, so the EMA never learns.
    l.set_deposits(0);
    let mut now = T0;
    for _ in 0..50 {
        now += window / 2;
        p.drip(COIN, now).unwrap();
        assert_eq!(p.view().unwrap().sp_utilization_ema, TARGET_SP_UTIL);
    }

    // Only a quiet stretch longer than the window lets the reading in.
    now += window;
    p.drip(COIN, now).unwrap();
    assert!(p.view().unwrap().sp_utilization_ema < TARGET_SP_UTIL);
}

#[test]
fn integral_stops_growing_at_the_output_wall() {
    let l = steady_ledgers();
    l.set_deposits(0);
    let p = pipeline_at(&l, T0);

    // Starve the pool until the allocation pins at its maximum.
    let mut now = T0;
    for _ in 0..6 {
        now += WEEK;
        p.drip(0, now).unwrap();
    }
    let pinned = p.view().unwrap();
    assert_eq!(pinned.sp_alloc_frac, SP_MAX_ALLOCATION_FRAC);

    // Years of further starvation leave the integral exactly where it froze.
    for _ in 0..100 {
        now += WEEK;
        p.drip(0, now).unwrap();
        let v = p.view().unwrap();
        assert_eq!(v.sp_control_integral, pinned.sp_control_integral);
        assert_eq!(v.sp_alloc_frac, SP_MAX_ALLOCATION_FRAC);
        assert_eq!(v.sp_control_last_update, now);
    }
}
