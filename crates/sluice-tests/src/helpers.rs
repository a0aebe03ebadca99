//! Shared test helpers for the integration and adversarial suites.

use std::sync::Arc;

use parking_lot::Mutex;
use sluice_core::error::LedgerError;
use sluice_core::traits::{DebtLedger, LiquidityOracle, OracleFund, StabilityPoolLedger};
use sluice_core::types::{apply_fraction, Amount, Ratio, Timestamp};
use sluice_router::{AllocationParams, DripPipeline, FeeRouter, GlobalFeeRouter, GlobalRouterParams};

/// Genesis timestamp used by every scenario.
pub const T0: Timestamp = 1_700_000_000;

/// One mock backing all four collaborator seams, mutable through shared refs.
///
/// Flipping `available` off makes every read fail, for abort-path tests.
#[derive(Default)]
pub struct TestLedgers {
    pub debt: Mutex<Amount>,
    pub deposits: Mutex<Amount>,
    pub pending: Mutex<Amount>,
    pub liquidity: Mutex<Amount>,
    pub oracle_balance: Mutex<Amount>,
    pub unavailable: Mutex<bool>,
}

impl TestLedgers {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn guard(&self) -> Result<(), LedgerError> {
        if *self.unavailable.lock() {
            Err(LedgerError::Unavailable("ledger offline".into()))
        } else {
            Ok(())
        }
    }

    pub fn set_debt(&self, v: Amount) {
        *self.debt.lock() = v;
    }

    pub fn set_deposits(&self, v: Amount) {
        *self.deposits.lock() = v;
    }

    pub fn set_pending(&self, v: Amount) {
        *self.pending.lock() = v;
    }

    pub fn set_liquidity(&self, v: Amount) {
        *self.liquidity.lock() = v;
    }

    pub fn set_oracle_balance(&self, v: Amount) {
        *self.oracle_balance.lock() = v;
    }

    pub fn set_unavailable(&self, v: bool) {
        *self.unavailable.lock() = v;
    }

    /// Deposits (or liquidity) producing a given spot utilization against the
    /// current mock debt.
    pub fn amount_for_util(&self, util: Ratio) -> Amount {
        apply_fraction(*self.debt.lock(), util).unwrap()
    }

    /// Credit the oracle reserve the way the token ledger would after a drip.
    pub fn credit_oracle(&self, v: Amount) {
        *self.oracle_balance.lock() += v;
    }
}

impl DebtLedger for TestLedgers {
    fn entire_system_debt(&self) -> Result<Amount, LedgerError> {
        self.guard()?;
        Ok(*self.debt.lock())
    }
}

impl StabilityPoolLedger for TestLedgers {
    fn total_deposits(&self) -> Result<Amount, LedgerError> {
        self.guard()?;
        Ok(*self.deposits.lock())
    }

    fn pending_deposits(&self) -> Result<Amount, LedgerError> {
        self.guard()?;
        Ok(*self.pending.lock())
    }
}

impl LiquidityOracle for TestLedgers {
    fn liquidity_reserve(&self) -> Result<Amount, LedgerError> {
        self.guard()?;
        Ok(*self.liquidity.lock())
    }
}

impl OracleFund for TestLedgers {
    fn balance(&self) -> Result<Amount, LedgerError> {
        self.guard()?;
        Ok(*self.oracle_balance.lock())
    }
}

/// Build a pipeline over the mock ledgers with the deployed parameters.
pub fn pipeline_at(ledgers: &Arc<TestLedgers>, now: Timestamp) -> DripPipeline {
    let fee = FeeRouter::new(
        ledgers.clone(),
        ledgers.clone(),
        AllocationParams::stability_pool(),
        now,
    )
    .expect("stability-pool params are valid");
    let global = GlobalFeeRouter::new(
        ledgers.clone(),
        ledgers.clone(),
        ledgers.clone(),
        GlobalRouterParams::default(),
        now,
    )
    .expect("liquidity params are valid");
    DripPipeline::new(fee, global)
}
