//! Trait interfaces between the fee-allocation layer and its collaborators.
//!
//! These traits define the contracts consumed by the routers:
//! - [`DebtLedger`] — total outstanding debt (the debt/collateral ledger)
//! - [`StabilityPoolLedger`] — deposit balances (the stability-pool ledger)
//! - [`LiquidityOracle`] — external liquidity observed on market venues
//! - [`OracleFund`] — balance of the price-oracle funding reserve
//!
//! The routers only ever *read* through these seams; transfers and ledger
//! mutation stay on the collaborator side.

use crate::error::LedgerError;
use crate::types::Amount;

/// Read-only view of the debt ledger.
pub trait DebtLedger: Send + Sync {
    /// Total outstanding system debt in drops.
    fn entire_system_debt(&self) -> Result<Amount, LedgerError>;
}

/// Read-only view of the stability-pool ledger.
pub trait StabilityPoolLedger: Send + Sync {
    /// Total settled deposits in drops.
    fn total_deposits(&self) -> Result<Amount, LedgerError>;

    /// Deposits committed but not yet folded into the settled balance.
    ///
    /// Default implementation reports none.
    fn pending_deposits(&self) -> Result<Amount, LedgerError> {
        Ok(0)
    }
}

/// Read-only view of external liquidity backing the stablecoin.
pub trait LiquidityOracle: Send + Sync {
    /// Stablecoin-denominated liquidity reserve observed on market venues.
    fn liquidity_reserve(&self) -> Result<Amount, LedgerError>;
}

/// Read-only view of the price-oracle funding reserve.
pub trait OracleFund: Send + Sync {
    /// Current balance of the oracle funding reserve in drops.
    fn balance(&self) -> Result<Amount, LedgerError>;
}
