//! Error types for the Sluice fee-allocation layer.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("clock regression: now {now} before last update {last_update}")] ClockRegression { last_update: u64, now: u64 },
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error("invalid decay table: {0}")] InvalidDecayTable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("collaborator unavailable: {0}")] Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("re-entrant call into the distribution path")] ReentrancyRejected,
    #[error(transparent)] Control(#[from] ControlError),
    #[error(transparent)] Ledger(#[from] LedgerError),
}

#[derive(Error, Debug)]
pub enum SluiceError {
    #[error(transparent)] Control(#[from] ControlError),
    #[error(transparent)] Ledger(#[from] LedgerError),
    #[error(transparent)] Router(#[from] RouterError),
}
