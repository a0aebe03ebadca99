//! # sluice-core
//! Foundation types and collaborator traits for the Sluice protocol's
//! adaptive fee-allocation layer.

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
