//! # sluice-router — Fee-splitting pipeline.
//!
//! Composes the control leaves into the per-cycle interest distribution:
//! - [`AllocationController`] binds one EMA to one PI controller and turns a
//!   utilization observation into a bounded allocation fraction.
//! - [`FeeRouter`] splits each drip between the stability pool and the rest
//!   of the system using the *previous* cycle's fraction.
//! - [`GlobalFeeRouter`] funds the oracle reserve first, then splits the
//!   remainder between the external liquidity venue and staking, informing
//!   its controller when the shared 100% budget saturates.
//! - [`DripPipeline`] runs one full cycle atomically behind a fail-closed
//!   reentrancy guard.

pub mod allocation;
pub mod fee_router;
pub mod global_router;
pub mod pipeline;

pub use allocation::{AllocationController, AllocationParams};
pub use fee_router::FeeRouter;
pub use global_router::{GlobalFeeRouter, GlobalRouterParams};
pub use pipeline::{DripPipeline, PipelineView};
