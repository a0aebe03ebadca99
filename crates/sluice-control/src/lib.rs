//! # sluice-control — Discretized decay, EMA, and PI control.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! This crate implements the control-math leaves of the fee-allocation layer:
//! - **Table-driven half-life decay**: elapsed time maps to a precomputed
//!   staircase of retention weights, clamped at 50% so a single stale reading
//!   can never wipe accumulated history.
//! - **EMA**: a blend of decayed history and the current observation, with a
//!   pure preview path that commits bit-for-bit identically.
//! - **Deadband PI control**: proportional-integral output with hard error
//!   zeroing inside the deadband and direction-aware anti-windup at the
//!   output bounds.

pub mod decay;
pub mod ema;
pub mod pi;

pub use decay::DecayTable;
pub use ema::Ema;
pub use pi::{PiController, PiParams};
