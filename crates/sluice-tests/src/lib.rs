//! Integration and adversarial test suite for the Sluice allocation layer.
//!
//! This crate drives full fee-distribution cycles against mock collaborators
//! and verifies the layer's invariants: conservation-exact splits, one-cycle
//! distribution lag, fail-closed reentrancy, and full-abort error semantics.

pub mod helpers;
