//! Scenario tests for the clash engine
//!
//! This module contains end-to-end tests that drive the public API:
//! - Contract properties (role-swap symmetry, threshold monotonicity,
//!   empty-set identity, determinism)
//! - Geometry fixtures (distance correctness, exact boundaries, cell
//!   boundary neighbours)
//! - Randomized agreement with an exhaustive pairwise scan
//! - Large-set runs across backends and parallel settings

#[cfg(test)]
pub mod support;

#[cfg(test)]
pub mod properties_test;
