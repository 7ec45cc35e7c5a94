//! Common utilities for integration tests

#![allow(dead_code)]

pub mod mock_systems;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_systems::{CountingDecay, ExponentialDecay, HarmonicOscillator, VanDerPol};
pub use test_helpers::{assert_strictly_increasing, decay_scenario, max_abs_error, relative_error};
