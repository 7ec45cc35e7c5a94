//! Helper functions for integration tests

use rkf_rs::solver::{Scenario, SimulationResult, TimeSpan};
use rkf_rs::state::Scalar;

use super::ExponentialDecay;

/// `y' = -rate·y`, `y(0) = 1` on `[0, end]`
pub fn decay_scenario(rate: f64, end: f64) -> Scenario<Scalar> {
    Scenario::new(Box::new(ExponentialDecay::new(rate)), TimeSpan::until(end), 1.0)
}

/// Largest pointwise deviation from `exact(t)` over the trajectory
pub fn max_abs_error(result: &SimulationResult<Scalar>, exact: impl Fn(f64) -> f64) -> f64 {
    result
        .iter()
        .map(|(t, y)| (y - exact(t)).abs())
        .fold(0.0, f64::max)
}

/// Panic unless every time point is strictly after the previous one
pub fn assert_strictly_increasing(times: &[f64], message: &str) {
    for (i, pair) in times.windows(2).enumerate() {
        assert!(
            pair[1] > pair[0],
            "{}: t[{}] = {} is not after t[{}] = {}",
            message,
            i + 1,
            pair[1],
            i,
            pair[0]
        );
    }
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_error() {
        assert!((relative_error(1.0, 1.0) - 0.0).abs() < 1e-10);
        assert!((relative_error(1.1, 1.0) - 0.1).abs() < 1e-10);
        assert!((relative_error(0.0, 0.0)).abs() < 1e-10);
    }
}
