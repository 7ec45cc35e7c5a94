//! Independent solves over many scenarios or configurations
//!
//! Each solve builds its own integrator and owns its trajectory, so solves
//! never share mutable state. With the `parallel` feature and at least
//! [`parallel_threshold()`](crate::solver::parallel_threshold) jobs, they run
//! on rayon's global pool; otherwise sequentially. Output order always
//! matches input order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::solver::{Scenario, SimulationResult, Solver, SolverConfiguration, SolverError};
use crate::state::ProblemKind;

/// Outcome of one solve in a sweep
pub type SweepResult<K> = Result<SimulationResult<K>, SolverError>;

/// Solve every scenario with the same solver and configuration
///
/// # Example
///
/// ```rust
/// use rkf_rs::solver::{solve_all, RkfSolver, Scenario, SolverConfiguration, TimeSpan};
/// use rkf_rs::state::Scalar;
///
/// let scenarios: Vec<Scenario<Scalar>> = [1.0, 2.0, 4.0]
///     .iter()
///     .map(|&rate| {
///         Scenario::<Scalar>::new(
///             Box::new(move |_t: f64, y: &f64| -rate * y),
///             TimeSpan::until(1.0),
///             1.0,
///         )
///     })
///     .collect();
///
/// let results = solve_all(&RkfSolver::new(), &scenarios, &SolverConfiguration::default());
/// assert_eq!(results.len(), 3);
/// assert!(results.iter().all(|r| r.as_ref().is_ok_and(|r| !r.failed)));
/// ```
pub fn solve_all<K, S>(
    solver: &S,
    scenarios: &[Scenario<K>],
    config: &SolverConfiguration,
) -> Vec<SweepResult<K>>
where
    K: ProblemKind,
    S: Solver<K> + Sync,
{
    if scenarios.len() >= super::parallel_threshold() {
        log::debug!(
            "solving {} scenarios (parallel: {})",
            scenarios.len(),
            cfg!(feature = "parallel")
        );

        #[cfg(feature = "parallel")]
        return scenarios
            .par_iter()
            .map(|scenario| solver.solve(scenario, config))
            .collect();
    }

    scenarios
        .iter()
        .map(|scenario| solver.solve(scenario, config))
        .collect()
}

/// Solve one scenario under several configurations (e.g. a tolerance sweep)
pub fn solve_configurations<K, S>(
    solver: &S,
    scenario: &Scenario<K>,
    configs: &[SolverConfiguration],
) -> Vec<SweepResult<K>>
where
    K: ProblemKind,
    S: Solver<K> + Sync,
{
    if configs.len() >= super::parallel_threshold() {
        #[cfg(feature = "parallel")]
        return configs
            .par_iter()
            .map(|config| solver.solve(scenario, config))
            .collect();
    }

    configs
        .iter()
        .map(|config| solver.solve(scenario, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{RkfSolver, ThresholdOverride, TimeSpan};
    use crate::state::Scalar;

    fn decays(rates: &[f64]) -> Vec<Scenario<Scalar>> {
        rates
            .iter()
            .map(|&rate| {
                Scenario::<Scalar>::new(
                    Box::new(move |_t: f64, y: &f64| -rate * y),
                    TimeSpan::until(1.0),
                    1.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_order_preserved() {
        let _override = ThresholdOverride::set(2);
        let rates = [0.5, 1.0, 2.0, 3.0, 5.0];
        let config = SolverConfiguration::new(1e-8, 10_000);
        let results = solve_all(&RkfSolver::new(), &decays(&rates), &config);

        for (rate, result) in rates.iter().zip(&results) {
            let result = result.as_ref().unwrap();
            let y = *result.final_state().unwrap();
            assert!((y - (-*rate).exp()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_sequential_and_batched_agree() {
        let rates = [1.0, 2.0, 3.0];
        let config = SolverConfiguration::new(1e-6, 10_000);

        let batched = {
            let _override = ThresholdOverride::set(1);
            solve_all(&RkfSolver::new(), &decays(&rates), &config)
        };
        let sequential = {
            let _override = ThresholdOverride::set(1000);
            solve_all(&RkfSolver::new(), &decays(&rates), &config)
        };

        for (a, b) in batched.iter().zip(&sequential) {
            assert_eq!(
                a.as_ref().unwrap().time_points,
                b.as_ref().unwrap().time_points
            );
        }
    }

    #[test]
    fn test_errors_reported_per_scenario() {
        let mut scenarios = decays(&[1.0]);
        scenarios.push(Scenario::<Scalar>::new(
            Box::new(|_t: f64, y: &f64| -y),
            TimeSpan::new(1.0, 0.0),
            1.0,
        ));
        let results = solve_all(&RkfSolver::new(), &scenarios, &SolverConfiguration::default());

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(SolverError::InvalidTimeSpan { .. })));
    }

    #[test]
    fn test_tolerance_sweep_refines() {
        let scenarios = decays(&[1.0]);
        let scenario = &scenarios[0];
        let configs: Vec<_> = [1e-3, 1e-6, 1e-9]
            .iter()
            .map(|&tol| SolverConfiguration::new(tol, 100_000))
            .collect();

        let results = solve_configurations(&RkfSolver::new(), scenario, &configs);
        let steps: Vec<usize> = results
            .iter()
            .map(|r| r.as_ref().unwrap().statistics.accepted)
            .collect();

        assert!(steps[0] < steps[1] && steps[1] < steps[2]);
    }
}
