//! Adaptive embedded Runge-Kutta solver
//!
//! # Mathematical Background
//!
//! An embedded pair computes two solutions of adjacent order `p` and `p−1`
//! from the same stage derivatives. Their difference
//!
//! ```text
//! err = ‖y_high − y_low‖ ≈ C·h^p
//! ```
//!
//! estimates the local error of the lower-order solution. The solver:
//!
//! 1. proposes a step `h`
//! 2. accepts it when `err ≤ tol`, advancing with `y_high` (local extrapolation)
//! 3. otherwise rejects it and retries with a smaller `h`
//! 4. after each decision picks the next `h` from the error ratio
//!
//! # Characteristics
//!
//! - **Order**: that of the tableau (5 for the default RKF45)
//! - **Cost**: `s` function evaluations per attempted step
//! - **Step size**: adaptive, lands exactly on `tf`
//! - **Stiffness**: explicit; stiff problems are solved at the stability
//!   limit of the pair, with many rejections
//!
//! # Comparison of tableaux
//!
//! | Tableau          | Stages | Order | Typical use                    |
//! |------------------|--------|-------|--------------------------------|
//! | Heun-Euler       | 2      | 2(1)  | teaching, very loose tolerance |
//! | Fehlberg 1(2)    | 3      | 2(1)  | cheap low-accuracy runs        |
//! | Bogacki-Shampine | 4      | 3(2)  | moderate tolerance             |
//! | RKF45            | 6      | 5(4)  | default                        |
//! | Dormand-Prince   | 7      | 5(4)  | tight tolerance                |
//!
//! # Example
//!
//! ```rust
//! use rkf_rs::solver::{RkfSolver, Scenario, Solver, SolverConfiguration, TimeSpan};
//! use rkf_rs::state::Scalar;
//!
//! let scenario = Scenario::<Scalar>::new(
//!     Box::new(|_t: f64, y: &f64| -10.0 * y),
//!     TimeSpan::until(1.0),
//!     1.0,
//! );
//! let config = SolverConfiguration::new(1e-8, 10_000);
//!
//! let result = RkfSolver::new().solve(&scenario, &config)?;
//! assert!(!result.failed);
//! assert!((result.final_state().unwrap() - (-10.0_f64).exp()).abs() < 1e-6);
//! # Ok::<(), rkf_rs::solver::SolverError>(())
//! ```

use crate::solver::{Integrator, Scenario, SimulationResult, Solver, SolverConfiguration, SolverError};
use crate::state::ProblemKind;
use crate::tableau::ButcherTableau;

// =================================================================================================
// RKF Solver
// =================================================================================================

/// Adaptive solver driven by an embedded Butcher tableau
///
/// Stateless between solves: each call to [`Solver::solve`] builds its own
/// [`Integrator`], so one solver can be shared across threads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RkfSolver {
    tableau: ButcherTableau,
}

impl RkfSolver {
    /// Runge-Kutta-Fehlberg 4(5) solver
    ///
    /// # Example
    ///
    /// ```rust
    /// use rkf_rs::solver::{RkfSolver, Solver};
    /// use rkf_rs::state::Scalar;
    ///
    /// let solver = RkfSolver::new();
    /// assert_eq!(Solver::<Scalar>::name(&solver), "Runge-Kutta-Fehlberg 4(5)");
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Solver using any embedded pair
    pub fn with_tableau(tableau: ButcherTableau) -> Self {
        Self { tableau }
    }

    /// Tableau used by this solver
    pub fn tableau(&self) -> &ButcherTableau {
        &self.tableau
    }
}

impl<K: ProblemKind> Solver<K> for RkfSolver {
    fn solve(
        &self,
        scenario: &Scenario<K>,
        config: &SolverConfiguration,
    ) -> Result<SimulationResult<K>, SolverError> {
        // ====== Step 1: Validation and setup ======

        let integrator = Integrator::new(&self.tableau, scenario, config)?;

        // ====== Step 2: Time integration ======

        let mut result = integrator.run();

        if result.failed {
            log::warn!(
                "{} on '{}' stopped at t = {:?} of {} ({} steps)",
                self.tableau.name(),
                scenario.system_name(),
                result.final_time(),
                scenario.span.end,
                result.statistics.attempts()
            );
        }

        // ====== Step 3: Metadata ======

        result.add_metadata("solver", self.tableau.name());
        result.add_metadata("system", scenario.system_name());
        result.add_metadata("kind", K::label());
        result.add_metadata("control", config.control.name());
        result.add_metadata("tolerance", &config.tolerance.to_string());
        result.add_metadata("t0", &scenario.span.start.to_string());
        result.add_metadata("tf", &scenario.span.end.to_string());

        Ok(result)
    }

    fn name(&self) -> &str {
        self.tableau.name()
    }
}

// =================================================================================================
// Tests
// =================================================================================================
