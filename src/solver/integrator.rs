//! Adaptive time-stepping driver
//!
//! # State machine
//!
//! ```text
//!            attempt_step()
//!          ┌──────────────┐
//!          │   accepted   │  t ← t + h, y ← y_high, append (t, y)
//!          │   rejected   │  (t, y) unchanged, h shrinks
//!          ▼              │
//!     ┌─────────┐─────────┘
//!     │ Running │
//!     └────┬────┘
//!          │ t == tf                 │ accepted + rejected == max_steps
//!          ▼                         ▼
//!   ┌───────────┐              ┌────────┐
//!   │ Converged │              │ Failed │
//!   └───────────┘              └────────┘
//! ```
//!
//! # Step size bounds
//!
//! - `h ∈ [h_min, h_max]` with `h_min = 100·ε·(tf − t0)` and `h_max` the
//!   configured maximum (default: the whole span)
//! - `t + h` never exceeds `tf`. When the remaining interval is shorter than
//!   `h`, or would leave a sliver shorter than `h_min`, the step is set to the
//!   remaining interval and the accepted time is snapped to `tf` exactly.

use crate::solver::control::StepController;
use crate::solver::hinit::initial_step;
use crate::solver::{
    IntegrationStatus, RkfStepper, Scenario, SimulationResult, SolverConfiguration, SolverError,
    Statistics, TimeSpan,
};
use crate::state::{ProblemKind, State};
use crate::tableau::ButcherTableau;

/// Outcome of one attempted step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepDecision {
    /// The state advanced to `time`
    Accepted { time: f64, step: f64, error: f64 },

    /// The state stayed at `time`; the next attempt uses a smaller step
    Rejected { time: f64, step: f64, error: f64 },
}

impl StepDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, StepDecision::Accepted { .. })
    }
}

// =================================================================================================
// Integrator
// =================================================================================================

/// Owns the running `(t, y, h)` triple and the trajectory of one solve
///
/// Built by [`Integrator::new`], which validates every input before any
/// step is taken. Drive it step by step with [`Integrator::attempt_step`]
/// or to completion with [`Integrator::run`].
///
/// # Example
///
/// ```rust
/// use rkf_rs::solver::{Integrator, IntegrationStatus, Scenario, SolverConfiguration, TimeSpan};
/// use rkf_rs::state::Scalar;
/// use rkf_rs::tableau::ButcherTableau;
///
/// let scenario = Scenario::<Scalar>::new(
///     Box::new(|_t: f64, y: &f64| -y),
///     TimeSpan::until(1.0),
///     1.0,
/// );
/// let config = SolverConfiguration::new(1e-8, 1000);
/// let tableau = ButcherTableau::rkf45();
///
/// let mut integrator = Integrator::new(&tableau, &scenario, &config)?;
/// let first = integrator.attempt_step();
/// assert!(first.is_some());
///
/// let result = integrator.run();
/// assert_eq!(result.status, IntegrationStatus::Converged);
/// assert_eq!(result.final_time(), Some(1.0));
/// # Ok::<(), rkf_rs::solver::SolverError>(())
/// ```
pub struct Integrator<'a, K: ProblemKind> {
    stepper: RkfStepper<'a, K>,
    controller: StepController,
    config: &'a SolverConfiguration,
    span: TimeSpan,
    system_name: &'a str,
    h_min: f64,
    h_max: f64,

    t: f64,
    y: K::Variable,
    h: f64,
    status: IntegrationStatus,

    time_points: Vec<f64>,
    trajectory: Vec<K::Variable>,
    statistics: Statistics,
    error_sum: f64,
}

impl<'a, K: ProblemKind> Integrator<'a, K> {
    /// Validate inputs and prepare the first step
    ///
    /// # Errors
    ///
    /// Any [`SolverError`] from the configuration, the scenario, or the probe
    /// `f(t0, y0)` (non-finite or wrong dimension).
    pub fn new(
        tableau: &'a ButcherTableau,
        scenario: &'a Scenario<K>,
        config: &'a SolverConfiguration,
    ) -> Result<Self, SolverError> {
        // ====== Step 1: Validation ======

        config.validate()?;
        scenario.validate()?;

        let span = scenario.span;
        let t0 = span.start;
        let y0 = scenario.initial.clone();

        let f0 = scenario.system.rhs(t0, &y0);
        let mut statistics = Statistics {
            function_evaluations: 1,
            ..Default::default()
        };

        if f0.dimension() != y0.dimension() {
            return Err(SolverError::DimensionMismatch {
                expected: y0.dimension(),
                found: f0.dimension(),
            });
        }
        if f0.shape() != y0.shape() {
            return Err(SolverError::ShapeMismatch {
                expected: y0.shape(),
                found: f0.shape(),
            });
        }
        if !f0.is_finite() {
            return Err(SolverError::NonFiniteDerivative { time: t0 });
        }

        // ====== Step 2: Step size bounds ======

        let h_min = span.min_step();
        let h_max = config
            .max_step
            .map_or(span.length(), |h| h.min(span.length()))
            .max(h_min);

        let h0 = match config.initial_step {
            Some(h) => h,
            None => {
                let (h, evaluations) = initial_step::<K>(
                    &*scenario.system,
                    t0,
                    &y0,
                    &f0,
                    tableau.order_high(),
                    config.tolerance,
                    h_max,
                );
                statistics.function_evaluations += evaluations;
                log::debug!("{}: estimated initial step h0 = {:e}", scenario.system_name(), h);
                h
            }
        };

        // ====== Step 3: Storage ======

        let mut time_points = Vec::with_capacity(config.max_steps.min(4096) + 1);
        let mut trajectory = Vec::with_capacity(config.max_steps.min(4096) + 1);
        time_points.push(t0);
        trajectory.push(y0.clone());

        Ok(Self {
            stepper: RkfStepper::new(tableau, &*scenario.system),
            controller: StepController::new(config, config.tolerance_mode.error_exponent(tableau)),
            config,
            span,
            system_name: scenario.system_name(),
            h_min,
            h_max,
            t: t0,
            y: y0,
            h: h0.clamp(h_min, h_max),
            status: IntegrationStatus::Running,
            time_points,
            trajectory,
            statistics,
            error_sum: 0.0,
        })
    }

    // ======================================== Accessors ========================================

    /// Current time
    pub fn time(&self) -> f64 {
        self.t
    }

    /// Current accepted state
    pub fn state(&self) -> &K::Variable {
        &self.y
    }

    /// Step size of the next attempt (before landing adjustment)
    pub fn step_size(&self) -> f64 {
        self.h
    }

    /// Smallest step size the integrator will use
    pub fn min_step_size(&self) -> f64 {
        self.h_min
    }

    pub fn status(&self) -> IntegrationStatus {
        self.status
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    // ======================================== Stepping ========================================

    /// Attempt one step
    ///
    /// Returns `None` once the integrator has left [`IntegrationStatus::Running`];
    /// the call that exhausts the step budget switches the status to
    /// [`IntegrationStatus::Failed`] and also returns `None`, as does a step
    /// too small to move `t`.
    pub fn attempt_step(&mut self) -> Option<StepDecision> {
        if self.status != IntegrationStatus::Running {
            return None;
        }

        if self.statistics.attempts() >= self.config.max_steps {
            self.status = IntegrationStatus::Failed;
            log::warn!(
                "{}: maximum number of steps ({}) reached at t = {} before tf = {}",
                self.system_name,
                self.config.max_steps,
                self.t,
                self.span.end
            );
            return None;
        }

        // ====== Landing on tf ======

        let remaining = self.span.end - self.t;
        let landing = self.h >= remaining || remaining - self.h < self.h_min;
        let h = if landing { remaining } else { self.h };

        if !landing && self.t + h <= self.t {
            self.status = IntegrationStatus::Failed;
            log::warn!(
                "{}: step h = {:e} no longer advances t = {}",
                self.system_name,
                h,
                self.t
            );
            return None;
        }

        // ====== Embedded step ======

        let estimate = self.stepper.step(self.t, &self.y, h);
        self.statistics.function_evaluations += self.stepper.evaluations_per_step();

        let error = if estimate.high.is_finite() {
            estimate.error()
        } else {
            f64::INFINITY
        };
        let threshold =
            self.config
                .tolerance_mode
                .threshold(self.config.tolerance, h, self.span.length());
        let ratio = error / threshold;

        let within_tolerance = ratio <= 1.0;
        let forced = !within_tolerance
            && self.config.accept_at_min_step
            && error.is_finite()
            && h <= self.h_min;

        if within_tolerance || forced {
            Some(self.accept(estimate.high, h, error, ratio, landing, forced))
        } else {
            Some(self.reject(h, error, ratio))
        }
    }

    fn accept(
        &mut self,
        next: K::Variable,
        h: f64,
        error: f64,
        ratio: f64,
        landing: bool,
        forced: bool,
    ) -> StepDecision {
        self.t = if landing { self.span.end } else { self.t + h };
        self.y = next;
        self.time_points.push(self.t);
        self.trajectory.push(self.y.clone());

        self.statistics.accepted += 1;
        self.error_sum += error;

        if forced {
            self.statistics.forced += 1;
            log::warn!(
                "{}: step accepted at minimum size h = {:e} with error {:e} above tolerance (t = {})",
                self.system_name,
                h,
                error,
                self.t
            );
        }

        let factor = if forced {
            1.0
        } else {
            self.controller.accepted(ratio)
        };
        if factor > 1.0 {
            self.statistics.expansions += 1;
        }
        self.h = (h * factor).clamp(self.h_min, self.h_max);

        log::trace!(
            "accepted t = {:.6e}, h = {:.3e}, err = {:.3e}, next h = {:.3e}",
            self.t,
            h,
            error,
            self.h
        );

        if landing {
            self.status = IntegrationStatus::Converged;
            log::debug!(
                "{}: reached tf = {} after {} accepted and {} rejected steps",
                self.system_name,
                self.span.end,
                self.statistics.accepted,
                self.statistics.rejected
            );
        }

        StepDecision::Accepted {
            time: self.t,
            step: h,
            error,
        }
    }

    fn reject(&mut self, h: f64, error: f64, ratio: f64) -> StepDecision {
        self.statistics.rejected += 1;

        let factor = self.controller.rejected(ratio);
        self.h = (h * factor).max(self.h_min);

        log::debug!(
            "rejected t = {:.6e}, h = {:.3e}, err = {:.3e}, retry h = {:.3e}",
            self.t,
            h,
            error,
            self.h
        );

        StepDecision::Rejected {
            time: self.t,
            step: h,
            error,
        }
    }

    /// Step until the status leaves [`IntegrationStatus::Running`]
    pub fn run(mut self) -> SimulationResult<K> {
        while self.attempt_step().is_some() {}
        self.into_result()
    }

    /// Hand the trajectory to the caller
    ///
    /// An integrator stopped while still running yields `failed == true`.
    pub fn into_result(self) -> SimulationResult<K> {
        SimulationResult::new(
            self.time_points,
            self.trajectory,
            self.statistics,
            self.error_sum,
            self.status,
        )
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{StepControl, ToleranceMode};
    use crate::state::{Matrix, Scalar, Vector};
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};

    fn decay(rate: f64, end: f64) -> Scenario<Scalar> {
        Scenario::<Scalar>::new(
            Box::new(move |_t: f64, y: &f64| -rate * y),
            TimeSpan::until(end),
            1.0,
        )
    }

    #[test]
    fn test_trajectory_starts_at_initial_point() {
        let scenario = decay(1.0, 1.0);
        let config = SolverConfiguration::new(1e-6, 1000);
        let tableau = ButcherTableau::rkf45();
        let result = Integrator::new(&tableau, &scenario, &config).unwrap().run();

        assert_eq!(result.time_points[0], 0.0);
        assert_eq!(result.trajectory[0], 1.0);
        assert_eq!(result.len(), result.statistics.accepted + 1);
    }

    #[test]
    fn test_lands_exactly_on_final_time() {
        let scenario = decay(1.0, 0.7);
        let config = SolverConfiguration::new(1e-6, 1000).with_initial_step(0.3);
        let tableau = ButcherTableau::rkf45();
        let result = Integrator::new(&tableau, &scenario, &config).unwrap().run();

        assert!(!result.failed);
        assert_eq!(result.final_time(), Some(0.7));
        assert!(result.time_points.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_rejection_leaves_state_unchanged() {
        let scenario = decay(10.0, 10.0);
        let config = SolverConfiguration::new(1e-10, 1000).with_initial_step(5.0);
        let tableau = ButcherTableau::rkf45();
        let mut integrator = Integrator::new(&tableau, &scenario, &config).unwrap();

        let decision = integrator.attempt_step().unwrap();
        assert!(!decision.is_accepted());
        assert_eq!(integrator.time(), 0.0);
        assert_eq!(*integrator.state(), 1.0);
        assert!(integrator.step_size() < 5.0);

        let again = integrator.attempt_step().unwrap();
        assert!(!again.is_accepted());
        assert_eq!(integrator.time(), 0.0);
        assert_eq!(*integrator.state(), 1.0);
        assert_eq!(integrator.statistics().rejected, 2);
    }

    #[test]
    fn test_budget_exhaustion_sets_failed() {
        let scenario = decay(1.0, 100.0);
        let config = SolverConfiguration::new(1e-12, 5);
        let tableau = ButcherTableau::rkf45();
        let mut integrator = Integrator::new(&tableau, &scenario, &config).unwrap();

        for _ in 0..5 {
            assert!(integrator.attempt_step().is_some());
        }
        assert!(integrator.attempt_step().is_none());
        assert_eq!(integrator.status(), IntegrationStatus::Failed);

        let result = integrator.into_result();
        assert!(result.failed);
        assert_eq!(result.statistics.attempts(), 5);
        assert!(result.final_time().unwrap() < 100.0);
    }

    #[test]
    fn test_no_attempt_after_convergence() {
        let scenario = decay(1.0, 0.1);
        let config = SolverConfiguration::new(1e-3, 100);
        let tableau = ButcherTableau::rkf45();
        let mut integrator = Integrator::new(&tableau, &scenario, &config).unwrap();

        while integrator.attempt_step().is_some() {}
        assert_eq!(integrator.status(), IntegrationStatus::Converged);
        assert!(integrator.attempt_step().is_none());
    }

    #[test]
    fn test_error_estimate_is_sum_of_accepted_errors() {
        let scenario = decay(1.0, 1.0);
        let config = SolverConfiguration::new(1e-6, 1000);
        let tableau = ButcherTableau::bogacki_shampine();
        let mut integrator = Integrator::new(&tableau, &scenario, &config).unwrap();

        let mut sum = 0.0;
        while let Some(decision) = integrator.attempt_step() {
            if let StepDecision::Accepted { error, .. } = decision {
                sum += error;
            }
        }
        let result = integrator.into_result();
        assert_relative_eq!(result.final_error_estimate, sum, epsilon = 1e-15);
    }

    #[test]
    fn test_function_evaluations_counted() {
        let scenario = decay(1.0, 1.0);
        let config = SolverConfiguration::new(1e-6, 1000).with_initial_step(0.1);
        let tableau = ButcherTableau::rkf45();
        let result = Integrator::new(&tableau, &scenario, &config).unwrap().run();

        // one probe f(t0, y0) plus six stages per attempt
        assert_eq!(
            result.statistics.function_evaluations,
            1 + 6 * result.statistics.attempts()
        );
    }

    #[test]
    fn test_forced_acceptance_at_min_step() {
        // Derivative discontinuity at t = 0.5 cannot be resolved at this tolerance
        let jump = |t: f64, _y: &f64| if t < 0.5 { 0.0 } else { 1.0e6 };
        let scenario = Scenario::<Scalar>::new(Box::new(jump), TimeSpan::until(1.0), 0.0);
        let config = SolverConfiguration::new(1e-14, 100_000)
            .with_initial_step(0.1)
            .with_accept_at_min_step(true);
        let tableau = ButcherTableau::heun_euler();
        let result = Integrator::new(&tableau, &scenario, &config).unwrap().run();

        assert!(!result.failed);
        assert!(result.statistics.forced > 0);
    }

    #[test]
    fn test_offset_span_keeps_time_increasing() {
        // Same discontinuity, on an interval far from the origin
        let t0 = 1e10;
        let jump = move |t: f64, _y: &f64| if t < t0 + 0.5 { 0.0 } else { 1.0e6 };
        let scenario = Scenario::<Scalar>::new(Box::new(jump), TimeSpan::new(t0, t0 + 1.0), 0.0);
        let tableau = ButcherTableau::heun_euler();

        let strict = SolverConfiguration::new(1e-14, 2000).with_initial_step(0.1);
        let integrator = Integrator::new(&tableau, &scenario, &strict).unwrap();
        assert!(t0 + integrator.min_step_size() > t0);

        let result = integrator.run();
        assert!(result.time_points.windows(2).all(|w| w[1] > w[0]));
        assert!(result.final_time().unwrap() <= t0 + 0.5);

        let forced = strict.with_accept_at_min_step(true);
        let result = Integrator::new(&tableau, &scenario, &forced).unwrap().run();
        assert!(!result.failed);
        assert_eq!(result.final_time(), Some(t0 + 1.0));
        assert!(result.time_points.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_non_finite_step_is_rejected() {
        // Undefined for |y| > 10: the unstable first step (h·λ = −10) leaves
        // that region in its stages and must be retried
        let guarded = |_t: f64, y: &f64| if y.abs() > 10.0 { f64::NAN } else { -5.0 * y };
        let scenario = Scenario::<Scalar>::new(Box::new(guarded), TimeSpan::until(2.0), 1.0);
        let config = SolverConfiguration::new(1e-6, 1000).with_initial_step(2.0);
        let tableau = ButcherTableau::rkf45();
        let mut integrator = Integrator::new(&tableau, &scenario, &config).unwrap();

        let first = integrator.attempt_step().unwrap();
        assert!(!first.is_accepted());
        assert_relative_eq!(integrator.step_size(), 0.2, epsilon = 1e-12);

        let result = integrator.run();
        assert!(!result.failed);
        assert_eq!(result.final_time(), Some(2.0));
        assert!(result.trajectory.iter().all(|y| y.is_finite()));
    }

    #[test]
    fn test_rejects_dimension_mismatch() {
        let scenario = Scenario::<Vector>::new(
            Box::new(|_t: f64, _y: &DVector<f64>| DVector::zeros(3)),
            TimeSpan::until(1.0),
            DVector::from_vec(vec![1.0, 2.0]),
        );
        let config = SolverConfiguration::default();
        let tableau = ButcherTableau::rkf45();

        let error = Integrator::new(&tableau, &scenario, &config).err();
        assert_eq!(
            error,
            Some(SolverError::DimensionMismatch { expected: 2, found: 3 })
        );
    }

    #[test]
    fn test_rejects_transposed_matrix_derivative() {
        let scenario = Scenario::<Matrix>::new(
            Box::new(|_t: f64, y: &DMatrix<f64>| y.transpose()),
            TimeSpan::until(1.0),
            DMatrix::from_element(2, 3, 1.0),
        );
        let config = SolverConfiguration::default();
        let tableau = ButcherTableau::rkf45();

        let error = Integrator::new(&tableau, &scenario, &config).err();
        assert_eq!(
            error,
            Some(SolverError::ShapeMismatch {
                expected: (2, 3),
                found: (3, 2)
            })
        );
    }

    #[test]
    fn test_rejects_non_finite_initial_derivative() {
        let scenario = Scenario::<Scalar>::new(
            Box::new(|_t: f64, y: &f64| 1.0 / y),
            TimeSpan::until(1.0),
            0.0,
        );
        let config = SolverConfiguration::default();
        let tableau = ButcherTableau::rkf45();

        assert!(matches!(
            Integrator::new(&tableau, &scenario, &config),
            Err(SolverError::NonFiniteDerivative { .. })
        ));
    }

    #[test]
    fn test_max_step_respected() {
        let scenario = decay(0.01, 10.0);
        let config = SolverConfiguration::new(1e-3, 1000).with_max_step(0.5);
        let tableau = ButcherTableau::rkf45();
        let result = Integrator::new(&tableau, &scenario, &config).unwrap().run();

        assert!(result.max_step().unwrap() <= 0.5 + 1e-12);
        assert!(result.len() >= 21);
    }

    #[test]
    fn test_per_unit_time_is_stricter() {
        let scenario = decay(1.0, 10.0);
        let tableau = ButcherTableau::rkf45();

        let per_step = SolverConfiguration::new(1e-6, 10_000);
        let per_unit = per_step.clone().with_tolerance_mode(ToleranceMode::PerUnitTime);

        let a = Integrator::new(&tableau, &scenario, &per_step).unwrap().run();
        let b = Integrator::new(&tableau, &scenario, &per_unit).unwrap().run();

        assert!(!a.failed && !b.failed);
        assert!(b.statistics.accepted > a.statistics.accepted);
    }

    #[test]
    fn test_fixed_factor_control_converges() {
        let scenario = decay(1.0, 5.0);
        let config = SolverConfiguration::new(1e-6, 10_000)
            .with_initial_step(0.1)
            .with_factors(2.0, 0.5)
            .with_control(StepControl::FixedFactors);
        let tableau = ButcherTableau::rkf45();
        let result = Integrator::new(&tableau, &scenario, &config).unwrap().run();

        assert!(!result.failed);
        assert_relative_eq!(*result.final_state().unwrap(), (-5.0_f64).exp(), epsilon = 1e-4);
    }
}
