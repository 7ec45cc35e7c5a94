//! Solver trait and configuration
//!
//! # Design Philosophy
//!
//! - `Scenario` says WHAT to solve (system, span, initial state)
//! - `SolverConfiguration` says HOW to control the step size
//! - `Solver` applies a numerical method and returns a `SimulationResult`
//!
//! A configuration is plain data: validating it never touches the system.

use crate::solver::{Scenario, SimulationResult, SolverError, StepControl, ToleranceMode};
use crate::state::ProblemKind;

// =================================================================================================
// Solver configuration
// =================================================================================================

/// Step-size control parameters of an adaptive solve
///
/// # Defaults
///
/// | Field                | Default               |
/// |----------------------|-----------------------|
/// | `initial_step`       | `None` (estimated)    |
/// | `tolerance`          | `1e-6`                |
/// | `max_steps`          | `10_000`              |
/// | `factor_expansion`   | `4.0`                 |
/// | `factor_reduction`   | `0.95`                |
/// | `min_factor`         | `0.1`                 |
/// | `max_step`           | `None` (`tf − t0`)    |
/// | `control`            | `Integral`, safety 0.9|
/// | `tolerance_mode`     | `PerStep`             |
/// | `accept_at_min_step` | `false`               |
///
/// # Examples
///
/// ```rust
/// use rkf_rs::solver::{SolverConfiguration, StepControl};
///
/// let config = SolverConfiguration::new(1e-4, 2000)
///     .with_initial_step(0.01)
///     .with_factors(2.0, 0.95)
///     .with_control(StepControl::FixedFactors);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfiguration {
    /// First step size (`None` = Hairer–Wanner estimate)
    pub initial_step: Option<f64>,

    /// Local error tolerance
    pub tolerance: f64,

    /// Maximum number of attempted steps (accepted + rejected)
    pub max_steps: usize,

    /// Largest multiplier applied to `h` after an accepted step
    pub factor_expansion: f64,

    /// Largest multiplier applied to `h` after a rejected step (< 1)
    pub factor_reduction: f64,

    /// Smallest multiplier ever applied to `h`
    pub min_factor: f64,

    /// Upper bound on `h` (`None` = the whole span)
    pub max_step: Option<f64>,

    /// Step-size policy
    pub control: StepControl,

    /// Interpretation of `tolerance`
    pub tolerance_mode: ToleranceMode,

    /// Accept a step exceeding the tolerance once `h` hits its floor
    pub accept_at_min_step: bool,
}

impl Default for SolverConfiguration {
    fn default() -> Self {
        Self {
            initial_step: None,
            tolerance: 1e-6,
            max_steps: 10_000,
            factor_expansion: 4.0,
            factor_reduction: 0.95,
            min_factor: 0.1,
            max_step: None,
            control: StepControl::default(),
            tolerance_mode: ToleranceMode::default(),
            accept_at_min_step: false,
        }
    }
}

impl SolverConfiguration {
    /// Create a configuration with the given tolerance and step budget
    pub fn new(tolerance: f64, max_steps: usize) -> Self {
        Self {
            tolerance,
            max_steps,
            ..Default::default()
        }
    }

    /// Builder pattern: set tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder pattern: set step budget
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Builder pattern: fix the first step size
    pub fn with_initial_step(mut self, h0: f64) -> Self {
        self.initial_step = Some(h0);
        self
    }

    /// Builder pattern: set expansion and reduction factors
    pub fn with_factors(mut self, expansion: f64, reduction: f64) -> Self {
        self.factor_expansion = expansion;
        self.factor_reduction = reduction;
        self
    }

    /// Builder pattern: set the floor on step multipliers
    pub fn with_min_factor(mut self, min_factor: f64) -> Self {
        self.min_factor = min_factor;
        self
    }

    /// Builder pattern: bound the step size
    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = Some(max_step);
        self
    }

    /// Builder pattern: set step-size policy
    pub fn with_control(mut self, control: StepControl) -> Self {
        self.control = control;
        self
    }

    /// Builder pattern: set tolerance interpretation
    pub fn with_tolerance_mode(mut self, mode: ToleranceMode) -> Self {
        self.tolerance_mode = mode;
        self
    }

    /// Builder pattern: allow forced acceptance at the minimum step size
    pub fn with_accept_at_min_step(mut self, accept: bool) -> Self {
        self.accept_at_min_step = accept;
        self
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// - [`SolverError::InvalidTolerance`] when `tolerance` is not positive and finite
    /// - [`SolverError::InvalidStepSize`] for a non-positive `initial_step` or `max_step`
    /// - [`SolverError::MaxStepsMustBePositive`] when `max_steps == 0`
    /// - [`SolverError::FactorOutOfRange`] when `factor_expansion ≤ 1`,
    ///   `factor_reduction ∉ (0, 1)`, `min_factor ∉ (0, factor_reduction]`
    ///   or the controller parameters are out of range
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SolverError::InvalidTolerance(self.tolerance));
        }

        for h in [self.initial_step, self.max_step].into_iter().flatten() {
            if !(h.is_finite() && h > 0.0) {
                return Err(SolverError::InvalidStepSize(h));
            }
        }

        if self.max_steps == 0 {
            return Err(SolverError::MaxStepsMustBePositive);
        }

        if !(self.factor_expansion.is_finite() && self.factor_expansion > 1.0) {
            return Err(SolverError::FactorOutOfRange {
                name: "factor_expansion",
                value: self.factor_expansion,
            });
        }

        if !(self.factor_reduction > 0.0 && self.factor_reduction < 1.0) {
            return Err(SolverError::FactorOutOfRange {
                name: "factor_reduction",
                value: self.factor_reduction,
            });
        }

        if !(self.min_factor > 0.0 && self.min_factor <= self.factor_reduction) {
            return Err(SolverError::FactorOutOfRange {
                name: "min_factor",
                value: self.min_factor,
            });
        }

        self.control.validate()
    }
}

// =================================================================================================
// Solver trait
// =================================================================================================

/// Numerical method that turns a scenario into a trajectory
///
/// # Contract
///
/// - Ill-posed input is reported as `Err` before any step is taken
/// - Running out of steps is NOT an error: the partial trajectory is
///   returned with `failed == true`
pub trait Solver<K: ProblemKind> {
    /// Solve the scenario with the given configuration
    fn solve(
        &self,
        scenario: &Scenario<K>,
        config: &SolverConfiguration,
    ) -> Result<SimulationResult<K>, SolverError>;

    /// Solver name (used in reports and metadata)
    fn name(&self) -> &str;
}
