//! Step-size control policies
//!
//! After each attempted step the integrator turns the local error estimate
//! into a multiplier for the next step size. All policies work on the
//! normalized error ratio
//!
//! ```text
//! r = err / threshold        (accept iff r ≤ 1)
//! ```
//!
//! where `threshold` is `tol` or `tol·h/(tf − t0)` depending on
//! [`ToleranceMode`].
//!
//! # Policies
//!
//! | Policy                | Accepted step                         | Rejected step            |
//! |-----------------------|---------------------------------------|--------------------------|
//! | `Integral`            | `safety·r^(−1/(q+1))`                 | same formula             |
//! | `ProportionalIntegral`| `safety·r^(−α)·r_prev^β`              | `safety·r^(−α)`          |
//! | `FixedFactors`        | `factor_expansion`                    | `factor_reduction`       |
//!
//! with `q` the embedded order and `α = 1/(q+1) − 0.75·β` (Hairer's PI
//! controller). Under [`ToleranceMode::PerUnitTime`] the threshold itself
//! carries a factor `h`, so `r` scales like `h^q` and every `1/(q+1)` above
//! becomes `1/q`. Every multiplier is bounded:
//!
//! - accepted: `[min_factor, factor_expansion]`, and at most `1` right after a rejection
//! - rejected: `[min_factor, factor_reduction]`

use crate::solver::{SolverConfiguration, SolverError};
use crate::tableau::ButcherTableau;

/// Floor on the previous error ratio used by the PI controller
const PI_MIN_PREVIOUS_RATIO: f64 = 1e-4;

// =================================================================================================
// Public policy selection
// =================================================================================================

/// Step-size control policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepControl {
    /// Classical error-ratio controller `safety·(tol/err)^(1/(q+1))`
    Integral { safety: f64 },

    /// Proportional-integral controller (Gustafsson, Hairer)
    ///
    /// `beta` weights the previous accepted error ratio; `beta = 0` recovers
    /// the integral controller.
    ProportionalIntegral { safety: f64, beta: f64 },

    /// Constant multipliers: expand after an accepted step, reduce after a
    /// rejected one
    FixedFactors,
}

impl StepControl {
    /// Integral controller with safety factor 0.9
    pub fn integral() -> Self {
        StepControl::Integral { safety: 0.9 }
    }

    /// PI controller with safety factor 0.9 and `beta = 0.04`
    pub fn proportional_integral() -> Self {
        StepControl::ProportionalIntegral {
            safety: 0.9,
            beta: 0.04,
        }
    }

    /// Short name used in reports and run-parameter files
    pub fn name(&self) -> &'static str {
        match self {
            StepControl::Integral { .. } => "integral",
            StepControl::ProportionalIntegral { .. } => "pi",
            StepControl::FixedFactors => "fixed",
        }
    }

    /// Resolve a name accepted by [`StepControl::name`] with default parameters
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "integral" | "i" => Some(Self::integral()),
            "pi" | "proportional-integral" | "proportional_integral" => {
                Some(Self::proportional_integral())
            }
            "fixed" | "fixed-factors" | "fixed_factors" => Some(StepControl::FixedFactors),
            _ => None,
        }
    }

    /// Check `safety ∈ (0, 1]` and `beta ∈ [0, 0.2]`
    pub fn validate(&self) -> Result<(), SolverError> {
        let check_safety = |safety: f64| {
            if safety > 0.0 && safety <= 1.0 {
                Ok(())
            } else {
                Err(SolverError::FactorOutOfRange {
                    name: "safety",
                    value: safety,
                })
            }
        };

        match *self {
            StepControl::Integral { safety } => check_safety(safety),
            StepControl::ProportionalIntegral { safety, beta } => {
                check_safety(safety)?;
                if !(0.0..=0.2).contains(&beta) {
                    return Err(SolverError::FactorOutOfRange {
                        name: "beta",
                        value: beta,
                    });
                }
                Ok(())
            }
            StepControl::FixedFactors => Ok(()),
        }
    }
}

impl Default for StepControl {
    fn default() -> Self {
        Self::integral()
    }
}

/// How the tolerance is compared with the local error estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToleranceMode {
    /// Accept when `err ≤ tol`
    #[default]
    PerStep,

    /// Accept when `err ≤ tol·h/(tf − t0)`
    ///
    /// The sum of accepted local errors over the whole interval then stays
    /// close to `tol`.
    PerUnitTime,
}

impl ToleranceMode {
    /// Acceptance threshold for a step of size `h` on an interval of `length`
    pub fn threshold(&self, tolerance: f64, h: f64, length: f64) -> f64 {
        match self {
            ToleranceMode::PerStep => tolerance,
            ToleranceMode::PerUnitTime => tolerance * h / length,
        }
    }

    /// Exponent the controller applies to the error ratio
    ///
    /// `1/(q+1)` per step; `1/q` per unit time, where the threshold already
    /// scales with `h`.
    pub fn error_exponent(&self, tableau: &ButcherTableau) -> f64 {
        match self {
            ToleranceMode::PerStep => tableau.error_exponent(),
            ToleranceMode::PerUnitTime => 1.0 / tableau.order_low() as f64,
        }
    }
}

// =================================================================================================
// Controller state
// =================================================================================================

/// Mutable state of a step-size policy during one solve
///
/// Owned by a single integrator; never shared.
#[derive(Debug, Clone)]
pub(crate) struct StepController {
    control: StepControl,
    exponent: f64,
    factor_expansion: f64,
    factor_reduction: f64,
    min_factor: f64,
    previous_ratio: f64,
    last_rejected: bool,
}

impl StepController {
    /// `exponent` comes from [`ToleranceMode::error_exponent`]
    pub(crate) fn new(config: &SolverConfiguration, exponent: f64) -> Self {
        Self {
            control: config.control,
            exponent,
            factor_expansion: config.factor_expansion,
            factor_reduction: config.factor_reduction,
            min_factor: config.min_factor,
            previous_ratio: PI_MIN_PREVIOUS_RATIO,
            last_rejected: false,
        }
    }

    /// Multiplier after an accepted step with error ratio `ratio ≤ 1`
    pub(crate) fn accepted(&mut self, ratio: f64) -> f64 {
        let proposal = match self.control {
            StepControl::Integral { safety } => safety * self.shrinkage(ratio, self.exponent),
            StepControl::ProportionalIntegral { safety, beta } => {
                let alpha = self.exponent - 0.75 * beta;
                let previous = self.previous_ratio.powf(beta);
                self.previous_ratio = ratio.max(PI_MIN_PREVIOUS_RATIO);
                safety * self.shrinkage(ratio, alpha) * previous
            }
            StepControl::FixedFactors => self.factor_expansion,
        };

        let mut factor = proposal.clamp(self.min_factor, self.factor_expansion);
        if self.last_rejected {
            factor = factor.min(1.0);
        }
        self.last_rejected = false;
        factor
    }

    /// Multiplier after a rejected step with error ratio `ratio > 1`
    ///
    /// A non-finite ratio yields the smallest admissible multiplier.
    pub(crate) fn rejected(&mut self, ratio: f64) -> f64 {
        self.last_rejected = true;

        let proposal = match self.control {
            StepControl::Integral { safety } => safety * self.shrinkage(ratio, self.exponent),
            StepControl::ProportionalIntegral { safety, beta } => {
                safety * self.shrinkage(ratio, self.exponent - 0.75 * beta)
            }
            StepControl::FixedFactors => self.factor_reduction,
        };

        if proposal.is_nan() {
            return self.min_factor;
        }
        proposal.clamp(self.min_factor, self.factor_reduction)
    }

    /// `ratio^(−exponent)`, infinite for an exact step
    fn shrinkage(&self, ratio: f64, exponent: f64) -> f64 {
        if ratio <= 0.0 {
            f64::INFINITY
        } else {
            ratio.powf(-exponent)
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
