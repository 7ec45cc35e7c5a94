//! Simulation scenario definition
//!
//! A scenario combines an ODE system with its time span and initial state.

use crate::solver::{SolverError, TimeSpan};
use crate::state::{OdeSystem, ProblemKind, State};

/// Initial value problem `y' = f(t, y)`, `y(t0) = y0`, on `[t0, tf]`
///
/// # Design
///
/// The same scenario can be solved with different tableaux or step
/// controllers. This is the "WHAT to solve" (not "HOW to solve").
///
/// # Examples
///
/// ```rust
/// use rkf_rs::solver::{Scenario, TimeSpan};
/// use rkf_rs::state::Scalar;
///
/// let scenario = Scenario::<Scalar>::new(
///     Box::new(|_t: f64, y: &f64| -10.0 * y),
///     TimeSpan::until(100.0),
///     1.0,
/// );
/// assert!(scenario.validate().is_ok());
/// assert_eq!(scenario.dimension(), 1);
/// ```
pub struct Scenario<K: ProblemKind> {
    /// Forcing function
    pub system: Box<dyn OdeSystem<K>>,

    /// Integration interval
    pub span: TimeSpan,

    /// State at `span.start`
    pub initial: K::Variable,
}

impl<K: ProblemKind> Scenario<K> {
    /// Create a scenario
    pub fn new(system: Box<dyn OdeSystem<K>>, span: TimeSpan, initial: K::Variable) -> Self {
        Self {
            system,
            span,
            initial,
        }
    }

    /// Check the span and the initial state
    ///
    /// The forcing function itself is probed by the solver, which owns the
    /// evaluation counter.
    pub fn validate(&self) -> Result<(), SolverError> {
        self.span.validate()?;
        if !self.initial.is_finite() {
            return Err(SolverError::NonFiniteInitialState);
        }
        Ok(())
    }

    /// Name of the system
    pub fn system_name(&self) -> &str {
        self.system.name()
    }

    /// Number of state components
    pub fn dimension(&self) -> usize {
        self.initial.dimension()
    }
}

impl<K: ProblemKind> std::fmt::Debug for Scenario<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("system", &self.system_name())
            .field("kind", &K::label())
            .field("span", &self.span)
            .field("initial", &self.initial)
            .finish()
    }
}
