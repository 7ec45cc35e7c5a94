//! Typed errors raised before the integration loop starts
//!
//! Everything here is an ill-posed input detected eagerly. Running out of
//! steps is *not* an error: it is reported through
//! [`SimulationResult::failed`](crate::solver::SimulationResult::failed).

use std::fmt;

/// Validation errors returned by solvers, configurations and tableaux
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Tolerance is zero, negative or not finite
    InvalidTolerance(f64),

    /// Integration interval is empty, reversed or not finite
    InvalidTimeSpan { start: f64, end: f64 },

    /// Initial or maximum step size is zero, negative or not finite
    InvalidStepSize(f64),

    /// Step budget of zero
    MaxStepsMustBePositive,

    /// A step-control factor lies outside its admissible range
    FactorOutOfRange { name: &'static str, value: f64 },

    /// Initial state contains NaN or Inf
    NonFiniteInitialState,

    /// Forcing function returned NaN or Inf at the initial point
    NonFiniteDerivative { time: f64 },

    /// Forcing function returned a derivative of the wrong size
    DimensionMismatch { expected: usize, found: usize },

    /// Same number of components, different `(rows, columns)`
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Butcher tableau violates a consistency condition
    InvalidTableau { name: String, reason: String },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::InvalidTolerance(v) => {
                write!(f, "tolerance must be positive and finite (got {})", v)
            }
            SolverError::InvalidTimeSpan { start, end } => {
                write!(f, "time span must satisfy t0 < tf (got [{}, {}])", start, end)
            }
            SolverError::InvalidStepSize(v) => {
                write!(f, "step size must be positive and finite (got {})", v)
            }
            SolverError::MaxStepsMustBePositive => write!(f, "max_steps must be positive"),
            SolverError::FactorOutOfRange { name, value } => {
                write!(f, "{} is out of range (got {})", name, value)
            }
            SolverError::NonFiniteInitialState => {
                write!(f, "initial state contains NaN or Inf")
            }
            SolverError::NonFiniteDerivative { time } => {
                write!(f, "forcing function returned NaN or Inf at t = {}", time)
            }
            SolverError::DimensionMismatch { expected, found } => write!(
                f,
                "forcing function returned {} components, state has {}",
                found, expected
            ),
            SolverError::ShapeMismatch { expected, found } => write!(
                f,
                "forcing function returned a {}x{} derivative, state is {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            SolverError::InvalidTableau { name, reason } => {
                write!(f, "invalid Butcher tableau '{}': {}", name, reason)
            }
        }
    }
}

impl std::error::Error for SolverError {}
