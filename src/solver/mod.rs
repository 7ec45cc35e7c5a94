//! Adaptive ODE solvers
//!
//! This module provides the stepping machinery that integrates an
//! [`OdeSystem`](crate::state::OdeSystem) from `t0` to `tf` with an explicit
//! embedded Runge-Kutta pair and error-controlled step sizes.
//!
//! # Three Inputs, One Output
//!
//! A solve combines a [`Scenario`] (forcing function, `[t0, tf]`, `y0`), a
//! [`SolverConfiguration`] (tolerance, step budget, growth and shrink
//! limits, [`StepControl`] policy) and a [`Solver`], here [`RkfSolver`]
//! holding its [`ButcherTableau`](crate::tableau::ButcherTableau). The
//! outcome is a [`SimulationResult`]: trajectory, counters and status.
//!
//! # Module Organization
//!
//! - **`stepper`**: one embedded step, `(t, y, h) → (y_high, y_low)`
//! - **`control`**: step-size policies (`StepControl`, `ToleranceMode`)
//! - **`integrator`**: the accept/reject state machine (`Integrator`)
//! - **`result`**: trajectory, counters and text report (`SimulationResult`)
//! - **`sweep`**: independent solves over many scenarios or configurations
//! - **`methods`**: concrete `Solver` implementations
//!
//! # Example
//!
//! ```rust
//! use rkf_rs::solver::{RkfSolver, Scenario, Solver, SolverConfiguration, TimeSpan};
//! use rkf_rs::state::Scalar;
//!
//! // y' = -10 y on [0, 100]
//! let scenario = Scenario::<Scalar>::new(
//!     Box::new(|_t: f64, y: &f64| -10.0 * y),
//!     TimeSpan::until(100.0),
//!     1.0,
//! );
//!
//! // per-step tolerance 1e-4, at most 10 000 attempts
//! let config = SolverConfiguration::new(1e-4, 10_000);
//!
//! let result = RkfSolver::new().solve(&scenario, &config)?;
//!
//! assert!(!result.failed);
//! assert_eq!(result.final_time(), Some(100.0));
//! # Ok::<(), rkf_rs::solver::SolverError>(())
//! ```
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌─────────────────┐
//! │   OdeSystem     │  (forcing function)
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ Scenario        │
//! │ (system + span) │
//! └────────┬────────┘
//!          │
//! ┌────────▼─────────────┐
//! │ Solver Configuration │
//! └────────┬─────────────┘
//!          │
//! ┌────────▼────────┐     ┌────────────────┐
//! │   Integrator    │────►│  RkfStepper    │ ← tableau + f
//! │ accept / reject │◄────│ (y_high,y_low) │
//! └────────┬────────┘     └────────────────┘
//!          │
//! ┌────────▼────────────┐
//! │ Simulation Result   │
//! │ (trajectory + stats)│
//! └─────────────────────┘
//! ```
//!
//! # Error Handling
//!
//! Ill-posed input is rejected before the first step with a typed
//! [`SolverError`]. Running out of steps is not an error:
//!
//! ```rust
//! use rkf_rs::solver::{RkfSolver, Scenario, Solver, SolverConfiguration, TimeSpan};
//! use rkf_rs::state::Scalar;
//!
//! let scenario = Scenario::<Scalar>::new(
//!     Box::new(|_t: f64, y: &f64| -y),
//!     TimeSpan::until(1000.0),
//!     1.0,
//! );
//! let config = SolverConfiguration::new(1e-10, 10);
//!
//! match RkfSolver::new().solve(&scenario, &config) {
//!     Ok(result) if result.failed => {
//!         println!("gave up at t = {:?}", result.final_time());
//!     }
//!     Ok(result) => println!("{} steps", result.len()),
//!     Err(e) => eprintln!("invalid input: {}", e),
//! }
//! ```

// =================================================================================================
// Module Declarations
// =================================================================================================

mod control;
mod error;
mod hinit;
mod integrator;
mod methods;
mod result;
mod scenario;
mod span;
mod stepper;
mod sweep;
mod traits;

// =================================================================================================
// Sweep Dispatch Threshold
// =================================================================================================
//
// One solve never runs in parallel; only independent solves do. Sweeps with
// at least this many jobs go to rayon's global pool (feature `parallel`).
// Relaxed ordering: the value is read once per sweep and never guards data.
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

static SWEEP_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Smallest number of jobs for which [`solve_all`] and
/// [`solve_configurations`] dispatch to rayon
///
/// Without the `parallel` feature the value is still tracked but every
/// sweep runs on the calling thread.
pub fn parallel_threshold() -> usize {
    SWEEP_THRESHOLD.load(Ordering::Relaxed)
}

/// Change the dispatch threshold, returning the previous value
///
/// `0` is treated as `1`: every non-empty sweep is dispatched.
///
/// ```rust
/// use rkf_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let previous = set_parallel_threshold(16);
/// assert_eq!(parallel_threshold(), 16);
/// set_parallel_threshold(previous);
/// ```
pub fn set_parallel_threshold(threshold: usize) -> usize {
    SWEEP_THRESHOLD.swap(threshold.max(1), Ordering::Relaxed)
}

/// Test-only override of the dispatch threshold, undone on drop
///
/// Holds a process-wide lock for its lifetime so tests running on other
/// threads never see each other's value.
#[cfg(test)]
pub(crate) struct ThresholdOverride {
    previous: usize,
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
static OVERRIDE_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
impl ThresholdOverride {
    pub(crate) fn set(threshold: usize) -> Self {
        let lock = OVERRIDE_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = set_parallel_threshold(threshold);
        Self {
            previous,
            _lock: lock,
        }
    }
}

#[cfg(test)]
impl Drop for ThresholdOverride {
    fn drop(&mut self) {
        SWEEP_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use control::{StepControl, ToleranceMode};
pub use error::SolverError;
pub use integrator::{Integrator, StepDecision};
pub use methods::RkfSolver;
pub use result::{IntegrationStatus, SimulationResult, Statistics};
pub use scenario::Scenario;
pub use span::TimeSpan;
pub use stepper::{RkfStepper, StepEstimate};
pub use sweep::{solve_all, solve_configurations, SweepResult};
pub use traits::{Solver, SolverConfiguration};

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_is_visible_then_undone() {
        let before = {
            let first = ThresholdOverride::set(500);
            assert_eq!(parallel_threshold(), 500);
            first.previous
        };

        let second = ThresholdOverride::set(7);
        assert_eq!(second.previous, before);
        assert_eq!(parallel_threshold(), 7);
    }

    #[test]
    fn test_zero_threshold_means_always_dispatch() {
        let _override = ThresholdOverride::set(0);
        assert_eq!(parallel_threshold(), 1);
    }
}
