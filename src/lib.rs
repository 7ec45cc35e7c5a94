//! rkf-rs: adaptive Runge-Kutta-Fehlberg integration
//!
//! Integrates initial-value problems `dy/dt = f(t, y)`, `y(t0) = y0` over
//! `[t0, tf]` with an explicit embedded Runge-Kutta pair, growing and
//! shrinking the step size so that the local error estimate stays within a
//! tolerance.
//!
//! # Architecture
//!
//! rkf-rs is built on two core principles:
//!
//! 1. **Separation of System and Method**
//!    - An ODE system defines the forcing term (what to solve)
//!    - A solver provides the embedded pair and step control (how to solve)
//!
//! 2. **Compile-time state representation**
//!    - Scalar, dynamic-vector and fixed-vector problems share one solver
//!    - No runtime branching on the shape of the state
//!
//! # Quick Start
//!
//! ```rust
//! use rkf_rs::prelude::*;
//!
//! // 1. Scenario: y' = -10 y, y(0) = 1 on [0, 100]
//! let scenario = Scenario::<Scalar>::new(
//!     Box::new(|_t: f64, y: &f64| -10.0 * y),
//!     TimeSpan::new(0.0, 100.0),
//!     1.0,
//! );
//!
//! // 2. Configure step control
//! let config = SolverConfiguration::new(1e-4, 10_000);
//!
//! // 3. Run
//! let result = RkfSolver::new().solve(&scenario, &config)?;
//!
//! // 4. Inspect
//! assert!(!result.failed);
//! assert!(result.final_state().unwrap().abs() < 1e-3);
//! println!("{} steps, {} rejections", result.statistics.accepted, result.statistics.rejected);
//! # Ok::<(), SolverError>(())
//! ```
//!
//! # Modules
//!
//! - [`state`]: problem kinds, state arithmetic and the `OdeSystem` trait
//! - [`tableau`]: Butcher tableaux of embedded pairs
//! - [`solver`]: stepper, step control, integrator and results
//! - [`config`]: GetPot-style run-parameter files
//! - [`output`]: CSV/DAT export and plotting

pub mod config;
pub mod output;
pub mod solver;
pub mod state;
pub mod tableau;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use rkf_rs::prelude::*;
    //! ```
    pub use crate::solver::{
        IntegrationStatus,
        RkfSolver,
        Scenario,
        SimulationResult,
        Solver,
        SolverConfiguration,
        SolverError,
        StepControl,
        TimeSpan,
        ToleranceMode,
    };
    pub use crate::state::{
        FixedVector, Matrix, OdeSystem, ProblemKind, Scalar, State, Vector,
    };
    pub use crate::tableau::ButcherTableau;
}
