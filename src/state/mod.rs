//! State representation and forcing functions
//!
//! This module maps a *problem kind* (scalar, vector or matrix state) to the
//! concrete variable type the integrator manipulates, and defines the
//! forcing-function interface `f(t, y)` supplied by the caller.
//!
//! # Core Concepts
//!
//! - **Problem kind** (`ProblemKind`): a zero-sized tag (`Scalar`, `Vector`,
//!   `FixedVector<N>`, `Matrix`) resolved entirely at compile time
//! - **State** (`State`): the arithmetic the integrator needs from a variable
//!   (scaled addition and a norm)
//! - **ODE system** (`OdeSystem`): the right-hand side of `dy/dt = f(t, y)`
//!
//! # Architecture
//!
//! The system is **separate from the numerical method**:
//! - The system provides the **equations** (the forcing term)
//! - The solver provides the **method** to integrate them (an embedded RK pair)
//!
//! There is no runtime branching on "is this a scalar or a vector": every
//! solver is generic over `K: ProblemKind` and only ever calls `State` methods.
//!
//! # Example
//!
//! ```rust
//! use rkf_rs::state::{OdeSystem, Scalar, State};
//!
//! struct Decay {
//!     rate: f64,
//! }
//!
//! impl OdeSystem<Scalar> for Decay {
//!     fn rhs(&self, _t: f64, y: &f64) -> f64 {
//!         -self.rate * y
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Decay"
//!     }
//! }
//!
//! let system = Decay { rate: 10.0 };
//! let derivative = system.rhs(0.0, &1.0);
//! assert_eq!(derivative.norm(), 10.0);
//! ```

pub mod data;
pub mod traits;

pub use data::State;
pub use traits::{
    FixedVector,
    ForcingTerm,
    Matrix,
    OdeSystem,
    ProblemKind,
    Scalar,
    VariableOf,
    Vector,
};
