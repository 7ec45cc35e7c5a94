//! Numerical methods for solving differential equations
//!
//! This module contains concrete implementations of the [`Solver`](crate::solver::Solver) trait.
//!
//! # Architecture
//!
//! The abstract interface (`solver::traits`) is separate from the concrete
//! methods (`solver::methods`): a new method is a new type implementing
//! `Solver<K>`, the trait itself never changes.
//!
//! # Available Methods
//!
//! - **[`RkfSolver`]**: adaptive explicit embedded Runge-Kutta
//!   - Order: that of its [`ButcherTableau`](crate::tableau::ButcherTableau)
//!   - Cost: `s` function evaluations per attempted step
//!   - Use: non-stiff problems, scalar or vector state
//!
//! # Design Philosophy
//!
//! Each solver is:
//! - **Self-contained**: No shared mutable state
//! - **Stateless**: Can be reused for multiple simulations
//! - **Generic**: One implementation for every `ProblemKind`

mod rkf;

pub use rkf::RkfSolver;
