//! Compute an initial step size guess
//!
//! Starting-step heuristic of Hairer, Nørsett & Wanner (Solving ODEs I,
//! section II.4): pick `h` such that an explicit Euler step changes the state
//! by about 1% of its size, then refine it with a finite-difference estimate
//! of the second derivative so that `h^order · ‖y''‖ ≈ 0.01·tol`.

use crate::state::{OdeSystem, ProblemKind, State};

/// Initial step size guess and the number of forcing-function evaluations it cost
///
/// `f0` must be `f(t0, y0)`. The result lies in `(0, h_max]`.
pub(crate) fn initial_step<K: ProblemKind>(
    system: &dyn OdeSystem<K>,
    t0: f64,
    y0: &K::Variable,
    f0: &K::Variable,
    order: usize,
    tolerance: f64,
    h_max: f64,
) -> (f64, usize) {
    let d0 = y0.norm() / tolerance;
    let d1 = f0.norm() / tolerance;

    let mut h = if d0 <= 1e-10 || d1 <= 1e-10 {
        1.0e-6
    } else {
        0.01 * d0 / d1
    };
    h = h.min(h_max);

    // Explicit Euler step: y1 = y0 + h·f0
    let mut y1 = y0.clone();
    y1.add_scaled(h, f0);
    let f1 = system.rhs(t0 + h, &y1);

    // Estimate second derivative
    let d2 = f1.distance(f0) / tolerance / h;

    // f64::max ignores a NaN operand
    let d12 = d2.max(d1);
    let h1 = if d12 <= 1.0e-15 {
        (1.0e-6_f64).max(h * 1.0e-3)
    } else {
        (0.01 / d12).powf(1.0 / order as f64)
    };

    let h_final = (100.0 * h).min(h1).min(h_max);
    (h_final, 1)
}
