//! ODE systems for testing
//!
//! Most have closed-form solutions, which makes them suitable for checking
//! accuracy and not just termination.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use nalgebra::{DVector, Vector2};
use rkf_rs::state::{FixedVector, OdeSystem, Scalar, Vector};

// =================================================================================================
// Exponential Decay: dy/dt = -k*y
// =================================================================================================

/// Analytical solution: y(t) = y₀ * exp(-k*t)
pub struct ExponentialDecay {
    pub rate: f64,
}

impl ExponentialDecay {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }

    pub fn analytical_solution(&self, t: f64, y0: f64) -> f64 {
        y0 * (-self.rate * t).exp()
    }
}

impl OdeSystem<Scalar> for ExponentialDecay {
    fn rhs(&self, _t: f64, y: &f64) -> f64 {
        -self.rate * y
    }

    fn name(&self) -> &str {
        "Exponential Decay"
    }
}

// =================================================================================================
// Van der Pol: x'' - mu (1 - x²) x' + x = 0
// =================================================================================================

/// First-order form `(x, v)' = (v, mu (1 - x²) v - x)`; no closed form,
/// trajectories settle on a limit cycle with `|x| ≈ 2`.
pub struct VanDerPol {
    pub mu: f64,
}

impl OdeSystem<Vector> for VanDerPol {
    fn rhs(&self, _t: f64, y: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![y[1], self.mu * (1.0 - y[0] * y[0]) * y[1] - y[0]])
    }

    fn name(&self) -> &str {
        "Van der Pol"
    }
}

// =================================================================================================
// Harmonic oscillator on a fixed-size state
// =================================================================================================

/// `(x, v)' = (v, -ω² x)`, `x(t) = x₀ cos ωt + (v₀/ω) sin ωt`
pub struct HarmonicOscillator {
    pub omega: f64,
}

impl HarmonicOscillator {
    pub fn analytical_solution(&self, t: f64, y0: &Vector2<f64>) -> Vector2<f64> {
        let (s, c) = (self.omega * t).sin_cos();
        Vector2::new(
            y0[0] * c + y0[1] / self.omega * s,
            -y0[0] * self.omega * s + y0[1] * c,
        )
    }
}

impl OdeSystem<FixedVector<2>> for HarmonicOscillator {
    fn rhs(&self, _t: f64, y: &Vector2<f64>) -> Vector2<f64> {
        Vector2::new(y[1], -self.omega * self.omega * y[0])
    }

    fn name(&self) -> &str {
        "Harmonic Oscillator"
    }
}

// =================================================================================================
// Evaluation counter
// =================================================================================================

/// Exponential decay that counts how often it is evaluated
///
/// The counter is shared so it can be read after the scenario took ownership
/// of the system.
pub struct CountingDecay {
    pub rate: f64,
    pub calls: Arc<AtomicUsize>,
}

impl CountingDecay {
    pub fn new(rate: f64) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let system = Self {
            rate,
            calls: Arc::clone(&calls),
        };
        (system, calls)
    }
}

impl OdeSystem<Scalar> for CountingDecay {
    fn rhs(&self, _t: f64, y: &f64) -> f64 {
        self.calls.fetch_add(1, Ordering::Relaxed);
        -self.rate * y
    }

    fn name(&self) -> &str {
        "Counting Decay"
    }
}
