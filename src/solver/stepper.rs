//! One step of an explicit embedded Runge-Kutta pair
//!
//! # Algorithm
//!
//! For a tableau with `s` stages:
//!
//! ```text
//! kᵢ = f(t + cᵢ·h, y + h·Σⱼ<ᵢ aᵢⱼ·kⱼ)        i = 0 … s−1
//!
//! y_high = y + h·Σᵢ bᵢ·kᵢ                    (order p, used to advance)
//! y_low  = y + h·Σᵢ b*ᵢ·kᵢ                   (order p−1, error estimate only)
//! ```
//!
//! Stage `i` needs every `kⱼ` with `j < i`, so stages are evaluated strictly
//! in order.

use crate::state::{OdeSystem, ProblemKind, State};
use crate::tableau::ButcherTableau;

/// The two candidate states produced by one embedded step
#[derive(Debug, Clone, PartialEq)]
pub struct StepEstimate<V> {
    /// Higher-order solution
    pub high: V,

    /// Embedded lower-order solution
    pub low: V,
}

impl<V: State> StepEstimate<V> {
    /// Local error estimate `‖y_high − y_low‖`
    pub fn error(&self) -> f64 {
        self.high.distance(&self.low)
    }
}

/// Stage evaluator for a tableau and a forcing function
///
/// Holds only borrows; calling [`RkfStepper::step`] has no effect on the
/// stepper itself, and the input state is never mutated.
pub struct RkfStepper<'a, K: ProblemKind> {
    tableau: &'a ButcherTableau,
    system: &'a dyn OdeSystem<K>,
}

impl<'a, K: ProblemKind> RkfStepper<'a, K> {
    pub fn new(tableau: &'a ButcherTableau, system: &'a dyn OdeSystem<K>) -> Self {
        Self { tableau, system }
    }

    /// Tableau used by this stepper
    pub fn tableau(&self) -> &ButcherTableau {
        self.tableau
    }

    /// Forcing-function evaluations performed by one call to [`RkfStepper::step`]
    pub fn evaluations_per_step(&self) -> usize {
        self.tableau.stages()
    }

    /// Advance `y` from `t` by `h`, returning both embedded solutions
    pub fn step(&self, t: f64, y: &K::Variable, h: f64) -> StepEstimate<K::Variable> {
        let tableau = self.tableau;
        let stages = tableau.stages();
        let mut k: Vec<K::Variable> = Vec::with_capacity(stages);

        // ====== Stages ======

        for i in 0..stages {
            let mut stage_state = y.clone();
            for (j, kj) in k.iter().enumerate() {
                let a = tableau.a(i, j);
                if a != 0.0 {
                    stage_state.add_scaled(h * a, kj);
                }
            }
            k.push(self.system.rhs(t + tableau.c(i) * h, &stage_state));
        }

        // ====== Combination ======

        let mut high = y.clone();
        let mut low = y.clone();
        for (i, ki) in k.iter().enumerate() {
            let b = tableau.b_high(i);
            if b != 0.0 {
                high.add_scaled(h * b, ki);
            }
            let b_star = tableau.b_low(i);
            if b_star != 0.0 {
                low.add_scaled(h * b_star, ki);
            }
        }

        StepEstimate { high, low }
    }
}
