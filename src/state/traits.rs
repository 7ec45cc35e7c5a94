//! Problem kinds and forcing-function traits
//!
//! This module defines the type-level mapping used by every solver:
//! - `ProblemKind`: tag → variable type
//! - `OdeSystem`: the forcing term `f(t, y)`
//! - `ForcingTerm`: boxed-closure alias for the forcing term signature

use nalgebra::{DMatrix, DVector, SVector};

use super::data::State;

// =================================================================================================
// Problem kinds (compile-time tags)
// =================================================================================================

/// Compile-time tag selecting the state representation
///
/// # Design
///
/// The tag carries no data. Its only role is to fix `Variable`, the type the
/// integrator stores in the trajectory and hands to the forcing function.
/// Adding a new representation means adding a tag and a `State` impl, the
/// solver code is untouched.
///
/// # Example
///
/// ```rust
/// use rkf_rs::state::{ProblemKind, Scalar, Vector, VariableOf};
/// use nalgebra::DVector;
///
/// let y: VariableOf<Scalar> = 1.0;
/// let z: VariableOf<Vector> = DVector::from_vec(vec![1.0, 1.0]);
/// # let _ = (y, z);
/// ```
pub trait ProblemKind: Send + Sync + 'static {
    /// Concrete variable type used to represent the state
    type Variable: State;

    /// Human readable name of the kind
    fn label() -> &'static str;
}

/// Scalar problems: `y ∈ ℝ`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scalar;

/// Vector problems of runtime dimension: `y ∈ ℝⁿ`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vector;

/// Vector problems of compile-time dimension `N`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedVector<const N: usize>;

/// Matrix-valued problems: `Y ∈ ℝ^(m×n)`, e.g. `Y' = A·Y`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Matrix;

impl ProblemKind for Scalar {
    type Variable = f64;

    fn label() -> &'static str {
        "scalar"
    }
}

impl ProblemKind for Vector {
    type Variable = DVector<f64>;

    fn label() -> &'static str {
        "vector"
    }
}

impl<const N: usize> ProblemKind for FixedVector<N> {
    type Variable = SVector<f64, N>;

    fn label() -> &'static str {
        "fixed vector"
    }
}

impl ProblemKind for Matrix {
    type Variable = DMatrix<f64>;

    fn label() -> &'static str {
        "matrix"
    }
}

/// Variable type associated with a problem kind
pub type VariableOf<K> = <K as ProblemKind>::Variable;

/// Boxed forcing-term signature `(time, state) -> derivative`
pub type ForcingTerm<K> = Box<dyn Fn(f64, &VariableOf<K>) -> VariableOf<K> + Send + Sync>;

// =================================================================================================
// ODE System Trait
// =================================================================================================

/// Right-hand side of `dy/dt = f(t, y)`
///
/// # Responsibility
///
/// Evaluates the forcing term at a given time and state. Does NOT integrate
/// it (that's the solver's job).
///
/// # Closures
///
/// Every `Fn(f64, &Variable) -> Variable + Send + Sync` closure is an
/// `OdeSystem`, so small problems need no dedicated type:
///
/// ```rust
/// use rkf_rs::state::{OdeSystem, Scalar};
///
/// let decay = |_t: f64, y: &f64| -10.0 * y;
/// assert_eq!(OdeSystem::<Scalar>::rhs(&decay, 0.0, &2.0), -20.0);
/// ```
///
/// # Side effects
///
/// The solver does not rely on `rhs` being pure; it may count evaluations
/// through interior mutability, but it must be `Send + Sync`.
pub trait OdeSystem<K: ProblemKind>: Send + Sync {
    /// Evaluate the derivative at `(t, y)`
    fn rhs(&self, t: f64, y: &K::Variable) -> K::Variable;

    /// Name of the system (used for reports and logging)
    fn name(&self) -> &str {
        "ODE system"
    }
}

impl<K, F> OdeSystem<K> for F
where
    K: ProblemKind,
    F: Fn(f64, &K::Variable) -> K::Variable + Send + Sync,
{
    fn rhs(&self, t: f64, y: &K::Variable) -> K::Variable {
        self(t, y)
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct VanDerPol {
        mu: f64,
    }

    impl OdeSystem<Vector> for VanDerPol {
        fn rhs(&self, _t: f64, y: &DVector<f64>) -> DVector<f64> {
            DVector::from_vec(vec![
                y[1],
                -y[0] + self.mu * (1.0 - y[0] * y[0]) * y[1],
            ])
        }

        fn name(&self) -> &str {
            "Van der Pol"
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Scalar::label(), "scalar");
        assert_eq!(Vector::label(), "vector");
        assert_eq!(FixedVector::<3>::label(), "fixed vector");
        assert_eq!(Matrix::label(), "matrix");
    }

    #[test]
    fn test_struct_system() {
        let system = VanDerPol { mu: 1.0 };
        let dy = system.rhs(0.0, &DVector::from_vec(vec![1.0, 1.0]));

        assert_eq!(dy[0], 1.0);
        assert_eq!(dy[1], -1.0);
        assert_eq!(system.name(), "Van der Pol");
    }

    #[test]
    fn test_closure_system_has_default_name() {
        let growth = |_t: f64, _y: &f64| 2.0;
        assert_eq!(OdeSystem::<Scalar>::rhs(&growth, 0.0, &0.0), 2.0);
        assert_eq!(OdeSystem::<Scalar>::name(&growth), "ODE system");
    }

    #[test]
    fn test_fixed_vector_closure() {
        let rotation = |_t: f64, y: &Vector2<f64>| Vector2::new(y[1], -y[0]);
        let dy = OdeSystem::<FixedVector<2>>::rhs(&rotation, 0.0, &Vector2::new(1.0, 0.0));
        assert_eq!(dy, Vector2::new(0.0, -1.0));
    }

    #[test]
    fn test_matrix_closure() {
        let a = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, -1.0, 0.0]);
        let linear = move |_t: f64, y: &DMatrix<f64>| &a * y;
        let dy = OdeSystem::<Matrix>::rhs(&linear, 0.0, &DMatrix::identity(2, 2));
        assert_eq!(dy, DMatrix::from_row_slice(2, 2, &[0.0, 1.0, -1.0, 0.0]));
    }

    #[test]
    fn test_boxed_forcing_term() {
        let forcing: ForcingTerm<Scalar> = Box::new(|t, y| t * y);
        assert_eq!(forcing(2.0, &3.0), 6.0);
    }

    #[test]
    fn test_system_may_count_evaluations() {
        let calls = AtomicUsize::new(0);
        let counting = |_t: f64, y: &f64| {
            calls.fetch_add(1, Ordering::Relaxed);
            -y
        };

        for _ in 0..3 {
            OdeSystem::<Scalar>::rhs(&counting, 0.0, &1.0);
        }
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }
}
