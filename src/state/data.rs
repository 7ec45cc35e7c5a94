//! State variable arithmetic
//!
//! The integrator never inspects the shape of a state. It only needs to form
//! linear combinations `y + h·Σ aᵢⱼ·kⱼ` and measure the distance between two
//! candidate states. The `State` trait captures exactly that, and is
//! implemented for:
//!
//! - `f64` (scalar problems, norm = absolute value)
//! - `nalgebra::DVector<f64>` (dynamic vectors, Euclidean norm)
//! - `nalgebra::SVector<f64, N>` (fixed-size vectors, Euclidean norm)
//! - `nalgebra::DMatrix<f64>` (matrices, Frobenius norm, column-major components)

use nalgebra::{DMatrix, DVector, SVector};
use std::fmt;

// =================================================================================================
// State Trait
// =================================================================================================

/// Arithmetic required from a state variable
///
/// # Contract
///
/// - `add_scaled` must be an in-place `self += alpha * other`
/// - `norm` must be a vector norm (absolute value for scalars)
/// - `components` lists the entries in index order; it defines the column
///   order of every text export
/// - `component(i)` is `components()[i]` without the allocation
pub trait State: Clone + fmt::Debug + Send + Sync + 'static {
    /// Norm of the state (absolute value or Euclidean norm)
    fn norm(&self) -> f64;

    /// In-place scaled addition: `self += alpha * other`
    fn add_scaled(&mut self, alpha: f64, other: &Self);

    /// Number of scalar components
    fn dimension(&self) -> usize;

    /// Components in index order
    fn components(&self) -> Vec<f64>;

    /// Component `index` (panics when out of range)
    fn component(&self, index: usize) -> f64;

    /// `(rows, columns)`; vectors are a single column
    fn shape(&self) -> (usize, usize) {
        (self.dimension(), 1)
    }

    /// True when every component is finite (no NaN, no Inf)
    fn is_finite(&self) -> bool;

    /// Norm of the difference `self - other`
    fn distance(&self, other: &Self) -> f64 {
        let mut difference = self.clone();
        difference.add_scaled(-1.0, other);
        difference.norm()
    }
}

// ======================================== Scalar state ========================================

impl State for f64 {
    fn norm(&self) -> f64 {
        self.abs()
    }

    fn add_scaled(&mut self, alpha: f64, other: &Self) {
        *self += alpha * other;
    }

    fn dimension(&self) -> usize {
        1
    }

    fn components(&self) -> Vec<f64> {
        vec![*self]
    }

    fn component(&self, index: usize) -> f64 {
        assert_eq!(index, 0, "a scalar state has a single component");
        *self
    }

    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }

    fn distance(&self, other: &Self) -> f64 {
        (self - other).abs()
    }
}

// ======================================= Dynamic vectors =======================================

impl State for DVector<f64> {
    fn norm(&self) -> f64 {
        self.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    fn add_scaled(&mut self, alpha: f64, other: &Self) {
        // nalgebra's axpy: self = alpha * other + 1.0 * self
        self.axpy(alpha, other, 1.0);
    }

    fn dimension(&self) -> usize {
        self.len()
    }

    fn components(&self) -> Vec<f64> {
        self.iter().copied().collect()
    }

    fn component(&self, index: usize) -> f64 {
        self[index]
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|x| x.is_finite())
    }

    fn distance(&self, other: &Self) -> f64 {
        self.iter()
            .zip(other.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

// ======================================== Fixed vectors ========================================

impl<const N: usize> State for SVector<f64, N> {
    fn norm(&self) -> f64 {
        self.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    fn add_scaled(&mut self, alpha: f64, other: &Self) {
        self.axpy(alpha, other, 1.0);
    }

    fn dimension(&self) -> usize {
        N
    }

    fn components(&self) -> Vec<f64> {
        self.iter().copied().collect()
    }

    fn component(&self, index: usize) -> f64 {
        self[index]
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|x| x.is_finite())
    }
}

// =========================================== Matrices ===========================================

impl State for DMatrix<f64> {
    /// Frobenius norm
    fn norm(&self) -> f64 {
        self.iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    fn add_scaled(&mut self, alpha: f64, other: &Self) {
        debug_assert_eq!(self.shape(), other.shape());
        for (a, b) in self.iter_mut().zip(other.iter()) {
            *a += alpha * b;
        }
    }

    fn dimension(&self) -> usize {
        self.len()
    }

    /// Column-major: `y[0]` is `(0, 0)`, `y[1]` is `(1, 0)`, ...
    fn components(&self) -> Vec<f64> {
        self.iter().copied().collect()
    }

    fn component(&self, index: usize) -> f64 {
        self[index]
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|x| x.is_finite())
    }

    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_scalar_norm_is_absolute_value() {
        assert_eq!(State::norm(&-3.5_f64), 3.5);
        assert_eq!(State::norm(&2.0_f64), 2.0);
    }

    #[test]
    fn test_scalar_add_scaled() {
        let mut y = 1.0_f64;
        y.add_scaled(0.5, &4.0);
        assert_eq!(y, 3.0);
    }

    #[test]
    fn test_scalar_distance() {
        assert_eq!(1.0_f64.distance(&-2.0), 3.0);
    }

    #[test]
    fn test_dvector_euclidean_norm() {
        let v = DVector::from_vec(vec![3.0, 4.0]);
        assert_relative_eq!(State::norm(&v), 5.0);
    }

    #[test]
    fn test_dvector_add_scaled() {
        let mut y = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let k = DVector::from_vec(vec![1.0, 1.0, -1.0]);
        y.add_scaled(2.0, &k);
        assert_eq!(y.as_slice(), &[3.0, 4.0, 1.0]);
    }

    #[test]
    fn test_dvector_distance_matches_difference_norm() {
        let a = DVector::from_vec(vec![1.0, 5.0]);
        let b = DVector::from_vec(vec![4.0, 1.0]);
        assert_relative_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_dvector_components_keep_index_order() {
        let v = DVector::from_vec(vec![0.1, 0.2, 0.3]);
        assert_eq!(v.components(), vec![0.1, 0.2, 0.3]);
        assert_eq!(v.dimension(), 3);
    }

    #[test]
    fn test_non_finite_detection() {
        assert!(!f64::NAN.is_finite());
        assert!(!State::is_finite(&f64::INFINITY));

        let v = DVector::from_vec(vec![1.0, f64::NAN]);
        assert!(!State::is_finite(&v));

        let w = Vector3::new(1.0, 2.0, f64::NEG_INFINITY);
        assert!(!State::is_finite(&w));
    }

    #[test]
    fn test_component_matches_components() {
        let v = DVector::from_vec(vec![0.1, 0.2, 0.3]);
        let w = Vector3::new(4.0, 5.0, 6.0);
        for i in 0..3 {
            assert_eq!(v.component(i), v.components()[i]);
            assert_eq!(w.component(i), w.components()[i]);
        }
        assert_eq!(2.5_f64.component(0), 2.5);
    }

    #[test]
    fn test_matrix_frobenius_norm_and_shape() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert_relative_eq!(State::norm(&m), 5.0);
        assert_eq!(m.dimension(), 4);
        assert_eq!(m.shape(), (2, 2));
        assert_eq!(DVector::from_vec(vec![1.0, 2.0]).shape(), (2, 1));
    }

    #[test]
    fn test_matrix_components_are_column_major() {
        // [[1, 2, 3],
        //  [4, 5, 6]]
        let m = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.components(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(m.component(1), 4.0);
        assert_eq!(m.component(4), 3.0);
    }

    #[test]
    fn test_matrix_add_scaled_and_distance() {
        let mut y = DMatrix::from_element(2, 2, 1.0);
        let k = DMatrix::identity(2, 2);
        y.add_scaled(-2.0, &k);
        assert_eq!(y, DMatrix::from_row_slice(2, 2, &[-1.0, 1.0, 1.0, -1.0]));
        assert_relative_eq!(y.distance(&DMatrix::zeros(2, 2)), 2.0);
        assert!(State::is_finite(&y));
    }

    #[test]
    fn test_fixed_vector_default_distance() {
        let a = Vector3::new(1.0, 2.0, 2.0);
        let b = Vector3::zeros();
        assert_relative_eq!(a.distance(&b), 3.0);
        assert_eq!(a.dimension(), 3);
    }
}
