//! Butcher tableaux for explicit embedded Runge-Kutta pairs
//!
//! # Mathematical Background
//!
//! An explicit `s`-stage Runge-Kutta method is defined by its Butcher tableau:
//!
//! ```text
//!  c₀ |
//!  c₁ | a₁₀
//!  c₂ | a₂₀  a₂₁
//!  ⋮  |  ⋮         ⋱
//! ----+---------------------
//!     | b₀   b₁  ...  bₛ₋₁     (high order p)
//!     | b*₀  b*₁ ...  b*ₛ₋₁    (embedded order p−1)
//! ```
//!
//! An *embedded pair* carries two weight rows sharing the same stages. The
//! difference of the two solutions is a local error estimate of order `p`
//! obtained at no extra function evaluation.
//!
//! # Available pairs
//!
//! | Constructor          | Name                  | Stages | Orders |
//! |----------------------|-----------------------|--------|--------|
//! | `heun_euler()`       | Heun-Euler            | 2      | 2(1)   |
//! | `fehlberg12()`       | Fehlberg 1(2)         | 3      | 2(1)   |
//! | `bogacki_shampine()` | Bogacki-Shampine      | 4      | 3(2)   |
//! | `rkf45()`            | Runge-Kutta-Fehlberg  | 6      | 5(4)   |
//! | `dormand_prince()`   | Dormand-Prince        | 7      | 5(4)   |
//!
//! A tableau is immutable once built, and each solver owns its own copy, so
//! two integrators can run with different tableaux without any coordination.

use std::fmt;

use crate::solver::SolverError;

/// Absolute tolerance used when checking the consistency conditions
const CONSISTENCY_TOLERANCE: f64 = 1e-10;

// =================================================================================================
// Butcher Tableau
// =================================================================================================

/// Coefficients of an explicit embedded Runge-Kutta pair
///
/// # Invariants (checked by [`ButcherTableau::new`])
///
/// - `a` is square and strictly lower triangular (explicit method)
/// - `c`, `b_high`, `b_low` have one entry per stage
/// - `Σ b_high = Σ b_low = 1`
/// - `c(i) = Σⱼ a(i, j)` (row-sum condition)
/// - `order_high = order_low + 1`
///
/// # Example
///
/// ```rust
/// use rkf_rs::tableau::ButcherTableau;
///
/// let rkf45 = ButcherTableau::rkf45();
/// assert_eq!(rkf45.stages(), 6);
/// assert_eq!(rkf45.order_low(), 4);
/// assert_eq!(rkf45.c(1), 0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ButcherTableau {
    name: String,
    a: Vec<Vec<f64>>,
    c: Vec<f64>,
    b_high: Vec<f64>,
    b_low: Vec<f64>,
    order_high: usize,
    order_low: usize,
}

impl ButcherTableau {
    /// Build and validate a tableau
    ///
    /// `a` may be given either as full square rows or as ragged rows holding
    /// only the strictly lower part (row `i` with `i` entries); missing
    /// entries are zero.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvalidTableau`] when any consistency condition
    /// fails.
    pub fn new(
        name: &str,
        a: Vec<Vec<f64>>,
        b_high: Vec<f64>,
        b_low: Vec<f64>,
        order_high: usize,
        order_low: usize,
    ) -> Result<Self, SolverError> {
        let stages = b_high.len();
        let invalid = |reason: String| SolverError::InvalidTableau {
            name: name.to_string(),
            reason,
        };

        if stages == 0 {
            return Err(invalid("a tableau needs at least one stage".to_string()));
        }

        if a.len() != stages || b_low.len() != stages {
            return Err(invalid(format!(
                "inconsistent sizes: {} rows in a, {} high weights, {} low weights",
                a.len(),
                stages,
                b_low.len()
            )));
        }

        // Pad ragged rows into a full square matrix, rejecting any
        // non-zero entry on or above the diagonal.
        let mut full = vec![vec![0.0; stages]; stages];
        for (i, row) in a.iter().enumerate() {
            if row.len() > stages {
                return Err(invalid(format!("row {} has {} entries", i, row.len())));
            }
            for (j, &value) in row.iter().enumerate() {
                if j >= i && value != 0.0 {
                    return Err(invalid(format!(
                        "a({}, {}) = {} is not strictly lower triangular (implicit stage)",
                        i, j, value
                    )));
                }
                full[i][j] = value;
            }
        }

        let c: Vec<f64> = full.iter().map(|row| row.iter().sum()).collect();

        let sum_high: f64 = b_high.iter().sum();
        if (sum_high - 1.0).abs() > CONSISTENCY_TOLERANCE {
            return Err(invalid(format!("high-order weights sum to {}", sum_high)));
        }

        let sum_low: f64 = b_low.iter().sum();
        if (sum_low - 1.0).abs() > CONSISTENCY_TOLERANCE {
            return Err(invalid(format!("low-order weights sum to {}", sum_low)));
        }

        if order_low == 0 || order_high != order_low + 1 {
            return Err(invalid(format!(
                "orders {}({}) do not differ by exactly one",
                order_high, order_low
            )));
        }

        Ok(Self {
            name: name.to_string(),
            a: full,
            c,
            b_high,
            b_low,
            order_high,
            order_low,
        })
    }

    // ======================================== Accessors ========================================

    /// Name of the pair
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of stages `s`
    pub fn stages(&self) -> usize {
        self.b_high.len()
    }

    /// Stage-coupling coefficient `a(i, j)` (zero for `j ≥ i`)
    pub fn a(&self, i: usize, j: usize) -> f64 {
        self.a[i][j]
    }

    /// Node offset `c(i)` of stage `i` within the step
    pub fn c(&self, i: usize) -> f64 {
        self.c[i]
    }

    /// Weight of stage `i` in the high-order solution
    pub fn b_high(&self, i: usize) -> f64 {
        self.b_high[i]
    }

    /// Weight of stage `i` in the embedded low-order solution
    pub fn b_low(&self, i: usize) -> f64 {
        self.b_low[i]
    }

    /// Order of the solution used to advance the state
    pub fn order_high(&self) -> usize {
        self.order_high
    }

    /// Order of the embedded solution used for error estimation
    pub fn order_low(&self) -> usize {
        self.order_low
    }

    /// Exponent `1/(q+1)` of the error-ratio step controller
    ///
    /// The local error estimate behaves like `C·h^(q+1)` where `q` is the
    /// embedded order, which is what the controller inverts.
    pub fn error_exponent(&self) -> f64 {
        1.0 / (self.order_low as f64 + 1.0)
    }

    // ====================================== Catalogue ======================================

    /// Look up a catalogue pair by name (case-insensitive)
    ///
    /// Accepted names: `heun-euler`/`rk12`, `fehlberg12`/`rkf12`,
    /// `bogacki-shampine`/`rk23`, `rkf45`/`fehlberg45`, `dormand-prince`/`dopri5`.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "heun-euler" | "heun_euler" | "rk12" => Some(Self::heun_euler()),
            "fehlberg12" | "rkf12" => Some(Self::fehlberg12()),
            "bogacki-shampine" | "bogacki_shampine" | "rk23" => Some(Self::bogacki_shampine()),
            "rkf45" | "fehlberg45" | "rk45" => Some(Self::rkf45()),
            "dormand-prince" | "dormand_prince" | "dopri5" => Some(Self::dormand_prince()),
            _ => None,
        }
    }

    /// Heun-Euler 2(1): explicit Euler embedded in Heun's method
    pub fn heun_euler() -> Self {
        Self::catalogue(
            "Heun-Euler 2(1)",
            vec![vec![], vec![1.0]],
            vec![0.5, 0.5],
            vec![1.0, 0.0],
            2,
            1,
        )
    }

    /// Fehlberg 1(2): three-stage first-order pair with a small error constant
    pub fn fehlberg12() -> Self {
        Self::catalogue(
            "Fehlberg 1(2)",
            vec![vec![], vec![1.0 / 2.0], vec![1.0 / 256.0, 255.0 / 256.0]],
            vec![1.0 / 512.0, 255.0 / 256.0, 1.0 / 512.0],
            vec![1.0 / 256.0, 255.0 / 256.0, 0.0],
            2,
            1,
        )
    }

    /// Bogacki-Shampine 3(2)
    pub fn bogacki_shampine() -> Self {
        Self::catalogue(
            "Bogacki-Shampine 3(2)",
            vec![
                vec![],
                vec![1.0 / 2.0],
                vec![0.0, 3.0 / 4.0],
                vec![2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0],
            ],
            vec![2.0 / 9.0, 1.0 / 3.0, 4.0 / 9.0, 0.0],
            vec![7.0 / 24.0, 1.0 / 4.0, 1.0 / 3.0, 1.0 / 8.0],
            3,
            2,
        )
    }

    /// Runge-Kutta-Fehlberg 4(5), advancing with the fifth-order weights
    pub fn rkf45() -> Self {
        Self::catalogue(
            "Runge-Kutta-Fehlberg 4(5)",
            vec![
                vec![],
                vec![1.0 / 4.0],
                vec![3.0 / 32.0, 9.0 / 32.0],
                vec![1932.0 / 2197.0, -7200.0 / 2197.0, 7296.0 / 2197.0],
                vec![439.0 / 216.0, -8.0, 3680.0 / 513.0, -845.0 / 4104.0],
                vec![-8.0 / 27.0, 2.0, -3544.0 / 2565.0, 1859.0 / 4104.0, -11.0 / 40.0],
            ],
            vec![
                16.0 / 135.0,
                0.0,
                6656.0 / 12825.0,
                28561.0 / 56430.0,
                -9.0 / 50.0,
                2.0 / 55.0,
            ],
            vec![
                25.0 / 216.0,
                0.0,
                1408.0 / 2565.0,
                2197.0 / 4104.0,
                -1.0 / 5.0,
                0.0,
            ],
            5,
            4,
        )
    }

    /// Dormand-Prince 5(4)
    pub fn dormand_prince() -> Self {
        Self::catalogue(
            "Dormand-Prince 5(4)",
            vec![
                vec![],
                vec![1.0 / 5.0],
                vec![3.0 / 40.0, 9.0 / 40.0],
                vec![44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
                vec![19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0],
                vec![
                    9017.0 / 3168.0,
                    -355.0 / 33.0,
                    46732.0 / 5247.0,
                    49.0 / 176.0,
                    -5103.0 / 18656.0,
                ],
                vec![
                    35.0 / 384.0,
                    0.0,
                    500.0 / 1113.0,
                    125.0 / 192.0,
                    -2187.0 / 6784.0,
                    11.0 / 84.0,
                ],
            ],
            vec![
                35.0 / 384.0,
                0.0,
                500.0 / 1113.0,
                125.0 / 192.0,
                -2187.0 / 6784.0,
                11.0 / 84.0,
                0.0,
            ],
            vec![
                5179.0 / 57600.0,
                0.0,
                7571.0 / 16695.0,
                393.0 / 640.0,
                -92097.0 / 339200.0,
                187.0 / 2100.0,
                1.0 / 40.0,
            ],
            5,
            4,
        )
    }

    /// Catalogue entries are compile-time constants known to satisfy every
    /// invariant, so validation failure here is a programming error.
    fn catalogue(
        name: &str,
        a: Vec<Vec<f64>>,
        b_high: Vec<f64>,
        b_low: Vec<f64>,
        order_high: usize,
        order_low: usize,
    ) -> Self {
        match Self::new(name, a, b_high, b_low, order_high, order_low) {
            Ok(tableau) => tableau,
            Err(error) => panic!("built-in tableau is inconsistent: {}", error),
        }
    }
}

impl Default for ButcherTableau {
    fn default() -> Self {
        Self::rkf45()
    }
}

impl fmt::Display for ButcherTableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} stages)", self.name, self.stages())?;
        for i in 0..self.stages() {
            write!(f, "{:>10.6} |", self.c[i])?;
            for j in 0..i {
                write!(f, " {:>10.6}", self.a[i][j])?;
            }
            writeln!(f)?;
        }
        write!(f, "{:>10} |", "")?;
        for b in &self.b_high {
            write!(f, " {:>10.6}", b)?;
        }
        writeln!(f)?;
        write!(f, "{:>10} |", "")?;
        for b in &self.b_low {
            write!(f, " {:>10.6}", b)?;
        }
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn catalogue() -> Vec<ButcherTableau> {
        vec![
            ButcherTableau::heun_euler(),
            ButcherTableau::fehlberg12(),
            ButcherTableau::bogacki_shampine(),
            ButcherTableau::rkf45(),
            ButcherTableau::dormand_prince(),
        ]
    }

    #[test]
    fn test_catalogue_weights_sum_to_one() {
        for tableau in catalogue() {
            let high: f64 = (0..tableau.stages()).map(|i| tableau.b_high(i)).sum();
            let low: f64 = (0..tableau.stages()).map(|i| tableau.b_low(i)).sum();
            assert_relative_eq!(high, 1.0, epsilon = 1e-12);
            assert_relative_eq!(low, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_catalogue_is_explicit() {
        for tableau in catalogue() {
            for i in 0..tableau.stages() {
                for j in i..tableau.stages() {
                    assert_eq!(tableau.a(i, j), 0.0, "{} a({}, {})", tableau.name(), i, j);
                }
            }
        }
    }

    #[test]
    fn test_catalogue_nodes_in_unit_interval() {
        for tableau in catalogue() {
            assert_eq!(tableau.c(0), 0.0);
            for i in 0..tableau.stages() {
                assert!(tableau.c(i) >= -1e-12 && tableau.c(i) <= 1.0 + 1e-12);
            }
        }
    }

    #[test]
    fn test_rkf45_nodes() {
        let tableau = ButcherTableau::rkf45();
        let expected = [0.0, 0.25, 3.0 / 8.0, 12.0 / 13.0, 1.0, 0.5];
        for (i, c) in expected.iter().enumerate() {
            assert_relative_eq!(tableau.c(i), *c, epsilon = 1e-12);
        }
        assert_relative_eq!(tableau.error_exponent(), 0.2);
    }

    #[test]
    fn test_dormand_prince_nodes() {
        let tableau = ButcherTableau::dormand_prince();
        assert_relative_eq!(tableau.c(4), 8.0 / 9.0, epsilon = 1e-12);
        assert_relative_eq!(tableau.c(6), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_reject_implicit_entry() {
        let result = ButcherTableau::new(
            "implicit",
            vec![vec![0.5, 0.0], vec![0.5, 0.5]],
            vec![0.5, 0.5],
            vec![1.0, 0.0],
            2,
            1,
        );
        assert!(matches!(result, Err(SolverError::InvalidTableau { .. })));
    }

    #[test]
    fn test_reject_bad_weights() {
        let result = ButcherTableau::new(
            "bad",
            vec![vec![], vec![1.0]],
            vec![0.5, 0.6],
            vec![1.0, 0.0],
            2,
            1,
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("high-order weights"));
    }

    #[test]
    fn test_reject_orders_not_adjacent() {
        let result = ButcherTableau::new(
            "gap",
            vec![vec![], vec![1.0]],
            vec![0.5, 0.5],
            vec![1.0, 0.0],
            3,
            1,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_reject_size_mismatch() {
        let result = ButcherTableau::new(
            "sizes",
            vec![vec![]],
            vec![0.5, 0.5],
            vec![1.0, 0.0],
            2,
            1,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_by_name() {
        assert_eq!(ButcherTableau::by_name("RKF45"), Some(ButcherTableau::rkf45()));
        assert_eq!(ButcherTableau::by_name("rk23"), Some(ButcherTableau::bogacki_shampine()));
        assert_eq!(ButcherTableau::by_name(" dopri5 "), Some(ButcherTableau::dormand_prince()));
        assert!(ButcherTableau::by_name("esdirk34").is_none());
    }

    #[test]
    fn test_default_is_rkf45() {
        assert_eq!(ButcherTableau::default().name(), "Runge-Kutta-Fehlberg 4(5)");
    }

    #[test]
    fn test_display_lists_every_stage() {
        let text = ButcherTableau::heun_euler().to_string();
        assert!(text.starts_with("Heun-Euler 2(1) (2 stages)"));
        assert_eq!(text.lines().count(), 5);
    }
}
