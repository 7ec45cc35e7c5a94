//! Integration interval `[t0, tf]`

use crate::solver::SolverError;

/// Time interval of a solve
///
/// Integration always runs forward: `start < end`.
///
/// # Example
///
/// ```rust
/// use rkf_rs::solver::TimeSpan;
///
/// let span = TimeSpan::new(0.0, 40.0);
/// assert_eq!(span.length(), 40.0);
/// assert!(span.validate().is_ok());
/// assert!(TimeSpan::new(1.0, 1.0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    /// Initial time `t0`
    pub start: f64,

    /// Final time `tf`
    pub end: f64,
}

impl TimeSpan {
    /// Create a span (not validated until [`TimeSpan::validate`])
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Span `[0, end]`
    pub fn until(end: f64) -> Self {
        Self::new(0.0, end)
    }

    /// `tf − t0`
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Smallest step the integrator will ever attempt on this span
    ///
    /// `100·ε·max(|t0|, |tf|, tf − t0)`. The floor stays well above the
    /// spacing of floating-point numbers anywhere in the span, so `t + h > t`
    /// even for intervals far from the origin.
    pub fn min_step(&self) -> f64 {
        let scale = self.start.abs().max(self.end.abs()).max(self.length());
        100.0 * f64::EPSILON * scale
    }

    /// Check `t0 < tf`, both finite
    pub fn validate(&self) -> Result<(), SolverError> {
        if !self.start.is_finite() || !self.end.is_finite() || self.start >= self.end {
            return Err(SolverError::InvalidTimeSpan {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_until_starts_at_zero() {
        let span = TimeSpan::until(100.0);
        assert_eq!(span.start, 0.0);
        assert_eq!(span.length(), 100.0);
    }

    #[test]
    fn test_reversed_span_rejected() {
        assert_eq!(
            TimeSpan::new(5.0, 1.0).validate(),
            Err(SolverError::InvalidTimeSpan { start: 5.0, end: 1.0 })
        );
    }

    #[test]
    fn test_non_finite_span_rejected() {
        assert!(TimeSpan::new(0.0, f64::INFINITY).validate().is_err());
        assert!(TimeSpan::new(f64::NAN, 1.0).validate().is_err());
    }

    #[test]
    fn test_min_step_scales_with_length() {
        let short = TimeSpan::until(1.0).min_step();
        let long = TimeSpan::until(100.0).min_step();
        assert!(short > 0.0);
        assert!((long / short - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_min_step_advances_time_far_from_origin() {
        for span in [
            TimeSpan::new(1e10, 1e10 + 1.0),
            TimeSpan::new(-1e12, -1e12 + 0.5),
            TimeSpan::new(-3.0, 2.0),
        ] {
            let h = span.min_step();
            assert!(span.start + h > span.start, "{:?}", span);
            assert!(span.end - h < span.end, "{:?}", span);
        }
    }
}
