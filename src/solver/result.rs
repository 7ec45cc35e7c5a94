//! Simulation result and text report
//!
//! A [`SimulationResult`] is the only thing a solve hands back. It owns the
//! accepted trajectory and the counters collected by the integrator, and can
//! write itself in the plain-text format consumed by gnuplot-style tools:
//!
//! ```text
//! # Number of time steps: 42
//! # Number of rejections: 3
//! # ...
//! # h_min: 0.0125, h_max: 0.31
//! # t y[0] ... y[1]
//!   0	1	1
//!   0.0125	1.0124	0.9875
//! ```

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

use crate::state::{ProblemKind, State};

// =================================================================================================
// Status and statistics
// =================================================================================================

/// Integrator state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationStatus {
    /// `t < tf` and step budget left
    Running,

    /// `t` reached `tf` exactly
    Converged,

    /// Step budget exhausted before reaching `tf`
    Failed,
}

impl fmt::Display for IntegrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IntegrationStatus::Running => "running",
            IntegrationStatus::Converged => "converged",
            IntegrationStatus::Failed => "failed",
        };
        write!(f, "{}", text)
    }
}

/// Step counters collected during a solve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Accepted steps
    pub accepted: usize,

    /// Rejected steps (state unchanged, step size reduced)
    pub rejected: usize,

    /// Accepted steps after which the step size grew
    pub expansions: usize,

    /// Steps accepted at the minimum step size despite exceeding tolerance
    pub forced: usize,

    /// Calls to the forcing function, including initial-step estimation
    pub function_evaluations: usize,
}

impl Statistics {
    /// Accepted + rejected
    pub fn attempts(&self) -> usize {
        self.accepted + self.rejected
    }
}

// =================================================================================================
// Simulation result
// =================================================================================================

/// Trajectory and summary of one solve
///
/// `time_points[i]` is the time of `trajectory[i]`. The first entry is always
/// the initial point `(t0, y0)`; each further entry is one accepted step.
#[derive(Debug, Clone)]
pub struct SimulationResult<K: ProblemKind> {
    /// Accepted times, strictly increasing
    pub time_points: Vec<f64>,

    /// Accepted states, one per time point
    pub trajectory: Vec<K::Variable>,

    /// Step counters
    pub statistics: Statistics,

    /// Sum of the local error estimates of all accepted steps
    pub final_error_estimate: f64,

    /// True unless the run reached `tf`
    pub failed: bool,

    /// Terminal state of the integrator
    pub status: IntegrationStatus,

    /// Free-form information (solver name, tolerance, ...)
    pub metadata: HashMap<String, String>,
}

impl<K: ProblemKind> SimulationResult<K> {
    /// Create a result
    ///
    /// `failed` is derived from `status`: anything but
    /// [`IntegrationStatus::Converged`] counts as failed.
    pub fn new(
        time_points: Vec<f64>,
        trajectory: Vec<K::Variable>,
        statistics: Statistics,
        final_error_estimate: f64,
        status: IntegrationStatus,
    ) -> Self {
        Self {
            time_points,
            trajectory,
            statistics,
            final_error_estimate,
            failed: status != IntegrationStatus::Converged,
            status,
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Read a metadata entry
    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Number of stored points (accepted steps + 1)
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    /// No point stored
    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    /// Time of the last accepted point
    pub fn final_time(&self) -> Option<f64> {
        self.time_points.last().copied()
    }

    /// State at the last accepted point
    pub fn final_state(&self) -> Option<&K::Variable> {
        self.trajectory.last()
    }

    /// Number of state components
    pub fn dimension(&self) -> usize {
        self.trajectory.first().map_or(0, |y| y.dimension())
    }

    /// Sizes of the accepted steps, `tᵢ₊₁ − tᵢ`
    pub fn step_sizes(&self) -> Vec<f64> {
        self.time_points.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Smallest accepted step
    pub fn min_step(&self) -> Option<f64> {
        self.step_sizes().into_iter().reduce(f64::min)
    }

    /// Largest accepted step
    pub fn max_step(&self) -> Option<f64> {
        self.step_sizes().into_iter().reduce(f64::max)
    }

    /// `(t, y)` pairs in time order
    pub fn iter(&self) -> impl Iterator<Item = (f64, &K::Variable)> + '_ {
        self.time_points.iter().copied().zip(self.trajectory.iter())
    }

    /// Values of component `index` over the trajectory
    ///
    /// # Panics
    ///
    /// Panics when `index >= self.dimension()`.
    pub fn component_series(&self, index: usize) -> Vec<f64> {
        let dimension = self.dimension();
        assert!(
            index < dimension,
            "component {} out of range for a {}-dimensional state",
            index,
            dimension
        );
        self.trajectory.iter().map(|y| y.component(index)).collect()
    }

    /// Write the plotting report: `#` header then one `t y...` line per point
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let all: Vec<usize> = (0..self.len()).collect();
        self.write_report_points(out, &all)
    }

    /// Same report, restricted to the points at `indices`
    ///
    /// Header counters and `h_min`/`h_max` still describe the full run.
    ///
    /// # Panics
    ///
    /// Panics when an index is out of bounds.
    pub fn write_report_points<W: Write>(&self, out: &mut W, indices: &[usize]) -> io::Result<()> {
        writeln!(out, "# Number of time steps: {}", self.statistics.accepted)?;
        writeln!(out, "# Number of rejections: {}", self.statistics.rejected)?;
        writeln!(out, "# Number of expansions: {}", self.statistics.expansions)?;
        if self.statistics.forced > 0 {
            writeln!(out, "# Forced at minimum step: {}", self.statistics.forced)?;
        }
        writeln!(
            out,
            "# Function evaluations: {}",
            self.statistics.function_evaluations
        )?;
        writeln!(out, "# Error estimate: {}", self.final_error_estimate)?;
        writeln!(out, "# Failed: {}", self.failed)?;

        if let (Some(h_min), Some(h_max)) = (self.min_step(), self.max_step()) {
            writeln!(out, "# h_min: {}, h_max: {}", h_min, h_max)?;
        }

        match self.dimension() {
            0 | 1 => writeln!(out, "# t y")?,
            n => writeln!(out, "# t y[0] ... y[{}]", n - 1)?,
        }

        for &i in indices {
            let (t, y) = (self.time_points[i], &self.trajectory[i]);
            write!(out, "  {}", t)?;
            for value in y.components() {
                write!(out, "\t{}", value)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl<K: ProblemKind> fmt::Display for SimulationResult<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buffer = Vec::new();
        self.write_report(&mut buffer).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buffer))
    }
}

// =================================================================================================
// Tests
// =================================================================================================
