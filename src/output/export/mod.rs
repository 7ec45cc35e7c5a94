//! Export of simulation results to files.
//!
//! # Architecture
//!
//! The [`Exporter`] trait abstracts the file format. Each format is an
//! independent implementation in its own sub-module; adding a format means
//! adding a file.
//!
//! # Available formats
//!
//! | Format | Module  | Content                                           |
//! |--------|---------|---------------------------------------------------|
//! | CSV    | [`csv`] | optional `#` metadata, header row, one row per point |
//! | DAT    | [`dat`] | the text report of [`SimulationResult::write_report`] |
//!
//! # Usage example
//!
//! ```rust,no_run
//! use rkf_rs::output::export::{CsvExporter, DatExporter, Exporter};
//! # use rkf_rs::solver::{RkfSolver, Scenario, Solver, SolverConfiguration, TimeSpan};
//! # use rkf_rs::state::Scalar;
//! # let scenario = Scenario::<Scalar>::new(
//! #     Box::new(|_t: f64, y: &f64| -y),
//! #     TimeSpan::until(1.0),
//! #     1.0,
//! # );
//! # let result = RkfSolver::new().solve(&scenario, &SolverConfiguration::default()).unwrap();
//!
//! // Full export (all accepted points)
//! CsvExporter::default().export(&result, None, "decay.csv")?;
//!
//! // Downsampled to 100 points, first and last always kept
//! DatExporter.export(&result, Some(100), "decay.dat")?;
//! # Ok::<(), rkf_rs::output::export::ExportError>(())
//! ```

pub mod csv;
pub mod dat;

pub use csv::{CsvConfig, CsvExporter, CsvMetadata};
pub use dat::DatExporter;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::solver::SimulationResult;
use crate::state::ProblemKind;

// =================================================================================================
// Errors
// =================================================================================================

/// Errors raised while exporting a result
#[derive(Debug)]
pub enum ExportError {
    /// File creation or write failure
    Io(std::io::Error),

    /// The result holds no point
    EmptyResult,

    /// NaN or Inf found at trajectory index `index`
    NonFinite { index: usize },

    /// Downsampling target below 2 (first and last points cannot both fit)
    InvalidPointCount(usize),

    /// Column labels do not match the state dimension
    LabelMismatch { expected: usize, found: usize },

    /// The column delimiter equals the decimal separator
    AmbiguousSeparator(char),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "I/O error: {}", e),
            ExportError::EmptyResult => write!(f, "result contains no data"),
            ExportError::NonFinite { index } => {
                write!(f, "NaN or Inf in trajectory at point {}", index)
            }
            ExportError::InvalidPointCount(n) => {
                write!(f, "cannot downsample to {} points (need at least 2)", n)
            }
            ExportError::LabelMismatch { expected, found } => write!(
                f,
                "{} column labels for a {}-dimensional state",
                found, expected
            ),
            ExportError::AmbiguousSeparator(c) => {
                write!(f, "'{}' used as both delimiter and decimal separator", c)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

// =================================================================================================
// Exporter trait
// =================================================================================================

/// Abstraction over export formats.
///
/// # Parameter `n_points`
///
/// - `None`: every stored point is written
/// - `Some(n)`: uniform downsampling to `n` points, always keeping the
///   **first and last** points (initial condition and final state)
///
/// Implementors write to any [`Write`]; [`Exporter::export`] opens the file.
pub trait Exporter {
    /// Error type specific to this export format.
    type Error: std::error::Error + From<std::io::Error>;

    /// Write `result` to `out`
    fn write<K: ProblemKind, W: Write>(
        &self,
        result: &SimulationResult<K>,
        n_points: Option<usize>,
        out: &mut W,
    ) -> Result<(), Self::Error>;

    /// Create (or truncate) the file at `path` and write `result` into it
    fn export<K: ProblemKind, P: AsRef<Path>>(
        &self,
        result: &SimulationResult<K>,
        n_points: Option<usize>,
        path: P,
    ) -> Result<(), Self::Error> {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        self.write(result, n_points, &mut out)?;
        out.flush()?;
        log::debug!("exported {} points to {}", result.len(), path.display());
        Ok(())
    }
}

// =================================================================================================
// Shared helpers
// =================================================================================================

/// Indices of the points to write
///
/// `n` points evenly spread over `0..len`, first and last included. Asking
/// for at least `len` points returns every index.
pub fn downsample_indices(len: usize, n_points: Option<usize>) -> Result<Vec<usize>, ExportError> {
    match n_points {
        Some(n) if n < 2 => Err(ExportError::InvalidPointCount(n)),
        Some(n) if n < len => Ok((0..n).map(|i| i * (len - 1) / (n - 1)).collect()),
        _ => Ok((0..len).collect()),
    }
}

/// Reject empty results and non-finite trajectories
pub(crate) fn check_result<K: ProblemKind>(result: &SimulationResult<K>) -> Result<(), ExportError> {
    use crate::state::State;

    if result.is_empty() {
        return Err(ExportError::EmptyResult);
    }
    for (index, (t, y)) in result.iter().enumerate() {
        if !t.is_finite() || !y.is_finite() {
            return Err(ExportError::NonFinite { index });
        }
    }
    Ok(())
}
