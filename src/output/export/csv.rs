//! CSV export of integration results
//!
//! Produces files readable by spreadsheets, pandas or gnuplot: one row per
//! accepted point, a time column then one column per state component.
//!
//! # Quick Examples
//!
//! ## Minimal export
//!
//! ```rust,ignore
//! use rkf_rs::output::export::{CsvExporter, Exporter};
//!
//! CsvExporter::default().export(&result, None, "decay.csv")?;
//! ```
//!
//! **Output** (`decay.csv`):
//! ```csv
//! t,y
//! 0.000000,1.000000
//! 0.081325,0.443352
//! ...
//! ```
//!
//! ## With metadata
//!
//! ```rust,ignore
//! use rkf_rs::output::export::{CsvConfig, CsvExporter, CsvMetadata, Exporter};
//!
//! let config = CsvConfig::default().with_metadata(CsvMetadata::from_result(&result));
//! CsvExporter::new(config).export(&result, Some(500), "vdp.csv")?;
//! ```
//!
//! **Output** (`vdp.csv`):
//! ```csv
//! # RKF Integration Data
//! # Generated: 2026-02-11T15:30:00+00:00
//! # System: Van der Pol
//! # Solver: Runge-Kutta-Fehlberg 4(5)
//! # Time Span: [0, 40]
//! # Accepted Steps: 412
//! # Rejected Steps: 37
//! # Status: converged
//! #
//! t,y[0],y[1]
//! ...
//! ```

use std::io::Write;

use super::{check_result, downsample_indices, ExportError, Exporter};
use crate::solver::SimulationResult;
use crate::state::{ProblemKind, State};

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// # Example
///
/// ```rust
/// use rkf_rs::output::export::CsvConfig;
///
/// let config = CsvConfig {
///     delimiter: ';',
///     precision: 10,
///     ..Default::default()
/// };
/// assert_eq!(config.decimal_separator, '.');
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Decimal places written for every value (default: 6)
    pub precision: usize,

    /// Write the `#` metadata block (default: false)
    pub include_metadata: bool,

    /// Metadata written when `include_metadata` is set
    pub metadata: Option<CsvMetadata>,

    /// Header of the time column (default: "t")
    pub time_header: String,

    /// Component headers; `None` gives `y` for scalars and `y[i]` otherwise
    pub component_headers: Option<Vec<String>>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
            include_metadata: false,
            metadata: None,
            time_header: "t".to_string(),
            component_headers: None,
        }
    }
}

impl CsvConfig {
    /// European CSV: semicolon delimiter, comma decimal separator
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    /// 12 decimal places
    pub fn high_precision() -> Self {
        Self {
            precision: 12,
            ..Default::default()
        }
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Name the component columns (e.g. `["x", "v"]`)
    pub fn with_headers<S: Into<String>>(mut self, headers: impl IntoIterator<Item = S>) -> Self {
        self.component_headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    /// Enable the metadata block
    pub fn with_metadata(mut self, metadata: CsvMetadata) -> Self {
        self.include_metadata = true;
        self.metadata = Some(metadata);
        self
    }
}

/// Metadata for the CSV comment block
///
/// Only fields that are `Some` are written.
#[derive(Debug, Clone, Default)]
pub struct CsvMetadata {
    pub system_name: Option<String>,
    pub solver_name: Option<String>,
    pub time_span: Option<(f64, f64)>,
    pub tolerance: Option<f64>,
    pub accepted_steps: Option<usize>,
    pub rejected_steps: Option<usize>,
    pub function_evaluations: Option<usize>,
    pub error_estimate: Option<f64>,
    pub status: Option<String>,

    /// Additional `key: value` lines
    pub custom: Vec<(String, String)>,
}

impl CsvMetadata {
    /// Collect everything the result knows about its run
    pub fn from_result<K: ProblemKind>(result: &SimulationResult<K>) -> Self {
        let span = match (result.time_points.first(), result.final_time()) {
            (Some(&start), Some(end)) => Some((start, end)),
            _ => None,
        };

        Self {
            system_name: result.get_metadata("system").map(str::to_string),
            solver_name: result.get_metadata("solver").map(str::to_string),
            time_span: span,
            tolerance: result.get_metadata("tolerance").and_then(|v| v.parse().ok()),
            accepted_steps: Some(result.statistics.accepted),
            rejected_steps: Some(result.statistics.rejected),
            function_evaluations: Some(result.statistics.function_evaluations),
            error_estimate: Some(result.final_error_estimate),
            status: Some(result.status.to_string()),
            custom: Vec::new(),
        }
    }

    /// Add custom parameter
    pub fn add_custom(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.custom.push((key.into(), value.into()));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn write_metadata_header<W: Write>(out: &mut W, metadata: &CsvMetadata) -> std::io::Result<()> {
    writeln!(out, "# RKF Integration Data")?;
    writeln!(out, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;

    if let Some(system) = &metadata.system_name {
        writeln!(out, "# System: {}", system)?;
    }
    if let Some(solver) = &metadata.solver_name {
        writeln!(out, "# Solver: {}", solver)?;
    }
    if let Some((start, end)) = metadata.time_span {
        writeln!(out, "# Time Span: [{}, {}]", start, end)?;
    }
    if let Some(tolerance) = metadata.tolerance {
        writeln!(out, "# Tolerance: {:e}", tolerance)?;
    }
    if let Some(accepted) = metadata.accepted_steps {
        writeln!(out, "# Accepted Steps: {}", accepted)?;
    }
    if let Some(rejected) = metadata.rejected_steps {
        writeln!(out, "# Rejected Steps: {}", rejected)?;
    }
    if let Some(evaluations) = metadata.function_evaluations {
        writeln!(out, "# Function Evaluations: {}", evaluations)?;
    }
    if let Some(error) = metadata.error_estimate {
        writeln!(out, "# Error Estimate: {:e}", error)?;
    }
    if let Some(status) = &metadata.status {
        writeln!(out, "# Status: {}", status)?;
    }

    for (key, value) in &metadata.custom {
        writeln!(out, "# {}: {}", key, value)?;
    }

    writeln!(out, "#")
}

/// Format number with configured precision and decimal separator
fn format_number(value: f64, config: &CsvConfig) -> String {
    let formatted = format!("{:.prec$}", value, prec = config.precision);

    if config.decimal_separator != '.' {
        formatted.replace('.', &config.decimal_separator.to_string())
    } else {
        formatted
    }
}

fn component_headers(config: &CsvConfig, dimension: usize) -> Result<Vec<String>, ExportError> {
    match &config.component_headers {
        Some(headers) if headers.len() != dimension => Err(ExportError::LabelMismatch {
            expected: dimension,
            found: headers.len(),
        }),
        Some(headers) => Ok(headers.clone()),
        None if dimension == 1 => Ok(vec!["y".to_string()]),
        None => Ok((0..dimension).map(|i| format!("y[{}]", i)).collect()),
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// CSV exporter
#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    config: CsvConfig,
}

impl CsvExporter {
    pub fn new(config: CsvConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }
}

impl Exporter for CsvExporter {
    type Error = ExportError;

    fn write<K: ProblemKind, W: Write>(
        &self,
        result: &SimulationResult<K>,
        n_points: Option<usize>,
        out: &mut W,
    ) -> Result<(), ExportError> {
        let config = &self.config;

        // ============================= Validation =============================

        if config.delimiter == config.decimal_separator {
            return Err(ExportError::AmbiguousSeparator(config.delimiter));
        }
        check_result(result)?;
        let headers = component_headers(config, result.dimension())?;
        let indices = downsample_indices(result.len(), n_points)?;

        // ============================= Metadata ===============================

        if config.include_metadata {
            if let Some(metadata) = &config.metadata {
                write_metadata_header(out, metadata)?;
            }
        }

        // ============================= Header =================================

        write!(out, "{}", config.time_header)?;
        for header in &headers {
            write!(out, "{}{}", config.delimiter, header)?;
        }
        writeln!(out)?;

        // ============================= Data ===================================

        for i in indices {
            write!(out, "{}", format_number(result.time_points[i], config))?;
            for value in result.trajectory[i].components() {
                write!(out, "{}{}", config.delimiter, format_number(value, config))?;
            }
            writeln!(out)?;
        }

        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
