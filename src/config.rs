//! Run-parameter files
//!
//! Solver runs are usually driven from a small GetPot-style text file:
//!
//! ```text
//! # Van der Pol, mu = 1
//! t0 = 0
//! tf = 40
//! y0 = '1 1'          # quoted list for vector problems
//! h0 = 0.1
//! tolerance = 1e-4
//! n_max_steps = 2000
//! factor_reduction = 0.95
//! factor_expansion = 2
//! method = rkf45
//! control = integral
//!
//! [output]
//! file = vdp.dat
//! ```
//!
//! Lines are `key = value`; `#` starts a comment; `[section]` prefixes the
//! following keys with `section/` (`[]` returns to the top level). Values may
//! be single- or double-quoted.
//!
//! [`ParameterFile`] is the untyped key-value view, [`RunParameters`] the typed
//! run description built from it.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use nalgebra::DVector;

use crate::solver::{Scenario, SolverConfiguration, StepControl, TimeSpan};
use crate::state::{OdeSystem, Scalar, Vector};
use crate::tableau::ButcherTableau;

// =================================================================================================
// Errors
// =================================================================================================

/// The error type for parameter-file loading
#[derive(Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading the input stream.
    Io(std::io::Error),
    /// A non-empty line is neither `key = value` nor `[section]`.
    Malformed { line: usize, content: String },
    /// A value could not be parsed into the expected numeric type.
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },
    /// `method` names no catalogue tableau.
    UnknownMethod(String),
    /// `control` names no step-control policy.
    UnknownControl(String),
    /// `y0` has the wrong number of components for the requested problem kind.
    InitialStateDimension { expected: usize, found: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::Malformed { line, content } => {
                write!(f, "line {}: expected 'key = value', got '{}'", line, content)
            }
            ConfigError::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "{} = '{}' is not a valid {}", key, value, expected),
            ConfigError::UnknownMethod(name) => write!(f, "unknown method '{}'", name),
            ConfigError::UnknownControl(name) => write!(f, "unknown step control '{}'", name),
            ConfigError::InitialStateDimension { expected, found } => write!(
                f,
                "y0 has {} components, expected {}",
                found, expected
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

// =================================================================================================
// Untyped key-value view
// =================================================================================================

/// Parsed `key = value` pairs, keys qualified by their section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterFile {
    values: HashMap<String, String>,
}

impl ParameterFile {
    /// Parse any buffered reader
    pub fn from_bufread<R: BufRead>(reader: R) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        let mut section = String::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let content = strip_comment(&line).trim();
            if content.is_empty() {
                continue;
            }

            if let Some(name) = content.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                section = name.trim().trim_matches('/').to_string();
                if section == "." || section == ".." {
                    section.clear();
                }
                continue;
            }

            let Some((key, value)) = content.split_once('=') else {
                return Err(ConfigError::Malformed {
                    line: index + 1,
                    content: content.to_string(),
                });
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::Malformed {
                    line: index + 1,
                    content: content.to_string(),
                });
            }

            let qualified = if section.is_empty() {
                key.to_string()
            } else {
                format!("{}/{}", section, key)
            };
            values.insert(qualified, unquote(value.trim()).to_string());
        }

        Ok(Self { values })
    }

    /// Parse a file on disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        Self::from_bufread(BufReader::new(file))
    }

    /// Parse any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Self::from_bufread(BufReader::new(reader))
    }

    /// Parse an in-memory string
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Self::from_bufread(text.as_bytes())
    }

    /// Keys under `name/`, with the prefix removed
    pub fn section(&self, name: &str) -> Self {
        let prefix = format!("{}/", name.trim_matches('/'));
        let values = self
            .values
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(&prefix).map(|k| (k.to_string(), v.clone())))
            .collect();
        Self { values }
    }

    /// Raw value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// String value or default
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Floating-point value or default
    pub fn get_f64(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => parse_f64(key, raw),
        }
    }

    /// Non-negative integer value or default
    ///
    /// Accepts floating-point notation with no fractional part (`1e3`).
    pub fn get_usize(&self, key: &str, default: usize) -> Result<usize, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(default);
        };

        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
            expected: "non-negative integer",
        };

        if let Ok(value) = raw.parse::<usize>() {
            return Ok(value);
        }
        let value: f64 = raw.parse().map_err(|_| invalid())?;
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= usize::MAX as f64
        {
            Ok(value as usize)
        } else {
            Err(invalid())
        }
    }

    /// Whitespace- or comma-separated list of numbers, or default
    pub fn get_list(&self, key: &str, default: &[f64]) -> Result<Vec<f64>, ConfigError> {
        match self.get(key) {
            None => Ok(default.to_vec()),
            Some(raw) => raw
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|token| !token.is_empty())
                .map(|token| parse_f64(key, token))
                .collect(),
        }
    }
}

fn parse_f64(key: &str, raw: &str) -> Result<f64, ConfigError> {
    raw.trim().parse::<f64>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        expected: "number",
    })
}

/// Drop everything from the first `#` outside quotes
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (i, c) in line.char_indices() {
        match (c, quote) {
            ('\'' | '"', None) => quote = Some(c),
            (q, Some(open)) if q == open => quote = None,
            ('#', None) => return &line[..i],
            _ => {}
        }
    }
    line
}

fn unquote(value: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = value.strip_prefix(quote).and_then(|v| v.strip_suffix(quote)) {
            return inner;
        }
    }
    value
}

// =================================================================================================
// Typed run description
// =================================================================================================

/// Everything needed to run one solve, except the forcing function
///
/// # Keys and defaults
///
/// | Key                | Default   |
/// |--------------------|-----------|
/// | `t0`               | `0`       |
/// | `tf`               | `1`       |
/// | `y0`               | `0`       |
/// | `h0`               | `0.1`     |
/// | `tolerance`        | `1e-6`    |
/// | `n_max_steps`      | `1000`    |
/// | `factor_reduction` | `0.95`    |
/// | `factor_expansion` | `2`       |
/// | `method`           | `rkf45`   |
/// | `control`          | `integral`|
#[derive(Debug, Clone, PartialEq)]
pub struct RunParameters {
    pub t0: f64,
    pub tf: f64,
    pub y0: Vec<f64>,
    pub h0: f64,
    pub tolerance: f64,
    pub n_max_steps: usize,
    pub factor_reduction: f64,
    pub factor_expansion: f64,
    pub tableau: ButcherTableau,
    pub control: StepControl,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            t0: 0.0,
            tf: 1.0,
            y0: vec![0.0],
            h0: 0.1,
            tolerance: 1e-6,
            n_max_steps: 1000,
            factor_reduction: 0.95,
            factor_expansion: 2.0,
            tableau: ButcherTableau::rkf45(),
            control: StepControl::integral(),
        }
    }
}

impl RunParameters {
    /// Read the run keys of a parameter file (missing keys take their default)
    pub fn from_parameters(file: &ParameterFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let method = file.get_str("method", "rkf45");
        let tableau = ButcherTableau::by_name(method)
            .ok_or_else(|| ConfigError::UnknownMethod(method.to_string()))?;

        let control_name = file.get_str("control", "integral");
        let control = StepControl::by_name(control_name)
            .ok_or_else(|| ConfigError::UnknownControl(control_name.to_string()))?;

        Ok(Self {
            t0: file.get_f64("t0", defaults.t0)?,
            tf: file.get_f64("tf", defaults.tf)?,
            y0: file.get_list("y0", &defaults.y0)?,
            h0: file.get_f64("h0", defaults.h0)?,
            tolerance: file.get_f64("tolerance", defaults.tolerance)?,
            n_max_steps: file.get_usize("n_max_steps", defaults.n_max_steps)?,
            factor_reduction: file.get_f64("factor_reduction", defaults.factor_reduction)?,
            factor_expansion: file.get_f64("factor_expansion", defaults.factor_expansion)?,
            tableau,
            control,
        })
    }

    /// Load a parameter file and read its top-level run keys
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_parameters(&ParameterFile::from_path(path)?)
    }

    /// Integration interval
    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.t0, self.tf)
    }

    /// Step-control configuration (validated later by the solver)
    pub fn configuration(&self) -> SolverConfiguration {
        SolverConfiguration::new(self.tolerance, self.n_max_steps)
            .with_initial_step(self.h0)
            .with_factors(self.factor_expansion, self.factor_reduction)
            .with_min_factor(self.factor_reduction.min(0.1))
            .with_control(self.control)
    }

    /// `y0` as a scalar (exactly one component)
    pub fn scalar_initial(&self) -> Result<f64, ConfigError> {
        match self.y0.as_slice() {
            [value] => Ok(*value),
            other => Err(ConfigError::InitialStateDimension {
                expected: 1,
                found: other.len(),
            }),
        }
    }

    /// `y0` as a vector
    pub fn vector_initial(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.y0)
    }

    /// Scalar scenario for the given forcing function
    pub fn scalar_scenario(
        &self,
        system: Box<dyn OdeSystem<Scalar>>,
    ) -> Result<Scenario<Scalar>, ConfigError> {
        Ok(Scenario::new(system, self.span(), self.scalar_initial()?))
    }

    /// Vector scenario for the given forcing function
    pub fn vector_scenario(&self, system: Box<dyn OdeSystem<Vector>>) -> Scenario<Vector> {
        Scenario::new(system, self.span(), self.vector_initial())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
