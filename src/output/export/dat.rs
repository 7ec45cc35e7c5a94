//! Plain-text `.dat` export
//!
//! Writes the report of [`SimulationResult::write_report`]: a `#` comment block
//! with the step counters, then whitespace-separated `t y...` rows. gnuplot
//! reads it as is:
//!
//! ```text
//! gnuplot> plot "vdp.dat" using 1:2 with lines
//! ```

use std::io::Write;

use super::{check_result, downsample_indices, ExportError, Exporter};
use crate::solver::SimulationResult;
use crate::state::ProblemKind;

/// Text report exporter
#[derive(Debug, Clone, Copy, Default)]
pub struct DatExporter;

impl Exporter for DatExporter {
    type Error = ExportError;

    fn write<K: ProblemKind, W: Write>(
        &self,
        result: &SimulationResult<K>,
        n_points: Option<usize>,
        out: &mut W,
    ) -> Result<(), ExportError> {
        check_result(result)?;
        let indices = downsample_indices(result.len(), n_points)?;
        result.write_report_points(out, &indices)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{IntegrationStatus, Statistics};
    use crate::state::Scalar;

    #[test]
    fn test_matches_report() {
        let result = SimulationResult::<Scalar>::new(
            vec![0.0, 0.5, 1.0],
            vec![1.0, 0.6, 0.4],
            Statistics {
                accepted: 2,
                ..Default::default()
            },
            0.0,
            IntegrationStatus::Converged,
        );

        let mut buffer = Vec::new();
        DatExporter.write(&result, None, &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), result.to_string());

        let mut buffer = Vec::new();
        DatExporter.write(&result, Some(2), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("# h_min: 0.5, h_max: 0.5\n"));
        assert!(text.ends_with("# t y\n  0\t1\n  1\t0.4\n"));
    }
}
