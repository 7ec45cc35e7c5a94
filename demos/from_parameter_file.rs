//! Example: run driven by a parameter file
//!
//! ```bash
//! cargo run --example from_parameter_file -- demos/data/van_der_pol.pot
//! ```
//!
//! The file holds the integration parameters at the top level and two
//! sections:
//!
//! - `[problem]`: `name` (`decay` or `van_der_pol`) and its coefficient
//!   (`rate` or `mu`)
//! - `[output]`: report file name and an optional number of `points`
//!
//! The report is written in the plotting text format to the system
//! temporary directory.

use nalgebra::DVector;
use rkf_rs::config::{ParameterFile, RunParameters};
use rkf_rs::output::export::{DatExporter, Exporter};
use rkf_rs::prelude::*;

use std::path::{Path, PathBuf};

struct VanDerPol {
    mu: f64,
}

impl OdeSystem<Vector> for VanDerPol {
    fn rhs(&self, _t: f64, y: &DVector<f64>) -> DVector<f64> {
        DVector::from_vec(vec![y[1], self.mu * (1.0 - y[0] * y[0]) * y[1] - y[0]])
    }

    fn name(&self) -> &str {
        "Van der Pol"
    }
}

/// Print the summary and write the report
fn finish<K: ProblemKind>(
    result: &SimulationResult<K>,
    path: &Path,
    points: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Result:");
    println!("  status         : {}", result.status);
    println!("  accepted       : {}", result.statistics.accepted);
    println!("  rejected       : {}", result.statistics.rejected);
    println!("  error estimate : {:e}", result.final_error_estimate);

    DatExporter.export(result, points, path)?;
    println!("  report         : {}", path.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("demos/data/decay.pot"));

    println!("═══════════════════════════════════════════════════════");
    println!("  Parameter file: {}", path.display());
    println!("═══════════════════════════════════════════════════════\n");

    // ====== Parameters ======

    let file = ParameterFile::from_path(&path)?;
    let run = RunParameters::from_parameters(&file)?;
    let problem = file.section("problem");
    let output = file.section("output");

    println!("Parameters:");
    println!("  interval       : [{}, {}]", run.t0, run.tf);
    println!("  y0             : {:?}", run.y0);
    println!("  method         : {}", run.tableau.name());
    println!("  control        : {}", run.control.name());
    println!("  tolerance      : {:e}", run.tolerance);
    println!("  max steps      : {}\n", run.n_max_steps);

    let report = std::env::temp_dir().join(output.get_str("file", "rkf.dat"));
    let points = match output.get_usize("points", 0)? {
        0 => None,
        n => Some(n),
    };

    // ====== Solve ======

    let solver = RkfSolver::with_tableau(run.tableau.clone());
    let config = run.configuration();

    match problem.get_str("name", "decay") {
        "van_der_pol" => {
            let mu = problem.get_f64("mu", 1.0)?;
            let scenario = run.vector_scenario(Box::new(VanDerPol { mu }));
            finish(&solver.solve(&scenario, &config)?, &report, points)
        }
        "decay" => {
            let rate = problem.get_f64("rate", 1.0)?;
            let scenario =
                run.scalar_scenario(Box::new(move |_t: f64, y: &f64| -rate * y))?;
            finish(&solver.solve(&scenario, &config)?, &report, points)
        }
        other => Err(format!("unknown problem '{}'", other).into()),
    }
}
