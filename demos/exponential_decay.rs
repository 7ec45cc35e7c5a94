//! Example: exponential decay, y' = -k·y
//!
//! Integrates `y' = -10 y`, `y(0) = 1` over `[0, 100]` with every
//! catalogue pair and compares the result against the exact solution
//! `y(t) = exp(-10 t)`.
//!
//! The problem is mildly stiff: after the transient the solution is
//! essentially zero and the step size is limited by stability rather than
//! accuracy, so the solvers settle into a regime of regular rejections.
//!
//! The full report of the RKF45 run is written in the plotting text format
//! to the system temporary directory.

use rkf_rs::output::export::{DatExporter, Exporter};
use rkf_rs::prelude::*;

use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("═══════════════════════════════════════════════════════");
    println!("  Exponential decay: y' = -k y");
    println!("═══════════════════════════════════════════════════════\n");

    // ====== Problem ======

    let rate = 10.0;
    let span = TimeSpan::new(0.0, 100.0);
    let scenario = Scenario::<Scalar>::new(
        Box::new(move |_t: f64, y: &f64| -rate * y),
        span,
        1.0,
    );

    let config = SolverConfiguration::new(1e-4, 10_000)
        .with_initial_step(0.1)
        .with_factors(2.0, 0.95);

    println!("Problem:");
    println!("  k          : {}", rate);
    println!("  interval   : [{}, {}]", span.start, span.end);
    println!("  tolerance  : {:e}", config.tolerance);
    println!("  h0         : {:?}\n", config.initial_step);

    // ====== Every embedded pair ======

    println!(
        "{:<28} {:>8} {:>8} {:>8} {:>12} {:>10}",
        "Method", "Steps", "Reject", "f-evals", "max |error|", "Time"
    );
    println!("{:-<80}", "");

    for tableau in [
        ButcherTableau::heun_euler(),
        ButcherTableau::fehlberg12(),
        ButcherTableau::bogacki_shampine(),
        ButcherTableau::rkf45(),
        ButcherTableau::dormand_prince(),
    ] {
        let solver = RkfSolver::with_tableau(tableau);

        let start = Instant::now();
        let result = solver.solve(&scenario, &config)?;
        let elapsed = start.elapsed();

        let max_error = result
            .iter()
            .map(|(t, y)| (y - (-rate * t).exp()).abs())
            .fold(0.0, f64::max);

        println!(
            "{:<28} {:>8} {:>8} {:>8} {:>12.3e} {:>8.2?}{}",
            solver.tableau().name(),
            result.statistics.accepted,
            result.statistics.rejected,
            result.statistics.function_evaluations,
            max_error,
            elapsed,
            if result.failed { "  (failed)" } else { "" }
        );
    }

    // ====== Report of the default pair ======

    let result = RkfSolver::new().solve(&scenario, &config)?;
    let path = std::env::temp_dir().join("exponential_decay.dat");
    DatExporter.export(&result, None, &path)?;

    println!("\nRKF45 report written to {}", path.display());
    if let (Some(h_min), Some(h_max)) = (result.min_step(), result.max_step()) {
        println!("  h_min = {:.3e}, h_max = {:.3e}", h_min, h_max);
    }
    println!("  y({}) = {:e}", span.end, result.final_state().copied().unwrap_or(f64::NAN));

    Ok(())
}
