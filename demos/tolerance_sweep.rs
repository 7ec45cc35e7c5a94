//! Example: tolerance sweep
//!
//! Solves the harmonic oscillator `x'' = -x` over ten periods under a range
//! of tolerances and reports cost and accuracy for each run. The runs are
//! independent; with `--features parallel` they are spread over rayon's
//! pool.
//!
//! The oscillator uses a fixed-size state (`SVector<f64, 2>`), so no vector
//! is allocated per stage.

use nalgebra::Vector2;
use rkf_rs::prelude::*;
use rkf_rs::solver::{set_parallel_threshold, solve_configurations};

use std::f64::consts::PI;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("═══════════════════════════════════════════════════════");
    println!("  Tolerance sweep: harmonic oscillator");
    println!("═══════════════════════════════════════════════════════\n");

    let end = 20.0 * PI;
    let scenario = Scenario::<FixedVector<2>>::new(
        Box::new(|_t: f64, y: &Vector2<f64>| Vector2::new(y[1], -y[0])),
        TimeSpan::new(0.0, end),
        Vector2::new(1.0, 0.0),
    );

    let tolerances = [1e-2, 1e-4, 1e-6, 1e-8, 1e-10, 1e-12];
    let configs: Vec<SolverConfiguration> = tolerances
        .iter()
        .map(|&tol| SolverConfiguration::new(tol, 1_000_000))
        .collect();

    set_parallel_threshold(2);

    for tableau in [ButcherTableau::bogacki_shampine(), ButcherTableau::rkf45()] {
        let solver = RkfSolver::with_tableau(tableau);
        println!("{}:", solver.tableau().name());
        println!(
            "  {:>10} {:>8} {:>8} {:>10} {:>12} {:>12}",
            "tol", "steps", "reject", "f-evals", "estimate", "|error|"
        );

        for (tol, outcome) in tolerances.iter().zip(solve_configurations(&solver, &scenario, &configs)) {
            let result = outcome?;
            let error = result
                .final_state()
                .map(|y| (y - Vector2::new(end.cos(), -end.sin())).norm())
                .unwrap_or(f64::NAN);

            println!(
                "  {:>10.0e} {:>8} {:>8} {:>10} {:>12.3e} {:>12.3e}",
                tol,
                result.statistics.accepted,
                result.statistics.rejected,
                result.statistics.function_evaluations,
                result.final_error_estimate,
                error
            );
        }
        println!();
    }

    Ok(())
}
