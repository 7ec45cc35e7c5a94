//! Example: Van der Pol oscillator with plots
//!
//! ```text
//! x'' - mu (1 - x²) x' + x = 0
//! ```
//!
//! written as the first-order system `y0' = y1`, `y1' = mu (1 - y0²) y1 - y0`.
//! For larger `mu` the limit cycle alternates slow drifts with fast jumps,
//! which is where adaptive step control pays off: the accepted step sizes
//! shrink by orders of magnitude during each jump.
//!
//! Produces, per value of `mu`, three plots in the system temporary
//! directory: components against time, the phase portrait and the step-size
//! history.

use nalgebra::DVector;
use rkf_rs::output::visualization::{plot_phase_portrait, plot_result, plot_step_sizes, PlotConfig};
use rkf_rs::prelude::*;

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

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("═══════════════════════════════════════════════════════");
    println!("  Van der Pol oscillator");
    println!("═══════════════════════════════════════════════════════\n");

    let tmp_dir = std::env::temp_dir();
    let solver = RkfSolver::with_tableau(ButcherTableau::dormand_prince());
    let config = SolverConfiguration::new(1e-6, 100_000)
        .with_control(StepControl::proportional_integral());

    for mu in [1.0, 5.0] {
        let scenario = Scenario::<Vector>::new(
            Box::new(VanDerPol { mu }),
            TimeSpan::new(0.0, 30.0),
            DVector::from_vec(vec![2.0, 0.0]),
        );

        let result = solver.solve(&scenario, &config)?;

        println!("mu = {}:", mu);
        println!("  status      : {}", result.status);
        println!("  accepted    : {}", result.statistics.accepted);
        println!("  rejected    : {}", result.statistics.rejected);
        println!("  f-evals     : {}", result.statistics.function_evaluations);
        if let (Some(h_min), Some(h_max)) = (result.min_step(), result.max_step()) {
            println!("  h range     : [{:.3e}, {:.3e}]", h_min, h_max);
        }

        // ====== Plots ======

        let mut trajectory = PlotConfig::trajectory(format!("Van der Pol, mu = {}", mu));
        trajectory.component_labels = Some(vec!["x".to_string(), "x'".to_string()]);

        let mut phase = PlotConfig::phase_portrait(format!("Limit cycle, mu = {}", mu));
        phase.xlabel = "x".to_string();
        phase.ylabel = "x'".to_string();
        phase.show_legend = false;

        let mut steps = PlotConfig::step_sizes(format!("Accepted steps, mu = {}", mu));
        steps.show_legend = false;

        let stem = format!("van_der_pol_mu{}", mu);
        let curves = tmp_dir.join(format!("{}.png", stem));
        let cycle = tmp_dir.join(format!("{}_phase.svg", stem));
        let history = tmp_dir.join(format!("{}_steps.png", stem));

        plot_result(&result, &curves, Some(&trajectory))?;
        plot_phase_portrait(&result, (0, 1), &cycle, Some(&phase))?;
        plot_step_sizes(&result, &history, Some(&steps))?;

        println!("  plots       : {}", curves.display());
        println!("                {}", cycle.display());
        println!("                {}\n", history.display());
    }

    Ok(())
}
