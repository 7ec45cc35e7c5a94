//! Plotting of integration results with `plotters`
//!
//! Compiled with the `plotting` feature (on by default).
//!
//! # Organization
//!
//! - **config**: shared plot configuration (`PlotConfig`)
//! - **trajectory**: solution, phase-portrait and step-size plots
//!
//! # When to Use Which Function
//!
//! | Use Case                           | Function              |
//! |------------------------------------|-----------------------|
//! | Components of `y` against `t`      | `plot_result`         |
//! | One component against another      | `plot_phase_portrait` |
//! | How the controller adapted `h`     | `plot_step_sizes`     |

pub mod config;
pub mod trajectory;

pub use config::PlotConfig;
pub use trajectory::{plot_phase_portrait, plot_result, plot_step_sizes};
