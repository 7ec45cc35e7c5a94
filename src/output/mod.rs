//! Output of simulation results
//!
//! - **Export**: CSV and gnuplot-style `.dat` files for external analysis
//! - **Visualization**: PNG/SVG plots (feature `plotting`)
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs
//! ├── export/             ← Data export
//! │   ├── mod.rs          (Exporter trait, downsampling)
//! │   ├── csv.rs
//! │   └── dat.rs
//! └── visualization/      ← Plots
//!     ├── mod.rs
//!     ├── config.rs
//!     └── trajectory.rs
//! ```
//!
//! Both halves read a [`SimulationResult`](crate::solver::SimulationResult)
//! directly; no intermediate copy of the trajectory is needed.

pub mod export;
#[cfg(feature = "plotting")]
pub mod visualization;

pub use export::{CsvConfig, CsvExporter, CsvMetadata, DatExporter, ExportError, Exporter};

#[cfg(feature = "plotting")]
pub use visualization::{plot_phase_portrait, plot_result, plot_step_sizes, PlotConfig};
