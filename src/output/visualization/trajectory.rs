//! Static plots of integration results
//!
//! Every function picks its backend from the file extension: `.svg` gives a
//! vector image, anything else a PNG bitmap.
//!
//! # Example
//!
//! ```rust,ignore
//! use rkf_rs::output::visualization::{plot_phase_portrait, plot_result, plot_step_sizes, PlotConfig};
//!
//! let result = RkfSolver::new().solve(&scenario, &config)?;
//!
//! plot_result(&result, "vdp.png", Some(&PlotConfig::trajectory("Van der Pol")))?;
//! plot_phase_portrait(&result, (0, 1), "vdp_phase.svg", None)?;
//! plot_step_sizes(&result, "vdp_steps.png", None)?;
//! ```

use std::error::Error;
use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use super::PlotConfig;
use crate::solver::SimulationResult;
use crate::state::ProblemKind;

// =================================================================================================
// Backend dispatch
// =================================================================================================

macro_rules! render_to {
    ($path:expr, $config:expr, $render:ident ( $($arg:expr),* $(,)? )) => {{
        let path: &Path = $path;
        let size = ($config.width, $config.height);
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("svg") => $render(SVGBackend::new(path, size), $($arg),*),
            _ => $render(BitMapBackend::new(path, size), $($arg),*),
        }
    }};
}

// =================================================================================================
// Public API
// =================================================================================================

/// Plot every state component against time
///
/// # Errors
///
/// Returns `Err` when the result is empty or the backend cannot write to
/// `output_path`.
pub fn plot_result<K: ProblemKind, P: AsRef<Path>>(
    result: &SimulationResult<K>,
    output_path: P,
    config: Option<&PlotConfig>,
) -> Result<(), Box<dyn Error>> {
    if result.is_empty() {
        return Err("result contains no data".into());
    }

    let default_config = PlotConfig::trajectory("Solution");
    let config = config.unwrap_or(&default_config);

    let series: Vec<Vec<(f64, f64)>> = (0..result.dimension())
        .map(|k| {
            result
                .time_points
                .iter()
                .copied()
                .zip(result.component_series(k))
                .collect()
        })
        .collect();

    let x_range = padded_range(result.time_points.iter().copied());
    let y_range = padded_range(series.iter().flatten().map(|&(_, y)| y));

    render_to!(
        output_path.as_ref(),
        config,
        draw_curves(&series, config, x_range, y_range)
    )
}

/// Plot component `axes.1` against component `axes.0`
///
/// # Errors
///
/// Returns `Err` when the result is empty, an axis index is out of range, or
/// the backend cannot write to `output_path`.
pub fn plot_phase_portrait<K: ProblemKind, P: AsRef<Path>>(
    result: &SimulationResult<K>,
    axes: (usize, usize),
    output_path: P,
    config: Option<&PlotConfig>,
) -> Result<(), Box<dyn Error>> {
    if result.is_empty() {
        return Err("result contains no data".into());
    }
    let dimension = result.dimension();
    if axes.0 >= dimension || axes.1 >= dimension {
        return Err(format!(
            "phase axes ({}, {}) out of range for a {}-dimensional state",
            axes.0, axes.1, dimension
        )
        .into());
    }

    let mut default_config = PlotConfig::phase_portrait("Phase portrait");
    default_config.xlabel = format!("y[{}]", axes.0);
    default_config.ylabel = format!("y[{}]", axes.1);
    default_config.component_labels = Some(vec!["trajectory".to_string()]);
    let config = config.unwrap_or(&default_config);

    let curve: Vec<(f64, f64)> = result
        .component_series(axes.0)
        .into_iter()
        .zip(result.component_series(axes.1))
        .collect();

    let x_range = padded_range(curve.iter().map(|&(x, _)| x));
    let y_range = padded_range(curve.iter().map(|&(_, y)| y));

    render_to!(
        output_path.as_ref(),
        config,
        draw_curves(&[curve], config, x_range, y_range)
    )
}

/// Plot accepted step sizes against the time at which each step started
///
/// The step-size axis is logarithmic.
///
/// # Errors
///
/// Returns `Err` when fewer than two points were accepted or the backend
/// cannot write to `output_path`.
pub fn plot_step_sizes<K: ProblemKind, P: AsRef<Path>>(
    result: &SimulationResult<K>,
    output_path: P,
    config: Option<&PlotConfig>,
) -> Result<(), Box<dyn Error>> {
    let steps = result.step_sizes();
    if steps.is_empty() {
        return Err("no accepted step to plot".into());
    }

    let default_config = PlotConfig::step_sizes("Accepted step sizes");
    let config = config.unwrap_or(&default_config);

    let points: Vec<(f64, f64)> = result.time_points.iter().copied().zip(steps).collect();

    let x_range = padded_range(result.time_points.iter().copied());
    let low = points.iter().map(|&(_, h)| h).fold(f64::INFINITY, f64::min);
    let high = points.iter().map(|&(_, h)| h).fold(0.0, f64::max);
    let h_range = (low / 2.0)..(high * 2.0);

    render_to!(
        output_path.as_ref(),
        config,
        draw_step_sizes(&points, config, x_range, h_range)
    )
}

// =================================================================================================
// Private Plot Implementations
// =================================================================================================

/// Data range widened by 5% on each side; flat data gets a unit half-width
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !low.is_finite() || !high.is_finite() {
        return 0.0..1.0;
    }
    let width = high - low;
    if width <= f64::EPSILON * high.abs().max(1.0) {
        return (low - 1.0)..(high + 1.0);
    }
    (low - 0.05 * width)..(high + 0.05 * width)
}

fn draw_curves<DB: DrawingBackend>(
    backend: DB,
    series: &[Vec<(f64, f64)>],
    config: &PlotConfig,
    x_range: Range<f64>,
    y_range: Range<f64>,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let root = backend.into_drawing_area();
    root.fill(&config.background)?;

    let (x_area, y_area) = if config.show_grid { (50, 60) } else { (0, 0) };
    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(15)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area);
    if !config.title.is_empty() {
        builder.caption(&config.title, ("sans-serif", 36).into_font());
    }
    let mut chart = builder.build_cartesian_2d(x_range, y_range)?;

    if config.show_grid {
        chart
            .configure_mesh()
            .x_desc(&config.xlabel)
            .y_desc(&config.ylabel)
            .x_label_formatter(&|x| format!("{:.2}", x))
            .y_label_formatter(&|y| format!("{:.3}", y))
            .draw()?;
    }

    let dimension = series.len();
    for (k, points) in series.iter().enumerate() {
        let color = config.component_color(k);

        chart
            .draw_series(LineSeries::new(
                points.iter().copied(),
                ShapeStyle::from(&color).stroke_width(config.line_width),
            ))?
            .label(config.component_label(k, dimension))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));

        if config.show_points {
            chart.draw_series(
                points
                    .iter()
                    .map(|&point| Circle::new(point, 2, color.filled())),
            )?;
        }
    }

    if config.show_legend {
        chart
            .configure_series_labels()
            .background_style(&config.background.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn draw_step_sizes<DB: DrawingBackend>(
    backend: DB,
    points: &[(f64, f64)],
    config: &PlotConfig,
    x_range: Range<f64>,
    h_range: Range<f64>,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let root = backend.into_drawing_area();
    root.fill(&config.background)?;

    let (x_area, y_area) = if config.show_grid { (50, 60) } else { (0, 0) };
    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(15)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area);
    if !config.title.is_empty() {
        builder.caption(&config.title, ("sans-serif", 36).into_font());
    }
    let mut chart = builder.build_cartesian_2d(x_range, h_range.log_scale())?;

    if config.show_grid {
        chart
            .configure_mesh()
            .x_desc(&config.xlabel)
            .y_desc(&config.ylabel)
            .y_label_formatter(&|h| format!("{:.1e}", h))
            .draw()?;
    }

    let color = config.component_color(0);
    chart.draw_series(LineSeries::new(
        points.iter().copied(),
        ShapeStyle::from(&color).stroke_width(config.line_width),
    ))?;

    if config.show_points {
        chart.draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, 2, color.filled())),
        )?;
    }

    root.present()?;
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
