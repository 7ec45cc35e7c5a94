//! Plot configuration shared by every plotting function

use plotters::prelude::*;

/// Configuration for customizing plots
///
/// # Example
///
/// ```rust
/// use rkf_rs::output::visualization::PlotConfig;
/// use plotters::prelude::*;
///
/// let mut config = PlotConfig::trajectory("Van der Pol, mu = 1");
/// config.component_colors = Some(vec![BLUE, RED]);
/// config.width = 1920;
/// config.height = 1080;
/// ```
#[derive(Clone)]
pub struct PlotConfig {
    /// Image width in pixels (default: 1024)
    pub width: u32,

    /// Image height in pixels (default: 768)
    pub height: u32,

    /// Plot title; empty means no caption (default: "Plot")
    pub title: String,

    pub xlabel: String,
    pub ylabel: String,

    /// Colors per state component; falls back to the built-in palette
    pub component_colors: Option<Vec<RGBColor>>,

    /// Component labels in the legend; `None` gives `y` / `y[i]`
    pub component_labels: Option<Vec<String>>,

    /// Background color (default: WHITE)
    pub background: RGBColor,

    /// Line width in pixels (default: 2)
    pub line_width: u32,

    /// Draw axes, tick labels and grid lines (default: true)
    pub show_grid: bool,

    /// Draw the series legend (default: true)
    pub show_legend: bool,

    /// Mark every accepted point, not only the joining line (default: false)
    pub show_points: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "Plot".to_string(),
            xlabel: String::new(),
            ylabel: String::new(),
            component_colors: None,
            component_labels: None,
            background: WHITE,
            line_width: 2,
            show_grid: true,
            show_legend: true,
            show_points: false,
        }
    }
}

impl PlotConfig {
    /// Solution components against time
    pub fn trajectory(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            xlabel: "t".to_string(),
            ylabel: "y(t)".to_string(),
            ..Self::default()
        }
    }

    /// Component `y[j]` against component `y[i]`
    pub fn phase_portrait(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            xlabel: "y[0]".to_string(),
            ylabel: "y[1]".to_string(),
            ..Self::default()
        }
    }

    /// Accepted step size against time (log scale)
    pub fn step_sizes(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            xlabel: "t".to_string(),
            ylabel: "h".to_string(),
            show_points: true,
            ..Self::default()
        }
    }

    /// No caption, axes or legend: only the curves are rendered
    pub fn bare() -> Self {
        Self {
            title: String::new(),
            show_grid: false,
            show_legend: false,
            ..Self::default()
        }
    }

    pub(crate) fn component_color(&self, index: usize) -> RGBColor {
        if let Some(color) = self.component_colors.as_ref().and_then(|c| c.get(index)) {
            return *color;
        }

        const PALETTE: [RGBColor; 8] = [
            RED,
            BLUE,
            GREEN,
            MAGENTA,
            CYAN,
            BLACK,
            RGBColor(255, 165, 0),
            RGBColor(128, 0, 128),
        ];
        PALETTE[index % PALETTE.len()]
    }

    pub(crate) fn component_label(&self, index: usize, dimension: usize) -> String {
        match self.component_labels.as_ref().and_then(|l| l.get(index)) {
            Some(label) => label.clone(),
            None if dimension == 1 => "y".to_string(),
            None => format!("y[{}]", index),
        }
    }
}
