//! Chart appearance.

use plotters::prelude::*;

#[derive(Clone, Debug)]
pub struct PlotConfig {
    /// Image width in pixels (default: 1024)
    pub width: u32,

    /// Image height in pixels (default: 768)
    pub height: u32,

    pub title: String,
    pub xlabel: String,
    pub ylabel: String,

    /// Line width in pixels (default: 2)
    pub line_width: u32,

    pub show_grid: bool,

    /// One color per series; the default palette is used past the end.
    pub series_colors: Option<Vec<RGBColor>>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "Mass-spring-damper".to_string(),
            xlabel: "Time (s)".to_string(),
            ylabel: "Position (m)".to_string(),
            line_width: 2,
            show_grid: true,
            series_colors: None,
        }
    }
}

const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

impl PlotConfig {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn series_color(&self, index: usize) -> RGBColor {
        if let Some(colors) = &self.series_colors
            && let Some(color) = colors.get(index)
        {
            return *color;
        }
        PALETTE[index % PALETTE.len()]
    }
}
