//! Position-vs-time line charts.

use std::ops::Range;
use std::path::Path;

use msd_model::State;
use msd_sim::SimRecord;
use plotters::prelude::*;

use crate::config::PlotConfig;
use crate::{PlotError, PlotResult};

/// One curve: positions `x` sampled at times `t`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    pub label: Option<String>,
    pub t: Vec<f64>,
    pub x: Vec<f64>,
}

impl Series {
    pub fn new(label: Option<String>, t: Vec<f64>, x: Vec<f64>) -> Self {
        Self { label, t, x }
    }

    pub fn from_record(record: &SimRecord<State>, label: Option<String>) -> Self {
        Self {
            label,
            t: record.t.clone(),
            x: record.x.iter().map(|s| s.x).collect(),
        }
    }

    fn name(&self) -> String {
        self.label.clone().unwrap_or_else(|| "<unnamed>".to_string())
    }

    fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.t
            .iter()
            .copied()
            .zip(self.x.iter().copied())
            .filter(|(t, x)| t.is_finite() && x.is_finite())
    }
}

fn backend_err(e: impl std::fmt::Display) -> PlotError {
    PlotError::Backend {
        message: e.to_string(),
    }
}

/// Check the series and compute the padded axis ranges.
pub(crate) fn axis_ranges(series: &[Series]) -> PlotResult<(Range<f64>, Range<f64>)> {
    if series.is_empty() {
        return Err(PlotError::Empty);
    }

    let (mut t_min, mut t_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);

    for s in series {
        if s.t.len() != s.x.len() {
            return Err(PlotError::LengthMismatch {
                label: s.name(),
                t_len: s.t.len(),
                x_len: s.x.len(),
            });
        }
        let mut any = false;
        for (t, x) in s.points() {
            any = true;
            t_min = t_min.min(t);
            t_max = t_max.max(t);
            x_min = x_min.min(x);
            x_max = x_max.max(x);
        }
        if !any {
            return Err(PlotError::NoFiniteData { label: s.name() });
        }
    }

    if t_max <= t_min {
        t_max = t_min + 1.0;
    }
    let pad = if x_max > x_min {
        0.05 * (x_max - x_min)
    } else {
        0.5 * x_max.abs().max(1.0)
    };

    Ok((t_min..t_max, (x_min - pad)..(x_max + pad)))
}

/// Draw all series on one chart at `path`.
pub fn plot_series(
    series: &[Series],
    path: impl AsRef<Path>,
    config: Option<&PlotConfig>,
) -> PlotResult<()> {
    let path = path.as_ref();
    let default_config = PlotConfig::default();
    let config = config.unwrap_or(&default_config);
    let (t_range, x_range) = axis_ranges(series)?;

    let svg = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    if svg {
        let backend = SVGBackend::new(path, (config.width, config.height));
        draw(backend, series, config, t_range, x_range)?;
    } else {
        let backend = BitMapBackend::new(path, (config.width, config.height));
        draw(backend, series, config, t_range, x_range)?;
    }

    tracing::info!(path = %path.display(), series = series.len(), "wrote plot");
    Ok(())
}

fn draw<DB: DrawingBackend>(
    backend: DB,
    series: &[Series],
    config: &PlotConfig,
    t_range: Range<f64>,
    x_range: Range<f64>,
) -> PlotResult<()>
where
    DB::ErrorType: 'static,
{
    let root = backend.into_drawing_area();
    root.fill(&WHITE).map_err(backend_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, ("sans-serif", 32).into_font())
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(t_range, x_range)
        .map_err(backend_err)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(&config.xlabel).y_desc(&config.ylabel);
    if !config.show_grid {
        mesh.disable_mesh();
    }
    mesh.draw().map_err(backend_err)?;

    for (idx, s) in series.iter().enumerate() {
        let color = config.series_color(idx);
        let style = ShapeStyle::from(&color).stroke_width(config.line_width);
        let drawn = chart
            .draw_series(LineSeries::new(s.points(), style))
            .map_err(backend_err)?;
        if let Some(label) = &s.label {
            drawn
                .label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        }
    }

    if series.iter().any(|s| s.label.is_some()) {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(backend_err)?;
    }

    root.present().map_err(backend_err)?;
    Ok(())
}
