//! msd-plot: position-vs-time charts rendered with `plotters`.
//!
//! Output format follows the file extension: `.svg` gives an SVG, anything
//! else goes through the bitmap backend (PNG for `.png`).

pub mod config;
pub mod series;

pub use config::PlotConfig;
pub use series::{Series, plot_series};

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlotError {
    #[error("No series to plot")]
    Empty,

    #[error("Series '{label}' has {t_len} times but {x_len} positions")]
    LengthMismatch {
        label: String,
        t_len: usize,
        x_len: usize,
    },

    #[error("Series '{label}' contains no finite samples")]
    NoFiniteData { label: String },

    #[error("Plot backend error: {message}")]
    Backend { message: String },
}
