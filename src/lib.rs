use thiserror::Error;

pub mod bars;
pub mod chart;
pub mod colormap;
pub mod display;
pub mod grid;
pub mod light;
pub mod render;
pub mod utils;
pub mod water;

pub use bars::{Bar, BarStyle};
pub use chart::{build_chart, Chart, ChartOptions};
pub use colormap::{ColorSource, RandomColors, Rgb, Rgba};
pub use grid::HeightGrid;
pub use light::LightSource;
pub use render::RenderOptions;
pub use water::{WaterMap, WaterTable};

#[derive(Error, Debug)]
pub enum ChartError {
  #[error("Grid has no cells")]
  EmptyGrid,
  #[error("Row {row} has {found} values, expected {expected}")]
  RaggedGrid {
    row: usize,
    expected: usize,
    found: usize,
  },
  #[error("Height at ({row}, {col}) is negative: {value}")]
  NegativeHeight { row: usize, col: usize, value: f64 },
  #[error("Height at ({row}, {col}) is not a finite number")]
  NonFiniteHeight { row: usize, col: usize },
  #[error("Random height range is empty: {min} > {max}")]
  InvalidRandomRange { min: u32, max: u32 },
  #[error("Random height range {min}..{max} is not a finite non-negative span")]
  InvalidContinuousRange { min: f64, max: f64 },
  #[error("A {rows}x{cols} grid exceeds the {limit} cell limit")]
  GridTooLarge {
    rows: usize,
    cols: usize,
    limit: usize,
  },
  #[error("Invalid grid JSON: {0}")]
  InvalidGridJson(String),
  #[error("Got {found} colors for {expected} cells")]
  ColorCountMismatch { expected: usize, found: usize },
  #[error("Option {0} must be a finite number")]
  NonFiniteOption(&'static str),
  #[error("Degenerate projection")]
  DegenerateProjection,
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
  #[error("Viewer failed: {0}")]
  ViewerFailed(String),
}
