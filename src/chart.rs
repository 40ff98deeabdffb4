use log::{debug, info};

use crate::bars::{layout_bars, water_bars, Bar, BarStyle};
use crate::colormap::{base_colors, ColorSource};
use crate::grid::HeightGrid;
use crate::light::LightSource;
use crate::render::{render_svg, RenderOptions};
use crate::water::WaterMap;
use crate::ChartError;

#[derive(Default)]
pub struct ChartOptions {
  pub style: BarStyle,
  pub light: LightSource,
  pub render: RenderOptions,
  /// Flood the grid and draw the pooled water over the bars.
  pub water: bool,
}

impl ChartOptions {
  fn validate(&self) -> Result<(), ChartError> {
    let numbers = [
      ("bar width", self.style.width),
      ("bar depth", self.style.depth),
      ("gap", self.style.gap),
      ("azimuth", self.light.azimuth_deg),
      ("altitude", self.light.altitude_deg),
    ];
    match numbers.iter().find(|(_, v)| !v.is_finite()) {
      Some(&(name, _)) => Err(ChartError::NonFiniteOption(name)),
      None => Ok(()),
    }
  }
}

/// Every intermediate stage of one render, kept for inspection.
pub struct Chart {
  pub grid: HeightGrid,
  pub normalized: Vec<f64>,
  pub bars: Vec<Bar>,
  /// Present when the options asked for water.
  pub water: Option<WaterMap>,
  pub svg: String,
}

/// Normalize, color, shade, place and render `grid`.
pub fn build_chart(
  grid: HeightGrid,
  options: &ChartOptions,
  source: &mut dyn ColorSource,
) -> Result<Chart, ChartError> {
  options.validate()?;
  let (rows, cols) = (grid.rows(), grid.cols());
  debug!(
    "building chart for {rows}x{cols} grid, heights {}..={}",
    grid.min(),
    grid.max()
  );

  let normalized = grid.normalized();
  let colors = base_colors(&grid, source);
  let shaded = options.light.shade_rgb(&colors, &normalized, rows, cols);
  let bars = layout_bars(&grid, &shaded, &options.style)?;

  let water = options.water.then(|| grid.water_levels());
  let svg = match &water {
    Some(water) => {
      let mut scene = bars.clone();
      scene.extend(water_bars(&grid, water, &options.style));
      render_svg(&scene, &options.render)?
    }
    None => render_svg(&bars, &options.render)?,
  };

  info!("rendered {} bars", bars.len());
  Ok(Chart {
    grid,
    normalized,
    bars,
    water,
    svg,
  })
}
