use log::debug;

use crate::colormap::Rgb;
use crate::grid::HeightGrid;
use crate::water::WaterMap;
use crate::ChartError;

/// Fill of the water prisms drawn over flooded cells.
pub const WATER_COLOR: Rgb = Rgb {
  r: 0.12,
  g: 0.47,
  b: 0.71,
};
pub const WATER_OPACITY: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point3D {
  pub x: f64,
  pub y: f64,
  pub z: f64,
}

/// Footprint and spacing shared by every bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarStyle {
  pub width: f64,
  pub depth: f64,
  /// Offset added (halved) to both footprint coordinates.
  pub gap: f64,
}

impl Default for BarStyle {
  fn default() -> Self {
    BarStyle {
      width: 0.9,
      depth: 0.9,
      gap: 9.0,
    }
  }
}

/// One rectangular prism. Height bars stand on the z = 0 plane; water
/// prisms sit on top of the bar they flood.
#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
  pub row: usize,
  pub col: usize,
  pub x: f64,
  pub y: f64,
  pub z: f64,
  pub width: f64,
  pub depth: f64,
  pub height: f64,
  pub color: Rgb,
  /// 1 for solid bars.
  pub opacity: f64,
}

/// A quad of a bar with its outward normal.
pub struct Face {
  pub corners: [Point3D; 4],
  pub normal: [f64; 3],
}

impl Bar {
  /// Bottom four corners counter-clockwise, then the top four.
  pub fn corners(&self) -> [Point3D; 8] {
    let (x0, x1) = (self.x, self.x + self.width);
    let (y0, y1) = (self.y, self.y + self.depth);
    let (z0, z1) = (self.z, self.z + self.height);
    let p = |x, y, z| Point3D { x, y, z };
    [
      p(x0, y0, z0),
      p(x1, y0, z0),
      p(x1, y1, z0),
      p(x0, y1, z0),
      p(x0, y0, z1),
      p(x1, y0, z1),
      p(x1, y1, z1),
      p(x0, y1, z1),
    ]
  }

  pub fn faces(&self) -> [Face; 6] {
    let c = self.corners();
    let face = |i: [usize; 4], normal| Face {
      corners: [c[i[0]], c[i[1]], c[i[2]], c[i[3]]],
      normal,
    };
    [
      face([0, 3, 2, 1], [0.0, 0.0, -1.0]),
      face([4, 5, 6, 7], [0.0, 0.0, 1.0]),
      face([0, 1, 5, 4], [0.0, -1.0, 0.0]),
      face([2, 3, 7, 6], [0.0, 1.0, 0.0]),
      face([1, 2, 6, 5], [1.0, 0.0, 0.0]),
      face([3, 0, 4, 7], [-1.0, 0.0, 0.0]),
    ]
  }
}

/// One bar per cell, row-major. The x coordinate follows the column and
/// y the row; height is the raw cell value.
pub fn layout_bars(
  grid: &HeightGrid,
  colors: &[Rgb],
  style: &BarStyle,
) -> Result<Vec<Bar>, ChartError> {
  if colors.len() != grid.len() {
    return Err(ChartError::ColorCountMismatch {
      expected: grid.len(),
      found: colors.len(),
    });
  }

  let offset = style.gap / 2.0;
  let bars: Vec<Bar> = grid
    .cells()
    .zip(colors)
    .map(|((row, col, height), &color)| Bar {
      row,
      col,
      x: col as f64 + offset,
      y: row as f64 + offset,
      z: 0.0,
      width: style.width,
      depth: style.depth,
      height,
      color,
      opacity: 1.0,
    })
    .collect();

  debug!("laid out {} bars with gap {}", bars.len(), style.gap);
  Ok(bars)
}

/// One translucent prism per flooded cell, resting on that cell's bar and
/// as tall as the water standing on it.
pub fn water_bars(
  grid: &HeightGrid,
  water: &WaterMap,
  style: &BarStyle,
) -> Vec<Bar> {
  let offset = style.gap / 2.0;
  water
    .wet_cells()
    .filter_map(|(row, col, depth)| {
      let floor = grid.get(row, col)?;
      Some(Bar {
        row,
        col,
        x: col as f64 + offset,
        y: row as f64 + offset,
        z: floor,
        width: style.width,
        depth: style.depth,
        height: depth,
        color: WATER_COLOR,
        opacity: WATER_OPACITY,
      })
    })
    .collect()
}
