//! Directional lighting: hillshading of the height surface blended into the
//! base colors in HSV space, plus the flat per-face shading applied to the
//! bar prisms.

use log::debug;

use crate::colormap::{Rgb, Rgba};

/// Light used for per-face shading of the bar prisms.
pub const FACE_LIGHT: LightSource = LightSource {
  azimuth_deg: 225.0,
  altitude_deg: 19.4712,
};

/// A light at infinity, described in compass terms: azimuth is measured
/// clockwise from north, altitude upward from the horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
  pub azimuth_deg: f64,
  pub altitude_deg: f64,
}

impl Default for LightSource {
  fn default() -> Self {
    LightSource {
      azimuth_deg: 180.0,
      altitude_deg: 45.0,
    }
  }
}

impl LightSource {
  pub fn new(azimuth_deg: f64, altitude_deg: f64) -> Self {
    LightSource {
      azimuth_deg,
      altitude_deg,
    }
  }

  /// Unit vector pointing toward the light.
  pub fn direction(&self) -> [f64; 3] {
    let az = (90.0 - self.azimuth_deg).to_radians();
    let alt = self.altitude_deg.to_radians();
    [az.cos() * alt.cos(), az.sin() * alt.cos(), alt.sin()]
  }

  /// Per-cell illumination of a row-major elevation surface, in [0, 1].
  pub fn hillshade(
    &self,
    elevation: &[f64],
    rows: usize,
    cols: usize,
  ) -> Vec<f64> {
    // Rows run top to bottom, so their spacing is negative.
    let d_row = gradient_rows(elevation, rows, cols, -1.0);
    let d_col = gradient_cols(elevation, rows, cols, 1.0);
    let light = self.direction();

    let mut intensity: Vec<f64> = d_row
      .iter()
      .zip(&d_col)
      .map(|(&dy, &dx)| {
        let n = [-dx, -dy, 1.0];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        (n[0] * light[0] + n[1] * light[1] + n[2] * light[2]) / len
      })
      .collect();

    let lo = intensity.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = intensity.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi - lo > 1e-6 {
      for v in &mut intensity {
        *v = (*v - lo) / (hi - lo);
      }
    }
    for v in &mut intensity {
      *v = v.clamp(0.0, 1.0);
    }
    intensity
  }

  /// Shade each color by the hillshade of `elevation`.
  pub fn shade_rgb(
    &self,
    colors: &[Rgba],
    elevation: &[f64],
    rows: usize,
    cols: usize,
  ) -> Vec<Rgb> {
    let intensity = self.hillshade(elevation, rows, cols);
    debug!(
      "shading {} colors, light az={} alt={}",
      colors.len(),
      self.azimuth_deg,
      self.altitude_deg
    );
    colors
      .iter()
      .zip(intensity)
      .map(|(&c, i)| blend_hsv(c.rgb(), i))
      .collect()
  }
}

/// Intensity above one half brightens and desaturates, below one half
/// darkens and saturates.
pub fn blend_hsv(color: Rgb, intensity: f64) -> Rgb {
  let i = 2.0 * intensity - 1.0;
  let (h, mut s, mut v) = rgb_to_hsv(color);

  if s.abs() > 1e-10 {
    if i > 0.0 {
      s *= 1.0 - i;
    } else if i < 0.0 {
      s = (1.0 + i) * s - i;
    }
  }
  if i > 0.0 {
    v = (1.0 - i) * v + i;
  } else if i < 0.0 {
    v *= 1.0 + i;
  }

  hsv_to_rgb(h, s.clamp(0.0, 1.0), v.clamp(0.0, 1.0))
}

/// Scale a face color by how squarely it faces [`FACE_LIGHT`], keeping
/// at least 30% of the original brightness.
pub fn face_shade(color: Rgb, normal: [f64; 3]) -> Rgb {
  let len =
    (normal[0] * normal[0] + normal[1] * normal[1] + normal[2] * normal[2])
      .sqrt();
  if len < 1e-15 {
    return color;
  }
  let d = FACE_LIGHT.direction();
  let dot = (normal[0] * d[0] + normal[1] * d[1] + normal[2] * d[2]) / len;
  let k = 0.3 + 0.7 * (dot + 1.0) / 2.0;
  color.scale(k)
}

/// Hue, saturation and value, each in [0, 1].
pub fn rgb_to_hsv(c: Rgb) -> (f64, f64, f64) {
  let max = c.r.max(c.g).max(c.b);
  let min = c.r.min(c.g).min(c.b);
  let delta = max - min;

  let s = if max > 0.0 { delta / max } else { 0.0 };
  let h = if delta <= 0.0 {
    0.0
  } else if c.r == max {
    (c.g - c.b) / delta
  } else if c.g == max {
    2.0 + (c.b - c.r) / delta
  } else {
    4.0 + (c.r - c.g) / delta
  };

  ((h / 6.0).rem_euclid(1.0), s, max)
}

pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
  let h6 = h.rem_euclid(1.0) * 6.0;
  let sector = h6.floor();
  let f = h6 - sector;
  let p = v * (1.0 - s);
  let q = v * (1.0 - s * f);
  let t = v * (1.0 - s * (1.0 - f));

  let (r, g, b) = match sector as u32 % 6 {
    0 => (v, t, p),
    1 => (q, v, p),
    2 => (p, v, t),
    3 => (p, q, v),
    4 => (t, p, v),
    _ => (v, p, q),
  };
  Rgb { r, g, b }
}

/// Derivative along the row axis: central differences inside, one-sided
/// at the first and last row, zero for a single row.
fn gradient_rows(
  z: &[f64],
  rows: usize,
  cols: usize,
  spacing: f64,
) -> Vec<f64> {
  let mut out = vec![0.0; rows * cols];
  if rows < 2 {
    return out;
  }
  for i in 0..rows {
    for j in 0..cols {
      let at = |r: usize| z[r * cols + j];
      out[i * cols + j] = if i == 0 {
        (at(1) - at(0)) / spacing
      } else if i == rows - 1 {
        (at(i) - at(i - 1)) / spacing
      } else {
        (at(i + 1) - at(i - 1)) / (2.0 * spacing)
      };
    }
  }
  out
}

fn gradient_cols(
  z: &[f64],
  rows: usize,
  cols: usize,
  spacing: f64,
) -> Vec<f64> {
  let mut out = vec![0.0; rows * cols];
  if cols < 2 {
    return out;
  }
  for i in 0..rows {
    let row = &z[i * cols..(i + 1) * cols];
    for j in 0..cols {
      out[i * cols + j] = if j == 0 {
        (row[1] - row[0]) / spacing
      } else if j == cols - 1 {
        (row[j] - row[j - 1]) / spacing
      } else {
        (row[j + 1] - row[j - 1]) / (2.0 * spacing)
      };
    }
  }
  out
}
