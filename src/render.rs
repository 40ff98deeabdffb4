use log::debug;

use crate::bars::{Bar, Point3D};
use crate::light::face_shade;
use crate::ChartError;

pub const DEFAULT_SIZE: u32 = 480;
/// Half-height of the normalized box; x and y span [-1, 1].
const Z_SCALE: f64 = 0.75;
const AXIS_LABELS: [&str; 3] = ["X", "Y", "Height"];

pub struct RenderOptions {
  pub image_size: u32,
  pub title: Option<String>,
}

impl Default for RenderOptions {
  fn default() -> Self {
    RenderOptions {
      image_size: DEFAULT_SIZE,
      title: None,
    }
  }
}

struct Camera {
  azimuth: f64,
  elevation: f64,
}

impl Default for Camera {
  fn default() -> Self {
    Camera {
      azimuth: (-60.0_f64).to_radians(),
      elevation: 30.0_f64.to_radians(),
    }
  }
}

impl Camera {
  /// Unit vector from the scene toward the viewer.
  fn view_dir(&self) -> [f64; 3] {
    let (sa, ca) = self.azimuth.sin_cos();
    let (se, ce) = self.elevation.sin_cos();
    [ce * ca, ce * sa, se]
  }
}

/// Orthographic projection onto the camera's screen plane.
fn project(p: Point3D, cam: &Camera) -> (f64, f64) {
  let (sa, ca) = cam.azimuth.sin_cos();
  let (se, ce) = cam.elevation.sin_cos();

  let screen_x = -p.x * sa + p.y * ca;
  let screen_y = -p.x * ca * se - p.y * sa * se + p.z * ce;

  (screen_x, screen_y)
}

/// Distance along the view direction. Positive = further from viewer.
fn depth(p: Point3D, cam: &Camera) -> f64 {
  let v = cam.view_dir();
  -(p.x * v[0] + p.y * v[1] + p.z * v[2])
}

/// Data-space extent of the chart, mapped into the normalized box.
struct Bounds {
  x: (f64, f64),
  y: (f64, f64),
  z: (f64, f64),
}

impl Bounds {
  fn of(bars: &[Bar]) -> Self {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    let mut z_hi = 0.0_f64;
    for bar in bars {
      x = (x.0.min(bar.x), x.1.max(bar.x + bar.width));
      y = (y.0.min(bar.y), y.1.max(bar.y + bar.depth));
      z_hi = z_hi.max(bar.z + bar.height);
    }
    if bars.is_empty() {
      x = (0.0, 1.0);
      y = (0.0, 1.0);
    }
    // A chart of zero-height bars still gets a unit z axis.
    let z = if z_hi < 1e-15 { (0.0, 1.0) } else { (0.0, z_hi) };
    Bounds { x, y, z }
  }

  fn normalize(&self, p: Point3D) -> Point3D {
    let unit = |v: f64, (lo, hi): (f64, f64)| {
      if (hi - lo).abs() < 1e-15 {
        0.5
      } else {
        (v - lo) / (hi - lo)
      }
    };
    Point3D {
      x: unit(p.x, self.x) * 2.0 - 1.0,
      y: unit(p.y, self.y) * 2.0 - 1.0,
      z: unit(p.z, self.z) * 2.0 * Z_SCALE - Z_SCALE,
    }
  }
}

struct Polygon {
  projected: [(f64, f64); 4],
  color: (u8, u8, u8),
  opacity: f64,
}

/// Visible faces of every bar, ordered back to front.
///
/// Bars are sorted by the depth of their footprint center on the floor;
/// the visible faces of a single box never overlap, so their order within
/// a bar does not matter. The sort is stable, so prisms stacked on the
/// same footprint are drawn in input order.
fn build_polygons(
  bars: &[Bar],
  bounds: &Bounds,
  cam: &Camera,
) -> Vec<Polygon> {
  let view = cam.view_dir();

  let mut order: Vec<(f64, &Bar)> = bars
    .iter()
    .map(|bar| {
      let center = bounds.normalize(Point3D {
        x: bar.x + bar.width / 2.0,
        y: bar.y + bar.depth / 2.0,
        z: 0.0,
      });
      (depth(center, cam), bar)
    })
    .collect();
  order.sort_by(|a, b| {
    b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal)
  });

  let mut polygons = Vec::with_capacity(bars.len() * 3);
  for (_, bar) in order {
    for face in bar.faces() {
      let facing = face.normal[0] * view[0]
        + face.normal[1] * view[1]
        + face.normal[2] * view[2];
      if facing <= 0.0 {
        continue;
      }
      // Side walls of a flat bar have no area.
      if bar.height <= 0.0 && face.normal[2] == 0.0 {
        continue;
      }
      let projected = face
        .corners
        .map(|corner| project(bounds.normalize(corner), cam));
      polygons.push(Polygon {
        projected,
        color: face_shade(bar.color, face.normal).to_u8(),
        opacity: bar.opacity,
      });
    }
  }
  polygons
}

/// The 8 corners of the normalized [-1,1]² × [-Z_SCALE, Z_SCALE] box
fn bounding_box_corners() -> [Point3D; 8] {
  let mut corners = [Point3D {
    x: 0.0,
    y: 0.0,
    z: 0.0,
  }; 8];
  for (k, corner) in corners.iter_mut().enumerate() {
    *corner = Point3D {
      x: if k & 1 == 0 { -1.0 } else { 1.0 },
      y: if k & 2 == 0 { -1.0 } else { 1.0 },
      z: if k & 4 == 0 { -Z_SCALE } else { Z_SCALE },
    };
  }
  corners
}

pub(crate) fn nice_step(range: f64, target_labels: usize) -> f64 {
  let raw = range / target_labels as f64;
  if raw <= 0.0 || !raw.is_finite() {
    return 0.0;
  }
  let mag = 10_f64.powf(raw.log10().floor());
  let norm = raw / mag;
  let nice = if norm <= 1.0 {
    1.0
  } else if norm <= 2.0 {
    2.0
  } else if norm <= 5.0 {
    5.0
  } else {
    10.0
  };
  nice * mag
}

/// Format a tick value, dropping the trailing ".0" for integers.
pub(crate) fn format_tick(v: f64) -> String {
  if (v - v.round()).abs() < 1e-9 {
    format!("{}", v.round() as i64)
  } else {
    format!("{v:.1}")
  }
}

fn xml_escape(s: &str) -> String {
  s.replace('&', "&amp;")
    .replace('<', "&lt;")
    .replace('>', "&gt;")
    .replace('"', "&quot;")
}

/// Render the bars as a standalone SVG document with labelled axes.
pub fn render_svg(
  bars: &[Bar],
  options: &RenderOptions,
) -> Result<String, ChartError> {
  let camera = Camera::default();
  let bounds = Bounds::of(bars);
  let polygons = build_polygons(bars, &bounds, &camera);

  // Fit the whole normalized box, not just the bars, so axes stay visible.
  let mut px_min = f64::INFINITY;
  let mut px_max = f64::NEG_INFINITY;
  let mut py_min = f64::INFINITY;
  let mut py_max = f64::NEG_INFINITY;
  for corner in bounding_box_corners() {
    let (px, py) = project(corner, &camera);
    px_min = px_min.min(px);
    px_max = px_max.max(px);
    py_min = py_min.min(py);
    py_max = py_max.max(py);
  }

  let p_width = px_max - px_min;
  let p_height = py_max - py_min;
  if !(p_width > 1e-15 && p_height > 1e-15) {
    return Err(ChartError::DegenerateProjection);
  }

  let size = options.image_size as f64;
  let margin = 60.0;
  let top = if options.title.is_some() { 30.0 } else { 0.0 };
  let draw_w = size - 2.0 * margin;
  let draw_h = size - 2.0 * margin - top;
  let scale = (draw_w / p_width).min(draw_h / p_height);
  let cx = margin + draw_w / 2.0;
  let cy = margin + top + draw_h / 2.0;
  let p_cx = (px_min + px_max) / 2.0;
  let p_cy = (py_min + py_max) / 2.0;

  let to_svg = |px: f64, py: f64| -> (f64, f64) {
    let sx = cx + (px - p_cx) * scale;
    let sy = cy - (py - p_cy) * scale; // flip Y for SVG
    (sx, sy)
  };

  let mut svg = String::with_capacity(polygons.len() * 140 + 3000);
  svg.push_str(&format!(
    "<svg width=\"{0}\" height=\"{0}\" viewBox=\"0 0 {0} {0}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
    options.image_size
  ));
  svg.push_str(&format!(
    "<rect width=\"{0}\" height=\"{0}\" fill=\"white\"/>\n",
    options.image_size
  ));

  if let Some(title) = &options.title {
    svg.push_str(&format!(
      "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"14\" fill=\"#222222\" text-anchor=\"middle\">{}</text>\n",
      size / 2.0,
      margin / 2.0 + top / 2.0,
      xml_escape(title)
    ));
  }

  draw_axes(&mut svg, &camera, &to_svg, &bounds);

  for poly in &polygons {
    let points: Vec<String> = poly
      .projected
      .iter()
      .map(|&(px, py)| {
        let (x, y) = to_svg(px, py);
        format!("{x:.1},{y:.1}")
      })
      .collect();
    let (r, g, b) = poly.color;
    let opacity = if poly.opacity < 1.0 {
      format!(" fill-opacity=\"{:.2}\"", poly.opacity)
    } else {
      String::new()
    };
    svg.push_str(&format!(
      "<polygon points=\"{}\" fill=\"rgb({},{},{})\"{} stroke=\"#00000030\" stroke-width=\"0.5\"/>\n",
      points.join(" "),
      r,
      g,
      b,
      opacity
    ));
  }

  svg.push_str("</svg>");
  debug!("rendered {} faces for {} bars", polygons.len(), bars.len());
  Ok(svg)
}

/// Draw the three axis lines with ticks and labels. The x and y axes run
/// along the two floor edges facing the viewer and the z axis rises from
/// the floor corner between them on the left.
fn draw_axes(
  svg: &mut String,
  camera: &Camera,
  to_svg: &dyn Fn(f64, f64) -> (f64, f64),
  bounds: &Bounds,
) {
  let axis_color = "#666666";
  let font_size = 10;

  // Bottom corner furthest from the viewer anchors the floor edges.
  let corners = bounding_box_corners();
  let origin = corners
    .iter()
    .copied()
    .filter(|c| c.z < 0.0)
    .fold(None::<Point3D>, |best, c| match best {
      Some(b) if depth(b, camera) >= depth(c, camera) => Some(b),
      _ => Some(c),
    })
    .unwrap_or(corners[0]);

  let x_start = Point3D {
    x: -1.0,
    y: -origin.y,
    z: -Z_SCALE,
  };
  let y_start = Point3D {
    x: -origin.x,
    y: -1.0,
    z: -Z_SCALE,
  };
  let z_start = Point3D {
    x: origin.x,
    y: -origin.y,
    z: -Z_SCALE,
  };

  let axes: [(Point3D, [f64; 3], (f64, f64), &str); 3] = [
    (x_start, [1.0, 0.0, 0.0], bounds.x, AXIS_LABELS[0]),
    (y_start, [0.0, 1.0, 0.0], bounds.y, AXIS_LABELS[1]),
    (z_start, [0.0, 0.0, 1.0], bounds.z, AXIS_LABELS[2]),
  ];

  for (start, dir, (val_min, val_max), label) in axes {
    let span = if dir[2] > 0.0 { 2.0 * Z_SCALE } else { 2.0 };
    let at = |t: f64| Point3D {
      x: start.x + dir[0] * span * t,
      y: start.y + dir[1] * span * t,
      z: start.z + dir[2] * span * t,
    };
    let screen = |p: Point3D| {
      let (px, py) = project(p, camera);
      to_svg(px, py)
    };

    let (sx0, sy0) = screen(at(0.0));
    let (sx1, sy1) = screen(at(1.0));
    svg.push_str(&format!(
      "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"1\"/>\n",
      sx0, sy0, sx1, sy1, axis_color
    ));

    // Tick marks point away from the center of the box on screen.
    let (ccx, ccy) = screen(Point3D {
      x: 0.0,
      y: 0.0,
      z: 0.0,
    });
    let dx = sx1 - sx0;
    let dy = sy1 - sy0;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= 1.0 {
      continue;
    }
    let (mut perpx, mut perpy) = (-dy / len * 4.0, dx / len * 4.0);
    let (mx, my) = ((sx0 + sx1) / 2.0, (sy0 + sy1) / 2.0);
    if (mx - ccx) * perpx + (my - ccy) * perpy < 0.0 {
      perpx = -perpx;
      perpy = -perpy;
    }

    let step = nice_step(val_max - val_min, 4);
    if step > 0.0 {
      let mut tick_val = (val_min / step).ceil() * step;
      while tick_val <= val_max + step * 0.01 {
        let t = ((tick_val - val_min) / (val_max - val_min)).clamp(0.0, 1.0);
        let (tx, ty) = screen(at(t));
        svg.push_str(&format!(
          "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"{}\" stroke-width=\"0.5\"/>\n",
          tx, ty, tx + perpx, ty + perpy, axis_color
        ));
        svg.push_str(&format!(
          "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>\n",
          tx + perpx * 3.0, ty + perpy * 3.0, font_size, axis_color, format_tick(tick_val)
        ));
        tick_val += step;
      }
    }

    svg.push_str(&format!(
      "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" fill=\"#333333\" text-anchor=\"middle\" dominant-baseline=\"middle\">{}</text>\n",
      mx + perpx * 8.0,
      my + perpy * 8.0,
      label
    ));
  }
}
