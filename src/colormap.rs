use log::debug;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::grid::HeightGrid;

/// Color with channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
  pub r: f64,
  pub g: f64,
  pub b: f64,
  pub a: f64,
}

/// Opaque color with channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
  pub r: f64,
  pub g: f64,
  pub b: f64,
}

impl Rgba {
  pub fn rgb(self) -> Rgb {
    Rgb {
      r: self.r,
      g: self.g,
      b: self.b,
    }
  }
}

fn channel_to_u8(c: f64) -> u8 {
  (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl Rgb {
  pub fn to_u8(self) -> (u8, u8, u8) {
    (
      channel_to_u8(self.r),
      channel_to_u8(self.g),
      channel_to_u8(self.b),
    )
  }

  /// `#rrggbb` form used for SVG fills.
  pub fn to_hex(self) -> String {
    let (r, g, b) = self.to_u8();
    format!("#{r:02x}{g:02x}{b:02x}")
  }

  pub fn scale(self, k: f64) -> Rgb {
    Rgb {
      r: (self.r * k).clamp(0.0, 1.0),
      g: (self.g * k).clamp(0.0, 1.0),
      b: (self.b * k).clamp(0.0, 1.0),
    }
  }
}

const VIRIDIS: [(u8, u8, u8); 9] = [
  (68, 1, 84),
  (71, 44, 122),
  (59, 81, 139),
  (44, 113, 142),
  (33, 144, 141),
  (39, 173, 129),
  (92, 200, 99),
  (170, 220, 50),
  (253, 231, 37),
];

/// Viridis ramp, `t` clamped to [0, 1].
pub fn viridis(t: f64) -> Rgba {
  let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
  let segs = (VIRIDIS.len() - 1) as f64;
  let x = t * segs;
  let i = x.floor() as usize;

  let to_f = |c: u8| c as f64 / 255.0;
  if i >= VIRIDIS.len() - 1 {
    let (r, g, b) = VIRIDIS[VIRIDIS.len() - 1];
    return Rgba {
      r: to_f(r),
      g: to_f(g),
      b: to_f(b),
      a: 1.0,
    };
  }

  let f = x - i as f64;
  let (r0, g0, b0) = VIRIDIS[i];
  let (r1, g1, b1) = VIRIDIS[i + 1];
  let lerp = |a: u8, b: u8| to_f(a) + f * (to_f(b) - to_f(a));
  Rgba {
    r: lerp(r0, r1),
    g: lerp(g0, g1),
    b: lerp(b0, b1),
    a: 1.0,
  }
}

/// Supplies one base color per grid cell.
pub trait ColorSource {
  fn next_color(&mut self) -> Rgba;
}

/// Viridis sampled at uniform random positions.
pub struct RandomColors {
  rng: Box<dyn RngCore>,
}

impl RandomColors {
  /// Seeded sources are reproducible; `None` draws from `thread_rng()`.
  pub fn new(seed: Option<u64>) -> Self {
    let rng: Box<dyn RngCore> = match seed {
      Some(seed) => Box::new(ChaCha8Rng::seed_from_u64(seed)),
      None => Box::new(rand::thread_rng()),
    };
    RandomColors { rng }
  }

  pub fn from_rng(rng: Box<dyn RngCore>) -> Self {
    RandomColors { rng }
  }
}

impl ColorSource for RandomColors {
  fn next_color(&mut self) -> Rgba {
    viridis(self.rng.gen_range(0.0..1.0))
  }
}

/// One independent draw per cell, row-major.
pub fn base_colors(
  grid: &HeightGrid,
  source: &mut dyn ColorSource,
) -> Vec<Rgba> {
  debug!("drawing {} base colors", grid.len());
  (0..grid.len()).map(|_| source.next_color()).collect()
}
