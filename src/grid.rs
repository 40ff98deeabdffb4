use log::{debug, warn};
use rand::{Rng, RngCore};
use serde_json::Value;

use crate::ChartError;

/// Heights rendered when no grid is given on the command line.
const DEFAULT_HEIGHTS: [[f64; 3]; 3] =
  [[7.0, 9.0, 6.0], [4.0, 2.0, 8.0], [4.0, 5.0, 2.0]];

/// Upper bound on the cells of a generated grid.
pub const MAX_RANDOM_CELLS: usize = 1_000_000;

/// A rectangular grid of non-negative bar heights, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
  rows: usize,
  cols: usize,
  values: Vec<f64>,
}

impl Default for HeightGrid {
  fn default() -> Self {
    HeightGrid {
      rows: DEFAULT_HEIGHTS.len(),
      cols: DEFAULT_HEIGHTS[0].len(),
      values: DEFAULT_HEIGHTS.iter().flatten().copied().collect(),
    }
  }
}

impl HeightGrid {
  /// Build a grid from nested rows, rejecting empty, ragged, negative
  /// and non-finite input.
  pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ChartError> {
    let cols = rows.first().map(Vec::len).unwrap_or(0);
    if cols == 0 {
      return Err(ChartError::EmptyGrid);
    }

    let n_rows = rows.len();
    let mut values = Vec::with_capacity(n_rows * cols);
    for (i, row) in rows.into_iter().enumerate() {
      if row.len() != cols {
        return Err(ChartError::RaggedGrid {
          row: i,
          expected: cols,
          found: row.len(),
        });
      }
      for (j, v) in row.into_iter().enumerate() {
        if !v.is_finite() {
          return Err(ChartError::NonFiniteHeight { row: i, col: j });
        }
        if v < 0.0 {
          return Err(ChartError::NegativeHeight {
            row: i,
            col: j,
            value: v,
          });
        }
        values.push(v);
      }
    }

    Ok(HeightGrid {
      rows: n_rows,
      cols,
      values,
    })
  }

  /// Parse a JSON array of arrays of numbers, e.g. `[[1, 2], [3, 4]]`.
  pub fn from_json(text: &str) -> Result<Self, ChartError> {
    let parsed: Value = serde_json::from_str(text)
      .map_err(|e| ChartError::InvalidGridJson(e.to_string()))?;

    let outer = parsed.as_array().ok_or_else(|| {
      ChartError::InvalidGridJson("expected an array of rows".into())
    })?;

    let mut rows = Vec::with_capacity(outer.len());
    for (i, row) in outer.iter().enumerate() {
      let items = row.as_array().ok_or_else(|| {
        ChartError::InvalidGridJson(format!("row {i} is not an array"))
      })?;
      let mut parsed_row = Vec::with_capacity(items.len());
      for (j, item) in items.iter().enumerate() {
        let v = item.as_f64().ok_or_else(|| {
          ChartError::InvalidGridJson(format!(
            "cell ({i}, {j}) is not a number: {item}"
          ))
        })?;
        parsed_row.push(v);
      }
      rows.push(parsed_row);
    }

    Self::from_rows(rows)
  }

  /// Random integer heights drawn uniformly from `min..=max`.
  pub fn random(
    rows: usize,
    cols: usize,
    min: u32,
    max: u32,
    rng: &mut dyn RngCore,
  ) -> Result<Self, ChartError> {
    let n = random_cell_count(rows, cols)?;
    if min > max {
      return Err(ChartError::InvalidRandomRange { min, max });
    }

    let values = (0..n).map(|_| rng.gen_range(min..=max) as f64).collect();
    debug!("generated random {rows}x{cols} grid in {min}..={max}");

    Ok(HeightGrid { rows, cols, values })
  }

  /// Random real-valued heights drawn uniformly from `min..max`.
  pub fn random_continuous(
    rows: usize,
    cols: usize,
    min: f64,
    max: f64,
    rng: &mut dyn RngCore,
  ) -> Result<Self, ChartError> {
    let n = random_cell_count(rows, cols)?;
    if !(min.is_finite() && max.is_finite() && 0.0 <= min && min <= max) {
      return Err(ChartError::InvalidContinuousRange { min, max });
    }

    let values = (0..n)
      .map(|_| {
        if min == max {
          min
        } else {
          rng.gen_range(min..max)
        }
      })
      .collect();
    debug!("generated continuous {rows}x{cols} grid in {min}..{max}");

    Ok(HeightGrid { rows, cols, values })
  }

  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn cols(&self) -> usize {
    self.cols
  }

  /// Number of cells. Never zero: every constructor rejects empty grids.
  #[allow(clippy::len_without_is_empty)]
  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn get(&self, row: usize, col: usize) -> Option<f64> {
    if row < self.rows && col < self.cols {
      Some(self.values[row * self.cols + col])
    } else {
      None
    }
  }

  /// Row-major view of the heights.
  pub fn values(&self) -> &[f64] {
    &self.values
  }

  /// Yields `(row, col, height)` in row-major order.
  pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
    let cols = self.cols;
    self
      .values
      .iter()
      .enumerate()
      .map(move |(k, &v)| (k / cols, k % cols, v))
  }

  pub fn min(&self) -> f64 {
    self.values.iter().copied().fold(f64::INFINITY, f64::min)
  }

  pub fn max(&self) -> f64 {
    self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
  }

  /// Linearly rescale every height into [0, 1] using the grid's own range.
  ///
  /// A flat grid has no range to divide by; every cell then maps to 0.
  pub fn normalized(&self) -> Vec<f64> {
    let lo = self.min();
    let hi = self.max();
    let range = hi - lo;

    if hi <= lo {
      warn!(
        "all {} heights equal {lo}, normalizing to zero",
        self.values.len()
      );
      return vec![0.0; self.values.len()];
    }

    self.values.iter().map(|&v| (v - lo) / range).collect()
  }
}

fn random_cell_count(rows: usize, cols: usize) -> Result<usize, ChartError> {
  if rows == 0 || cols == 0 {
    return Err(ChartError::EmptyGrid);
  }
  match rows.checked_mul(cols) {
    Some(n) if n <= MAX_RANDOM_CELLS => Ok(n),
    _ => Err(ChartError::GridTooLarge {
      rows,
      cols,
      limit: MAX_RANDOM_CELLS,
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_grid_is_three_by_three() {
    let grid = HeightGrid::default();
    assert_eq!((grid.rows(), grid.cols()), (3, 3));
    assert_eq!(grid.get(1, 1), Some(2.0));
    assert_eq!(grid.get(0, 1), Some(9.0));
    assert_eq!(grid.get(3, 0), None);
  }

  #[test]
  fn cells_are_row_major() {
    let grid =
      HeightGrid::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
        .unwrap();
    let cells: Vec<_> = grid.cells().collect();
    assert_eq!(cells[0], (0, 0, 1.0));
    assert_eq!(cells[2], (0, 2, 3.0));
    assert_eq!(cells[3], (1, 0, 4.0));
    assert_eq!(cells.len(), 6);
  }

  #[test]
  fn rejects_empty_first_row() {
    assert!(matches!(
      HeightGrid::from_rows(vec![vec![]]),
      Err(ChartError::EmptyGrid)
    ));
    assert!(matches!(
      HeightGrid::from_rows(vec![]),
      Err(ChartError::EmptyGrid)
    ));
  }

  #[test]
  fn random_cell_count_guards_overflow() {
    assert_eq!(random_cell_count(3, 4).unwrap(), 12);
    assert!(matches!(
      random_cell_count(usize::MAX, 2),
      Err(ChartError::GridTooLarge { .. })
    ));
    assert!(matches!(
      random_cell_count(MAX_RANDOM_CELLS, 2),
      Err(ChartError::GridTooLarge { .. })
    ));
  }

  #[test]
  fn rejects_nan() {
    assert!(matches!(
      HeightGrid::from_rows(vec![vec![1.0, f64::NAN]]),
      Err(ChartError::NonFiniteHeight { row: 0, col: 1 })
    ));
  }
}
