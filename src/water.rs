//! Water pooling on a height grid.
//!
//! Water poured over the whole grid runs off every edge cell and collects
//! in basins whose rim is higher than their floor. The settled surface is
//! found by flooding inward from the border in order of increasing level,
//! so each cell ends up at the lowest spill height that leads off the grid.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use log::debug;

use crate::grid::HeightGrid;
use crate::render::format_tick;

/// Depth of standing water on every cell of a grid, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterMap {
  rows: usize,
  cols: usize,
  depths: Vec<f64>,
}

/// Heap entry ordered so that `BinaryHeap` pops the lowest level first.
struct Spill {
  level: f64,
  index: usize,
}

impl PartialEq for Spill {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for Spill {}

impl PartialOrd for Spill {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Spill {
  fn cmp(&self, other: &Self) -> Ordering {
    other
      .level
      .total_cmp(&self.level)
      .then_with(|| other.index.cmp(&self.index))
  }
}

/// Settle water over `grid` and return the depth left on each cell.
pub fn flood(grid: &HeightGrid) -> WaterMap {
  let (rows, cols) = (grid.rows(), grid.cols());
  let heights = grid.values();
  let mut level = heights.to_vec();
  let mut settled = vec![false; heights.len()];
  let mut heap = BinaryHeap::new();

  for (row, col, height) in grid.cells() {
    if row == 0 || col == 0 || row == rows - 1 || col == cols - 1 {
      let index = row * cols + col;
      settled[index] = true;
      heap.push(Spill {
        level: height,
        index,
      });
    }
  }

  while let Some(Spill { level: rim, index }) = heap.pop() {
    let (row, col) = (index / cols, index % cols);
    let neighbours = [
      (row > 0).then(|| index - cols),
      (row + 1 < rows).then(|| index + cols),
      (col > 0).then(|| index - 1),
      (col + 1 < cols).then(|| index + 1),
    ];
    for next in neighbours.into_iter().flatten() {
      if settled[next] {
        continue;
      }
      settled[next] = true;
      level[next] = heights[next].max(rim);
      heap.push(Spill {
        level: level[next],
        index: next,
      });
    }
  }

  let depths: Vec<f64> = level
    .iter()
    .zip(heights)
    .map(|(&surface, &height)| surface - height)
    .collect();
  let map = WaterMap {
    rows,
    cols,
    depths,
  };
  debug!(
    "flooded {rows}x{cols} grid: {} wet cells, volume {}",
    map.wet_cells().count(),
    map.volume(1.0)
  );
  map
}

impl HeightGrid {
  /// Water depth per cell after pouring water over the whole grid.
  pub fn water_levels(&self) -> WaterMap {
    flood(self)
  }
}

impl WaterMap {
  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn cols(&self) -> usize {
    self.cols
  }

  pub fn depth(&self, row: usize, col: usize) -> Option<f64> {
    if row < self.rows && col < self.cols {
      Some(self.depths[row * self.cols + col])
    } else {
      None
    }
  }

  /// Row-major view of the depths.
  pub fn depths(&self) -> &[f64] {
    &self.depths
  }

  /// Yields `(row, col, depth)` for every cell holding water.
  pub fn wet_cells(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
    let cols = self.cols;
    self
      .depths
      .iter()
      .enumerate()
      .filter(|(_, d)| **d > 0.0)
      .map(move |(k, &d)| (k / cols, k % cols, d))
  }

  pub fn is_dry(&self) -> bool {
    self.wet_cells().next().is_none()
  }

  /// Total water held, with each cell a square of side `square_width`.
  pub fn volume(&self, square_width: f64) -> f64 {
    self.depths.iter().sum::<f64>() * square_width * square_width
  }
}

/// A grid printed with its water: numbered columns, lettered rows, and
/// the water surface in brackets on flooded cells.
pub struct WaterTable<'a> {
  pub grid: &'a HeightGrid,
  pub water: &'a WaterMap,
}

impl fmt::Display for WaterTable<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let cells: Vec<String> = self
      .grid
      .cells()
      .map(|(row, col, height)| {
        match self.water.depth(row, col).filter(|&d| d > 0.0) {
          Some(depth) => format!("[{}]", format_tick(height + depth)),
          None => format!(" {} ", format_tick(height)),
        }
      })
      .collect();
    let width = cells.iter().map(String::len).max().unwrap_or(3);
    let cols = self.grid.cols();

    write!(f, "    ")?;
    for col in 0..cols {
      write!(f, "{:^width$}", col + 1)?;
    }
    writeln!(f)?;
    let rule = "-".repeat(5 + width * cols);
    writeln!(f, "{rule}")?;
    for (row, line) in cells.chunks(cols).enumerate() {
      write!(f, " {} |", row_label(row))?;
      for cell in line {
        write!(f, "{cell:^width$}")?;
      }
      writeln!(f, "|")?;
    }
    writeln!(f, "{rule}")
  }
}

/// `A` through `Z`, then wrapping around.
fn row_label(row: usize) -> char {
  char::from(b'A' + (row % 26) as u8)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn grid(rows: Vec<Vec<f64>>) -> HeightGrid {
    HeightGrid::from_rows(rows).unwrap()
  }

  #[test]
  fn single_pit_fills_to_lowest_rim() {
    let g = grid(vec![
      vec![3.0, 3.0, 3.0],
      vec![3.0, 0.0, 2.0],
      vec![3.0, 3.0, 3.0],
    ]);
    let water = flood(&g);
    assert_eq!(water.depth(1, 1), Some(2.0));
    assert_eq!(water.volume(1.0), 2.0);
    assert_eq!(water.wet_cells().collect::<Vec<_>>(), vec![(1, 1, 2.0)]);
  }

  #[test]
  fn edges_never_hold_water() {
    let g = grid(vec![vec![0.0, 5.0, 0.0], vec![5.0, 0.0, 5.0]]);
    assert!(flood(&g).is_dry());
  }

  #[test]
  fn volume_scales_with_square_area() {
    let g = grid(vec![
      vec![4.0, 4.0, 4.0],
      vec![4.0, 1.0, 4.0],
      vec![4.0, 4.0, 4.0],
    ]);
    let water = g.water_levels();
    assert_eq!(water.volume(1.0), 3.0);
    assert_eq!(water.volume(2.0), 12.0);
  }

  #[test]
  fn spill_heap_pops_lowest_first() {
    let mut heap = BinaryHeap::new();
    for (level, index) in [(3.0, 0), (1.0, 1), (2.0, 2)] {
      heap.push(Spill { level, index });
    }
    let order: Vec<f64> =
      std::iter::from_fn(|| heap.pop().map(|s| s.level)).collect();
    assert_eq!(order, vec![1.0, 2.0, 3.0]);
  }

  #[test]
  fn table_brackets_flooded_cells() {
    let g = grid(vec![
      vec![3.0, 3.0, 3.0],
      vec![3.0, 0.0, 2.0],
      vec![3.0, 3.0, 3.0],
    ]);
    let water = flood(&g);
    let text = WaterTable {
      grid: &g,
      water: &water,
    }
    .to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].contains('1') && lines[0].contains('3'));
    assert!(lines[2].starts_with(" A |"));
    assert!(lines[3].contains("[2]"));
    assert!(lines[4].starts_with(" C |"));
    assert!(!lines[2].contains('['));
  }

  #[test]
  fn row_labels_wrap_after_z() {
    assert_eq!(row_label(0), 'A');
    assert_eq!(row_label(25), 'Z');
    assert_eq!(row_label(26), 'A');
  }
}
