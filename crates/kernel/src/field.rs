use physarum_common::GridSize;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Dense row-major grid of trail intensities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailField {
    grid: GridSize,
    cells: Vec<f64>,
}

impl TrailField {
    /// An all-zero field.
    pub fn new(grid: GridSize) -> Self {
        Self {
            grid,
            cells: vec![0.0; grid.cell_count()],
        }
    }

    /// Wrap existing row-major cells. Fails when the length does not match
    /// the grid or a cell is not finite.
    pub fn from_cells(grid: GridSize, cells: Vec<f64>) -> Result<Self, SimError> {
        if cells.len() != grid.cell_count() {
            return Err(SimError::config(
                "field",
                format!(
                    "{} cells do not fill a {}x{} grid",
                    cells.len(),
                    grid.width,
                    grid.height
                ),
            ));
        }
        if let Some(i) = cells.iter().position(|c| !c.is_finite() || *c < 0.0) {
            return Err(SimError::config(
                "field",
                format!("cell {i} holds {}, expected a finite value >= 0", cells[i]),
            ));
        }
        Ok(Self { grid, cells })
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width
    }

    pub fn height(&self) -> usize {
        self.grid.height
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [f64] {
        &mut self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.cells[y * self.grid.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        let w = self.grid.width;
        self.cells[y * w + x] = value;
    }

    /// Cell value with toroidal wrap on both axes.
    pub fn wrapped(&self, x: i64, y: i64) -> f64 {
        self.cells[self.grid.wrapped_index(x, y)]
    }

    /// Sum of all cells.
    pub fn mass(&self) -> f64 {
        self.cells.iter().sum()
    }

    pub fn peak(&self) -> f64 {
        self.cells.iter().copied().fold(0.0, f64::max)
    }

    pub fn fill(&mut self, value: f64) {
        self.cells.fill(value);
    }
}

/// Read-only copy of a published field.
///
/// Owned by the caller; later ticks never write into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub tick: u64,
    pub width: usize,
    pub height: usize,
    cells: Vec<f64>,
}

impl FieldSnapshot {
    pub fn capture(tick: u64, field: &TrailField) -> Self {
        Self {
            tick,
            width: field.width(),
            height: field.height(),
            cells: field.cells().to_vec(),
        }
    }

    /// Row-major cells, `width * height` long.
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<f64> {
        self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.cells[y * self.width + x]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// FNV-1a over the tick, dimensions and exact cell bits.
    pub fn content_hash(&self) -> u64 {
        let mut h = Fnv1a::new();
        h.write(&self.tick.to_le_bytes());
        h.write(&(self.width as u64).to_le_bytes());
        h.write(&(self.height as u64).to_le_bytes());
        for c in &self.cells {
            h.write(&c.to_bits().to_le_bytes());
        }
        h.finish()
    }
}

/// FNV-1a, used for cheap state comparison across runs.
pub(crate) struct Fnv1a(u64);

impl Fnv1a {
    pub(crate) fn new() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }

    pub(crate) fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x0100_0000_01b3);
        }
    }

    pub(crate) fn finish(&self) -> u64 {
        self.0
    }
}
