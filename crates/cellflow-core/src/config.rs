//! Grid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{CellflowError, Result};
use cellflow_engine::engine::CellRef;

/// Default grid height.
pub const DEFAULT_ROWS: usize = 6;
/// Default grid width (columns A..F).
pub const DEFAULT_COLS: usize = 6;

/// Largest accepted grid height.
pub const MAX_ROWS: usize = 1_000_000;
/// Largest accepted grid width (columns A..ZZZ).
pub const MAX_COLS: usize = 18_278;

/// Extent of the grid. Cells outside it cannot be written or referenced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

impl GridConfig {
    pub fn new(rows: usize, cols: usize) -> Self {
        GridConfig { rows, cols }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(CellflowError::Config(format!(
                "grid must have at least one row and column (got {}x{})",
                self.rows, self.cols
            )));
        }
        if self.rows > MAX_ROWS || self.cols > MAX_COLS {
            return Err(CellflowError::Config(format!(
                "grid {}x{} exceeds the maximum of {}x{}",
                self.rows, self.cols, MAX_ROWS, MAX_COLS
            )));
        }
        Ok(())
    }

    /// Whether `cell` lies inside the grid.
    pub fn contains(&self, cell: &CellRef) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Parse an identifier and check it against the grid bounds.
    pub fn parse_cell(&self, name: &str) -> Result<CellRef> {
        match CellRef::from_str(name.trim()) {
            Some(cell) if self.contains(&cell) => Ok(cell),
            _ => Err(CellflowError::UnknownReference(name.trim().to_string())),
        }
    }

    /// Every cell of the grid in row-major order.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellRef> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| CellRef::new(col, row)))
    }
}
