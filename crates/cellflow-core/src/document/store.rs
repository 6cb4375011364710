//! Sparse cell storage.
//!
//! Holds the raw text and the cached display text of every populated cell.
//! Pure data: the store never evaluates anything and never notifies anyone;
//! keeping `display` in step with `raw` is the document's job.

use std::collections::BTreeMap;

use cellflow_engine::engine::{CellRef, formula_body};

/// A populated cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// What the user typed: empty, a literal, or a formula (`=A1+1`).
    pub raw: String,
    /// What the user sees: the literal text or the formula's result.
    pub display: String,
}

impl Cell {
    pub fn is_formula(&self) -> bool {
        formula_body(&self.raw).is_some()
    }

    fn is_blank(&self) -> bool {
        self.raw.is_empty() && self.display.is_empty()
    }
}

/// Row-major sparse map of cells. Absent cells read as empty.
#[derive(Clone, Debug, Default)]
pub struct CellStore {
    cells: BTreeMap<CellRef, Cell>,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw text of a cell, empty if never set.
    pub fn get_raw(&self, cell: &CellRef) -> &str {
        self.cells.get(cell).map(|c| c.raw.as_str()).unwrap_or("")
    }

    pub fn set_raw(&mut self, cell: &CellRef, raw: &str) {
        self.update(cell, |c| c.raw = raw.to_string());
    }

    /// Display text of a cell, empty if never set.
    pub fn get_display(&self, cell: &CellRef) -> &str {
        self.cells
            .get(cell)
            .map(|c| c.display.as_str())
            .unwrap_or("")
    }

    pub fn set_display(&mut self, cell: &CellRef, display: &str) {
        self.update(cell, |c| c.display = display.to_string());
    }

    pub fn get(&self, cell: &CellRef) -> Option<&Cell> {
        self.cells.get(cell)
    }

    /// Populated cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (&CellRef, &Cell)> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn update(&mut self, cell: &CellRef, f: impl FnOnce(&mut Cell)) {
        let entry = self.cells.entry(cell.clone()).or_default();
        f(entry);
        if entry.is_blank() {
            self.cells.remove(cell);
        }
    }
}
