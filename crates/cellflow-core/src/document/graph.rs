//! Reverse-dependency graph for formula cells.
//!
//! ```text
//! A1 → B1  means  "B1's formula mentions A1"  (B1 is a dependent of A1)
//! ```
//!
//! The graph keeps both directions so a cell's old edges can be removed
//! when its formula is re-committed:
//! - `dependents[A]` = cells whose formula mentions A
//! - `precedents[B]` = cells B's formula mentions
//!
//! If A ∈ precedents[B] then B ∈ dependents[A], and vice versa. Empty sets
//! are removed, not stored.

use std::collections::{HashMap, HashSet};

use cellflow_engine::engine::CellRef;

#[derive(Clone, Debug, Default)]
pub struct DepGraph {
    dependents: HashMap<CellRef, HashSet<CellRef>>,
    precedents: HashMap<CellRef, HashSet<CellRef>>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells whose formula mentions `cell`, in row-major order.
    pub fn dependents(&self, cell: &CellRef) -> Vec<CellRef> {
        sorted(self.dependents.get(cell))
    }

    /// Cells mentioned by `cell`'s formula, in row-major order.
    pub fn precedents(&self, cell: &CellRef) -> Vec<CellRef> {
        sorted(self.precedents.get(cell))
    }

    pub fn has_dependent(&self, cell: &CellRef, dependent: &CellRef) -> bool {
        self.dependents
            .get(cell)
            .is_some_and(|deps| deps.contains(dependent))
    }

    /// Number of cells referenced by at least one formula.
    pub fn referenced_cell_count(&self) -> usize {
        self.dependents.len()
    }

    /// Replace every edge contributed by `formula_cell` with `new_precedents`.
    ///
    /// Pass an empty set when the cell no longer holds a formula.
    pub fn replace_edges(&mut self, formula_cell: &CellRef, new_precedents: HashSet<CellRef>) {
        if let Some(old) = self.precedents.remove(formula_cell) {
            for pred in old {
                if let Some(deps) = self.dependents.get_mut(&pred) {
                    deps.remove(formula_cell);
                    if deps.is_empty() {
                        self.dependents.remove(&pred);
                    }
                }
            }
        }

        if new_precedents.is_empty() {
            return;
        }

        for pred in &new_precedents {
            self.dependents
                .entry(pred.clone())
                .or_default()
                .insert(formula_cell.clone());
        }
        self.precedents.insert(formula_cell.clone(), new_precedents);
    }
}

fn sorted(set: Option<&HashSet<CellRef>>) -> Vec<CellRef> {
    let mut cells: Vec<CellRef> = set.into_iter().flatten().cloned().collect();
    cells.sort();
    cells
}
