use std::collections::HashSet;

use cellflow_engine::engine::{CellRef, extract_references, formula_body};
use log::{debug, warn};

use super::Document;
use super::eval::{Recalc, check_references};
use crate::error::{CellflowError, Result};

impl Document {
    /// Finalize the raw text of a cell identified by name (e.g. `"B1"`).
    pub fn commit(&mut self, cell: &str, raw: &str) -> Result<()> {
        let cell_ref = self.config.parse_cell(cell)?;
        self.commit_at(&cell_ref, raw)
    }

    /// Finalize the raw text of a cell.
    ///
    /// Evaluates the cell if it holds a formula and recomputes every cell
    /// that depends on it, directly or transitively. All-or-nothing: on
    /// error the raw text, the dependency graph and every display value are
    /// left as they were.
    pub fn commit_at(&mut self, cell: &CellRef, raw: &str) -> Result<()> {
        if !self.config.contains(cell) {
            return Err(CellflowError::UnknownReference(cell.to_string()));
        }

        let precedents: HashSet<CellRef> = match formula_body(raw) {
            Some(body) => {
                check_references(&self.config, body).inspect_err(|e| {
                    warn!("rejected commit of {}: {}", cell, e);
                })?;
                extract_references(body).into_iter().collect()
            }
            None => HashSet::new(),
        };

        let staged = Recalc::new(
            &self.store,
            &self.graph,
            &self.config,
            cell,
            raw,
            &precedents,
        )
        .run()
        .inspect_err(|e| warn!("rejected commit of {}: {}", cell, e))?;

        debug!(
            "commit {} = {:?} ({} cell(s) recomputed)",
            cell,
            raw,
            staged.len()
        );

        self.store.set_raw(cell, raw);
        self.graph.replace_edges(cell, precedents);
        for (target, display) in staged {
            self.store.set_display(&target, &display);
        }
        Ok(())
    }

    /// Empty a cell. Its dependents recompute against the empty value.
    pub fn clear(&mut self, cell: &str) -> Result<()> {
        self.commit(cell, "")
    }

    pub fn clear_at(&mut self, cell: &CellRef) -> Result<()> {
        self.commit_at(cell, "")
    }

    /// Display text of a cell identified by name.
    pub fn get_display(&self, cell: &str) -> Result<&str> {
        let cell_ref = self.config.parse_cell(cell)?;
        Ok(self.store.get_display(&cell_ref))
    }

    /// Raw text of a cell identified by name.
    pub fn get_raw(&self, cell: &str) -> Result<&str> {
        let cell_ref = self.config.parse_cell(cell)?;
        Ok(self.store.get_raw(&cell_ref))
    }

    pub fn display(&self, cell: &CellRef) -> &str {
        self.store.get_display(cell)
    }

    pub fn raw(&self, cell: &CellRef) -> &str {
        self.store.get_raw(cell)
    }

    /// Snapshot of every formula cell and its raw text, row-major.
    pub fn list_formula_cells(&self) -> Vec<(CellRef, String)> {
        self.store
            .iter()
            .filter(|(_, cell)| cell.is_formula())
            .map(|(cell_ref, cell)| (cell_ref.clone(), cell.raw.clone()))
            .collect()
    }

    /// Cells whose formula mentions `cell`.
    pub fn dependents(&self, cell: &CellRef) -> Vec<CellRef> {
        self.graph.dependents(cell)
    }

    /// Cells mentioned by `cell`'s formula.
    pub fn precedents(&self, cell: &CellRef) -> Vec<CellRef> {
        self.graph.precedents(cell)
    }

    /// Every cell of the grid in row-major order.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellRef> + '_ {
        self.config.cell_ids()
    }
}
