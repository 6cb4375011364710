//! Staged recalculation for a single commit.
//!
//! A [`Recalc`] evaluates the edited cell and everything downstream of it
//! against a view where the edited cell already holds its new raw text,
//! without touching the document. The document applies the staged display
//! values only once the whole pass has succeeded.
//!
//! Both directions are walked with explicit work stacks, so the length of a
//! dependency chain is bounded by the grid, not by the thread's stack.

use std::collections::{BTreeMap, HashMap, HashSet};

use cellflow_engine::engine::{
    CellRef, CellResolver, EvalError, Expr, Value, evaluate, extract_reference_names,
    extract_references, formula_body, parse_formula,
};
use log::trace;

use super::{CellStore, DepGraph};
use crate::config::GridConfig;
use crate::error::{CellflowError, Result};

pub(crate) struct Recalc<'a> {
    store: &'a CellStore,
    graph: &'a DepGraph,
    config: &'a GridConfig,
    edited: &'a CellRef,
    edited_raw: &'a str,
    edited_precedents: &'a HashSet<CellRef>,
    /// Values computed during this pass. Dropped with the `Recalc`.
    memo: HashMap<CellRef, Value>,
    recomputed: HashSet<CellRef>,
    staged: BTreeMap<CellRef, String>,
}

/// A formula cell waiting for its precedents to be evaluated.
struct Pending {
    cell: CellRef,
    expr: Expr,
    precedents: Vec<CellRef>,
    next: usize,
}

impl<'a> Recalc<'a> {
    pub(crate) fn new(
        store: &'a CellStore,
        graph: &'a DepGraph,
        config: &'a GridConfig,
        edited: &'a CellRef,
        edited_raw: &'a str,
        edited_precedents: &'a HashSet<CellRef>,
    ) -> Self {
        Recalc {
            store,
            graph,
            config,
            edited,
            edited_raw,
            edited_precedents,
            memo: HashMap::new(),
            recomputed: HashSet::new(),
            staged: BTreeMap::new(),
        }
    }

    /// Evaluate the edited cell, then propagate to its dependents.
    /// Returns the new display text of every cell that was recomputed.
    pub(crate) fn run(mut self) -> Result<BTreeMap<CellRef, String>> {
        let edited = self.edited;
        let display = if formula_body(self.edited_raw).is_some() {
            self.value_of(edited)?.to_display()
        } else {
            // Literals display their own text.
            self.edited_raw.to_string()
        };
        self.staged.insert(edited.clone(), display);
        self.recomputed.insert(edited.clone());

        self.propagate(edited)?;
        Ok(self.staged)
    }

    /// Raw text of `cell` as of this commit.
    fn raw(&self, cell: &CellRef) -> &'a str {
        if cell == self.edited {
            self.edited_raw
        } else {
            self.store.get_raw(cell)
        }
    }

    /// Dependents of `cell` with the edited cell's edges already replaced.
    fn dependents_of(&self, cell: &CellRef) -> Vec<CellRef> {
        let mut deps: Vec<CellRef> = self
            .graph
            .dependents(cell)
            .into_iter()
            .filter(|d| d != self.edited)
            .collect();
        if self.edited_precedents.contains(cell) {
            deps.push(self.edited.clone());
            deps.sort();
        }
        deps
    }

    /// Recompute every formula cell downstream of `start`, each once.
    ///
    /// The stored graph is acyclic and `run` has already evaluated the
    /// edited cell, so any new cycle was reported before we get here.
    fn propagate(&mut self, start: &CellRef) -> Result<()> {
        let mut to_process = vec![start.clone()];
        while let Some(cell) = to_process.pop() {
            for dep in self.dependents_of(&cell) {
                if !self.recomputed.insert(dep.clone()) {
                    continue;
                }
                if formula_body(self.raw(&dep)).is_none() {
                    continue;
                }

                let value = self.value_of(&dep)?;
                trace!("recomputed {} = {:?}", dep, value);
                self.staged.insert(dep.clone(), value.to_display());
                to_process.push(dep);
            }
        }
        Ok(())
    }

    /// Current value of a cell: literal text interpreted, or its formula
    /// evaluated on demand. Memoized for the rest of the pass.
    fn value_of(&mut self, cell: &CellRef) -> Result<Value> {
        if let Some(value) = self.memo.get(cell) {
            return Ok(value.clone());
        }
        self.settle(cell)?;
        self.memo
            .get(cell)
            .cloned()
            .ok_or_else(|| CellflowError::UnknownReference(cell.to_string()))
    }

    /// Memoize `root` and every precedent it transitively needs, deepest
    /// first. `pending` doubles as the stack of in-progress cells for cycle
    /// detection.
    fn settle(&mut self, root: &CellRef) -> Result<()> {
        let mut pending: Vec<Pending> = Vec::new();
        let mut in_progress: HashSet<CellRef> = HashSet::new();
        self.enter(root, &mut pending, &mut in_progress)?;

        while let Some(top) = pending.last_mut() {
            if let Some(precedent) = top.precedents.get(top.next).cloned() {
                top.next += 1;
                if self.memo.contains_key(&precedent) {
                    continue;
                }
                if in_progress.contains(&precedent) {
                    let pos = pending
                        .iter()
                        .position(|p| p.cell == precedent)
                        .unwrap_or(0);
                    let mut cycle: Vec<CellRef> =
                        pending[pos..].iter().map(|p| p.cell.clone()).collect();
                    cycle.push(precedent);
                    return Err(CellflowError::CycleDetected { path: cycle });
                }
                self.enter(&precedent, &mut pending, &mut in_progress)?;
                continue;
            }

            if let Some(done) = pending.pop() {
                in_progress.remove(&done.cell);
                let value = self.evaluate_settled(&done)?;
                self.memo.insert(done.cell, value);
            }
        }
        Ok(())
    }

    /// Memoize a literal right away, or queue a formula cell for evaluation.
    fn enter(
        &mut self,
        cell: &CellRef,
        pending: &mut Vec<Pending>,
        in_progress: &mut HashSet<CellRef>,
    ) -> Result<()> {
        if !self.config.contains(cell) {
            return Err(CellflowError::UnknownReference(cell.to_string()));
        }

        let raw = self.raw(cell);
        let Some(body) = formula_body(raw) else {
            self.memo.insert(cell.clone(), Value::from_literal(raw));
            return Ok(());
        };

        check_references(self.config, body)?;
        let expr = parse_formula(body).map_err(|e| malformed(cell, e))?;
        in_progress.insert(cell.clone());
        pending.push(Pending {
            cell: cell.clone(),
            expr,
            precedents: extract_references(body),
            next: 0,
        });
        Ok(())
    }

    fn evaluate_settled(&mut self, pending: &Pending) -> Result<Value> {
        evaluate(&pending.expr, self).map_err(|err| match err {
            EvalError::Expr(e) => malformed(&pending.cell, e),
            EvalError::Resolve(e) => e,
        })
    }
}

// `settle` memoizes every precedent before a formula is evaluated, so this
// is a memo lookup.
impl CellResolver for Recalc<'_> {
    type Error = CellflowError;

    fn resolve(&mut self, cell: &CellRef) -> Result<Value> {
        self.value_of(cell)
    }
}

/// Fail with `UnknownReference` if the formula names a cell outside the grid.
pub(crate) fn check_references(config: &GridConfig, body: &str) -> Result<()> {
    for name in extract_reference_names(body) {
        config.parse_cell(&name)?;
    }
    Ok(())
}

fn malformed(cell: &CellRef, err: impl std::fmt::Display) -> CellflowError {
    CellflowError::MalformedFormula {
        cell: cell.clone(),
        message: err.to_string(),
    }
}
