use super::{CellStore, DepGraph};
use crate::config::GridConfig;
use crate::error::Result;

/// UI-agnostic document state for one grid.
///
/// Owns the cell store and the reverse-dependency graph; both change only
/// through [`Document::commit`] and [`Document::clear`].
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub(crate) config: GridConfig,
    /// Raw and display text of every populated cell
    pub(crate) store: CellStore,
    /// Reverse dependency map: cell -> cells whose formula mentions it
    pub(crate) graph: DepGraph,
}

impl Document {
    /// Create an empty document over the default 6x6 grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document over a custom grid.
    pub fn with_config(config: GridConfig) -> Result<Self> {
        config.validate()?;
        Ok(Document {
            config,
            store: CellStore::new(),
            graph: DepGraph::new(),
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn graph(&self) -> &DepGraph {
        &self.graph
    }
}
