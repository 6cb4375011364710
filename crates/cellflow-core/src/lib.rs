//! cellflow-core - UI-agnostic document model.
//!
//! A [`Document`] owns the cell store and the reverse-dependency graph for
//! one grid. Committing a cell re-evaluates it and every cell that depends
//! on it, directly or transitively, before returning.

pub mod config;
pub mod document;
pub mod error;

pub use config::GridConfig;
pub use document::{Cell, CellStore, DepGraph, Document};
pub use error::{CellflowError, Result};

pub use cellflow_engine::engine::CellRef;
