//! Document state and logic (UI-agnostic).

mod eval;
mod graph;
mod ops;
mod state;
mod store;

pub use graph::DepGraph;
pub use state::Document;
pub use store::{Cell, CellStore};
