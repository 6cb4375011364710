//! cellflow_engine - Cell references, reference extraction and formula evaluation.

pub mod engine;
