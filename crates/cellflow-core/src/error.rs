//! Error types for Cellflow core.

use thiserror::Error;

use cellflow_engine::engine::CellRef;

/// Errors that can occur while editing a document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CellflowError {
    #[error("Malformed formula in {cell}: {message}")]
    MalformedFormula { cell: CellRef, message: String },

    #[error("Circular dependency detected: {}", format_path(.path))]
    CycleDetected { path: Vec<CellRef> },

    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

fn format_path(path: &[CellRef]) -> String {
    path.iter()
        .map(|cell| cell.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, CellflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_names_path() {
        let path = ["A1", "B1", "A1"]
            .iter()
            .map(|n| CellRef::from_str(n).unwrap())
            .collect();
        let err = CellflowError::CycleDetected { path };
        assert_eq!(
            err.to_string(),
            "Circular dependency detected: A1 -> B1 -> A1"
        );
    }
}
