//! Error types for the Cellflow command line

use cellflow_core::CellflowError;
use cellflow_engine::engine::ExprError;
use thiserror::Error;

/// Errors that can occur while running a command
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Cellflow(#[from] CellflowError),

    #[error("Invalid expression: {0}")]
    Expr(#[from] ExprError),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing argument for '{0}'")]
    MissingArgument(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
