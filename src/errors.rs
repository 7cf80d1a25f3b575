//! Error types for tooldev.

use crate::config::ConfigError;
use crate::interpreter::InterpreterError;
use crate::namespace::NamespaceError;
use crate::resolver::ResolveError;
use crate::summary::SummaryError;

/// Top-level error type for tooldev operations.
#[derive(Debug, thiserror::Error)]
pub enum TooldevError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    #[error(transparent)]
    Interpreter(#[from] InterpreterError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Summary(#[from] SummaryError),
}

/// Map an error to its exit code.
pub fn exit_code(error: &TooldevError) -> i32 {
    match error {
        TooldevError::Io(_) => 1,
        TooldevError::Namespace(_) => 1,
        TooldevError::Summary(_) => 1,
        TooldevError::Interpreter(InterpreterError::ModuleResolution { .. }) => 2,
        TooldevError::Interpreter(_) => 3,
        TooldevError::Config(_) => 4,
        TooldevError::Resolve(_) => 5,
    }
}
