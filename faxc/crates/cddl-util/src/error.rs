//! Rust-level error types for operations that fail in a way the embedding
//! program must react to, as opposed to CDDL diagnostics which are always
//! collected into an [`crate::diagnostic::ErrorList`] rather than returned.

use thiserror::Error;

use crate::position::Position;

/// Failure modes of [`crate::env::Environment`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("symbol already exists, first defined at {0}")]
    SymbolExists(Position),
}

pub type EnvironmentResult<T> = std::result::Result<T, EnvironmentError>;
