//! Foundation types shared across the CDDL front-end: source positions,
//! the diagnostic model, and small Rust-level error types used at crate
//! boundaries.

pub mod diagnostic;
pub mod env;
pub mod error;
pub mod position;

pub use diagnostic::{Diagnostic, ErrorList, Level};
pub use env::Environment;
pub use error::{EnvironmentError, EnvironmentResult};
pub use position::{Position, PositionRange};

pub use rustc_hash::FxHashMap;
