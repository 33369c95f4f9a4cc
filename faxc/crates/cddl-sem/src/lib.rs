//! The deferred semantic pass: reference resolution and cross-type checks
//! run once after the structural parse, expressed as a queue of thunks
//! rather than a second AST traversal.

pub mod queue;

pub use queue::DeferredQueue;
