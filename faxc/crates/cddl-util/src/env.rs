//! The flat symbol table binding rule names to the AST node they define.
//!
//! The environment is intentionally name-keyed rather than pointer-keyed:
//! CDDL rules may reference each other regardless of declaration order, and
//! a name-keyed table keeps the AST itself acyclic and resolution a separate
//! concern handled by the deferred pass.

use crate::error::{EnvironmentError, EnvironmentResult};
use crate::position::Position;
use crate::FxHashMap;

/// A symbol table entry: the position of the binding, kept so a later
/// duplicate can report where the name was first defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding<T> {
    pub position: Position,
    pub node: T,
}

/// Binds rule names to their defining node for the lifetime of one parse.
#[derive(Debug, Default)]
pub struct Environment<T> {
    symbols: FxHashMap<String, Binding<T>>,
}

impl<T: Clone> Environment<T> {
    pub fn new() -> Self {
        Environment {
            symbols: FxHashMap::default(),
        }
    }

    /// Binds `name` to `node`, recorded as first defined at `position`.
    /// Fails if the name is already bound.
    pub fn add(&mut self, name: &str, position: Position, node: T) -> EnvironmentResult<()> {
        if let Some(existing) = self.symbols.get(name) {
            return Err(EnvironmentError::SymbolExists(existing.position));
        }
        self.symbols
            .insert(name.to_string(), Binding { position, node });
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.symbols.get(name).map(|b| &b.node)
    }

    pub fn get_position(&self, name: &str) -> Option<Position> {
        self.symbols.get(name).map(|b| b.position)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_get_round_trips() {
        let mut env: Environment<i32> = Environment::new();
        env.add("byte", Position::new(0, 0, 1, 1), 42).unwrap();
        assert_eq!(env.get("byte"), Some(&42));
    }

    #[test]
    fn duplicate_add_reports_first_position() {
        let mut env: Environment<i32> = Environment::new();
        let first = Position::new(0, 0, 1, 1);
        env.add("byte", first, 1).unwrap();
        let err = env.add("byte", Position::new(0, 10, 2, 1), 2).unwrap_err();
        assert_eq!(err, EnvironmentError::SymbolExists(first));
    }

    #[test]
    fn unknown_name_is_absent() {
        let env: Environment<i32> = Environment::new();
        assert!(!env.exists("missing"));
        assert_eq!(env.get("missing"), None);
    }
}
