//! The deferred-task queue: a FIFO of thunks scheduled during the parser's
//! structural pass and run once at the end against a resolved `Environment`.
//!
//! Thunks never mutate the tree they were scheduled from — they only
//! inspect it (via whatever state they captured) and optionally produce a
//! diagnostic. Generic over the environment type so this crate does not
//! need to depend on the AST crate that constructs the closures.

use std::collections::VecDeque;

use cddl_util::diagnostic::Diagnostic;

type Thunk<Env> = Box<dyn FnOnce(&Env) -> Option<Diagnostic>>;

pub struct DeferredQueue<Env> {
    tasks: VecDeque<Thunk<Env>>,
}

impl<Env> Default for DeferredQueue<Env> {
    fn default() -> Self {
        DeferredQueue {
            tasks: VecDeque::new(),
        }
    }
}

impl<Env> DeferredQueue<Env> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, task: impl FnOnce(&Env) -> Option<Diagnostic> + 'static) {
        self.tasks.push_back(Box::new(task));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Runs every scheduled thunk against `env` in queueing order, returning
    /// the diagnostics produced.
    pub fn drain(&mut self, env: &Env) -> Vec<Diagnostic> {
        let mut out = Vec::with_capacity(self.tasks.len());
        while let Some(task) = self.tasks.pop_front() {
            tracing::trace!("running deferred task");
            if let Some(d) = task(env) {
                out.push(d);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cddl_util::position::{Position, PositionRange};

    fn range() -> PositionRange {
        PositionRange::new(Position::new(0, 0, 1, 1), Position::new(0, 1, 1, 2))
    }

    #[test]
    fn tasks_run_in_fifo_order() {
        let mut queue: DeferredQueue<Vec<i32>> = DeferredQueue::new();
        let order = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = order.clone();
            queue.schedule(move |_env: &Vec<i32>| {
                order.lock().unwrap().push(i);
                None
            });
        }
        queue.drain(&vec![]);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn a_thunk_may_emit_a_diagnostic() {
        let mut queue: DeferredQueue<()> = DeferredQueue::new();
        queue.schedule(|_env: &()| Some(Diagnostic::error("parser", range(), "unresolved reference")));
        let diags = queue.drain(&());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn draining_empties_the_queue() {
        let mut queue: DeferredQueue<()> = DeferredQueue::new();
        queue.schedule(|_| None);
        queue.drain(&());
        assert!(queue.is_empty());
    }
}
