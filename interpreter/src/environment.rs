//! The frame stack and current receiver (spec.md §3 "Environments (scopes)",
//! §4.4 "Name resolution" / "Assignment").

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::{ObjectInstance, Value};

/// A stack of name→value frames plus the "current receiver" fallback.
///
/// The bottom frame is the global frame and is never popped (spec.md §3
/// invariant: "the environment stack is never empty during evaluation").
pub struct Environment {
    frames: Vec<IndexMap<String, Value>>,
    receiver: Option<Rc<RefCell<ObjectInstance>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self { frames: vec![IndexMap::new()], receiver: None }
    }

    pub fn receiver(&self) -> Option<Rc<RefCell<ObjectInstance>>> {
        self.receiver.clone()
    }

    /// Frame depth, used by tests to check scope discipline (spec.md §8
    /// "Scope discipline").
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Runs `f` with a fresh frame pushed, popping it on every exit path
    /// (spec.md invariant: "that frame is popped on every exit path").
    pub fn with_frame<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.frames.push(IndexMap::new());
        let result = f(self);
        self.frames.pop();
        result
    }

    /// Runs `f` with `receiver` installed as the current receiver, restoring
    /// the prior receiver afterward regardless of how `f` returns (spec.md
    /// invariant: "restored on exit").
    pub fn with_receiver<T>(&mut self, receiver: Option<Rc<RefCell<ObjectInstance>>>, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.receiver, receiver);
        let result = f(self);
        self.receiver = previous;
        result
    }

    /// Lower-level half of [`Self::with_frame`], for callers (the
    /// evaluator) that need the push/pop straddling more than a single
    /// closure over `&mut Environment` because they also need `&mut self`
    /// access to sibling state (the class registry, stdout). The evaluator
    /// pairs this with [`Self::pop_frame`] around a closure over its own
    /// `&mut Self`, which still pops on every exit path since the pop runs
    /// after the closure's `T` (including an `Err`) has already been
    /// produced.
    pub fn push_frame(&mut self) {
        self.frames.push(IndexMap::new());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Lower-level half of [`Self::with_receiver`]; see [`Self::push_frame`].
    pub fn swap_receiver(&mut self, receiver: Option<Rc<RefCell<ObjectInstance>>>) -> Option<Rc<RefCell<ObjectInstance>>> {
        std::mem::replace(&mut self.receiver, receiver)
    }

    pub fn restore_receiver(&mut self, previous: Option<Rc<RefCell<ObjectInstance>>>) {
        self.receiver = previous;
    }

    pub fn declare(&mut self, name: String, value: Value) {
        self.frames.last_mut().expect("global frame always present").insert(name, value);
    }

    /// Name resolution: frames top to bottom, then the receiver's fields
    /// (spec.md §4.4 "Name resolution").
    pub fn get(&self, name: &str) -> Option<Value> {
        for frame in self.frames.iter().rev() {
            if let Some(v) = frame.get(name) {
                return Some(v.clone());
            }
        }
        if let Some(receiver) = &self.receiver {
            if let Some(v) = receiver.borrow().fields.get(name) {
                return Some(v.clone());
            }
        }
        None
    }

    /// `set_var`: write to the nearest frame that already binds the name;
    /// else to the receiver's fields if it has such a field; else create a
    /// new binding in the top frame (spec.md §4.4 "Assignment").
    pub fn set_var(&mut self, name: &str, value: Value) {
        for frame in self.frames.iter_mut().rev() {
            if frame.contains_key(name) {
                frame.insert(name.to_string(), value);
                return;
            }
        }
        if let Some(receiver) = &self.receiver {
            if receiver.borrow().fields.contains_key(name) {
                receiver.borrow_mut().fields.insert(name.to_string(), value);
                return;
            }
        }
        self.frames.last_mut().expect("global frame always present").insert(name.to_string(), value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_frame_shadows_outer_binding() {
        let mut env = Environment::new();
        env.declare("x".into(), Value::Int(1));
        env.with_frame(|env| {
            env.declare("x".into(), Value::Int(2));
            assert_eq!(env.get("x"), Some(Value::Int(2)));
        });
        assert_eq!(env.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn set_var_writes_through_to_existing_outer_binding() {
        let mut env = Environment::new();
        env.declare("x".into(), Value::Int(1));
        env.with_frame(|env| {
            env.set_var("x", Value::Int(9));
        });
        assert_eq!(env.get("x"), Some(Value::Int(9)));
    }

    #[test]
    fn with_frame_pops_even_though_closure_only_reads() {
        let mut env = Environment::new();
        assert_eq!(env.depth(), 1);
        env.with_frame(|_| {});
        assert_eq!(env.depth(), 1);
    }
}
