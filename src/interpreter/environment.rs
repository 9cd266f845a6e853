use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::error::InterpreterError;
use crate::value::Value;

type Scope = IndexMap<Rc<str>, Value>;

/// One frame of the lexical scope chain.
///
/// Cloning is cheap and yields another handle to the same frame: the call that
/// created it and every closure declared inside it share the bindings. Frames
/// are kept alive by reference counting, so a closure that escapes its call
/// keeps the whole chain above it reachable.
#[derive(Clone)]
pub struct Environment {
    bindings: Rc<RefCell<Scope>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            bindings: Rc::new(RefCell::new(IndexMap::new())),
            parent: None,
        }
    }

    pub fn with_parent(parent: Rc<Environment>) -> Self {
        Self {
            bindings: Rc::new(RefCell::new(IndexMap::new())),
            parent: Some(parent),
        }
    }

    /// A new frame whose parent is this one.
    pub fn child_scope(&self) -> Environment {
        Environment::with_parent(Rc::new(self.clone()))
    }

    /// Introduce or overwrite a binding in this frame only.
    pub fn define(&self, name: &str, value: Value) {
        self.bindings.borrow_mut().insert(Rc::from(name), value);
    }

    /// Overwrite the nearest existing binding. On a miss the binding is created
    /// in this (innermost) frame, not in the global one.
    pub fn assign(&self, name: &str, value: Value) {
        let mut frame = Some(self);
        while let Some(env) = frame {
            if let Some(slot) = env.bindings.borrow_mut().get_mut(name) {
                *slot = value;
                return;
            }
            frame = env.parent.as_deref();
        }
        self.define(name, value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let mut frame = Some(self);
        while let Some(env) = frame {
            if let Some(value) = env.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            frame = env.parent.as_deref();
        }
        None
    }

    pub fn lookup(&self, name: &str) -> Result<Value, InterpreterError> {
        self.get(name)
            .ok_or_else(|| InterpreterError::undefined_variable(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names bound directly in this frame, in definition order.
    pub fn names(&self) -> Vec<Rc<str>> {
        self.bindings.borrow().keys().cloned().collect()
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = self.parent.as_deref();
        while let Some(env) = frame {
            depth += 1;
            frame = env.parent.as_deref();
        }
        depth
    }

    /// True when both handles point at the same frame.
    pub fn same_scope(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.bindings, &other.bindings)
    }

    /// Drop every binding in this frame. Breaks closure cycles rooted here.
    pub fn clear(&self) {
        let drained: Vec<Value> = self.bindings.borrow_mut().drain(..).map(|(_, v)| v).collect();
        drop(drained);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.names())
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_lookup() {
        let env = Environment::new();
        env.define("x", Value::Number(42.0));
        assert_eq!(env.lookup("x").unwrap(), Value::Number(42.0));
    }

    #[test]
    fn test_lookup_walks_parents() {
        let global = Environment::new();
        global.define("x", Value::Number(1.0));
        let inner = global.child_scope().child_scope();
        assert_eq!(inner.lookup("x").unwrap(), Value::Number(1.0));
        assert_eq!(inner.depth(), 2);
    }

    #[test]
    fn test_lookup_miss_names_identifier() {
        let env = Environment::new();
        let err = env.lookup("ghost").unwrap_err();
        assert!(matches!(err, InterpreterError::UndefinedVariable { ref name, .. } if name == "ghost"));
    }

    #[test]
    fn test_define_shadows_parent() {
        let global = Environment::new();
        global.define("x", Value::Number(1.0));
        let inner = global.child_scope();
        inner.define("x", Value::Number(2.0));
        assert_eq!(inner.lookup("x").unwrap(), Value::Number(2.0));
        assert_eq!(global.lookup("x").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn test_assign_updates_outer_binding() {
        let global = Environment::new();
        global.define("x", Value::Number(1.0));
        let inner = global.child_scope();
        inner.assign("x", Value::Number(2.0));
        assert_eq!(global.lookup("x").unwrap(), Value::Number(2.0));
        assert!(inner.names().is_empty());
    }

    #[test]
    fn test_assign_miss_creates_in_innermost_frame() {
        let global = Environment::new();
        let inner = global.child_scope();
        inner.assign("fresh", Value::Bool(true));
        assert_eq!(inner.names(), vec![Rc::<str>::from("fresh")]);
        assert!(!global.contains("fresh"));
    }

    #[test]
    fn test_child_shares_parent_frame() {
        let global = Environment::new();
        let inner = global.child_scope();
        global.define("late", Value::Number(7.0));
        assert_eq!(inner.lookup("late").unwrap(), Value::Number(7.0));
        assert!(global.same_scope(&global.clone()));
        assert!(!global.same_scope(&inner));
    }

    #[test]
    fn test_clear() {
        let env = Environment::new();
        env.define("a", Value::Undefined);
        env.clear();
        assert!(env.names().is_empty());
    }
}
