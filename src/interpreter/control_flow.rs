use crate::value::Value;

/// Outcome of executing a statement.
///
/// `Return` is threaded back through every enclosing block, loop and switch
/// until the function call that owns it unwraps it.
#[derive(Debug, Clone)]
pub enum ControlFlow {
    Next,
    Value(Value),
    Return(Value),
}

impl ControlFlow {
    pub fn is_return(&self) -> bool {
        matches!(self, ControlFlow::Return(_))
    }

    /// The value a completed top-level run reports.
    pub fn into_value(self) -> Value {
        match self {
            ControlFlow::Next => Value::Undefined,
            ControlFlow::Value(value) | ControlFlow::Return(value) => value,
        }
    }
}
