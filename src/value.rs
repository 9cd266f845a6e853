use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::{FunctionDecl, Literal};
use crate::interpreter::environment::Environment;
use crate::interpreter::error::InterpreterError;

/// Host callback behind a built-in. Receives the already-evaluated arguments.
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, InterpreterError>;

#[derive(Clone)]
pub enum Value {
    Undefined,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Function(Rc<Function>),
    Builtin(Rc<Builtin>),
    Class(Rc<ClassTemplate>),
    Instance(Rc<Instance>),
}

/// A closure: the declaration plus the scope that was active where it was declared.
pub struct Function {
    pub decl: Rc<FunctionDecl>,
    pub closure: Environment,
    /// Set when the function was read off an instance; bound as `self` on call.
    pub receiver: Option<Rc<Instance>>,
}

impl Function {
    pub fn new(decl: Rc<FunctionDecl>, closure: Environment) -> Self {
        Self {
            decl,
            closure,
            receiver: None,
        }
    }

    pub fn bind(&self, receiver: Rc<Instance>) -> Function {
        Function {
            decl: Rc::clone(&self.decl),
            closure: self.closure.clone(),
            receiver: Some(receiver),
        }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    /// Same declaration, closure frame and receiver. Two reads of `obj.method`
    /// produce separate bound functions that compare equal through this.
    pub fn same_callable(&self, other: &Function) -> bool {
        let same_receiver = match (&self.receiver, &other.receiver) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        Rc::ptr_eq(&self.decl, &other.decl) && self.closure.same_scope(&other.closure) && same_receiver
    }
}

pub struct Builtin {
    pub name: Rc<str>,
    pub func: Box<NativeFn>,
}

impl Builtin {
    pub fn new(
        name: impl Into<Rc<str>>,
        func: impl Fn(&[Value]) -> Result<Value, InterpreterError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, InterpreterError> {
        (self.func)(args)
    }
}

pub struct ClassTemplate {
    pub name: Rc<str>,
    pub methods: IndexMap<Rc<str>, Rc<Function>>,
}

impl ClassTemplate {
    pub fn method(&self, name: &str) -> Option<&Rc<Function>> {
        self.methods.get(name)
    }
}

pub struct Instance {
    pub class: Rc<ClassTemplate>,
    pub fields: RefCell<IndexMap<Rc<str>, Value>>,
}

impl Instance {
    pub fn new(class: Rc<ClassTemplate>) -> Self {
        Self {
            class,
            fields: RefCell::new(IndexMap::new()),
        }
    }

    /// Own field first, then the class method table bound to this instance.
    pub fn get(self: &Rc<Self>, property: &str) -> Option<Value> {
        if let Some(value) = self.fields.borrow().get(property) {
            return Some(value.clone());
        }
        self.class
            .method(property)
            .map(|method| Value::Function(Rc::new(method.bind(Rc::clone(self)))))
    }

    pub fn set(&self, property: &str, value: Value) {
        self.fields.borrow_mut().insert(Rc::from(property), value);
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Number(n) => Value::Number(*n),
            Literal::String(s) => Value::String(Rc::clone(s)),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Undefined => Value::Undefined,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) | Value::Builtin(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Builtin(_) | Value::Class(_))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Undefined | Value::Bool(_) | Value::Number(_) | Value::String(_)
        )
    }

    /// Numeric coercion used by arithmetic and ordering.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    parse_decimal(trimmed)
                }
            }
            _ => f64::NAN,
        }
    }

    /// Strict equality: by value for primitives, by identity for everything else.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b) || a.same_callable(b),
            (Value::Builtin(a), Value::Builtin(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Decimal literals with optional sign, fraction and exponent, plus `Infinity`.
/// Anything else (`inf`, `0x10`, `nan`) is NaN.
fn parse_decimal(text: &str) -> f64 {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return if text.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    let decimal = unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !decimal || !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return f64::NAN;
    }
    text.parse().unwrap_or(f64::NAN)
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// What `print` writes and what `+` concatenates.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Function(func) => write!(f, "<func {}>", func.name()),
            Value::Builtin(builtin) => write!(f, "<builtin {}>", builtin.name),
            Value::Class(class) => write!(f, "<class {}>", class.name),
            Value::Instance(instance) => write!(f, "<{} instance>", instance.class.name),
        }
    }
}

// Closures can reach themselves through their environment, so Debug never recurses into scopes.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Number(n) => write!(f, "Number({})", n),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::Instance(instance) => {
                let fields = instance.fields.borrow();
                let mut map = f.debug_map();
                for (name, value) in fields.iter() {
                    map.entry(&name.as_ref(), &value.type_name());
                }
                map.finish()
            }
            other => write!(f, "{}", other),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}
