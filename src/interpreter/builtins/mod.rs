//! Built-in functions the host injects into the global environment.

mod io;

pub use io::*;

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use super::environment::Environment;
use super::error::InterpreterError;
use crate::value::{Builtin, Value};

pub fn define_builtin(
    env: &Environment,
    name: &str,
    func: impl Fn(&[Value]) -> Result<Value, InterpreterError> + 'static,
) {
    env.define(name, Value::Builtin(Rc::new(Builtin::new(name, func))));
}

/// `print` on stdout and `input` on stdin.
pub fn install_defaults(env: &Environment) {
    define_builtin(env, "print", builtin_print);
    define_builtin(env, "input", builtin_input);
}

/// Same as [`install_defaults`] but `print` writes into `sink`.
pub fn install_with_output<W: Write + 'static>(env: &Environment, sink: Rc<RefCell<W>>) {
    define_builtin(env, "print", print_into(sink));
    define_builtin(env, "input", builtin_input);
}

/// A global environment populated with the default built-ins.
pub fn default_globals() -> Environment {
    let env = Environment::new();
    install_defaults(&env);
    env
}
