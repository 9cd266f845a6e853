pub mod ast;
pub mod cli;
pub mod config;
pub mod convert;
pub mod diagnostic;
pub mod format;
pub mod interpreter;
pub mod json;
pub mod lexer;
pub mod repl;
pub mod stack;
pub mod token;
pub mod value;

pub use ast::{Expr, ExprKind, Stmt};
pub use interpreter::{interpret, parse_and_run, Environment, Interpreter, InterpreterError};
pub use token::Token;
pub use value::Value;
