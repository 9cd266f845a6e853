pub mod builtins;
pub mod control_flow;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod operators;
pub mod parser;

pub use control_flow::ControlFlow;
pub use environment::Environment;
pub use error::InterpreterError;
pub use evaluator::{interpret, parse_and_run, parse_and_run_with_diagnostics, parse_program, Interpreter};
pub use parser::{ParseError, ParseResult, TokenParser};
