#![allow(dead_code)]

use serpent::config::InterpreterConfig;
use serpent::interpreter::builtins::install_with_output;
use serpent::interpreter::{parse_program, Environment, Interpreter};
use serpent::{InterpreterError, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Result of running a program with `print` captured.
pub struct Run {
    pub result: Result<Value, InterpreterError>,
    pub stdout: String,
}

pub fn run_with_config(source: &str, config: InterpreterConfig) -> Run {
    let program = match parse_program(source) {
        Ok(program) => program,
        Err(diagnostics) => panic!("parse failed: {:?}", diagnostics),
    };
    let sink = Rc::new(RefCell::new(Vec::<u8>::new()));
    let globals = Environment::new();
    install_with_output(&globals, Rc::clone(&sink));

    let result = Interpreter::with_config(globals, config).run(&program);
    let stdout = String::from_utf8(sink.borrow().clone()).expect("print wrote invalid UTF-8");
    Run { result, stdout }
}

pub fn run(source: &str) -> Run {
    run_with_config(source, InterpreterConfig::default())
}

/// Captured `print` output of a program that must succeed.
pub fn output_of(source: &str) -> String {
    let run = run(source);
    if let Err(e) = &run.result {
        panic!("program failed: {}\n--- output so far ---\n{}", e, run.stdout);
    }
    run.stdout
}

/// Printed lines, for programs that print one value per line.
pub fn lines_of(source: &str) -> Vec<String> {
    output_of(source).lines().map(str::to_string).collect()
}

pub fn value_of(source: &str) -> Value {
    match run(source).result {
        Ok(value) => value,
        Err(e) => panic!("program failed: {}", e),
    }
}

pub fn error_of(source: &str) -> InterpreterError {
    match run(source).result {
        Ok(value) => panic!("expected an error, got {:?}", value),
        Err(e) => e,
    }
}
