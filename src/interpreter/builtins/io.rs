//! Host I/O built-ins: `print` and `input`.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use crate::interpreter::error::InterpreterError;
use crate::value::Value;

/// Display forms joined by single spaces, as `print` writes them.
pub fn join_display(args: &[Value]) -> String {
    args.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

pub fn write_line<W: Write + ?Sized>(out: &mut W, args: &[Value]) -> Result<Value, InterpreterError> {
    writeln!(out, "{}", join_display(args))
        .and_then(|_| out.flush())
        .map_err(|e| InterpreterError::io(format!("failed to write output: {}", e)))?;
    Ok(Value::Undefined)
}

pub fn builtin_print(args: &[Value]) -> Result<Value, InterpreterError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_line(&mut handle, args)
}

/// `print` writing into a shared buffer instead of stdout.
pub fn print_into<W: Write + 'static>(sink: Rc<RefCell<W>>) -> impl Fn(&[Value]) -> Result<Value, InterpreterError> {
    move |args| write_line(&mut *sink.borrow_mut(), args)
}

pub fn read_line<R: BufRead + ?Sized>(input: &mut R) -> Result<Value, InterpreterError> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| InterpreterError::io(format!("failed to read input: {}", e)))?;
    if read == 0 {
        return Ok(Value::Undefined);
    }
    Ok(Value::from(line.trim_end_matches(['\n', '\r'])))
}

pub fn builtin_input(args: &[Value]) -> Result<Value, InterpreterError> {
    if let Some(prompt) = args.first() {
        print!("{}", prompt);
        io::stdout()
            .flush()
            .map_err(|e| InterpreterError::io(format!("failed to write prompt: {}", e)))?;
    }
    let stdin = io::stdin();
    let mut handle = stdin.lock();
    read_line(&mut handle)
}
