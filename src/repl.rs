use std::io::{self, BufRead, Write};

use crate::diagnostic::render_diagnostics;
use crate::format::format_value;
use crate::interpreter::Interpreter;
use crate::value::Value;

pub const PROMPT: &str = "serpent> ";
pub const CONTINUATION_PROMPT: &str = "....... ";
const ORIGIN: &str = "<repl>";

/// True once every `{` and `(` opened outside strings and comments has been closed.
pub fn is_complete(source: &str) -> bool {
    let mut depth: i64 = 0;
    let mut chars = source.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '/' if chars.peek() == Some(&'/') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
            }
            '{' | '(' => depth += 1,
            '}' | ')' => depth -= 1,
            _ => {}
        }
    }

    depth <= 0 && !in_string
}

/// Read chunks from `input` until end of input or `exit`, running each complete
/// chunk against `interpreter`. Results go to `out`, diagnostics to `err`.
pub fn run<R, W, E>(
    interpreter: &mut Interpreter,
    mut input: R,
    out: &mut W,
    err: &mut E,
    color: bool,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { PROMPT } else { CONTINUATION_PROMPT };
        write!(out, "{}", prompt)?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            break;
        }

        if buffer.is_empty() {
            match line.trim() {
                "exit" | "quit" => break,
                ":env" => {
                    list_globals(interpreter, out, color)?;
                    continue;
                }
                "" => continue,
                _ => {}
            }
        }

        buffer.push_str(&line);
        if !is_complete(&buffer) {
            continue;
        }

        let source = std::mem::take(&mut buffer);
        match interpreter.eval_source(&source) {
            Ok(Value::Undefined) => {}
            Ok(value) => writeln!(out, "{}", format_value(&value, color))?,
            Err(diagnostics) => write!(err, "{}", render_diagnostics(&source, ORIGIN, &diagnostics, color))?,
        }
    }

    Ok(())
}

fn list_globals<W: Write>(interpreter: &Interpreter, out: &mut W, color: bool) -> io::Result<()> {
    let globals = interpreter.globals();
    for name in globals.names() {
        let value = globals.get(&name).unwrap_or(Value::Undefined);
        writeln!(out, "{} = {}", name, format_value(&value, color))?;
    }
    Ok(())
}
