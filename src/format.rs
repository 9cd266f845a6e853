//! How the REPL echoes values. `print` uses plain `Display` instead.

use owo_colors::OwoColorize;

use crate::value::Value;

pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Strings are quoted and instances list their fields one level deep.
pub fn format_value(value: &Value, color: bool) -> String {
    format_nested(value, color, true)
}

fn format_nested(value: &Value, color: bool, expand: bool) -> String {
    let plain = match value {
        Value::String(s) => format!("\"{}\"", escape_string(s)),
        Value::Instance(instance) if expand => {
            let fields = instance.fields.borrow();
            if fields.is_empty() {
                return paint_reference(&value.to_string(), color);
            }
            let rendered: Vec<String> = fields
                .iter()
                .map(|(name, field)| format!("{}: {}", name, format_nested(field, color, false)))
                .collect();
            return format!("{} {{ {} }}", paint_reference(&value.to_string(), color), rendered.join(", "));
        }
        other => other.to_string(),
    };

    if !color {
        return plain;
    }
    match value {
        Value::Number(_) => plain.yellow().to_string(),
        Value::String(_) => plain.green().to_string(),
        Value::Bool(_) => plain.magenta().to_string(),
        Value::Undefined => plain.dimmed().to_string(),
        _ => paint_reference(&plain, color),
    }
}

fn paint_reference(text: &str, color: bool) -> String {
    if color {
        text.cyan().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{Environment, Interpreter};

    #[test]
    fn test_plain_scalars() {
        assert_eq!(format_value(&Value::Number(2.5), false), "2.5");
        assert_eq!(format_value(&Value::from("a\"b\n"), false), "\"a\\\"b\\n\"");
        assert_eq!(format_value(&Value::Undefined, false), "undefined");
    }

    #[test]
    fn test_instance_fields() {
        let mut interpreter = Interpreter::new(Environment::new());
        let value = interpreter
            .eval_source("class P { func initialize() { self.x = 1; self.tag = \"a\"; } } P();")
            .unwrap();
        assert_eq!(format_value(&value, false), "<P instance> { x: 1, tag: \"a\" }");
    }

    #[test]
    fn test_colored_output_differs() {
        assert_ne!(format_value(&Value::Number(1.0), true), "1");
    }
}
