use std::cmp::Ordering;
use std::rc::Rc;

use crate::ast::{BinaryOp, UnaryOp};
use crate::value::Value;

/// Apply a binary operator to two already-evaluated operands.
///
/// Both operands are always evaluated by the caller, `and` and `or` included.
pub fn eval_binary_op(op: BinaryOp, left: Value, right: Value) -> Value {
    match op {
        BinaryOp::Add => add(&left, &right),
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        // Rust's `%` on f64 is fmod: the result takes the sign of the dividend.
        BinaryOp::Mod => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Eq => Value::Bool(left.strict_equals(&right)),
        BinaryOp::NotEq => Value::Bool(!left.strict_equals(&right)),
        BinaryOp::Less => Value::Bool(compare(&left, &right) == Some(Ordering::Less)),
        BinaryOp::Greater => Value::Bool(compare(&left, &right) == Some(Ordering::Greater)),
        BinaryOp::LessEq => Value::Bool(matches!(
            compare(&left, &right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::GreaterEq => Value::Bool(matches!(
            compare(&left, &right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::And => {
            if left.is_truthy() {
                right
            } else {
                left
            }
        }
        BinaryOp::Or => {
            if left.is_truthy() {
                left
            } else {
                right
            }
        }
    }
}

pub fn eval_unary_op(op: UnaryOp, operand: &Value) -> Value {
    match op {
        UnaryOp::Not => Value::Bool(!operand.is_truthy()),
        UnaryOp::Neg => Value::Number(-operand.to_number()),
    }
}

fn add(left: &Value, right: &Value) -> Value {
    let concatenates = |v: &Value| matches!(v, Value::String(_)) || !v.is_primitive();
    if concatenates(left) || concatenates(right) {
        let joined = format!("{}{}", left, right);
        Value::String(Rc::from(joined))
    } else {
        Value::Number(left.to_number() + right.to_number())
    }
}

/// Lexical when both sides are strings, numeric otherwise. `None` means unordered (NaN).
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.as_ref().cmp(b.as_ref())),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}
