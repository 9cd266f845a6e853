//! Decoding of the JSON AST emitted by external Serpent parsers.

use serde_json::{Map, Value as Json};
use std::rc::Rc;

use crate::ast::{BinaryOp, ElseIf, Expr, ExprKind, FunctionDecl, Literal, Stmt, SwitchCase, UnaryOp};
use crate::interpreter::InterpreterError;

type Node = Map<String, Json>;

const EMPTY: &[Json] = &[];

/// Accepts either a bare array of statements or `{"type": "Program", "body": [...]}`.
pub fn program_from_json(json: &Json) -> Result<Vec<Stmt>, InterpreterError> {
    match json {
        Json::Array(items) => items.iter().map(stmt_from_json).collect(),
        Json::Object(node) if node.get("type").and_then(Json::as_str) == Some("Program") => {
            block(node, "body", "Program")
        }
        Json::Object(_) => Ok(vec![stmt_from_json(json)?]),
        _ => Err(InterpreterError::malformed("program must be an array of statements")),
    }
}

pub fn stmt_from_json(json: &Json) -> Result<Stmt, InterpreterError> {
    let (kind, node) = tagged(json)?;
    let stmt = match kind {
        "VariableDeclaration" => Stmt::Let {
            name: string(node, "name", kind)?,
            value: expr_field(node, "value", kind)?,
        },
        "AssignmentStatement" => Stmt::Assign {
            name: string(node, "name", kind)?,
            value: expr_field(node, "value", kind)?,
        },
        "FunctionDeclaration" => Stmt::Function(function_decl(node, kind)?),
        "ClassDeclaration" => Stmt::Class {
            name: string(node, "name", kind)?,
            methods: array(node, "methods", kind)?
                .iter()
                .map(|method| -> Result<Rc<FunctionDecl>, InterpreterError> {
                    let (method_kind, method_node) = tagged(method)?;
                    if method_kind != "FunctionDeclaration" {
                        return Err(InterpreterError::malformed(format!(
                            "ClassDeclaration.methods expects FunctionDeclaration, found {}",
                            method_kind
                        )));
                    }
                    function_decl(method_node, method_kind)
                })
                .collect::<Result<_, _>>()?,
        },
        "IfStatement" => Stmt::If {
            condition: expr_field(node, "condition", kind)?,
            consequent: block(node, "consequent", kind)?,
            alternates: optional_array(node, "alternates", kind)?
                .iter()
                .map(|clause| -> Result<ElseIf, InterpreterError> {
                    let clause = object(clause, "IfStatement.alternates")?;
                    Ok(ElseIf {
                        condition: expr_field(clause, "condition", "elseif")?,
                        consequent: block(clause, "consequent", "elseif")?,
                    })
                })
                .collect::<Result<_, _>>()?,
            otherwise: optional_block(node, "else", kind)?,
        },
        "SwitchStatement" => Stmt::Switch {
            discriminant: expr_field(node, "discriminant", kind)?,
            cases: array(node, "cases", kind)?
                .iter()
                .map(|case| -> Result<SwitchCase, InterpreterError> {
                    let case = object(case, "SwitchStatement.cases")?;
                    Ok(SwitchCase {
                        value: expr_field(case, "value", "case")?,
                        body: block(case, "body", "case")?,
                    })
                })
                .collect::<Result<_, _>>()?,
            default: optional_block(node, "default", kind)?,
        },
        "WhileLoop" => Stmt::While {
            condition: expr_field(node, "condition", kind)?,
            body: block(node, "body", kind)?,
        },
        "ForLoop" => Stmt::For {
            init: Box::new(stmt_from_json(field(node, "init", kind)?)?),
            condition: expr_field(node, "condition", kind)?,
            update: expr_field(node, "update", kind)?,
            body: block(node, "body", kind)?,
        },
        "ReturnStatement" => Stmt::Return {
            value: match node.get("value") {
                None | Some(Json::Null) => Expr::synthetic(ExprKind::Literal {
                    value: Literal::Undefined,
                }),
                Some(value) => expr_from_json(value)?,
            },
        },
        "ExpressionStatement" => Stmt::Expression {
            expression: expr_field(node, "expression", kind)?,
        },
        other => return Err(InterpreterError::unknown_statement(other)),
    };
    Ok(stmt)
}

pub fn expr_from_json(json: &Json) -> Result<Expr, InterpreterError> {
    let (kind, node) = tagged(json)?;
    let expr_kind = match kind {
        "Literal" => ExprKind::Literal {
            value: literal(node.get("value").unwrap_or(&Json::Null))?,
        },
        "Identifier" => ExprKind::Identifier {
            name: string(node, "name", kind)?,
        },
        "BinaryExpression" => {
            let symbol = str_field(node, "operator", kind)?;
            let op = BinaryOp::from_symbol(symbol).ok_or_else(|| InterpreterError::unknown_operator(symbol))?;
            ExprKind::Binary {
                op,
                left: Box::new(expr_field(node, "left", kind)?),
                right: Box::new(expr_field(node, "right", kind)?),
            }
        }
        "UnaryExpression" => {
            let symbol = str_field(node, "operator", kind)?;
            let op = UnaryOp::from_symbol(symbol).ok_or_else(|| InterpreterError::unknown_operator(symbol))?;
            ExprKind::Unary {
                op,
                operand: Box::new(expr_field(node, "operand", kind)?),
            }
        }
        "AssignmentExpression" => ExprKind::Assignment {
            target: Box::new(expr_field(node, "target", kind)?),
            value: Box::new(expr_field(node, "value", kind)?),
        },
        "FunctionCall" => ExprKind::Call {
            callee: Box::new(expr_field(node, "callee", kind)?),
            arguments: optional_array(node, "arguments", kind)?
                .iter()
                .map(expr_from_json)
                .collect::<Result<_, _>>()?,
        },
        "MemberExpression" => ExprKind::Member {
            object: Box::new(expr_field(node, "object", kind)?),
            property: member_property(field(node, "property", kind)?)?,
        },
        other => return Err(InterpreterError::unknown_expression(other)),
    };
    Ok(Expr::synthetic(expr_kind))
}

fn tagged(json: &Json) -> Result<(&str, &Node), InterpreterError> {
    let node = object(json, "AST node")?;
    let kind = node
        .get("type")
        .and_then(Json::as_str)
        .ok_or_else(|| InterpreterError::malformed("AST node is missing a string `type`"))?;
    Ok((kind, node))
}

fn object<'a>(json: &'a Json, what: &str) -> Result<&'a Node, InterpreterError> {
    json.as_object()
        .ok_or_else(|| InterpreterError::malformed(format!("{} must be an object", what)))
}

fn field<'a>(node: &'a Node, name: &str, kind: &str) -> Result<&'a Json, InterpreterError> {
    node.get(name)
        .ok_or_else(|| InterpreterError::malformed(format!("{} is missing `{}`", kind, name)))
}

fn str_field<'a>(node: &'a Node, name: &str, kind: &str) -> Result<&'a str, InterpreterError> {
    field(node, name, kind)?
        .as_str()
        .ok_or_else(|| InterpreterError::malformed(format!("{}.{} must be a string", kind, name)))
}

fn string(node: &Node, name: &str, kind: &str) -> Result<Rc<str>, InterpreterError> {
    str_field(node, name, kind).map(Rc::from)
}

fn array<'a>(node: &'a Node, name: &str, kind: &str) -> Result<&'a Vec<Json>, InterpreterError> {
    field(node, name, kind)?
        .as_array()
        .ok_or_else(|| InterpreterError::malformed(format!("{}.{} must be an array", kind, name)))
}

/// Missing or `null` reads as an empty list.
fn optional_array<'a>(node: &'a Node, name: &str, kind: &str) -> Result<&'a [Json], InterpreterError> {
    match node.get(name) {
        None | Some(Json::Null) => Ok(EMPTY),
        Some(_) => array(node, name, kind).map(Vec::as_slice),
    }
}

fn block(node: &Node, name: &str, kind: &str) -> Result<Vec<Stmt>, InterpreterError> {
    array(node, name, kind)?.iter().map(stmt_from_json).collect()
}

fn optional_block(node: &Node, name: &str, kind: &str) -> Result<Option<Vec<Stmt>>, InterpreterError> {
    match node.get(name) {
        None | Some(Json::Null) => Ok(None),
        Some(_) => block(node, name, kind).map(Some),
    }
}

fn expr_field(node: &Node, name: &str, kind: &str) -> Result<Expr, InterpreterError> {
    expr_from_json(field(node, name, kind)?)
}

fn function_decl(node: &Node, kind: &str) -> Result<Rc<FunctionDecl>, InterpreterError> {
    let params = optional_array(node, "params", kind)?
        .iter()
        .map(|param| match param {
            Json::String(name) => Ok(Rc::from(name.as_str())),
            // Some parsers emit parameters as Identifier nodes.
            Json::Object(param) => string(param, "name", "parameter"),
            _ => Err(InterpreterError::malformed(format!("{}.params must hold names", kind))),
        })
        .collect::<Result<_, _>>()?;
    Ok(Rc::new(FunctionDecl {
        name: string(node, "name", kind)?,
        params,
        body: Rc::from(block(node, "body", kind)?),
    }))
}

fn member_property(json: &Json) -> Result<Rc<str>, InterpreterError> {
    match json {
        Json::String(name) => Ok(Rc::from(name.as_str())),
        Json::Object(node) => string(node, "name", "MemberExpression.property"),
        _ => Err(InterpreterError::malformed("MemberExpression.property must be a name")),
    }
}

fn literal(json: &Json) -> Result<Literal, InterpreterError> {
    match json {
        Json::Null => Ok(Literal::Undefined),
        Json::Bool(b) => Ok(Literal::Bool(*b)),
        Json::Number(n) => n
            .as_f64()
            .map(Literal::Number)
            .ok_or_else(|| InterpreterError::malformed(format!("number {} is out of range", n))),
        Json::String(s) => Ok(Literal::String(Rc::from(s.as_str()))),
        Json::Array(_) | Json::Object(_) => Err(InterpreterError::malformed("Literal.value must be a scalar")),
    }
}
