use serde_json::Value;
use std::path::Path;

use crate::ast::Stmt;
use crate::convert::program_from_json;
use crate::interpreter::InterpreterError;

pub fn parse_json(json_str: &str) -> Result<Value, String> {
    serde_json::from_str(json_str).map_err(|e| e.to_string())
}

/// Read a JSON AST from disk and decode it into statements.
pub fn load_ast_file(file_path: &Path) -> Result<Vec<Stmt>, InterpreterError> {
    let json_str = std::fs::read_to_string(file_path)
        .map_err(|e| InterpreterError::io(format!("{}: {}", file_path.display(), e)))?;
    let json = parse_json(&json_str).map_err(InterpreterError::malformed)?;
    program_from_json(&json)
}

pub fn program_to_json(program: &[Stmt]) -> Result<String, String> {
    serde_json::to_string_pretty(program).map_err(|e| e.to_string())
}
