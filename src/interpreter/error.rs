use thiserror::Error;

use crate::diagnostic::{Diagnostic, Label, Span};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpreterError {
    #[error("Unknown statement type: {kind}")]
    UnknownStatementKind { kind: String },

    #[error("Unknown expression type: {kind}")]
    UnknownExpressionKind { kind: String },

    #[error("Unknown operator: {operator}")]
    UnknownOperator { operator: String },

    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String, span: Span },

    #[error("{callee} is not a function")]
    NotCallable { callee: String, span: Span },

    #[error("Invalid left-hand side in assignment")]
    InvalidAssignmentTarget { span: Span },

    #[error("Cannot access property `{property}` of {target}")]
    InvalidMemberAccess {
        property: String,
        target: &'static str,
        span: Span,
    },

    #[error("Malformed AST node: {message}")]
    MalformedNode { message: String },

    #[error("Maximum call depth of {limit} exceeded")]
    RecursionLimit { limit: usize, span: Span },

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl InterpreterError {
    pub fn unknown_statement(kind: impl Into<String>) -> Self {
        Self::UnknownStatementKind { kind: kind.into() }
    }

    pub fn unknown_expression(kind: impl Into<String>) -> Self {
        Self::UnknownExpressionKind { kind: kind.into() }
    }

    pub fn unknown_operator(operator: impl Into<String>) -> Self {
        Self::UnknownOperator {
            operator: operator.into(),
        }
    }

    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            name: name.into(),
            span: Span::dummy(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedNode {
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn not_callable_at(callee: impl Into<String>, span: Span) -> Self {
        Self::NotCallable {
            callee: callee.into(),
            span,
        }
    }

    pub fn invalid_assignment_target_at(span: Span) -> Self {
        Self::InvalidAssignmentTarget { span }
    }

    pub fn invalid_member_access_at(property: impl Into<String>, target: &'static str, span: Span) -> Self {
        Self::InvalidMemberAccess {
            property: property.into(),
            target,
            span,
        }
    }

    pub fn recursion_limit_at(limit: usize, span: Span) -> Self {
        Self::RecursionLimit { limit, span }
    }

    /// Attach a source location if the error does not carry one yet.
    pub fn with_span(mut self, at: Span) -> Self {
        match &mut self {
            Self::UndefinedVariable { span, .. }
            | Self::NotCallable { span, .. }
            | Self::InvalidAssignmentTarget { span }
            | Self::InvalidMemberAccess { span, .. }
            | Self::RecursionLimit { span, .. } => {
                if span.is_dummy() {
                    *span = at;
                }
            }
            _ => {}
        }
        self
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UndefinedVariable { span, .. }
            | Self::NotCallable { span, .. }
            | Self::InvalidAssignmentTarget { span }
            | Self::InvalidMemberAccess { span, .. }
            | Self::RecursionLimit { span, .. } => *span,
            _ => Span::dummy(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownStatementKind { .. } => "E0301",
            Self::UnknownExpressionKind { .. } => "E0302",
            Self::UnknownOperator { .. } => "E0303",
            Self::MalformedNode { .. } => "E0304",
            Self::UndefinedVariable { .. } => "E0201",
            Self::NotCallable { .. } => "E0202",
            Self::InvalidAssignmentTarget { .. } => "E0203",
            Self::InvalidMemberAccess { .. } => "E0204",
            Self::RecursionLimit { .. } => "E0205",
            Self::Io { .. } => "E0206",
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.to_string()).with_code(self.code());
        match self {
            Self::UndefinedVariable { name, span } => diagnostic
                .with_label(Label::primary(*span, "not found in this scope"))
                .with_help(format!("declare it first with `let {} = ...;`", name)),
            Self::NotCallable { span, .. } => {
                diagnostic.with_label(Label::primary(*span, "called here"))
            }
            Self::InvalidAssignmentTarget { span } => diagnostic
                .with_label(Label::primary(*span, "cannot assign to this"))
                .with_note("only variables and instance fields can be assigned"),
            Self::InvalidMemberAccess { span, .. } => {
                diagnostic.with_label(Label::primary(*span, "property read here"))
            }
            Self::RecursionLimit { span, .. } => diagnostic
                .with_label(Label::primary(*span, "in this call"))
                .with_help("raise the limit with `--max-depth`"),
            _ => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            InterpreterError::undefined_variable("x").to_string(),
            "Undefined variable: x"
        );
        assert_eq!(
            InterpreterError::not_callable_at("answer", Span::dummy()).to_string(),
            "answer is not a function"
        );
        assert_eq!(
            InterpreterError::unknown_operator("**").to_string(),
            "Unknown operator: **"
        );
    }

    #[test]
    fn test_with_span_keeps_existing_location() {
        let located = InterpreterError::undefined_variable("x").with_span(Span::new(3, 4));
        assert_eq!(located.span(), Span::new(3, 4));
        assert_eq!(located.with_span(Span::new(9, 10)).span(), Span::new(3, 4));
    }

    #[test]
    fn test_diagnostic_code() {
        let diagnostic = InterpreterError::undefined_variable("y")
            .with_span(Span::new(0, 1))
            .to_diagnostic();
        assert_eq!(diagnostic.code.as_deref(), Some("E0201"));
        assert_eq!(diagnostic.labels.len(), 1);
        assert!(diagnostic.notes[0].contains("let y"));
    }
}
