use crate::ast::{BinaryOp, ElseIf, Expr, ExprKind, FunctionDecl, Literal, Stmt, SwitchCase, UnaryOp};
use crate::diagnostic::{Diagnostic, Label, Span};
use crate::stack::ensure_sufficient_stack;
use crate::token::Token;
use std::rc::Rc;

const MAX_ERRORS: usize = 10;

#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub expected: Vec<String>,
    pub found: Option<String>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: Vec::new(),
            found: None,
        }
    }

    pub fn with_expected(mut self, expected: Vec<String>) -> Self {
        self.expected = expected;
        self
    }

    pub fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut msg = self.message.clone();
        if !self.expected.is_empty() {
            msg = format!("expected {}", self.expected.join(" or "));
            if let Some(found) = &self.found {
                msg.push_str(&format!(", found {}", found));
            }
        }

        let mut diag = Diagnostic::error(msg)
            .with_code("E0101")
            .with_label(Label::primary(self.span, ""));

        if self.expected.len() == 1 {
            diag = diag.with_help(format!("expected {} here", self.expected[0]));
        }

        diag
    }
}

pub struct ParseResult {
    pub statements: Vec<Stmt>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct TokenParser {
    tokens: Vec<SpannedToken>,
    current: usize,
    errors: Vec<ParseError>,
    source_len: usize,
}

impl TokenParser {
    pub fn new(tokens: Vec<SpannedToken>, source_len: usize) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
            source_len,
        }
    }

    pub fn from_lexer_output(tokens: Vec<(Token, chumsky::span::SimpleSpan)>, source_len: usize) -> Self {
        let spanned_tokens: Vec<SpannedToken> = tokens
            .into_iter()
            .map(|(token, span)| SpannedToken {
                token,
                span: Span::from(span),
            })
            .collect();
        Self::new(spanned_tokens, source_len)
    }

    fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.current).map(|st| &st.token)
    }

    fn peek_token(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.current + offset).map(|st| &st.token)
    }

    fn check(&self, expected: &Token) -> bool {
        matches!(self.current_token(), Some(token) if std::mem::discriminant(token) == std::mem::discriminant(expected))
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.current)
            .map(|st| st.span)
            .unwrap_or_else(|| Span::new(self.source_len, self.source_len))
    }

    fn previous_span(&self) -> Span {
        if self.current > 0 {
            self.tokens[self.current - 1].span
        } else {
            Span::new(0, 0)
        }
    }

    fn advance(&mut self) -> Option<SpannedToken> {
        if self.current < self.tokens.len() {
            let st = self.tokens[self.current].clone();
            self.current += 1;
            Some(st)
        } else {
            None
        }
    }

    fn expect(&mut self, expected: Token) -> Result<Span, ParseError> {
        match self.current_token() {
            Some(token) if std::mem::discriminant(token) == std::mem::discriminant(&expected) => {
                let span = self.current_span();
                self.advance();
                Ok(span)
            }
            Some(token) => Err(ParseError::new("unexpected token", self.current_span())
                .with_expected(vec![expected.to_string()])
                .with_found(token.to_string())),
            None => Err(ParseError::new("unexpected end of input", self.current_span())
                .with_expected(vec![expected.to_string()])
                .with_found("end of input")),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<Rc<str>, ParseError> {
        match self.current_token() {
            Some(Token::Ident(name)) => {
                let name = Rc::from(name.as_str());
                self.advance();
                Ok(name)
            }
            Some(other) => Err(ParseError::new(format!("expected {}", what), self.current_span())
                .with_expected(vec![what.to_string()])
                .with_found(other.to_string())),
            None => Err(ParseError::new(format!("expected {}", what), self.current_span())
                .with_expected(vec![what.to_string()])
                .with_found("end of input")),
        }
    }

    fn synchronize(&mut self) {
        while let Some(token) = self.current_token() {
            match token {
                Token::Semicolon => {
                    self.advance();
                    return;
                }
                Token::RBrace => {
                    self.advance();
                    return;
                }
                token if token.starts_statement() => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Parse with recovery, collecting up to ten errors.
    pub fn parse_with_errors(&mut self) -> ParseResult {
        let mut statements = Vec::new();
        while self.current_token().is_some() {
            let before = self.current;
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize();
                    if self.current == before {
                        self.advance();
                    }
                    if self.errors.len() >= MAX_ERRORS {
                        break;
                    }
                }
            }
        }
        ParseResult {
            statements,
            errors: std::mem::take(&mut self.errors),
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        ensure_sufficient_stack(|| self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt, ParseError> {
        match self.current_token() {
            Some(Token::Let) => self.parse_let_statement(),
            Some(Token::Func) => {
                let decl = self.parse_function_decl()?;
                Ok(Stmt::Function(decl))
            }
            Some(Token::Class) => self.parse_class_statement(),
            Some(Token::If) => self.parse_if_statement(),
            Some(Token::Switch) => self.parse_switch_statement(),
            Some(Token::While) => self.parse_while_statement(),
            Some(Token::For) => self.parse_for_statement(),
            Some(Token::Return) => self.parse_return_statement(),
            Some(Token::Ident(_)) if matches!(self.peek_token(1), Some(Token::Assign)) => {
                let name = self.expect_ident("identifier")?;
                self.expect(Token::Assign)?;
                let value = self.parse_expression()?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Assign { name, value })
            }
            _ => {
                let expression = self.parse_expression()?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::Expression { expression })
            }
        }
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(Token::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) && self.current_token().is_some() {
            statements.push(self.parse_statement()?);
        }
        self.expect(Token::RBrace)?;
        Ok(statements)
    }

    fn parse_let_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::Let)?;
        let name = self.expect_ident("identifier")?;
        self.expect(Token::Assign)?;
        let value = self.parse_expression()?;
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Let { name, value })
    }

    fn parse_function_decl(&mut self) -> Result<Rc<FunctionDecl>, ParseError> {
        self.expect(Token::Func)?;
        let name = self.expect_ident("function name")?;
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                params.push(self.expect_ident("parameter name")?);
                if self.check(&Token::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        let body = self.parse_block()?;
        Ok(Rc::new(FunctionDecl {
            name,
            params,
            body: Rc::from(body),
        }))
    }

    fn parse_class_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::Class)?;
        let name = self.expect_ident("class name")?;
        self.expect(Token::LBrace)?;
        let mut methods = Vec::new();
        while self.check(&Token::Func) {
            methods.push(self.parse_function_decl()?);
        }
        if !self.check(&Token::RBrace) {
            let found = self
                .current_token()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "end of input".to_string());
            return Err(ParseError::new("expected method declaration", self.current_span())
                .with_expected(vec!["`func`".to_string(), "`}`".to_string()])
                .with_found(found));
        }
        self.expect(Token::RBrace)?;
        Ok(Stmt::Class { name, methods })
    }

    fn parse_if_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::If)?;
        let condition = self.parse_expression()?;
        let consequent = self.parse_block()?;

        let mut alternates = Vec::new();
        while self.check(&Token::ElseIf) {
            self.advance();
            let condition = self.parse_expression()?;
            let consequent = self.parse_block()?;
            alternates.push(ElseIf { condition, consequent });
        }

        let otherwise = if self.check(&Token::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        if self.check(&Token::EndIf) {
            self.advance();
        }

        Ok(Stmt::If {
            condition,
            consequent,
            alternates,
            otherwise,
        })
    }

    fn parse_switch_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::Switch)?;
        let discriminant = self.parse_expression()?;
        self.expect(Token::LBrace)?;

        let mut cases = Vec::new();
        let mut default = None;
        loop {
            match self.current_token() {
                Some(Token::Case) => {
                    self.advance();
                    let value = self.parse_expression()?;
                    self.expect(Token::Colon)?;
                    let body = self.parse_case_body()?;
                    cases.push(SwitchCase { value, body });
                }
                Some(Token::Default) => {
                    let span = self.current_span();
                    self.advance();
                    self.expect(Token::Colon)?;
                    if default.is_some() {
                        return Err(ParseError::new("duplicate `default` in switch", span));
                    }
                    default = Some(self.parse_case_body()?);
                }
                _ => break,
            }
        }

        self.expect(Token::RBrace)?;
        Ok(Stmt::Switch {
            discriminant,
            cases,
            default,
        })
    }

    fn parse_case_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut body = Vec::new();
        while !matches!(
            self.current_token(),
            None | Some(Token::Case) | Some(Token::Default) | Some(Token::RBrace)
        ) {
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    fn parse_while_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::While)?;
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { condition, body })
    }

    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        self.expect(Token::For)?;
        self.expect(Token::LParen)?;
        let init = self.parse_statement()?;
        let condition = self.parse_expression()?;
        self.expect(Token::Semicolon)?;
        let update = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let body = self.parse_block()?;
        Ok(Stmt::For {
            init: Box::new(init),
            condition,
            update,
            body,
        })
    }

    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword_span = self.expect(Token::Return)?;
        let value = if self.check(&Token::Semicolon) {
            Expr::new(ExprKind::Literal { value: Literal::Undefined }, keyword_span)
        } else {
            self.parse_expression()?
        };
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Return { value })
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_binary_expr(1)?;

        if self.check(&Token::Assign) {
            self.advance();
            let right = self.parse_assignment()?;
            let span = left.span.merge(right.span);
            return Ok(Expr::new(
                ExprKind::Assignment {
                    target: Box::new(left),
                    value: Box::new(right),
                },
                span,
            ));
        }

        Ok(left)
    }

    fn token_to_binary_operator(token: &Token) -> Option<(u8, BinaryOp)> {
        match token {
            Token::Or => Some((1, BinaryOp::Or)),
            Token::And => Some((2, BinaryOp::And)),
            Token::Eq => Some((3, BinaryOp::Eq)),
            Token::NotEq => Some((3, BinaryOp::NotEq)),
            Token::Greater => Some((4, BinaryOp::Greater)),
            Token::Less => Some((4, BinaryOp::Less)),
            Token::GreaterEq => Some((4, BinaryOp::GreaterEq)),
            Token::LessEq => Some((4, BinaryOp::LessEq)),
            Token::Plus => Some((5, BinaryOp::Add)),
            Token::Minus => Some((5, BinaryOp::Sub)),
            Token::Star => Some((6, BinaryOp::Mul)),
            Token::Slash => Some((6, BinaryOp::Div)),
            Token::Percent => Some((6, BinaryOp::Mod)),
            _ => None,
        }
    }

    fn parse_binary_expr(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some(token) = self.current_token() {
            let (precedence, op) = match Self::token_to_binary_operator(token) {
                Some((prec, op)) if prec >= min_precedence => (prec, op),
                _ => break,
            };
            self.advance();
            let right = self.parse_binary_expr(precedence + 1)?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let start_span = self.current_span();
        let op = match self.current_token() {
            Some(Token::Bang) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = start_span.merge(operand.span);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current_token() {
                Some(Token::Dot) => {
                    self.advance();
                    let property = self.expect_ident("property name")?;
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Member {
                            object: Box::new(expr),
                            property,
                        },
                        span,
                    );
                }
                Some(Token::LParen) => {
                    self.advance();
                    let mut arguments = Vec::new();
                    if !self.check(&Token::RParen) {
                        loop {
                            arguments.push(self.parse_expression()?);
                            if self.check(&Token::Comma) {
                                self.advance();
                            } else {
                                break;
                            }
                        }
                    }
                    let end_span = self.expect(Token::RParen)?;
                    let span = expr.span.merge(end_span);
                    expr = Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            arguments,
                        },
                        span,
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.current_span();
        let value = match self.current_token() {
            Some(Token::Number(n)) => Literal::Number(*n),
            Some(Token::String(s)) => Literal::String(Rc::from(s.as_str())),
            Some(Token::True) => Literal::Bool(true),
            Some(Token::False) => Literal::Bool(false),
            Some(Token::Undefined) => Literal::Undefined,
            Some(Token::Ident(name)) => {
                let name = Rc::from(name.as_str());
                self.advance();
                return Ok(Expr::new(ExprKind::Identifier { name }, span));
            }
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expression()?;
                let end_span = self.expect(Token::RParen)?;
                return Ok(Expr::new(inner.kind, span.merge(end_span)));
            }
            // Leave the offending token in place so recovery can resynchronise on it.
            Some(other) => {
                return Err(ParseError::new("expected expression", span)
                    .with_expected(vec!["expression".to_string()])
                    .with_found(other.to_string()));
            }
            None => {
                return Err(ParseError::new("unexpected end of input", span)
                    .with_expected(vec!["expression".to_string()])
                    .with_found("end of input"));
            }
        };
        self.advance();
        Ok(Expr::new(ExprKind::Literal { value }, span))
    }
}
