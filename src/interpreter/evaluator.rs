use crate::ast::{Expr, ExprKind, Stmt};
use crate::config::InterpreterConfig;
use crate::diagnostic::{Diagnostic, Span};
use crate::stack::ensure_sufficient_stack;
use crate::value::{ClassTemplate, Function, Instance, Value};
use super::builtins;
use super::control_flow::ControlFlow;
use super::environment::Environment;
use super::error::InterpreterError;
use super::operators::{eval_binary_op, eval_unary_op};
use super::parser::TokenParser;
use indexmap::IndexMap;
use std::rc::Rc;
use tracing::{debug, trace};

/// Name bound to the receiver inside a method body.
pub const SELF_NAME: &str = "self";

/// Method invoked automatically when a class is called.
pub const INITIALIZER: &str = "initialize";

/// Tree-walking evaluator over a persistent global environment.
///
/// The same interpreter can run many programs in a row (the REPL does this);
/// definitions from earlier runs stay visible to later ones. A global frame
/// handed in by the host stays the host's: it outlives the interpreter intact.
/// Only a frame built by [`Interpreter::standalone`] is cleared on drop, which
/// releases closures that captured it.
pub struct Interpreter {
    globals: Environment,
    call_depth: usize,
    config: InterpreterConfig,
    owns_globals: bool,
}

impl Interpreter {
    pub fn new(globals: Environment) -> Self {
        Self::with_config(globals, InterpreterConfig::default())
    }

    pub fn with_config(globals: Environment, config: InterpreterConfig) -> Self {
        Self {
            globals,
            call_depth: 0,
            config,
            owns_globals: false,
        }
    }

    /// An interpreter over its own globals with the default built-ins installed.
    pub fn standalone(config: InterpreterConfig) -> Self {
        Self {
            globals: builtins::default_globals(),
            call_depth: 0,
            config,
            owns_globals: true,
        }
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Execute a program against the global environment and report the value
    /// of its last statement, or of a top-level `return`.
    pub fn run(&mut self, program: &[Stmt]) -> Result<Value, InterpreterError> {
        let globals = self.globals.clone();
        let result = self.execute_block(program, &globals);
        // An error unwinds every active call at once.
        self.call_depth = 0;
        result.map(ControlFlow::into_value)
    }

    /// Parse and run `source`, reporting lexer, parser and runtime failures as diagnostics.
    pub fn eval_source(&mut self, source: &str) -> Result<Value, Vec<Diagnostic>> {
        let program = parse_program(source)?;
        self.run(&program).map_err(|e| vec![e.to_diagnostic()])
    }

    /// Run statements in order in `env`. Blocks never open a scope of their own.
    pub fn execute_block(&mut self, statements: &[Stmt], env: &Environment) -> Result<ControlFlow, InterpreterError> {
        let mut last = ControlFlow::Next;
        for statement in statements {
            let flow = self.execute(statement, env)?;
            if flow.is_return() {
                return Ok(flow);
            }
            last = flow;
        }
        Ok(last)
    }

    pub fn execute(&mut self, statement: &Stmt, env: &Environment) -> Result<ControlFlow, InterpreterError> {
        ensure_sufficient_stack(|| self.execute_inner(statement, env))
    }

    fn execute_inner(&mut self, statement: &Stmt, env: &Environment) -> Result<ControlFlow, InterpreterError> {
        trace!(node = statement.node_name(), "execute");
        match statement {
            Stmt::Let { name, value } => {
                let val = self.evaluate(value, env)?;
                env.define(name, val.clone());
                Ok(ControlFlow::Value(val))
            }
            Stmt::Assign { name, value } => {
                let val = self.evaluate(value, env)?;
                env.assign(name, val.clone());
                Ok(ControlFlow::Value(val))
            }
            Stmt::Expression { expression } => {
                let val = self.evaluate(expression, env)?;
                Ok(ControlFlow::Value(val))
            }
            Stmt::Return { value } => {
                let val = self.evaluate(value, env)?;
                Ok(ControlFlow::Return(val))
            }
            Stmt::Function(decl) => {
                let func = Value::Function(Rc::new(Function::new(Rc::clone(decl), env.clone())));
                env.define(&decl.name, func.clone());
                Ok(ControlFlow::Value(func))
            }
            Stmt::Class { name, methods } => {
                let methods: IndexMap<Rc<str>, Rc<Function>> = methods
                    .iter()
                    .map(|decl| {
                        let method = Rc::new(Function::new(Rc::clone(decl), env.clone()));
                        (Rc::clone(&decl.name), method)
                    })
                    .collect();
                debug!(class = %name, methods = methods.len(), "declare class");
                let class = Value::Class(Rc::new(ClassTemplate {
                    name: Rc::clone(name),
                    methods,
                }));
                env.define(name, class.clone());
                Ok(ControlFlow::Value(class))
            }
            Stmt::If {
                condition,
                consequent,
                alternates,
                otherwise,
            } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    return self.execute_block(consequent, env);
                }
                for alternate in alternates {
                    if self.evaluate(&alternate.condition, env)?.is_truthy() {
                        return self.execute_block(&alternate.consequent, env);
                    }
                }
                match otherwise {
                    Some(block) => self.execute_block(block, env),
                    None => Ok(ControlFlow::Next),
                }
            }
            Stmt::Switch {
                discriminant,
                cases,
                default,
            } => {
                let subject = self.evaluate(discriminant, env)?;
                for case in cases {
                    let candidate = self.evaluate(&case.value, env)?;
                    if subject.strict_equals(&candidate) {
                        return self.execute_block(&case.body, env);
                    }
                }
                match default {
                    Some(block) => self.execute_block(block, env),
                    None => Ok(ControlFlow::Next),
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition, env)?.is_truthy() {
                    let flow = self.execute_block(body, env)?;
                    if flow.is_return() {
                        return Ok(flow);
                    }
                }
                Ok(ControlFlow::Next)
            }
            Stmt::For {
                init,
                condition,
                update,
                body,
            } => {
                let flow = self.execute(init, env)?;
                if flow.is_return() {
                    return Ok(flow);
                }
                while self.evaluate(condition, env)?.is_truthy() {
                    let flow = self.execute_block(body, env)?;
                    if flow.is_return() {
                        return Ok(flow);
                    }
                    self.evaluate(update, env)?;
                }
                Ok(ControlFlow::Next)
            }
        }
    }

    pub fn evaluate(&mut self, expr: &Expr, env: &Environment) -> Result<Value, InterpreterError> {
        ensure_sufficient_stack(|| self.evaluate_inner(expr, env))
    }

    fn evaluate_inner(&mut self, expr: &Expr, env: &Environment) -> Result<Value, InterpreterError> {
        trace!(node = expr.kind.node_name(), "evaluate");
        match &expr.kind {
            ExprKind::Literal { value } => Ok(Value::from(value)),
            ExprKind::Identifier { name } => env.lookup(name).map_err(|e| e.with_span(expr.span)),
            ExprKind::Binary { op, left, right } => {
                let left_val = self.evaluate(left, env)?;
                let right_val = self.evaluate(right, env)?;
                Ok(eval_binary_op(*op, left_val, right_val))
            }
            ExprKind::Unary { op, operand } => {
                let val = self.evaluate(operand, env)?;
                Ok(eval_unary_op(*op, &val))
            }
            ExprKind::Assignment { target, value } => {
                let val = self.evaluate(value, env)?;
                self.perform_assignment(target, val, env)
            }
            ExprKind::Member { object, property } => {
                let target = self.evaluate(object, env)?;
                match target {
                    Value::Instance(instance) => Ok(instance.get(property).unwrap_or(Value::Undefined)),
                    other => Err(InterpreterError::invalid_member_access_at(
                        property.to_string(),
                        other.type_name(),
                        expr.span,
                    )),
                }
            }
            ExprKind::Call { callee, arguments } => {
                let func = self.evaluate(callee, env)?;
                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument, env)?);
                }
                if !func.is_callable() {
                    return Err(InterpreterError::not_callable_at(callee.to_string(), expr.span));
                }
                self.call_value(&func, args, expr.span)
            }
        }
    }

    fn perform_assignment(&mut self, target: &Expr, value: Value, env: &Environment) -> Result<Value, InterpreterError> {
        match &target.kind {
            ExprKind::Identifier { name } => {
                env.assign(name, value.clone());
                Ok(value)
            }
            ExprKind::Member { object, property } => match self.evaluate(object, env)? {
                Value::Instance(instance) => {
                    instance.set(property, value.clone());
                    Ok(value)
                }
                other => Err(InterpreterError::invalid_member_access_at(
                    property.to_string(),
                    other.type_name(),
                    target.span,
                )),
            },
            _ => Err(InterpreterError::invalid_assignment_target_at(target.span)),
        }
    }

    /// Invoke any callable value with already-evaluated arguments.
    pub fn call_value(&mut self, callee: &Value, args: Vec<Value>, span: Span) -> Result<Value, InterpreterError> {
        match callee {
            Value::Function(func) => self.call_function(func, args, span),
            Value::Builtin(builtin) => {
                debug!(builtin = %builtin.name, args = args.len(), "call builtin");
                builtin.call(&args).map_err(|e| e.with_span(span))
            }
            Value::Class(class) => self.instantiate(class, args, span),
            other => Err(InterpreterError::not_callable_at(other.to_string(), span)),
        }
    }

    pub fn call_function(&mut self, func: &Function, args: Vec<Value>, span: Span) -> Result<Value, InterpreterError> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(InterpreterError::recursion_limit_at(self.config.max_call_depth, span));
        }
        self.call_depth += 1;
        let result = self.call_user_function(func, args);
        self.call_depth -= 1;
        result
    }

    fn call_user_function(&mut self, func: &Function, args: Vec<Value>) -> Result<Value, InterpreterError> {
        debug!(
            function = func.name(),
            args = args.len(),
            depth = self.call_depth,
            bound = func.receiver.is_some(),
            "call"
        );

        let scope = func.closure.child_scope();
        if let Some(receiver) = &func.receiver {
            scope.define(SELF_NAME, Value::Instance(Rc::clone(receiver)));
        }

        let mut args = args.into_iter();
        for param in &func.decl.params {
            scope.define(param, args.next().unwrap_or(Value::Undefined));
        }

        match self.execute_block(&func.decl.body, &scope)? {
            ControlFlow::Return(val) => Ok(val),
            ControlFlow::Next | ControlFlow::Value(_) => Ok(Value::Undefined),
        }
    }

    /// Create an instance and run its `initialize` method, if the class has one.
    pub fn instantiate(&mut self, class: &Rc<ClassTemplate>, args: Vec<Value>, span: Span) -> Result<Value, InterpreterError> {
        debug!(class = %class.name, args = args.len(), "instantiate");
        let instance = Rc::new(Instance::new(Rc::clone(class)));
        if let Some(initializer) = class.method(INITIALIZER) {
            let bound = initializer.bind(Rc::clone(&instance));
            self.call_function(&bound, args, span)?;
        }
        Ok(Value::Instance(instance))
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        if self.owns_globals {
            self.globals.clear();
        }
    }
}

/// Run `program` once against `globals`. Bindings it creates stay in `globals`.
pub fn interpret(program: &[Stmt], globals: Environment) -> Result<Value, InterpreterError> {
    Interpreter::new(globals).run(program)
}

/// Lex and parse `source`, collecting every lexer or parser diagnostic.
pub fn parse_program(source: &str) -> Result<Vec<Stmt>, Vec<Diagnostic>> {
    let tokens = crate::lexer::tokenize(source)?;
    let mut parser = TokenParser::from_lexer_output(tokens, source.len());
    let parse_result = parser.parse_with_errors();

    if !parse_result.is_ok() {
        return Err(parse_result.errors.iter().map(|e| e.to_diagnostic()).collect());
    }
    Ok(parse_result.statements)
}

pub fn parse_and_run(source: &str, globals: Environment) -> Result<Value, String> {
    let stmts = parse_program(source).map_err(|diagnostics| {
        let messages: Vec<String> = diagnostics.iter().map(|d| d.message.clone()).collect();
        format!("Parse error: {}", messages.join("; "))
    })?;

    interpret(&stmts, globals).map_err(|e| format!("Runtime error: {}", e))
}

pub fn parse_and_run_with_diagnostics(source: &str, globals: Environment) -> Result<Value, Vec<Diagnostic>> {
    Interpreter::new(globals).eval_source(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::builtins::install_with_output;
    use std::cell::RefCell;

    fn run_capturing(source: &str) -> (Result<Value, String>, String) {
        let sink = Rc::new(RefCell::new(Vec::<u8>::new()));
        let globals = Environment::new();
        install_with_output(&globals, Rc::clone(&sink));
        let result = parse_and_run(source, globals);
        let output = String::from_utf8(sink.borrow().clone()).unwrap();
        (result, output)
    }

    fn output_of(source: &str) -> String {
        let (result, output) = run_capturing(source);
        if let Err(e) = result {
            panic!("program failed: {}", e);
        }
        output
    }

    #[test]
    fn test_let_reports_value() {
        let result = parse_and_run("let x = 5;", Environment::new());
        assert_eq!(result.unwrap(), Value::Number(5.0));
    }

    #[test]
    fn test_last_statement_value() {
        let result = parse_and_run("let x = 2; x * 21;", Environment::new());
        assert_eq!(result.unwrap(), Value::Number(42.0));
    }

    #[test]
    fn test_top_level_return_stops_program() {
        let result = parse_and_run("return 1; undefined_name;", Environment::new());
        assert_eq!(result.unwrap(), Value::Number(1.0));
    }

    #[test]
    fn test_print_sum() {
        assert_eq!(output_of("let x = 5; let y = 10; print(x + y);"), "15\n");
    }

    #[test]
    fn test_function_call() {
        assert_eq!(output_of("func add(a, b) { return a + b; } print(add(2, 3));"), "5\n");
    }

    #[test]
    fn test_method_call() {
        assert_eq!(
            output_of("class C { func m(a) { return a * 2; } } let c = C(); print(c.m(4));"),
            "8\n"
        );
    }

    #[test]
    fn test_closure_returned_from_function() {
        let source = "func make(x) { func inner(y) { return x + y; } return inner; } let f = make(5); print(f(3));";
        assert_eq!(output_of(source), "8\n");
    }

    #[test]
    fn test_missing_arguments_are_undefined() {
        assert_eq!(output_of("func f(a, b) { return b; } print(f(1), f(1, 2, 3));"), "undefined 2\n");
    }

    #[test]
    fn test_function_without_return_yields_undefined() {
        assert_eq!(output_of("func f() { 42; } print(f());"), "undefined\n");
    }

    #[test]
    fn test_initialize_runs_on_instantiation() {
        let source = "
            class Point {
                func initialize(x, y) { self.x = x; self.y = y; return 99; }
                func sum() { return self.x + self.y; }
            }
            let p = Point(3, 4);
            print(p.sum(), p.x);
        ";
        assert_eq!(output_of(source), "7 3\n");
    }

    #[test]
    fn test_undefined_variable_has_span() {
        let source = "let a = 1;\na + b;";
        let err = Interpreter::new(Environment::new()).eval_source(source).unwrap_err();
        assert_eq!(err[0].code.as_deref(), Some("E0201"));
        assert_eq!(err[0].labels[0].span, Span::new(15, 16));
    }

    #[test]
    fn test_not_callable_names_callee() {
        let (result, _) = run_capturing("let n = 3; n(1);");
        assert_eq!(result.unwrap_err(), "Runtime error: n is not a function");
    }

    #[test]
    fn test_recursion_limit() {
        let program = parse_program("func down(n) { return down(n + 1); } down(0);").unwrap();
        let config = InterpreterConfig { max_call_depth: 16 };
        let mut interpreter = Interpreter::with_config(Environment::new(), config);
        let err = interpreter.run(&program).unwrap_err();
        assert!(matches!(err, InterpreterError::RecursionLimit { limit: 16, .. }));
        assert_eq!(interpreter.call_depth, 0);
    }

    #[test]
    fn test_globals_persist_between_runs() {
        let mut interpreter = Interpreter::new(Environment::new());
        interpreter.eval_source("let total = 1;").unwrap();
        let value = interpreter.eval_source("total = total + 1; total;").unwrap();
        assert_eq!(value, Value::Number(2.0));
        assert!(interpreter.globals().contains("total"));
    }

    #[test]
    fn test_host_globals_survive_interpret() {
        let globals = builtins::default_globals();
        let program = parse_program("let a = 1;").unwrap();
        interpret(&program, globals.clone()).unwrap();

        assert!(globals.contains("print"));
        assert_eq!(globals.get("a"), Some(Value::Number(1.0)));

        let program = parse_program("a = a + 1; a;").unwrap();
        assert_eq!(interpret(&program, globals.clone()).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn test_standalone_clears_own_globals_on_drop() {
        let globals = {
            let mut interpreter = Interpreter::standalone(InterpreterConfig::default());
            interpreter.eval_source("func f() { return f; }").unwrap();
            interpreter.globals().clone()
        };
        assert!(globals.names().is_empty());
    }
}
