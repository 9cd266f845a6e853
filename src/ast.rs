use serde::Serialize;
use std::fmt;
use std::rc::Rc;

use crate::diagnostic::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<=")]
    LessEq,
    #[serde(rename = ">=")]
    GreaterEq,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 13] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Mod,
        BinaryOp::Eq,
        BinaryOp::NotEq,
        BinaryOp::Less,
        BinaryOp::Greater,
        BinaryOp::LessEq,
        BinaryOp::GreaterEq,
        BinaryOp::And,
        BinaryOp::Or,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEq => "<=",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    /// Accepts `&&` and `||` as spellings of `and` and `or`.
    pub fn from_symbol(symbol: &str) -> Option<BinaryOp> {
        match symbol {
            "&&" => Some(BinaryOp::And),
            "||" => Some(BinaryOp::Or),
            _ => Self::ALL.into_iter().find(|op| op.symbol() == symbol),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "-")]
    Neg,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<UnaryOp> {
        match symbol {
            "!" => Some(UnaryOp::Not),
            "-" => Some(UnaryOp::Neg),
            _ => None,
        }
    }
}

/// Constant embedded in a `Literal` node. `Undefined` serialises as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    String(Rc<str>),
    Bool(bool),
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,
    #[serde(skip)]
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Expression built without source text, e.g. by the JSON decoder or in tests.
    pub fn synthetic(kind: ExprKind) -> Self {
        Self {
            kind,
            span: Span::dummy(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ExprKind {
    #[serde(rename = "AssignmentExpression")]
    Assignment { target: Box<Expr>, value: Box<Expr> },
    #[serde(rename = "BinaryExpression")]
    Binary {
        #[serde(rename = "operator")]
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    #[serde(rename = "UnaryExpression")]
    Unary {
        #[serde(rename = "operator")]
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Literal { value: Literal },
    Identifier { name: Rc<str> },
    #[serde(rename = "FunctionCall")]
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    #[serde(rename = "MemberExpression")]
    Member { object: Box<Expr>, property: Rc<str> },
}

impl ExprKind {
    /// Node name as it appears in the JSON AST and in trace output.
    pub fn node_name(&self) -> &'static str {
        match self {
            ExprKind::Assignment { .. } => "AssignmentExpression",
            ExprKind::Binary { .. } => "BinaryExpression",
            ExprKind::Unary { .. } => "UnaryExpression",
            ExprKind::Literal { .. } => "Literal",
            ExprKind::Identifier { .. } => "Identifier",
            ExprKind::Call { .. } => "FunctionCall",
            ExprKind::Member { .. } => "MemberExpression",
        }
    }
}

/// A function or method declaration. Shared by every closure created from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDecl {
    pub name: Rc<str>,
    pub params: Vec<Rc<str>>,
    pub body: Rc<[Stmt]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElseIf {
    pub condition: Expr,
    pub consequent: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    pub value: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Stmt {
    #[serde(rename = "VariableDeclaration")]
    Let { name: Rc<str>, value: Expr },
    #[serde(rename = "FunctionDeclaration")]
    Function(Rc<FunctionDecl>),
    #[serde(rename = "ClassDeclaration")]
    Class {
        name: Rc<str>,
        methods: Vec<Rc<FunctionDecl>>,
    },
    #[serde(rename = "IfStatement")]
    If {
        condition: Expr,
        consequent: Vec<Stmt>,
        alternates: Vec<ElseIf>,
        #[serde(rename = "else")]
        otherwise: Option<Vec<Stmt>>,
    },
    #[serde(rename = "SwitchStatement")]
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Stmt>>,
    },
    #[serde(rename = "WhileLoop")]
    While { condition: Expr, body: Vec<Stmt> },
    #[serde(rename = "ForLoop")]
    For {
        init: Box<Stmt>,
        condition: Expr,
        update: Expr,
        body: Vec<Stmt>,
    },
    #[serde(rename = "ReturnStatement")]
    Return { value: Expr },
    #[serde(rename = "ExpressionStatement")]
    Expression { expression: Expr },
    #[serde(rename = "AssignmentStatement")]
    Assign { name: Rc<str>, value: Expr },
}

impl Stmt {
    pub fn node_name(&self) -> &'static str {
        match self {
            Stmt::Let { .. } => "VariableDeclaration",
            Stmt::Function(_) => "FunctionDeclaration",
            Stmt::Class { .. } => "ClassDeclaration",
            Stmt::If { .. } => "IfStatement",
            Stmt::Switch { .. } => "SwitchStatement",
            Stmt::While { .. } => "WhileLoop",
            Stmt::For { .. } => "ForLoop",
            Stmt::Return { .. } => "ReturnStatement",
            Stmt::Expression { .. } => "ExpressionStatement",
            Stmt::Assign { .. } => "AssignmentStatement",
        }
    }
}

/// Renders an expression back to Serpent source, used to name callees in errors.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal { value } => match value {
                Literal::Number(n) => write!(f, "{}", n),
                Literal::String(s) => write!(f, "{:?}", s),
                Literal::Bool(b) => write!(f, "{}", b),
                Literal::Undefined => write!(f, "undefined"),
            },
            ExprKind::Identifier { name } => write!(f, "{}", name),
            ExprKind::Binary { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            ExprKind::Unary { op, operand } => write!(f, "{}{}", op.symbol(), operand),
            ExprKind::Assignment { target, value } => write!(f, "{} = {}", target, value),
            ExprKind::Member { object, property } => write!(f, "{}.{}", object, property),
            ExprKind::Call { callee, arguments } => {
                write!(f, "{}(", callee)?;
                for (index, argument) in arguments.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                write!(f, ")")
            }
        }
    }
}
