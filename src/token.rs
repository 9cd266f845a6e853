use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Let,
    Func,
    Class,
    If,
    ElseIf,
    Else,
    EndIf,
    Switch,
    Case,
    Default,
    While,
    For,
    Return,
    And,
    Or,

    // Literals and Identifiers
    Ident(String),
    Number(f64),
    String(String),
    True,
    False,
    Undefined,

    // Arithmetic Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // Comparison Operators
    Eq,
    NotEq,
    Greater,
    Less,
    GreaterEq,
    LessEq,

    Bang,
    Assign,

    // Delimiters
    Dot,
    Comma,
    Colon,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
}

impl Token {
    /// Keyword table shared by the lexer; `None` means a plain identifier.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word {
            "let" => Token::Let,
            "func" => Token::Func,
            "class" => Token::Class,
            "if" => Token::If,
            "elseif" => Token::ElseIf,
            "else" => Token::Else,
            "endif" => Token::EndIf,
            "switch" => Token::Switch,
            "case" => Token::Case,
            "default" => Token::Default,
            "while" => Token::While,
            "for" => Token::For,
            "return" => Token::Return,
            "and" => Token::And,
            "or" => Token::Or,
            "true" => Token::True,
            "false" => Token::False,
            "undefined" => Token::Undefined,
            _ => return None,
        };
        Some(token)
    }

    /// Tokens a statement may begin with; the parser resynchronises on these.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            Token::Let
                | Token::Func
                | Token::Class
                | Token::If
                | Token::Switch
                | Token::While
                | Token::For
                | Token::Return
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Ident(name) => return write!(f, "identifier `{}`", name),
            Token::Number(n) => return write!(f, "number `{}`", n),
            Token::String(s) => return write!(f, "string {:?}", s),
            Token::Let => "`let`",
            Token::Func => "`func`",
            Token::Class => "`class`",
            Token::If => "`if`",
            Token::ElseIf => "`elseif`",
            Token::Else => "`else`",
            Token::EndIf => "`endif`",
            Token::Switch => "`switch`",
            Token::Case => "`case`",
            Token::Default => "`default`",
            Token::While => "`while`",
            Token::For => "`for`",
            Token::Return => "`return`",
            Token::And => "`and`",
            Token::Or => "`or`",
            Token::True => "`true`",
            Token::False => "`false`",
            Token::Undefined => "`undefined`",
            Token::Plus => "`+`",
            Token::Minus => "`-`",
            Token::Star => "`*`",
            Token::Slash => "`/`",
            Token::Percent => "`%`",
            Token::Eq => "`==`",
            Token::NotEq => "`!=`",
            Token::Greater => "`>`",
            Token::Less => "`<`",
            Token::GreaterEq => "`>=`",
            Token::LessEq => "`<=`",
            Token::Bang => "`!`",
            Token::Assign => "`=`",
            Token::Dot => "`.`",
            Token::Comma => "`,`",
            Token::Colon => "`:`",
            Token::Semicolon => "`;`",
            Token::LParen => "`(`",
            Token::RParen => "`)`",
            Token::LBrace => "`{`",
            Token::RBrace => "`}`",
        };
        f.write_str(text)
    }
}
